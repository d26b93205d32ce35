use crate::dlog;
use crate::error::AppError;
use crate::form::{FormInput, WorkoutForm};
use crate::kv::KvStore;
use crate::map::{DEFAULT_ZOOM, Geolocation, MapAdapter, MapSurface};
use crate::modal::{ConfirmModal, Dismiss};
use crate::render::WorkoutList;
use crate::store::{LoadReport, WorkoutStore};
use crate::types::{Coords, Workout, WorkoutId, WorkoutKind};
use chrono::{DateTime, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppConfig {
    pub zoom: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { zoom: DEFAULT_ZOOM }
    }
}

/// The workout tracker. Owns all state; every event handler takes
/// `&mut self`, so there is exactly one writer.
pub struct App<K, M, G> {
    store: WorkoutStore<K>,
    map: MapAdapter<M>,
    geolocation: G,
    form: WorkoutForm,
    list: WorkoutList,
    modal: ConfirmModal,
    last_stamp_ms: i64,
}

impl<K: KvStore, M: MapSurface, G: Geolocation> App<K, M, G> {
    pub fn new(kv: K, surface: M, geolocation: G, config: AppConfig) -> Self {
        Self {
            store: WorkoutStore::new(kv),
            map: MapAdapter::new(surface, config.zoom),
            geolocation,
            form: WorkoutForm::new(),
            list: WorkoutList::new(),
            modal: ConfirmModal::new(),
            last_stamp_ms: i64::MIN,
        }
    }

    /// Loads persisted workouts, then asks for the user's position.
    ///
    /// When the position is unavailable the workouts stay loaded but the
    /// map, markers and list are never drawn.
    pub fn start(&mut self) -> Result<LoadReport, AppError> {
        let report = self.store.load_all()?;
        if let Some(max) = self.store.workouts().iter().map(|w| w.date().timestamp_millis()).max() {
            self.last_stamp_ms = self.last_stamp_ms.max(max);
        }

        let home = self.geolocation.current_position().inspect_err(|e| {
            tracing::warn!(err = %e, "geolocation failed; map not initialized");
        })?;
        self.load_map(home);
        Ok(report)
    }

    fn load_map(&mut self, home: Coords) {
        self.map.init(home);
        for w in self.store.workouts() {
            self.list.insert_after_form(w);
            self.map.render_workout_marker(w);
        }
        self.map.center_on(home);
    }

    /// A click on the map opens the form at that spot.
    pub fn on_map_click(&mut self, coords: Coords) -> Result<(), AppError> {
        if !self.map.is_ready() {
            return Err(AppError::MapNotReady);
        }
        dlog!("map click at {coords}");
        self.form.show(coords);
        Ok(())
    }

    pub const fn select_type(&mut self, kind: WorkoutKind) {
        self.form.select_type(kind);
    }

    pub const fn form_input_mut(&mut self) -> &mut FormInput {
        self.form.input_mut()
    }

    pub fn submit(&mut self) -> Result<WorkoutId, AppError> {
        self.submit_at(Utc::now())
    }

    /// Validates the form, then stores and draws the new workout.
    ///
    /// Creation times are kept strictly increasing at millisecond
    /// resolution so ids never repeat.
    pub fn submit_at(&mut self, now: DateTime<Utc>) -> Result<WorkoutId, AppError> {
        if !self.map.is_ready() {
            return Err(AppError::MapNotReady);
        }

        let stamp = self.next_stamp(now);
        let workout = self.form.build(stamp)?;
        self.store.add(workout.clone())?;
        self.last_stamp_ms = stamp.timestamp_millis();

        self.map.center_on(workout.coords());
        self.map.render_workout_marker(&workout);
        self.list.insert_after_form(&workout);
        self.form.hide();

        tracing::info!(
            id = %workout.id(),
            kind = %workout.kind(),
            distance_km = workout.distance(),
            duration_min = workout.duration(),
            "workout logged"
        );
        Ok(workout.id().clone())
    }

    fn next_stamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let ms = now.timestamp_millis();
        if ms > self.last_stamp_ms {
            return now;
        }
        let bumped = self.last_stamp_ms.saturating_add(1);
        Utc.timestamp_millis_opt(bumped).single().unwrap_or(now)
    }

    /// Clicking a list entry pans to its marker and counts a view.
    pub fn select_workout(&mut self, id: &WorkoutId) -> Result<&Workout, AppError> {
        if !self.map.is_ready() {
            return Err(AppError::MapNotReady);
        }
        let Some(w) = self.store.find_mut(id) else {
            return Err(AppError::UnknownWorkout(id.clone()));
        };
        w.record_view();
        let coords = w.coords();

        self.map.center_on(coords);
        self.form.hide();
        self.store.update(id)?;

        self.store
            .find(id)
            .ok_or_else(|| AppError::UnknownWorkout(id.clone()))
    }

    /// The delete control on a list entry: ask before doing anything.
    pub fn request_delete(&mut self, id: &WorkoutId) -> Result<(), AppError> {
        if self.store.find(id).is_none() {
            return Err(AppError::UnknownWorkout(id.clone()));
        }
        self.modal.open(id.clone());
        Ok(())
    }

    pub fn dismiss_modal(&mut self, how: Dismiss) {
        self.modal.dismiss(how);
    }

    /// Deletes the workout the modal was opened for, from storage, the
    /// list and the map.
    pub fn confirm_delete(&mut self) -> Result<Workout, AppError> {
        let id = self.modal.confirm().ok_or(AppError::NothingToConfirm)?;
        let removed = self
            .store
            .remove_by_id(&id)?
            .ok_or_else(|| AppError::UnknownWorkout(id.clone()))?;

        self.list.remove(&id);
        self.map.remove_workout_marker(&id);
        tracing::info!(id = %id, "workout deleted");
        Ok(removed)
    }

    /// Removes every workout. Returns how many persisted records went away.
    pub fn reset(&mut self) -> Result<usize, AppError> {
        for w in self.store.workouts() {
            self.map.remove_workout_marker(w.id());
        }
        let n = self.store.clear()?;
        self.list.clear();
        self.form.hide();
        self.modal.dismiss(Dismiss::Cancel);
        Ok(n)
    }

    pub fn workouts(&self) -> &[Workout] {
        self.store.workouts()
    }

    pub fn find(&self, id: &WorkoutId) -> Option<&Workout> {
        self.store.find(id)
    }

    pub const fn form(&self) -> &WorkoutForm {
        &self.form
    }

    pub const fn list(&self) -> &WorkoutList {
        &self.list
    }

    /// The workout list as markup. The list is only drawn alongside the
    /// map, so this fails until a position has been resolved.
    pub fn list_html(&self) -> Result<String, AppError> {
        if !self.map.is_ready() {
            return Err(AppError::MapNotReady);
        }
        Ok(self.list.to_html())
    }

    pub const fn modal(&self) -> &ConfirmModal {
        &self.modal
    }

    pub const fn map(&self) -> &MapAdapter<M> {
        &self.map
    }

    pub const fn store(&self) -> &WorkoutStore<K> {
        &self.store
    }

    /// Tears the app down, handing back its storage and map surface.
    pub fn into_parts(self) -> (K, M) {
        (self.store.into_inner(), self.map.into_surface())
    }
}

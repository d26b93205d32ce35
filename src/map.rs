use crate::dlog;
use crate::error::GeolocationError;
use crate::types::{Coords, Workout, WorkoutId};

pub const DEFAULT_ZOOM: u8 = 14;

const HOME_MARKER: &str = "home";

/// A pin with an always-open popup.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Stable handle so the marker can be taken off the map again.
    pub id: String,
    pub coords: Coords,
    pub popup: String,
    pub class: String,
}

/// The mapping library, as far as this app uses it.
///
/// Click events flow the other way: the host forwards them to
/// [`crate::app::App::on_map_click`].
pub trait MapSurface {
    fn center_view(&mut self, coords: Coords, zoom: u8);

    fn add_marker(&mut self, marker: Marker);

    fn remove_marker(&mut self, id: &str);
}

/// One-shot position lookup used to initialize the map.
pub trait Geolocation {
    fn current_position(&mut self) -> Result<Coords, GeolocationError>;
}

/// A position known up front. `None` behaves like a denied request.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPosition(pub Option<Coords>);

impl Geolocation for FixedPosition {
    fn current_position(&mut self) -> Result<Coords, GeolocationError> {
        self.0.ok_or(GeolocationError::Unavailable)
    }
}

/// Translates workouts into markers and keeps the view at a fixed zoom.
pub struct MapAdapter<M> {
    surface: M,
    zoom: u8,
    home: Option<Coords>,
}

impl<M: MapSurface> MapAdapter<M> {
    pub const fn new(surface: M, zoom: u8) -> Self {
        Self {
            surface,
            zoom,
            home: None,
        }
    }

    pub const fn surface(&self) -> &M {
        &self.surface
    }

    pub fn into_surface(self) -> M {
        self.surface
    }

    pub const fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Set once the geolocation request succeeded and the map is live.
    pub const fn home(&self) -> Option<Coords> {
        self.home
    }

    pub const fn is_ready(&self) -> bool {
        self.home.is_some()
    }

    /// Centers on the user's position and drops the home marker.
    pub fn init(&mut self, home: Coords) {
        self.surface.center_view(home, self.zoom);
        self.surface.add_marker(Marker {
            id: HOME_MARKER.to_string(),
            coords: home,
            popup: "🏠 Home".to_string(),
            class: String::new(),
        });
        self.home = Some(home);
        tracing::info!(lat = home.lat, lng = home.lng, zoom = self.zoom, "map ready");
    }

    pub fn center_on(&mut self, coords: Coords) {
        self.surface.center_view(coords, self.zoom);
    }

    pub fn render_workout_marker(&mut self, w: &Workout) {
        dlog!("marker id={} at {}", w.id(), w.coords());
        self.surface.add_marker(workout_marker(w));
    }

    pub fn remove_workout_marker(&mut self, id: &WorkoutId) {
        self.surface.remove_marker(&marker_id(id));
    }
}

pub fn marker_id(id: &WorkoutId) -> String {
    format!("workout-{id}")
}

pub fn workout_marker(w: &Workout) -> Marker {
    Marker {
        id: marker_id(w.id()),
        coords: w.coords(),
        popup: format!("{} {}", w.icon(), w.description()),
        class: format!("{}-popup", w.kind()),
    }
}

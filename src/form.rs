use crate::error::{AppError, ValidationError};
use crate::types::{Activity, Coords, Workout, WorkoutKind};
use chrono::{DateTime, Utc};

/// The one type-specific input shown for the selected workout type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricField {
    Cadence,
    Elevation,
    Laps,
}

impl MetricField {
    pub const fn for_kind(kind: WorkoutKind) -> Self {
        match kind {
            WorkoutKind::Running => Self::Cadence,
            WorkoutKind::Cycling => Self::Elevation,
            WorkoutKind::Swimming => Self::Laps,
        }
    }
}

/// Raw text of every form field, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
    pub laps: String,
}

impl FormInput {
    fn metric_text(&self, field: MetricField) -> &str {
        match field {
            MetricField::Cadence => &self.cadence,
            MetricField::Elevation => &self.elevation,
            MetricField::Laps => &self.laps,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormState {
    Hidden,
    /// Open at the location of the map click that opened it.
    AwaitingInput { coords: Coords },
}

/// The new-workout form: opened by a map click, closed by a valid submit.
#[derive(Debug, Clone)]
pub struct WorkoutForm {
    state: FormState,
    kind: WorkoutKind,
    input: FormInput,
}

impl Default for WorkoutForm {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkoutForm {
    pub fn new() -> Self {
        Self {
            state: FormState::Hidden,
            kind: WorkoutKind::Running,
            input: FormInput::default(),
        }
    }

    pub const fn state(&self) -> FormState {
        self.state
    }

    pub const fn is_open(&self) -> bool {
        matches!(self.state, FormState::AwaitingInput { .. })
    }

    pub const fn kind(&self) -> WorkoutKind {
        self.kind
    }

    pub const fn input(&self) -> &FormInput {
        &self.input
    }

    pub const fn input_mut(&mut self) -> &mut FormInput {
        &mut self.input
    }

    /// Opens the form bound to `coords`. A second click just moves the pin.
    pub fn show(&mut self, coords: Coords) {
        self.state = FormState::AwaitingInput { coords };
    }

    /// Closes the form and empties every input.
    pub fn hide(&mut self) {
        self.state = FormState::Hidden;
        self.input = FormInput::default();
    }

    pub const fn select_type(&mut self, kind: WorkoutKind) {
        self.kind = kind;
    }

    pub const fn visible_field(&self) -> MetricField {
        MetricField::for_kind(self.kind)
    }

    pub fn is_field_visible(&self, field: MetricField) -> bool {
        self.visible_field() == field
    }

    /// Validates the current input and builds a workout at the clicked
    /// location. The form stays open either way; the caller hides it once
    /// the workout is stored.
    pub fn build(&self, created: DateTime<Utc>) -> Result<Workout, AppError> {
        let FormState::AwaitingInput { coords } = self.state else {
            return Err(AppError::NoLocation);
        };

        let distance = read_number(&self.input.distance);
        let duration = read_number(&self.input.duration);
        let metric = read_number(self.input.metric_text(self.visible_field()));

        let activity = match self.kind {
            WorkoutKind::Running => Activity::Running { cadence: metric },
            WorkoutKind::Cycling => Activity::Cycling {
                elevation_gain: metric,
            },
            WorkoutKind::Swimming => Activity::Swimming { laps: metric },
        };

        let workout = Workout::create(activity, coords, distance, duration, created)
            .inspect_err(|e: &ValidationError| {
                tracing::debug!(field = e.field(), "form rejected");
            })?;
        Ok(workout)
    }
}

/// Reads a number field: blank is zero, anything unparsable is NaN.
pub fn read_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    s.parse().unwrap_or(f64::NAN)
}

use crate::types::WorkoutId;
use thiserror::Error;

/// Alert shown whenever a form field fails validation.
pub const INVALID_INPUT_ALERT: &str = "Inputs have to be positive numbers!";

/// A numeric form field that cannot be used to build a workout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Inputs have to be positive numbers! ({field} is not a finite number)")]
    NotFinite { field: &'static str },

    #[error("Inputs have to be positive numbers! ({field} must be greater than zero, got {value})")]
    NotPositive { field: &'static str, value: f64 },
}

impl ValidationError {
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NotFinite { field } | Self::NotPositive { field, .. } => *field,
        }
    }
}

/// The one-shot position request failed; the map stays uninitialized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Could not get your position")]
    Unavailable,

    #[error("Could not get your position: {0}")]
    Denied(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a workout with id {0} already exists")]
    DuplicateId(WorkoutId),

    #[error("serializing workout {id}")]
    Encode {
        id: WorkoutId,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Everything the application controller can report back to its host.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("the map is not ready yet")]
    MapNotReady,

    #[error("click on the map to choose where the workout happened")]
    NoLocation,

    #[error("no workout with id {0}")]
    UnknownWorkout(WorkoutId),

    #[error("no deletion is awaiting confirmation")]
    NothingToConfirm,
}

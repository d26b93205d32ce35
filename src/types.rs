use crate::error::ValidationError;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `[lat, lng]` pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(c: Coords) -> Self {
        [c.lat, c.lng]
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for Coords {
    type Err = String;

    /// Parses `LAT,LNG`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LNG, got {s:?}"))?;
        let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude: {e}"))?;
        let lng: f64 = lng.trim().parse().map_err(|e| format!("longitude: {e}"))?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(format!("coordinates out of range: {lat},{lng}"));
        }
        Ok(Self { lat, lng })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
    Swimming,
}

impl WorkoutKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
            Self::Swimming => "swimming",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
            Self::Swimming => "Swimming",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴",
            Self::Swimming => "🏊",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier derived from the creation time: the last ten digits of the
/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    pub fn from_timestamp(t: DateTime<Utc>) -> Self {
        let ms = t.timestamp_millis().unsigned_abs().to_string();
        let start = ms.len().saturating_sub(10);
        Self(ms[start..].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkoutId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The type-specific value typed into the form, before any derived
/// metric exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activity {
    Running { cadence: f64 },
    Cycling { elevation_gain: f64 },
    Swimming { laps: f64 },
}

impl Activity {
    pub const fn kind(self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
            Self::Swimming { .. } => WorkoutKind::Swimming,
        }
    }

    const fn field(self) -> (&'static str, f64) {
        match self {
            Self::Running { cadence } => ("cadence", cadence),
            Self::Cycling { elevation_gain } => ("elevation gain", elevation_gain),
            Self::Swimming { laps } => ("laps", laps),
        }
    }
}

/// Per-variant payload. The `type` tag is what lets a stored record be
/// rebuilt as the right variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutDetails {
    Running {
        cadence: f64,
        pace: f64,
    },
    Cycling {
        #[serde(rename = "elevationGain")]
        elevation_gain: f64,
        speed: f64,
    },
    Swimming {
        lap: f64,
        speed: f64,
    },
}

/// One displayable figure: icon, value and unit label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub icon: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

impl WorkoutDetails {
    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
            Self::Swimming { .. } => WorkoutKind::Swimming,
        }
    }

    /// Pace for running (min/km), speed for cycling (km/h) and
    /// swimming (km/min).
    pub const fn derived(&self) -> Reading {
        match *self {
            Self::Running { pace, .. } => Reading {
                icon: "⚡️",
                value: pace,
                unit: "min/km",
            },
            Self::Cycling { speed, .. } => Reading {
                icon: "⚡️",
                value: speed,
                unit: "km/h",
            },
            Self::Swimming { speed, .. } => Reading {
                icon: "⚡️",
                value: speed,
                unit: "km/min",
            },
        }
    }

    /// The value the user typed for this variant.
    pub const fn metric(&self) -> Reading {
        match *self {
            Self::Running { cadence, .. } => Reading {
                icon: "🦶🏼",
                value: cadence,
                unit: "spm",
            },
            Self::Cycling { elevation_gain, .. } => Reading {
                icon: "⛰",
                value: elevation_gain,
                unit: "m",
            },
            Self::Swimming { lap, .. } => Reading {
                icon: "🌊",
                value: lap,
                unit: "lap",
            },
        }
    }
}

/// A logged workout. Only the view counter changes after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    id: WorkoutId,
    date: DateTime<Utc>,
    coords: Coords,
    distance: f64,
    duration: f64,
    description: String,
    clicks: u32,
    #[serde(flatten)]
    details: WorkoutDetails,
}

impl Workout {
    /// Builds a workout, computing its derived metric once.
    ///
    /// `distance` is in km, `duration` in minutes. Every numeric input must
    /// be finite and positive.
    pub fn create(
        activity: Activity,
        coords: Coords,
        distance: f64,
        duration: f64,
        created: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let (metric_field, metric) = activity.field();
        for (field, value) in [
            ("distance", distance),
            ("duration", duration),
            (metric_field, metric),
        ] {
            require_positive(field, value)?;
        }

        let details = match activity {
            Activity::Running { cadence } => WorkoutDetails::Running {
                cadence,
                pace: duration / distance,
            },
            Activity::Cycling { elevation_gain } => WorkoutDetails::Cycling {
                elevation_gain,
                speed: distance / (duration / 60.0),
            },
            Activity::Swimming { laps } => WorkoutDetails::Swimming {
                lap: laps,
                speed: distance / duration,
            },
        };

        Ok(Self {
            id: WorkoutId::from_timestamp(created),
            date: created,
            coords,
            distance,
            duration,
            description: describe(activity.kind(), created),
            clicks: 0,
            details,
        })
    }

    /// Re-checks a workout that did not come through [`Self::create`]:
    /// the typed inputs and the stored derived metric must all be finite
    /// and positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let (metric_field, derived_field) = match self.details {
            WorkoutDetails::Running { .. } => ("cadence", "pace"),
            WorkoutDetails::Cycling { .. } => ("elevation gain", "speed"),
            WorkoutDetails::Swimming { .. } => ("laps", "speed"),
        };
        for (field, value) in [
            ("distance", self.distance),
            ("duration", self.duration),
            (metric_field, self.details.metric().value),
            (derived_field, self.details.derived().value),
        ] {
            require_positive(field, value)?;
        }
        Ok(())
    }

    pub const fn record_view(&mut self) {
        self.clicks = self.clicks.saturating_add(1);
    }

    pub const fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub const fn coords(&self) -> Coords {
        self.coords
    }

    pub const fn distance(&self) -> f64 {
        self.distance
    }

    pub const fn duration(&self) -> f64 {
        self.duration
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn clicks(&self) -> u32 {
        self.clicks
    }

    pub const fn details(&self) -> &WorkoutDetails {
        &self.details
    }

    pub const fn kind(&self) -> WorkoutKind {
        self.details.kind()
    }

    pub const fn icon(&self) -> &'static str {
        self.kind().icon()
    }
}

/// `"Running on April 14"`, using the local calendar date of `created`.
pub fn describe(kind: WorkoutKind, created: DateTime<Utc>) -> String {
    let local = created.with_timezone(&Local);
    format!("{} on {}", kind.title(), local.format("%B %-d"))
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NotPositive { field, value });
    }
    Ok(())
}

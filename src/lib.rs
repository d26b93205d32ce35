//! Workout tracker: pin a workout on the map, fill in the form, and keep a
//! persisted list of everything logged.
//!
//! [`app::App`] owns the state and takes its collaborators (flat key-value
//! storage, map surface, geolocation) at construction.

pub mod app;
pub mod cli;
pub mod database;
pub mod error;
pub mod form;
pub mod gpx;
pub mod kv;
pub mod map;
pub mod modal;
pub mod render;
pub mod store;
pub mod types;
pub mod utils;

use crate::map::DEFAULT_ZOOM;
use crate::types::{Coords, WorkoutKind};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Log running, cycling and swimming workouts on a map"
)]
pub struct Cli {
    /// Path to the workout database.
    ///
    /// Default: <data dir>/mapty/workouts.db
    #[arg(long, value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Your current position as LAT,LNG. Without it the map cannot be
    /// initialized.
    #[arg(long, value_name = "LAT,LNG", global = true, allow_hyphen_values = true)]
    pub home: Option<Coords>,

    /// Map zoom level used when centering on a workout.
    #[arg(long, default_value_t = DEFAULT_ZOOM, global = true)]
    pub zoom: u8,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Log a workout at a map location.
    Add {
        /// Where on the map the workout happened, as LAT,LNG.
        #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
        at: Coords,

        #[arg(long = "type", value_enum, default_value_t = WorkoutKind::Running)]
        kind: WorkoutKind,

        /// Distance in km.
        #[arg(long, allow_hyphen_values = true)]
        distance: String,

        /// Duration in minutes.
        #[arg(long, allow_hyphen_values = true)]
        duration: String,

        /// Steps per minute (running).
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        cadence: String,

        /// Elevation gain in meters (cycling).
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        elevation: String,

        /// Lap count (swimming).
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        laps: String,
    },

    /// Print every logged workout, oldest first.
    List {
        /// Include id, coordinates and view count.
        #[arg(long)]
        details: bool,
    },

    /// Center the map on one workout and count a view.
    Show { id: String },

    /// Delete one workout after confirmation.
    Delete {
        id: String,

        /// Skip the confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Delete every workout.
    Reset {
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Write the workout list as HTML.
    Render {
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write the map markers as GPX waypoints.
    ExportGpx {
        #[arg(long)]
        out: PathBuf,
    },
}

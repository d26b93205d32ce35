#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use clap::Parser;
use mapty::app::{App, AppConfig};
use mapty::database::SqliteKv;
use mapty::error::AppError;
use mapty::gpx::GpxMap;
use mapty::map::FixedPosition;
use mapty::modal::Dismiss;
use mapty::types::{Workout, WorkoutId};
use mapty::{cli, utils};
use std::fs;
use std::io::{self, BufRead, Write};

#[macro_use]
extern crate mapty;

type Tracker = App<SqliteKv, GpxMap, FixedPosition>;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let db_path = cli.db.clone().unwrap_or_else(utils::default_db_path);
    let kv = SqliteKv::open(&db_path)?;
    dlog!("db={} home={:?} zoom={}", db_path.display(), cli.home, cli.zoom);

    let mut app: Tracker = App::new(
        kv,
        GpxMap::new(),
        FixedPosition(cli.home),
        AppConfig { zoom: cli.zoom },
    );

    match app.start() {
        Ok(report) => {
            for s in &report.skipped {
                eprintln!("skipped unreadable record {}: {}", s.key, s.reason);
            }
        }
        Err(AppError::Geolocation(e)) => eprintln!("{e}"),
        Err(e) => return Err(e.into()),
    }

    run(&mut app, cli.cmd)
}

fn run(app: &mut Tracker, cmd: cli::Cmd) -> Result<()> {
    match cmd {
        cli::Cmd::Add {
            at,
            kind,
            distance,
            duration,
            cadence,
            elevation,
            laps,
        } => {
            app.on_map_click(at)?;
            app.select_type(kind);
            let input = app.form_input_mut();
            input.distance = distance;
            input.duration = duration;
            input.cadence = cadence;
            input.elevation = elevation;
            input.laps = laps;

            let id = app.submit()?;
            if let Some(w) = app.find(&id) {
                println!("{}\t{}", w.id(), w.description());
            }
        }
        cli::Cmd::List { details } => {
            if app.workouts().is_empty() {
                println!("No workouts logged yet.");
            }
            for (i, w) in app.workouts().iter().enumerate() {
                print_workout(i + 1, w, details);
            }
        }
        cli::Cmd::Show { id } => {
            let w = app.select_workout(&WorkoutId::from(id.as_str()))?;
            print_workout(1, w, true);
        }
        cli::Cmd::Delete { id, yes } => {
            let id = WorkoutId::from(id.as_str());
            app.request_delete(&id)?;
            let description = app
                .find(&id)
                .map(|w| w.description().to_string())
                .unwrap_or_default();

            if yes || confirm(&format!("Delete \"{description}\" ({id})?"))? {
                let removed = app.confirm_delete()?;
                println!("deleted {}", removed.id());
            } else {
                app.dismiss_modal(Dismiss::Cancel);
                println!("kept {id}");
            }
        }
        cli::Cmd::Reset { yes } => {
            if yes || confirm("Delete ALL workouts?")? {
                let n = app.reset()?;
                println!("deleted {n} workouts");
            }
        }
        cli::Cmd::Render { out } => {
            let html = app.list_html()?;
            match out {
                Some(path) => fs::write(&path, html)
                    .with_context(|| format!("writing HTML: {}", path.display()))?,
                None => print!("{html}"),
            }
        }
        cli::Cmd::ExportGpx { out } => {
            if !app.map().is_ready() {
                return Err(AppError::MapNotReady.into());
            }
            app.map().surface().write_to(&out)?;
        }
    }
    Ok(())
}

fn print_workout(n: usize, w: &Workout, details: bool) {
    let derived = w.details().derived();
    let metric = w.details().metric();
    let summary = format!(
        "{}\t{} km\t{} min\t{:.1} {}\t{} {}",
        w.description(),
        w.distance(),
        w.duration(),
        derived.value,
        derived.unit,
        metric.value,
        metric.unit
    );

    if details {
        println!(
            "{n}\t{}\t{}\t{summary}\tviews={}",
            w.id(),
            w.coords(),
            w.clicks()
        );
    } else {
        println!("{n}\t{summary}");
    }
}

/// The confirmation modal, as a terminal prompt.
fn confirm(question: &str) -> Result<bool> {
    let mut stdout = io::stdout();
    write!(stdout, "{question} [y/N] ")?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}

//! Gambit: camera-to-waypoint pipeline for a chess-playing robot arm.
//!
//! One cycle goes capture → detect → reconstruct → engine → waypoints:
//! a frame of the physical board is captured, an external detection model
//! boxes the board and the pieces, the detections are reconstructed into a
//! FEN record, an external UCI engine answers with its best move, and the
//! move is translated into the pick-and-place waypoint sequence the motion
//! controller consumes. The detector, the engine, and the arm are external
//! collaborators; this crate is the glue between them.
//!
//! # Modules
//!
//! - [`capture`]: frame acquisition ([`capture::FrameSource`])
//! - [`detect`]: detection model and detector adapters
//! - [`board`]: board-state reconstruction and FEN
//! - [`engine`]: UCI move-engine adapter
//! - [`waypoint`]: coordinate table and waypoint planning
//! - [`pipeline`]: the orchestrator
//! - [`error`]: error types for gambit operations

pub mod board;
pub mod capture;
pub mod detect;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod waypoint;

use std::path::PathBuf;

use clap::Parser;

pub use error::GambitError;

use capture::{CaptureCommand, FrameSource, StillFrame};
use detect::{BoardDetector, DetectionFile, DetectorCommand};
use engine::{EngineOptions, UciEngine};
use pipeline::Pipeline;
use waypoint::CoordinateTable;

/// The gambit CLI application.
///
/// Every input has a default, so a bare `gambit` invocation runs one full
/// cycle: detections from `detections.json`, engine `stockfish` on PATH,
/// coordinate table `squares.csv`.
#[derive(Parser)]
#[command(name = "gambit")]
#[command(version, author, about)]
struct Cli {
    /// Detections JSON export to read (used unless --detector-cmd is set).
    #[arg(long, default_value = "detections.json")]
    detections: PathBuf,

    /// External detector command; gets the frame path appended and must
    /// print detections JSON on stdout.
    #[arg(long)]
    detector_cmd: Option<String>,

    /// Captured frame path (written by --capture-cmd, or pre-existing).
    #[arg(long, default_value = "frame.jpg")]
    frame: PathBuf,

    /// External grabber command expected to write the --frame file.
    #[arg(long)]
    capture_cmd: Option<String>,

    /// UCI engine executable.
    #[arg(long, default_value = "stockfish", env = "GAMBIT_ENGINE")]
    engine: PathBuf,

    /// Square-to-coordinate table CSV.
    #[arg(long, default_value = "squares.csv")]
    table: PathBuf,

    /// Engine think time per query, milliseconds.
    #[arg(long, default_value_t = 2000)]
    movetime: u64,

    /// Approach clearance above pick and place positions, meters.
    #[arg(long, default_value_t = waypoint::DEFAULT_CLEARANCE)]
    clearance: f64,
}

/// Frame placeholder for the detections-file flow: the export already
/// exists on disk, so nothing reads the frame itself.
struct RecordedFrame(PathBuf);

impl FrameSource for RecordedFrame {
    fn capture(&self) -> Result<PathBuf, GambitError> {
        Ok(self.0.clone())
    }
}

/// Run the gambit CLI: one full capture-to-waypoint cycle.
///
/// This is the main entry point, called from `main.rs`. A missing-kings
/// board ends the run with a warning and success; everything else that
/// goes wrong is an error for the caller.
pub fn run() -> Result<(), GambitError> {
    let cli = Cli::parse();

    let source: Box<dyn FrameSource> = match (&cli.capture_cmd, &cli.detector_cmd) {
        (Some(cmd), _) => Box::new(CaptureCommand::new(cmd, &cli.frame)?),
        (None, Some(_)) => Box::new(StillFrame::new(&cli.frame)),
        (None, None) => Box::new(RecordedFrame(cli.frame.clone())),
    };

    let detector: Box<dyn BoardDetector> = match &cli.detector_cmd {
        Some(cmd) => Box::new(DetectorCommand::new(cmd)?),
        None => Box::new(DetectionFile::new(&cli.detections)),
    };

    let table = CoordinateTable::load(&cli.table)?;

    let options = EngineOptions {
        movetime_ms: cli.movetime,
        ..EngineOptions::default()
    };
    let engine = UciEngine::spawn(&cli.engine, &options)?;

    let mut pipeline = Pipeline::new(source, detector, Box::new(engine), table, cli.clearance);
    let outcome = pipeline.run()?;

    println!();
    print!("{}", outcome);

    // A skipped cycle is a warning, not a failure: the operator fixes the
    // board or the lighting and runs again.
    Ok(())
}

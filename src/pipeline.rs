//! The orchestrator: one linear capture-to-waypoint pass.
//!
//! Stages run strictly in order — Idle, Captured, Reconstructed, then
//! either EngineQueried or Skipped, Mapped, Done — with each stage's output
//! feeding the next. There is no retry and no loop-back; a person re-runs
//! the pipeline after fixing lighting or board setup. The single branch is
//! the missing-kings short-circuit: an invalid board skips the engine and
//! the planner and ends the run with a warning instead of an error.

use crate::board;
use crate::capture::FrameSource;
use crate::detect::BoardDetector;
use crate::engine::{MoveEngine, UciMove};
use crate::error::GambitError;
use crate::waypoint::{self, CoordinateTable, Waypoint};

/// Pipeline stages, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Captured,
    Reconstructed,
    EngineQueried,
    Skipped,
    Mapped,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Captured => "captured",
            Stage::Reconstructed => "reconstructed",
            Stage::EngineQueried => "engine-queried",
            Stage::Skipped => "skipped",
            Stage::Mapped => "mapped",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// The result of one pipeline cycle.
#[derive(Clone, Debug)]
pub enum CycleOutcome {
    /// The full pass ran: board, best move, and waypoints were produced.
    Completed {
        fen: String,
        best_move: UciMove,
        waypoints: Vec<Waypoint>,
    },
    /// Reconstruction found an invalid board (wrong king count); the engine
    /// was never queried and no waypoints exist.
    Skipped { white_kings: usize, black_kings: usize },
}

impl std::fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleOutcome::Completed {
                fen,
                best_move,
                waypoints,
            } => {
                writeln!(f, "FEN: {}", fen)?;
                writeln!(f, "Best move: {}", best_move)?;
                writeln!(f, "Waypoints:")?;
                for waypoint in waypoints {
                    writeln!(f, "  {}", waypoint)?;
                }
                Ok(())
            }
            CycleOutcome::Skipped {
                white_kings,
                black_kings,
            } => {
                writeln!(
                    f,
                    "Warning: board rejected ({} white king(s), {} black king(s)); \
                     engine not queried, no waypoints produced.",
                    white_kings, black_kings
                )?;
                writeln!(
                    f,
                    "Possible causes: an empty board in front of the camera, or the \
                     detector missed pieces."
                )
            }
        }
    }
}

impl CycleOutcome {
    /// True when the cycle ran to completion (not skipped).
    pub fn is_completed(&self) -> bool {
        matches!(self, CycleOutcome::Completed { .. })
    }
}

/// One capture-to-waypoint pipeline, owning its external collaborators.
///
/// The coordinate table and the engine handle are acquired at startup and
/// passed in here rather than living as ambient module state; the engine
/// subprocess is released by its own drop on every exit path.
pub struct Pipeline {
    source: Box<dyn FrameSource>,
    detector: Box<dyn BoardDetector>,
    engine: Box<dyn MoveEngine>,
    table: CoordinateTable,
    clearance: f64,
}

impl Pipeline {
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn BoardDetector>,
        engine: Box<dyn MoveEngine>,
        table: CoordinateTable,
        clearance: f64,
    ) -> Self {
        Self {
            source,
            detector,
            engine,
            table,
            clearance,
        }
    }

    /// Runs one full cycle over one captured frame.
    ///
    /// Per-stage progress goes to stdout; the outcome carries everything
    /// the caller needs to report or hand to the motion controller.
    pub fn run(&mut self) -> Result<CycleOutcome, GambitError> {
        let frame = self.source.capture()?;
        println!("[{}] frame: {}", Stage::Captured, frame.display());

        let detections = self.detector.detect(&frame)?;
        println!("[{}] detections: {}", Stage::Captured, detections.len());

        let board = match board::reconstruct(&detections) {
            Ok(board) => board,
            Err(GambitError::MissingKings { white, black }) => {
                println!("[{}] invalid board, ending the run", Stage::Skipped);
                return Ok(CycleOutcome::Skipped {
                    white_kings: white,
                    black_kings: black,
                });
            }
            Err(other) => return Err(other),
        };
        let fen = board.to_fen();
        println!("[{}] fen: {}", Stage::Reconstructed, fen);

        let best_move = self.engine.best_move(&fen)?;
        println!("[{}] best move: {}", Stage::EngineQueried, best_move);

        let waypoints = waypoint::plan_move(&best_move, &self.table, self.clearance)?;
        println!("[{}] waypoints: {}", Stage::Mapped, waypoints.len());

        println!("[{}] cycle complete", Stage::Done);

        Ok(CycleOutcome::Completed {
            fen,
            best_move,
            waypoints,
        })
    }
}

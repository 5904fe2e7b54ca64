use std::path::PathBuf;
use thiserror::Error;

/// The main error type for gambit operations.
#[derive(Debug, Error)]
pub enum GambitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse detections JSON from {path}: {source}")]
    DetectionParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown detection label '{0}'")]
    UnknownLabel(String),

    #[error("No board marker detected in the frame; cannot derive the grid")]
    BoardNotFound,

    #[error(
        "Reconstructed board has {white} white king(s) and {black} black king(s); expected exactly one of each"
    )]
    MissingKings { white: usize, black: usize },

    #[error("Detector command '{command}' failed: {message}")]
    Detector { command: String, message: String },

    #[error("Capture command '{command}' failed: {message}")]
    Capture { command: String, message: String },

    #[error("Capture command '{command}' exited successfully but did not produce {path}")]
    CaptureMissingFrame { command: String, path: PathBuf },

    #[error("Failed to parse coordinate table from {path}: {source}")]
    TableParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Coordinate table lists square '{0}' more than once")]
    DuplicateSquare(String),

    #[error("Malformed UCI move '{0}' (expected e.g. 'e2e4' or 'e7e8q')")]
    MalformedMove(String),

    #[error("Square '{0}' is missing from the coordinate table")]
    UnknownSquare(String),

    #[error("Failed to start engine '{path}': {source}")]
    EngineStart {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine protocol error: {0}")]
    EngineProtocol(String),

    #[error("Engine returned no best move (the game may be over)")]
    NoBestMove,

    #[error("Failed to parse FEN '{text}': {message}")]
    FenParse { text: String, message: String },
}

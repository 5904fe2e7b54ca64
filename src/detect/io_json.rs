//! Detections JSON reader.
//!
//! The detector export is a flat JSON array, one object per detection:
//!
//! ```json
//! [
//!   { "label": "Chess_Board", "confidence": 0.99,
//!     "bbox": { "xmin": 40.0, "ymin": 32.0, "xmax": 680.0, "ymax": 672.0 } },
//!   { "label": "White_King", "confidence": 0.97,
//!     "bbox": { "xmin": 362.0, "ymin": 575.0, "xmax": 398.0, "ymax": 665.0 } }
//! ]
//! ```
//!
//! This matches what a thin export script around the detection model writes
//! per frame. Parsing is strict about shape (unknown labels are rejected)
//! but permissive about geometry, which the reconstructor filters.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::Detection;
use crate::error::GambitError;

/// Reads a detection set from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or the JSON does not match
/// the detection schema (including unknown class labels).
pub fn read_detections(path: &Path) -> Result<Vec<Detection>, GambitError> {
    let file = File::open(path).map_err(GambitError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| GambitError::DetectionParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a detection set from a JSON string.
///
/// Useful for testing without file I/O. Errors carry a placeholder path.
pub fn from_json_str(json: &str) -> Result<Vec<Detection>, GambitError> {
    serde_json::from_str(json).map_err(|source| GambitError::DetectionParse {
        path: "<string>".into(),
        source,
    })
}

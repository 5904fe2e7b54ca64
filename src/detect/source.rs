//! Detector adapters behind the [`BoardDetector`] capability trait.
//!
//! The trait exists so the reconstructor never depends on where detections
//! come from: a pre-exported JSON file, an external detector process, or a
//! test double.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::io_json;
use super::Detection;
use crate::error::GambitError;

/// Anything that can produce a detection set for a captured frame.
pub trait BoardDetector {
    /// Runs detection on the frame at `image` and returns all detections.
    fn detect(&self, image: &Path) -> Result<Vec<Detection>, GambitError>;
}

/// Reads a pre-exported detections JSON file, ignoring the frame path.
///
/// This is the default adapter: the detection model runs out-of-process
/// (it is a pretrained network this crate does not embed) and leaves its
/// output next to the captured frame.
#[derive(Clone, Debug)]
pub struct DetectionFile {
    path: PathBuf,
}

impl DetectionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BoardDetector for DetectionFile {
    fn detect(&self, _image: &Path) -> Result<Vec<Detection>, GambitError> {
        io_json::read_detections(&self.path)
    }
}

/// Runs an external detector command with the frame path as its final
/// argument and parses the detections JSON it writes to stdout.
#[derive(Clone, Debug)]
pub struct DetectorCommand {
    program: String,
    args: Vec<String>,
}

impl DetectorCommand {
    /// Builds the adapter from a whitespace-separated command line, e.g.
    /// `"python detect.py --weights best.pt"`.
    pub fn new(command_line: &str) -> Result<Self, GambitError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| GambitError::Detector {
            command: command_line.to_string(),
            message: "empty command line".to_string(),
        })?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl BoardDetector for DetectorCommand {
    fn detect(&self, image: &Path) -> Result<Vec<Detection>, GambitError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(image)
            .output()
            .map_err(|e| GambitError::Detector {
                command: self.command_line(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(GambitError::Detector {
                command: self.command_line(),
                message: format!(
                    "exit status {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let stdout =
            String::from_utf8(output.stdout).map_err(|e| GambitError::Detector {
                command: self.command_line(),
                message: format!("stdout was not UTF-8: {}", e),
            })?;

        io_json::from_json_str(&stdout)
    }
}

//! Frame acquisition behind the [`FrameSource`] capability trait.
//!
//! The camera is an external system; this crate either takes an already
//! captured frame on disk or shells out to a grabber command (fswebcam,
//! ffmpeg, a vendor tool) that writes one.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::GambitError;

/// Anything that can produce the path of a freshly captured frame.
pub trait FrameSource {
    fn capture(&self) -> Result<PathBuf, GambitError>;
}

/// An already-captured frame on disk.
#[derive(Clone, Debug)]
pub struct StillFrame {
    path: PathBuf,
}

impl StillFrame {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FrameSource for StillFrame {
    fn capture(&self) -> Result<PathBuf, GambitError> {
        if !self.path.exists() {
            return Err(GambitError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("frame {} does not exist", self.path.display()),
            )));
        }
        Ok(self.path.clone())
    }
}

/// Runs an external grabber command that is expected to write `output`.
#[derive(Clone, Debug)]
pub struct CaptureCommand {
    program: String,
    args: Vec<String>,
    output: PathBuf,
}

impl CaptureCommand {
    /// Builds the source from a whitespace-separated command line, e.g.
    /// `"fswebcam -r 1280x720 --no-banner frame.jpg"`, and the frame path
    /// the command writes.
    pub fn new(command_line: &str, output: impl Into<PathBuf>) -> Result<Self, GambitError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| GambitError::Capture {
            command: command_line.to_string(),
            message: "empty command line".to_string(),
        })?;
        Ok(Self {
            program,
            args: parts.collect(),
            output: output.into(),
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

impl FrameSource for CaptureCommand {
    fn capture(&self) -> Result<PathBuf, GambitError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| GambitError::Capture {
                command: self.command_line(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(GambitError::Capture {
                command: self.command_line(),
                message: format!(
                    "exit status {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        if !self.output.exists() {
            return Err(GambitError::CaptureMissingFrame {
                command: self.command_line(),
                path: self.output.clone(),
            });
        }

        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn still_frame_requires_existing_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(
            StillFrame::new(file.path()).capture().unwrap(),
            file.path().to_path_buf()
        );

        let missing = StillFrame::new("no/such/frame.jpg");
        assert!(matches!(missing.capture(), Err(GambitError::Io(_))));
    }

    #[test]
    fn empty_capture_command_rejected() {
        assert!(matches!(
            CaptureCommand::new("", "frame.jpg"),
            Err(GambitError::Capture { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn capture_command_checks_for_output_frame() {
        let dir = tempfile::tempdir().unwrap();
        let frame = dir.path().join("frame.jpg");

        // "true" exits 0 without writing anything.
        let source = CaptureCommand::new("true", &frame).unwrap();
        assert!(matches!(
            source.capture(),
            Err(GambitError::CaptureMissingFrame { .. })
        ));

        std::fs::write(&frame, b"jpeg bytes").unwrap();
        assert_eq!(source.capture().unwrap(), frame);
    }

    #[cfg(unix)]
    #[test]
    fn capture_command_failure_carries_status() {
        let dir = tempfile::tempdir().unwrap();
        let source = CaptureCommand::new("false", dir.path().join("frame.jpg")).unwrap();
        assert!(matches!(source.capture(), Err(GambitError::Capture { .. })));
    }
}

//! Clock display backed by a file holding the seconds remaining.
//!
//! Some other process (usually the AI agent harness) keeps the file updated;
//! we just re-read it whenever the screen is drawn.

use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ClockModel {
    path: PathBuf,
    time_left: f64,
    /// Error from the current failure streak, if any.
    last_error: Option<String>,
}

impl ClockModel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            time_left: 0.0,
            last_error: None,
        }
    }

    /// Re-read the clock file. Unreadable or unparseable contents count as 0.
    ///
    /// Called every frame, so a failure is logged once per streak.
    pub fn read_time(&mut self) -> f64 {
        let read = match fs::read_to_string(&self.path) {
            Ok(text) => match text.trim().parse::<f64>() {
                Ok(secs) if secs.is_finite() => Ok(secs),
                Ok(_) => Err("Error parsing clock file: non-finite value".to_string()),
                Err(e) => Err(format!("Error parsing clock file: {}", e)),
            },
            Err(e) => Err(format!("Error reading clock file: {}", e)),
        };

        self.time_left = match read {
            Ok(secs) => {
                if self.last_error.take().is_some() {
                    log::info!("Clock file readable again");
                }
                secs
            }
            Err(message) => {
                self.note_failure(message);
                0.0
            }
        };
        self.time_left
    }

    /// Record a read failure. Returns true if it was logged.
    fn note_failure(&mut self, message: String) -> bool {
        if self.last_error.as_deref() == Some(message.as_str()) {
            return false;
        }
        log::error!("{}", message);
        self.last_error = Some(message);
        true
    }

    /// Current reading formatted as `MM:SS`.
    pub fn display(&mut self) -> String {
        format_clock(self.read_time())
    }
}

/// Format seconds as `MM:SS`. Negative values clamp to zero.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

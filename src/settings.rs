use std::path::PathBuf;

use hifitime::prelude::Duration;

use crate::archive::{Archive, RinexVersion};

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECONDS: f64 = 60.0;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Rover observation RINEX
    pub rover: PathBuf,

    /// Reference station (lowercase 4 letter code)
    pub station: String,

    /// Output directory
    pub output_dir: PathBuf,

    /// Observation RINEX revision to retrieve
    pub version: RinexVersion,

    /// Remote [Archive] layout
    pub archive: Archive,

    /// Per request timeout
    pub timeout: Duration,
}

impl Settings {
    /// Request timeout, as expected by the HTTP client
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.timeout.to_seconds().max(0.0))
    }
}

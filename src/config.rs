//! Application configuration loaded from environment variables.
//!
//! Every knob has a default, so an empty environment yields a working
//! setup; a `.env` file is honored for local development.

use std::env;

use crate::services::filter::{DEFAULT_STALENESS_SECS, SampleFilter};

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Reject fixes whose accuracy radius exceeds this many meters.
    /// `None` disables the upper limit (negative accuracy is always
    /// rejected regardless).
    pub max_accuracy_m: Option<f64>,
    /// Reject fixes older than this many seconds. 0 disables the check.
    pub staleness_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_accuracy_m: None,
            staleness_secs: DEFAULT_STALENESS_SECS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables: `TRAIL_MAX_ACCURACY_M` (meters, unset = no
    /// limit) and `TRAIL_STALENESS_SECS` (seconds, 0 disables, default 30).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let max_accuracy_m = match env::var("TRAIL_MAX_ACCURACY_M") {
            Ok(raw) => {
                let limit: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("TRAIL_MAX_ACCURACY_M", raw.clone()))?;
                if limit < 0.0 {
                    return Err(ConfigError::Invalid("TRAIL_MAX_ACCURACY_M", raw));
                }
                Some(limit)
            }
            Err(_) => None,
        };

        let staleness_secs = match env::var("TRAIL_STALENESS_SECS") {
            Ok(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("TRAIL_STALENESS_SECS", raw.clone()))?;
                if i64::try_from(secs).is_err() {
                    return Err(ConfigError::Invalid("TRAIL_STALENESS_SECS", raw));
                }
                secs
            }
            Err(_) => DEFAULT_STALENESS_SECS,
        };

        Ok(Self {
            max_accuracy_m,
            staleness_secs,
        })
    }

    /// Staleness window for the sample filter (`None` when disabled).
    pub fn staleness_window(&self) -> Option<chrono::Duration> {
        match self.staleness_secs {
            0 => None,
            secs => {
                // Out-of-range values cap at the widest representable window
                let secs = i64::try_from(secs).unwrap_or(i64::MAX);
                Some(chrono::Duration::try_seconds(secs).unwrap_or(chrono::Duration::MAX))
            }
        }
    }

    /// Build the sample filter these settings describe.
    pub fn sample_filter(&self) -> SampleFilter {
        SampleFilter::new(self.max_accuracy_m, self.staleness_window())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

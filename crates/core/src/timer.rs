//! Timer backend selector
//!
//! The backend is chosen once when the configuration is loaded and never
//! changes during a sweep. Names are matched case-insensitively, both in
//! config files and on parse.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Clock source used by every stopwatch in a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TimerBackend {
    /// Standard library monotonic wall clock (`std::time::Instant`)
    Std,
    /// `CLOCK_MONOTONIC_RAW`, falling back to `CLOCK_MONOTONIC`
    #[default]
    Posix,
    /// Hardware cycle counter, scaled by the calibrated frequency
    Tsc,
}

impl TimerBackend {
    /// All backends, in configuration order
    pub const ALL: [TimerBackend; 3] = [TimerBackend::Std, TimerBackend::Posix, TimerBackend::Tsc];

    /// Configuration name of this backend
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerBackend::Std => "std",
            TimerBackend::Posix => "posix",
            TimerBackend::Tsc => "tsc",
        }
    }
}

impl fmt::Display for TimerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "std" => Ok(TimerBackend::Std),
            "posix" => Ok(TimerBackend::Posix),
            "tsc" => Ok(TimerBackend::Tsc),
            other => Err(format!(
                "unknown timer backend '{}', expected \"std\", \"posix\" or \"tsc\"",
                other
            )),
        }
    }
}

impl TryFrom<String> for TimerBackend {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

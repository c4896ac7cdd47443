//! Error types for the roofline harness
//!
//! This module defines all error types used throughout the workspace.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for roofline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the roofline harness
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (result files, config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration rejected before any measurement began
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file could not be read
    #[error("Failed to read config file '{}': {source}", path.display())]
    ConfigRead {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// Config file could not be parsed
    #[error("Failed to parse config file '{}': {reason}", path.display())]
    ConfigParse {
        /// Path that was parsed
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// A worker thread could not be created; the trial is abandoned
    #[error("Failed to spawn worker thread {thread}: {source}")]
    ThreadSpawn {
        /// Thread slot that failed
        thread: usize,
        /// OS error from the spawn
        source: io::Error,
    },

    /// The frequency rev-up loop never reached its target runtime
    #[error("Calibration did not converge after {iterations} iterations ({runtime:.3e} s)")]
    CalibrationDiverged {
        /// Iteration count of the last attempt
        iterations: u64,
        /// Runtime of the last attempt in seconds
        runtime: f64,
    },

    /// Pinning a thread to a core failed
    #[error("Failed to pin thread to core {core}: {reason}")]
    Affinity {
        /// Target logical core
        core: usize,
        /// OS reason
        reason: String,
    },

    /// Result sink failure
    #[error("Output error: {0}")]
    Output(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidConfig`]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        let msg = err.to_string();
        assert!(msg.contains("I/O error"));
    }

    #[test]
    fn test_error_display_invalid_config() {
        let err = Error::invalid_config("threads must be at least 1");
        let msg = err.to_string();
        assert!(msg.contains("Invalid configuration"));
        assert!(msg.contains("threads must be at least 1"));
    }

    #[test]
    fn test_error_display_config_parse() {
        let err = Error::ConfigParse {
            path: PathBuf::from("/tmp/roofline.toml"),
            reason: "expected `=`".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/roofline.toml"));
        assert!(msg.contains("expected `=`"));
    }

    #[test]
    fn test_error_display_thread_spawn() {
        let err = Error::ThreadSpawn {
            thread: 3,
            source: io::Error::new(io::ErrorKind::WouldBlock, "resource unavailable"),
        };
        let msg = err.to_string();
        assert!(msg.contains("thread 3"));
        assert!(msg.contains("resource unavailable"));
    }

    #[test]
    fn test_error_display_calibration() {
        let err = Error::CalibrationDiverged {
            iterations: 1 << 40,
            runtime: 0.001,
        };
        let msg = err.to_string();
        assert!(msg.contains("did not converge"));
        assert!(msg.contains(&(1u64 << 40).to_string()));
    }

    #[test]
    fn test_error_display_affinity() {
        let err = Error::Affinity {
            core: 7,
            reason: "Invalid argument".to_string(),
        };
        assert!(err.to_string().contains("core 7"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }

        fn returns_error() -> Result<i32> {
            Err(Error::Output("sink closed".to_string()))
        }

        assert_eq!(returns_result().unwrap(), 42);
        assert!(returns_error().is_err());
    }
}

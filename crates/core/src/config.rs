//! Benchmark configuration via `roofline.toml`
//!
//! The configuration is an immutable record supplied before the sweep
//! begins. Every field has a default, so an empty file is a valid config.

use crate::error::{Error, Result};
use crate::timer::TimerBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "roofline.toml";

/// Format written by the result sink when `save_output` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One comma-separated row per vector length
    #[default]
    Csv,
    /// One JSON object per vector length
    Jsonl,
}

/// Sweep configuration loaded from `roofline.toml`.
///
/// # Example
///
/// ```toml
/// vlen_start = 16
/// vlen_end = 1000000
/// vlen_scale = 2.0
/// threads = 4
/// ensembles = 3
/// min_runtime = 0.01
/// timer = "tsc"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RooflineConfig {
    /// First vector length of the sweep.
    #[serde(default = "default_vlen_start")]
    pub vlen_start: usize,
    /// Upper bound of the sweep; the first length reaching it is the last one run.
    #[serde(default = "default_vlen_end")]
    pub vlen_end: usize,
    /// Geometric growth factor between lengths (> 1.0).
    #[serde(default = "default_vlen_scale")]
    pub vlen_scale: f64,
    /// Worker threads per trial.
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Repetitions of each (kernel, length) trial.
    #[serde(default = "default_ensembles")]
    pub ensembles: usize,
    /// Minimum timed-region duration in seconds.
    #[serde(default = "default_min_runtime")]
    pub min_runtime: f64,
    /// Stopwatch backend.
    #[serde(default)]
    pub timer: TimerBackend,
    /// Log per-thread results.
    #[serde(default)]
    pub verbose: bool,
    /// Write one result row per vector length to `output_path`.
    #[serde(default)]
    pub save_output: bool,
    /// Result file path.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    /// Result file format.
    #[serde(default)]
    pub output_format: OutputFormat,
    /// Scalar coefficient `a`.
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    /// Scalar coefficient `b`.
    #[serde(default = "default_beta")]
    pub beta: f32,
    /// Kernels to run by name; empty runs all of them.
    #[serde(default)]
    pub kernels: Vec<String>,
}

fn default_vlen_start() -> usize {
    16
}

fn default_vlen_end() -> usize {
    1_000_000
}

fn default_vlen_scale() -> f64 {
    2.0
}

fn default_threads() -> usize {
    1
}

fn default_ensembles() -> usize {
    1
}

fn default_min_runtime() -> f64 {
    0.01
}

fn default_output_path() -> PathBuf {
    PathBuf::from("results.csv")
}

// |beta| < 1 keeps repeated `y = a x + b y` bounded.
fn default_alpha() -> f32 {
    1.5
}

fn default_beta() -> f32 {
    0.5
}

impl Default for RooflineConfig {
    fn default() -> Self {
        Self {
            vlen_start: default_vlen_start(),
            vlen_end: default_vlen_end(),
            vlen_scale: default_vlen_scale(),
            threads: default_threads(),
            ensembles: default_ensembles(),
            min_runtime: default_min_runtime(),
            timer: TimerBackend::default(),
            verbose: false,
            save_output: false,
            output_path: default_output_path(),
            output_format: OutputFormat::default(),
            alpha: default_alpha(),
            beta: default_beta(),
            kernels: Vec::new(),
        }
    }
}

impl RooflineConfig {
    /// Reject configurations that cannot produce a meaningful sweep.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(Error::invalid_config("threads must be at least 1"));
        }
        if self.ensembles == 0 {
            return Err(Error::invalid_config("ensembles must be at least 1"));
        }
        if self.vlen_start == 0 {
            return Err(Error::invalid_config("vlen_start must be at least 1"));
        }
        if self.vlen_start > self.vlen_end {
            return Err(Error::invalid_config(format!(
                "vlen_start ({}) exceeds vlen_end ({})",
                self.vlen_start, self.vlen_end
            )));
        }
        if !self.vlen_scale.is_finite() || self.vlen_scale <= 1.0 {
            return Err(Error::invalid_config(format!(
                "vlen_scale must be a finite number greater than 1.0, got {}",
                self.vlen_scale
            )));
        }
        if !self.min_runtime.is_finite() || self.min_runtime <= 0.0 {
            return Err(Error::invalid_config(format!(
                "min_runtime must be a positive number of seconds, got {}",
                self.min_runtime
            )));
        }
        if !self.alpha.is_finite() || !self.beta.is_finite() {
            return Err(Error::invalid_config("alpha and beta must be finite"));
        }
        Ok(())
    }

    /// Check the thread count against the usable cores.
    ///
    /// Only multi-threaded sweeps pin, so only they need one core per thread.
    pub fn validate_cores(&self, usable_cores: usize) -> Result<()> {
        if self.threads > 1 && self.threads > usable_cores {
            return Err(Error::invalid_config(format!(
                "{} threads requested but only {} usable cores",
                self.threads, usable_cores
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Roofline benchmark configuration
#
# Vector lengths run from vlen_start, multiplying by vlen_scale (rounded up)
# until the first length that reaches vlen_end.
vlen_start = 16
vlen_end = 1000000
vlen_scale = 2.0

# Worker threads per trial. With more than one thread, each worker is pinned
# to its own core.
threads = 1

# Repetitions per (kernel, length); the maximum is reported.
ensembles = 1

# Minimum timed-region duration in seconds.
min_runtime = 0.01

# Stopwatch backend: "std", "posix" (CLOCK_MONOTONIC_RAW) or "tsc"
timer = "posix"

# Log per-thread results.
verbose = false

# Write one result row per vector length.
save_output = false
output_path = "results.csv"
# "csv" or "jsonl"
output_format = "csv"

# Scalar coefficients used by the axpy-family kernels.
alpha = 1.5
beta = 0.5

# Kernels to run, in registry order; omit or leave empty for all.
# kernels = ["copy", "axpy"]
"#
    }

    /// Read, parse, and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            Error::ConfigParse { reason, .. } => Error::ConfigParse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        Ok(config)
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RooflineConfig = toml::from_str(content).map_err(|e| Error::ConfigParse {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Output(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

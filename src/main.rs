//! `roofline [CONFIG]`
//!
//! Runs a sweep configured by `CONFIG` (default: `roofline.toml` in the
//! working directory if present, built-in defaults otherwise). Results go
//! to stdout and, with `save_output`, to `output_path`; logs go to stderr.

use anyhow::{bail, Context, Result};
use roofline::{open_sinks, KernelRegistry, RooflineConfig, Sweep, CONFIG_FILE_NAME};
use std::path::{Path, PathBuf};
use tracing::info;

fn main() -> Result<()> {
    let mut args = std::env::args_os().skip(1);
    let explicit = args.next().map(PathBuf::from);
    if args.next().is_some() {
        bail!("usage: roofline [CONFIG]");
    }

    let config = load_config(explicit.as_deref())?;
    setup_logging(&config);

    let registry = KernelRegistry::standard();
    let mut sweep = Sweep::new(config, &registry).context("invalid configuration")?;
    let mut sinks = open_sinks(sweep.config()).context("failed to open result output")?;
    let report = sweep.run(&mut sinks).context("sweep failed")?;

    info!(rows = report.rows.len(), "done");
    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<RooflineConfig> {
    match explicit {
        Some(path) => RooflineConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display())),
        None => {
            let path = Path::new(CONFIG_FILE_NAME);
            if path.exists() {
                RooflineConfig::from_file(path)
                    .with_context(|| format!("failed to load {}", path.display()))
            } else {
                Ok(RooflineConfig::default())
            }
        }
    }
}

fn setup_logging(config: &RooflineConfig) {
    let level = if config.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

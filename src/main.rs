//! antarctic_monitor: live terminal dashboard of simulated Antarctic temperatures.
//!
//! Run with:  `RUST_LOG=debug antarctic_monitor` (logs go to the configured log file)

mod app;
mod config;
mod constants;
mod error;
mod reading;
mod sampler;
mod trend;
mod ui;
mod util;

use std::{
    fs::OpenOptions,
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::error::MonitorError;
use crate::reading::TemperatureUnit;
use crate::sampler::LocalClock;

// The UI owns the terminal, so logs go to a file.
fn init_logging(path: &Path) -> std::result::Result<(), MonitorError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| MonitorError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let config_path = config::default_path();
    let loaded = config::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let from_file = loaded.is_some();
    let raw_config = loaded.unwrap_or_default();

    init_logging(&raw_config.log_path())?;
    info!("antarctic_monitor v{} starting", env!("CARGO_PKG_VERSION"));
    if from_file {
        info!(path = %config_path.display(), "configuration loaded");
    } else {
        warn!("config file not found at '{}'; using defaults", config_path.display());
    }

    let settings = raw_config.resolve().context("resolving configuration")?;
    info!(
        variant = ?settings.variant,
        interval_secs = settings.interval.as_secs(),
        capacity = settings.capacity,
        low = settings.low,
        high = settings.high,
        "sampler configured"
    );

    let unit = if raw_config.fahrenheit {
        TemperatureUnit::Fahrenheit
    } else {
        TemperatureUnit::Celsius
    };
    let app = App::new(&settings, unit, Box::new(LocalClock));

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))
        .context("installing signal handler")?;

    ui::run(app, running).context("running dashboard")?;
    info!("shutdown complete");
    Ok(())
}

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{MonitorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Current value and time only.
    Basic,
    /// Value box, rolling table and trend chart.
    #[default]
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub low: f64,
    pub high: f64,
}

/// Contents of `config.toml`. Unset fields fall back to the variant's defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub variant: Variant,
    pub update_interval_secs: Option<u64>,
    pub history_capacity: Option<usize>,
    pub range: Option<TemperatureRange>,
    /// Fixed PRNG seed for reproducible runs.
    pub seed: Option<u64>,
    /// Start in Fahrenheit.
    pub fahrenheit: bool,
    pub log_file: Option<PathBuf>,
}

/// Validated values the sampler and app loop run with.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerSettings {
    pub variant: Variant,
    pub interval: Duration,
    pub capacity: usize,
    pub low: f64,
    pub high: f64,
    pub seed: Option<u64>,
}

impl DashboardConfig {
    pub fn resolve(&self) -> Result<SamplerSettings> {
        let (interval, capacity, (low, high)) = match self.variant {
            Variant::Basic => (BASIC_UPDATE_INTERVAL_SECS, BASIC_HISTORY_CAPACITY, BASIC_RANGE_C),
            Variant::Live => (LIVE_UPDATE_INTERVAL_SECS, LIVE_HISTORY_CAPACITY, LIVE_RANGE_C),
        };
        let interval = self.update_interval_secs.unwrap_or(interval);
        let capacity = self.history_capacity.unwrap_or(capacity);
        let (low, high) = self.range.map(|r| (r.low, r.high)).unwrap_or((low, high));

        if interval == 0 {
            return Err(MonitorError::InvalidConfig(
                "update_interval_secs must be at least 1".into(),
            ));
        }
        if capacity == 0 {
            return Err(MonitorError::InvalidConfig(
                "history_capacity must be at least 1".into(),
            ));
        }
        if !low.is_finite() || !high.is_finite() {
            return Err(MonitorError::InvalidConfig(format!(
                "range bounds must be finite, got {low}..{high}"
            )));
        }
        if !(high - low).is_finite() {
            return Err(MonitorError::InvalidConfig(format!(
                "range {low}..{high} is too wide to sample"
            )));
        }
        let (low, high) = if low <= high { (low, high) } else { (high, low) };

        Ok(SamplerSettings {
            variant: self.variant,
            interval: Duration::from_secs(interval),
            capacity,
            low,
            high,
            seed: self.seed,
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| env::temp_dir().join(LOG_FILE_NAME))
    }
}

pub fn parse(raw: &str, path: &Path) -> Result<DashboardConfig> {
    toml::from_str(raw).map_err(|source| MonitorError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// `None` when the file does not exist; the caller falls back to defaults.
pub fn load(path: impl AsRef<Path>) -> Result<Option<DashboardConfig>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path).map_err(|source| MonitorError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&raw, path).map(Some)
}

/// `$ANTARCTIC_MONITOR_CONFIG`, then the XDG config directory.
pub fn default_path() -> PathBuf {
    if let Ok(explicit) = env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(explicit);
    }
    let base = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("antarctic-monitor").join("config.toml")
}

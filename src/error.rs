use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("cannot read config '{path}': {source}")]
    ConfigRead { path: PathBuf, source: io::Error },
    #[error("TOML parse error in '{path}': {source}")]
    ConfigParse { path: PathBuf, source: toml::de::Error },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("cannot open log file '{path}': {source}")]
    LogFile { path: PathBuf, source: io::Error },
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;

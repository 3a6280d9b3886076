//! Error types for the runner.

use std::path::PathBuf;

/// All errors that can occur while loading inputs or replaying a panel.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("panel file error: {0}")]
    Panel(String),

    #[error("failed to read panel file {path}: {source}")]
    PanelRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse panel JSON: {0}")]
    PanelParse(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] nanorevert::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

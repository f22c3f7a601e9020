use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings parse error: {0}")]
    Parse(String),
    #[error("invalid settings: {0}")]
    Invalid(String),
    #[error("settings serialize error: {0}")]
    Serialize(String),
}

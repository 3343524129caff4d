use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the scanning and fixing pipeline
#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("'{}' is not a valid directory", .0.display())]
    InvalidRoot(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid exclude pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConnectorError>;

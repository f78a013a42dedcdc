use connectors::error::StoreError;
use sample_filter::FilterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid filter: {0}")]
    Filter(#[from] FilterError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No data source: pass --conn, --fixture or set {0}")]
    MissingSource(&'static str),
}

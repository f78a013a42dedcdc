use thiserror::Error;

/// All errors coming from the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// PostgreSQL driver error.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// TLS setup failed before a connection could be attempted.
    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    /// An error occurred while lowering a filter or building a SQL query.
    #[error("Query build error: {0}")]
    QueryBuild(String),

    /// A stored value could not be read as the numeric type a comparison needs.
    #[error("Cannot convert {field} value '{value}' to a number")]
    ValueConversion { field: String, value: String },

    #[error("Failed to decode column '{column}': {message}")]
    Decode { column: String, message: String },

    #[error("Failed to load snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

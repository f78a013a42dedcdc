use connectors::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Unsupported predicate type '{kind}'")]
    UnsupportedPredicate { kind: String },

    /// A stored value could not be parsed as the number a comparison or a
    /// series needs.
    #[error("Cannot convert {field} value '{value}' to a number")]
    ValueConversion { field: String, value: String },

    #[error("Malformed filter specification: {0}")]
    MalformedFilterSpec(String),

    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for FilterError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ValueConversion { field, value } => {
                FilterError::ValueConversion { field, value }
            }
            other => FilterError::Store(other),
        }
    }
}

//! Observer error types

use thiserror::Error;

use crate::channel::ObserverId;

#[derive(Error, Debug)]
pub enum ObserverError {
    #[error("Observer channel closed: {0}")]
    ChannelClosed(ObserverId),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field {field}: expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

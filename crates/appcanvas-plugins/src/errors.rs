//! Error types for data-source plugins.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PluginError {
    #[error("invalid API specification: {message}")]
    Spec { message: String },
    #[error("unknown action: {id}")]
    UnknownAction { id: String },
    #[error("missing required parameter: {name}")]
    MissingParam { name: String },
    /// Connection-level failure, propagated uninterpreted.
    #[error("HTTP request failed: {message}")]
    Transport { message: String },
    /// The target service answered with an error status.
    #[error("API error: HTTP {status}")]
    Api { status: u16 },
}

pub type PluginResult<T> = Result<T, PluginError>;

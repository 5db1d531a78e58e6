//! Error types for the composition framework.
//!
//! Configuration errors are fatal at construction time and must never be
//! raised while an instance renders. Transport errors are retryable and
//! never corrupt in-memory state.

use thiserror::Error;

/// Build-time configuration errors.
///
/// Raised while a widget definition or registry is being constructed.
/// They indicate a defect in the definition itself, not bad runtime data,
/// so they are surfaced once at build and never during instance render.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error("duplicate control name: {name}")]
    DuplicateControlName { name: String },
    #[error("duplicate exposed name: {name}")]
    DuplicateExposedName { name: String },
    #[error("duplicate exposed method name: {name}")]
    DuplicateMethodName { name: String },
    #[error("duplicate widget type: {comp_type}")]
    DuplicateCompType { comp_type: String },
}

/// Errors from the HTTP gateway collaborator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    #[error("request failed: {message}")]
    Request { message: String },
    #[error("invalid response body: {message}")]
    InvalidBody { message: String },
}

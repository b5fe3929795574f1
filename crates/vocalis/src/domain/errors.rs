//! Domain Errors
//!
//! Error types for domain operations.

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    /// The inbound payload is structurally unusable: the correlation
    /// identifier is missing or empty. The only condition that produces a
    /// non-success webhook response.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// The persistence collaborator failed; propagated unmodified so the
    /// sender can retry delivery.
    #[error("Repository error: {0}")]
    Repository(String),
}

impl DomainError {
    pub fn not_found<T: AsRef<str>>(entity_type: T, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }
}

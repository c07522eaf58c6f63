use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invariant violated: {message}")]
    Invariant { message: String },
}

impl DomainError {
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }
}

//! # Service Errors

use derive_more::Display;

use crate::repository::RepoError;

/// Failures surfaced by the service layer.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No URL with this alias.
    #[display("URL not found: {_0}")]
    NotFound(String),

    /// The URL belongs to another user.
    #[display("User does not own this URL")]
    Forbidden,

    /// The alias is taken, or the URL is already inactive.
    #[display("{_0}")]
    Conflict(String),

    /// The request failed validation.
    #[display("{_0}")]
    InvalidInput(String),

    /// Random alias generation kept colliding.
    #[display("Unable to generate unique alias after {_0} attempts")]
    AliasExhausted(usize),
}

impl std::error::Error for ServiceError {}

impl From<RepoError> for ServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::DuplicateAlias(alias) => {
                ServiceError::Conflict(format!("Alias already exists: {}", alias))
            }
            RepoError::UnknownUrl(id) => ServiceError::NotFound(format!("#{}", id)),
        }
    }
}

/// Result alias for service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

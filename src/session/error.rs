//! Session error types.

use thiserror::Error;

use crate::cache::CacheError;

/// Errors returned by [`SessionManager`](crate::session::SessionManager).
#[derive(Error, Debug)]
pub enum SessionError {
    /// `update` was called on a request that carries no session cookie.
    #[error("no session found to update")]
    NoSession,

    /// Storing a new session failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The request carried a session cookie but its payload could not be
    /// loaded: expired, missing, or undecodable.
    #[error("failed to load session from backend: {source}")]
    Load {
        #[source]
        source: CacheError,
    },

    /// Writing the updated payload failed.
    #[error("failed to update session in backend: {source}")]
    Update {
        #[source]
        source: CacheError,
    },
}

impl SessionError {
    /// The underlying cache error, if any.
    pub fn cache_error(&self) -> Option<&CacheError> {
        match self {
            SessionError::NoSession => None,
            SessionError::Cache(source)
            | SessionError::Load { source }
            | SessionError::Update { source } => Some(source),
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

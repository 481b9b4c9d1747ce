//! Cookie-based sessions stored in a [`Cache`](crate::cache::Cache).
//!
//! The client holds an opaque, random session id in an HTTP-only cookie; the
//! payload lives in the cache under `session:<id>` with the configured TTL.
//!
//! ```ignore
//! let sessions = SessionManager::with_config(cache, &settings.session)?;
//!
//! let cookie = sessions.create(&ctx, &UserSession { user_id: 42 }).await?;
//! response.headers_mut().append(SET_COOKIE, cookie.to_header_value()?);
//!
//! let current: Option<UserSession> = sessions.get(&request).await?;
//! ```

mod cookie;
mod error;
mod manager;

pub use self::cookie::SessionCookie;
pub use error::{SessionError, SessionResult};
pub use manager::{SessionManager, generate_session_id, session_key};

// Re-export config types
pub use crate::config::settings::SessionConfig;

//! Cookie-based session manager backed by a [`Cache`].

use std::sync::Arc;
use std::time::Duration;

use http::Request;
use rand::Rng;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{Cache, CacheExt};
use crate::config::error::ConfigError;
use crate::config::settings::SessionConfig;
use crate::context::Context;
use crate::session::cookie::{SessionCookie, find_cookie};
use crate::session::error::{SessionError, SessionResult};

/// Cache key namespace for session payloads.
const SESSION_KEY_PREFIX: &str = "session:";

/// Random bytes in a session identifier.
const SESSION_ID_BYTES: usize = 32;

/// Generate a new session identifier: 256 random bits as lowercase hex.
pub fn generate_session_id() -> String {
    let bytes: [u8; SESSION_ID_BYTES] = rand::rng().random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Cache key under which the session `id` is stored.
pub fn session_key(id: &str) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, id)
}

/// Issues, reads and updates session cookies.
///
/// The manager is stateless between calls: payloads live in the cache under
/// `session:<id>`, and the client holds only the id. Reads never extend the
/// TTL; only [`update`](Self::update) does.
#[derive(Clone)]
pub struct SessionManager {
    name: String,
    secure: bool,
    ttl: Duration,
    path: String,
    backend: Arc<dyn Cache>,
}

impl SessionManager {
    /// Create a manager with the default configuration.
    pub fn new(backend: Arc<dyn Cache>) -> Self {
        Self::from_config(backend, &SessionConfig::default())
    }

    /// Create a manager from `config`.
    ///
    /// The cookie name and path end up verbatim in `Set-Cookie`, so the
    /// configuration is validated here as well as at load time.
    pub fn with_config(backend: Arc<dyn Cache>, config: &SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_config(backend, config))
    }

    fn from_config(backend: Arc<dyn Cache>, config: &SessionConfig) -> Self {
        Self {
            name: config.name.clone(),
            secure: config.secure,
            ttl: config.ttl(),
            path: config.path.clone(),
            backend,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store `payload` under a fresh session id and return the cookie that
    /// references it.
    pub async fn create<T>(&self, ctx: &Context, payload: &T) -> SessionResult<SessionCookie>
    where
        T: Serialize + Sync + ?Sized,
    {
        let id = generate_session_id();
        self.backend
            .set(ctx, &session_key(&id), payload, self.ttl)
            .await?;

        tracing::debug!(cookie = %self.name, "Session created");
        Ok(self.cookie(id, self.max_age()))
    }

    /// Load the session payload referenced by the request's cookie.
    ///
    /// Returns `Ok(None)` when the request has no session cookie. A cookie
    /// whose payload is missing or undecodable is an error, so callers can
    /// tell "no session" apart from "session lost".
    pub async fn get<T, B>(&self, request: &Request<B>) -> SessionResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let Some(id) = find_cookie(request.headers(), &self.name) else {
            return Ok(None);
        };

        let ctx = request_context(request);
        let payload = self
            .backend
            .get(&ctx, &session_key(&id))
            .await
            .map_err(|source| SessionError::Load { source })?;
        Ok(Some(payload))
    }

    /// Replace the payload of the request's session and reset its TTL.
    ///
    /// Fails with [`SessionError::NoSession`] when the request has no session
    /// cookie; nothing is written in that case.
    pub async fn update<T, B>(&self, request: &Request<B>, payload: &T) -> SessionResult<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let id = find_cookie(request.headers(), &self.name).ok_or(SessionError::NoSession)?;

        let ctx = request_context(request);
        self.backend
            .set(&ctx, &session_key(&id), payload, self.ttl)
            .await
            .map_err(|source| SessionError::Update { source })
    }

    /// A cookie that tells the client to discard its session cookie.
    ///
    /// Does not touch the cache; the stored payload expires through its TTL.
    pub fn delete(&self) -> SessionCookie {
        self.cookie(String::new(), -1)
    }

    /// Remove the request's session payload from the cache, then return the
    /// discard cookie from [`delete`](Self::delete).
    pub async fn invalidate<B>(&self, request: &Request<B>) -> SessionResult<SessionCookie> {
        if let Some(id) = find_cookie(request.headers(), &self.name) {
            let ctx = request_context(request);
            self.backend.delete(&ctx, &session_key(&id)).await?;
            tracing::debug!(cookie = %self.name, "Session invalidated");
        }
        Ok(self.delete())
    }

    fn max_age(&self) -> i64 {
        i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)
    }

    fn cookie(&self, value: String, max_age: i64) -> SessionCookie {
        SessionCookie {
            name: self.name.clone(),
            value,
            secure: self.secure,
            path: self.path.clone(),
            http_only: true,
            max_age,
        }
    }
}

/// The request's [`Context`] extension, or a background context.
fn request_context<B>(request: &Request<B>) -> Context {
    request
        .extensions()
        .get::<Context>()
        .cloned()
        .unwrap_or_default()
}

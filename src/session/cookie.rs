//! Session cookie descriptor and request cookie lookup.

use std::fmt;

use cookie::Cookie;
use http::header::{COOKIE, InvalidHeaderValue};
use http::{HeaderMap, HeaderValue};

/// Attributes of the cookie to send to, or clear from, a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub secure: bool,
    pub path: String,
    pub http_only: bool,
    /// Lifetime in seconds. Negative values tell the client to drop the
    /// cookie immediately.
    pub max_age: i64,
}

impl SessionCookie {
    /// Whether this descriptor instructs the client to discard the cookie.
    pub fn is_removal(&self) -> bool {
        self.max_age < 0
    }

    /// Render as a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.to_string())
    }
}

impl fmt::Display for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if !self.path.is_empty() {
            write!(f, "; Path={}", self.path)?;
        }
        if self.max_age < 0 {
            // Max-Age=0 is the on-the-wire form of "delete now".
            f.write_str("; Max-Age=0")?;
        } else {
            write!(f, "; Max-Age={}", self.max_age)?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        Ok(())
    }
}

/// Find the value of cookie `name` across every `Cookie` header.
///
/// Malformed pairs are skipped. The first match wins.
pub(crate) fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

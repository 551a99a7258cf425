//! Session cookie handling.
//!
//! The cookie holds only the opaque session id. It is `HttpOnly` and
//! `SameSite=Lax`, and `Secure` when the deployment serves HTTPS.

use axum::http::header::{COOKIE, InvalidHeaderValue};
use axum::http::{HeaderMap, HeaderValue};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "teramorph_session";

/// Session id from the request's `Cookie` headers, if present and
/// non-empty.
#[must_use]
pub fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value binding the client to session `id`.
///
/// # Errors
///
/// Returns an error if `id` contains bytes not allowed in a header.
pub fn session_cookie(
    id: &str,
    max_age_secs: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let secure = if secure { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={id}; Path=/; Max-Age={max_age_secs}; HttpOnly; SameSite=Lax{secure}"
    ))
}

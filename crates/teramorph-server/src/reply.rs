//! Response shaping for contact submissions.
//!
//! Requests that send a non-empty `X-Requested-With` header come from the
//! page's script and always get a JSON body. Plain form posts get a small
//! HTML page instead. Neither ever mentions file paths.

use axum::Json;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;

use crate::page::escape_html;

/// Header the landing page script sets on `fetch` submissions.
pub const REQUESTED_WITH: &str = "x-requested-with";

/// Client-facing text for a stored submission.
pub const SAVED: &str = "saved";

/// Client-facing text for any storage error.
pub const STORAGE_FAILURE: &str = "storage failure";

/// Client-facing text for a rejected CSRF token.
pub const INVALID_CSRF: &str = "invalid CSRF token";

/// Client-facing text for a body that could not be decoded.
pub const BAD_REQUEST: &str = "bad request";

/// Client-facing text when no new session can be opened.
pub const SERVICE_BUSY: &str = "service busy, try again later";

/// How the client expects to be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Script-driven request: JSON body.
    Script,
    /// Plain HTML form post: HTML body.
    Form,
}

impl ResponseMode {
    /// Pick the mode from the request headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let scripted = headers
            .get(REQUESTED_WITH)
            .is_some_and(|value| !value.as_bytes().is_empty());
        if scripted { Self::Script } else { Self::Form }
    }
}

/// JSON body sent to script-driven requests.
#[derive(Debug, Serialize)]
pub struct Payload {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

/// Successful submission.
#[must_use]
pub fn saved(mode: ResponseMode) -> Response {
    match mode {
        ResponseMode::Script => Json(Payload {
            ok: true,
            message: Some(SAVED),
            error: None,
        })
        .into_response(),
        ResponseMode::Form => acknowledgement(SAVED).into_response(),
    }
}

/// Failed submission reported with HTTP 200 and the failure in the body.
#[must_use]
pub fn failed(mode: ResponseMode, error: &'static str) -> Response {
    match mode {
        ResponseMode::Script => failure(error).into_response(),
        ResponseMode::Form => acknowledgement(error).into_response(),
    }
}

/// Refused request with an error status. Scripts still get the JSON
/// shape; form posts get plain text.
#[must_use]
pub fn rejected(mode: ResponseMode, status: StatusCode, error: &'static str) -> Response {
    match mode {
        ResponseMode::Script => (status, failure(error)).into_response(),
        ResponseMode::Form => (status, error).into_response(),
    }
}

fn failure(error: &'static str) -> Json<Payload> {
    Json(Payload {
        ok: false,
        message: None,
        error: Some(error),
    })
}

/// Minimal page shown after a plain form post.
#[must_use]
pub fn acknowledgement(message: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><meta charset=\"utf-8\"><title>Contacto</title>\n\
         <p style=\"font-family:system-ui, Roboto, sans-serif\">{}</p>\n\
         <p><a href=\"./\">Volver</a></p>\n",
        escape_html(message)
    ))
}

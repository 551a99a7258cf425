//! HTTP error types for `Teramorph` server.
//!
//! Maps contact pipeline errors into responses. Among pipeline errors only
//! a CSRF failure on a plain form post changes the status code (400);
//! script-driven requests get HTTP 200 with `{"ok": false, "error": ...}`,
//! which is what the page's `fetch` handler expects. Storage errors are
//! reported in the body at HTTP 200 on both paths, with the internal reason
//! kept in logs. An undecodable body is 400 on both paths, JSON for scripts.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use teramorph_core::error::ContactError;

use crate::reply::{self, BAD_REQUEST, INVALID_CSRF, ResponseMode, STORAGE_FAILURE};

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// The request body could not be decoded as a form.
    BadRequest { mode: ResponseMode, reason: String },
    /// The contact pipeline rejected or failed the submission.
    Contact {
        mode: ResponseMode,
        error: ContactError,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest { mode, reason } => {
                tracing::debug!(reason = %reason, "unreadable form body");
                reply::rejected(mode, StatusCode::BAD_REQUEST, BAD_REQUEST)
            }
            Self::Contact {
                mode: ResponseMode::Form,
                error: ContactError::InvalidCsrf,
            } => reply::rejected(ResponseMode::Form, StatusCode::BAD_REQUEST, INVALID_CSRF),
            Self::Contact {
                mode,
                error: ContactError::InvalidCsrf,
            } => reply::failed(mode, INVALID_CSRF),
            Self::Contact {
                mode,
                error: ContactError::StorageUnavailable { .. } | ContactError::StorageWriteFailure { .. },
            } => reply::failed(mode, STORAGE_FAILURE),
        }
    }
}

//! Landing page and contact form routes.
//!
//! - `GET /` renders the page with the session's CSRF token
//! - `POST /` accepts a url-encoded or multipart submission
//! - `GET /assets/landing.js` serves the page script

use std::sync::Arc;

use axum::{Form, Router};
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::http::header::{CONTENT_TYPE, SET_COOKIE};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tracing::{debug, warn};

use teramorph_core::submission::ContactForm;

use crate::cookie;
use crate::error::AppError;
use crate::page;
use crate::reply::{self, ResponseMode};
use crate::state::AppState;

/// Build the contact router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(landing).post(submit))
        .route(page::SCRIPT_PATH, get(script))
}

/// Render the landing page, creating a session if the client has none.
///
/// Answers 503 when a new session is needed and the registry is full.
async fn landing(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(session) = state
        .sessions
        .get_or_create(cookie::session_id(&headers))
        .await
    else {
        return (StatusCode::SERVICE_UNAVAILABLE, reply::SERVICE_BUSY).into_response();
    };
    let sessions = state.sessions.len().await;
    debug!(
        new_session = session.is_new,
        sessions,
        "landing page served"
    );

    let mut response = Html(page::render(&state.page, session.csrf.as_str())).into_response();
    match cookie::session_cookie(&session.id, state.session_ttl_secs, state.cookie_secure) {
        Ok(value) => {
            response.headers_mut().insert(SET_COOKIE, value);
        }
        Err(e) => warn!(error = %e, "failed to build session cookie"),
    }
    response
}

/// Handle one contact submission.
async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    SubmittedForm(form): SubmittedForm,
) -> Result<Response, AppError> {
    let mode = ResponseMode::from_headers(&headers);

    let expected = match cookie::session_id(&headers) {
        Some(id) => state.sessions.csrf_for(id).await,
        None => None,
    };

    let receipt = state
        .contact
        .submit(expected.as_ref(), &form)
        .await
        .map_err(|error| AppError::Contact { mode, error })?;
    debug!(?mode, email_accepted = receipt.email_accepted, "contact reply sent");

    Ok(reply::saved(mode))
}

async fn script() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "application/javascript; charset=utf-8")],
        page::LANDING_SCRIPT,
    )
}

/// Contact form decoded from either `multipart/form-data` or
/// `application/x-www-form-urlencoded`.
///
/// Both encodings go through [`ContactForm::set`], so a repeated field
/// keeps its last value either way.
#[derive(Debug)]
pub struct SubmittedForm(pub ContactForm);

impl<S> FromRequest<S> for SubmittedForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mode = ResponseMode::from_headers(req.headers());
        let bad_request = |reason: String| AppError::BadRequest { mode, reason };

        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        let mut form = ContactForm::default();

        if !is_multipart {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| bad_request(e.body_text()))?;
            for (name, value) in pairs {
                form.set(&name, value);
            }
            return Ok(Self(form));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| bad_request(e.body_text()))?;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| bad_request(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let value = field.text().await.map_err(|e| bad_request(e.body_text()))?;
            form.set(&name, value);
        }
        Ok(Self(form))
    }
}

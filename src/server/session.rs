//! Cookie-backed anonymous sessions
//!
//! The session id doubles as the caller's queue identity.

use crate::queue::api::QueueError;
use crate::server::error::ApiError;
use crate::server::state::AppState;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

pub const SESSION_COOKIE: &str = "session_id";

/// Session identity attached to the request by [`session_middleware`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session(pub String);

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .filter(|session| !session.0.is_empty())
            .cloned()
            .ok_or(ApiError::Queue(QueueError::IdentityMissing))
    }
}

/// Read the session cookie, issuing a fresh one when absent
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let (session_id, issued) = match session_from_headers(request.headers()) {
        Some(id) => (id, false),
        None => (uuid::Uuid::new_v4().to_string(), true),
    };

    request
        .extensions_mut()
        .insert(Session(session_id.clone()));
    let mut response = next.run(request).await;

    if issued {
        log::debug!("Issued session {session_id}");
        let cookie = format!(
            "{SESSION_COOKIE}={session_id}; Max-Age={}; Path=/; HttpOnly",
            state.session_max_age
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => log::warn!("Could not encode session cookie: {e}"),
        }
    }
    response
}

/// Find a non-empty session cookie in the request headers
pub fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

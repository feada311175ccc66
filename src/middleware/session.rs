//! # Session Middleware
//!
//! Extracts the session token from the request and records the session id on
//! the context. Missing or invalid credentials are not an error: the session
//! is marked absent and the request continues unauthenticated.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use cookie::Cookie;
use tracing::{debug, trace};

use super::{Middleware, Outcome};
use crate::models::RequestContext;
use crate::services::session::SessionService;
use crate::utils::constant::SESSION_COOKIE_NAME;

pub struct SessionMiddleware {
    sessions: Arc<SessionService>,
}

impl SessionMiddleware {
    pub fn new(sessions: Arc<SessionService>) -> Self {
        Self { sessions }
    }
}

/// Finds the session token, preferring the session cookie over an
/// `Authorization: Bearer` header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string)
    })
}

#[async_trait]
impl Middleware for SessionMiddleware {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn process(&self, ctx: &mut RequestContext) -> Outcome {
        let Some(token) = session_token(&ctx.headers) else {
            trace!("No session credentials on request");
            ctx.mark_session_absent();
            return Outcome::Continue;
        };

        match self.sessions.validate_token(&token) {
            Ok(session_id) => {
                trace!("Session token accepted");
                ctx.set_session(session_id);
            }
            Err(e) => {
                debug!(error = %e, "Ignoring unusable session token");
                ctx.mark_session_absent();
            }
        }
        Outcome::Continue
    }
}

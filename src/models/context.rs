//! # Request Context
//!
//! The request-scoped carrier threaded through the middleware chain. Every
//! resolution step has its own [`Stage`], so "not looked at yet" and "looked
//! at, nothing there" can't be confused.

use axum::http::{HeaderMap, Method, Uri};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use super::{SessionId, UserRecord};

/// Resolution state of one context field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Stage<T> {
    /// The middleware responsible for this field has not run yet.
    #[default]
    Pending,
    /// The middleware ran and found nothing. A normal state, not an error.
    Absent,
    Resolved(T),
}

impl<T> Stage<T> {
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Stage::Resolved(value) => Some(value),
            Stage::Pending | Stage::Absent => None,
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, Stage::Pending)
    }

    /// Moves the stage out of `Pending`. A stage that was already decided is
    /// kept as it is, fields are never overwritten within one chain run.
    fn settle(&mut self, next: Stage<T>, field: &'static str) {
        if self.is_pending() {
            *self = next;
        } else {
            warn!(field, "Ignoring attempt to resolve an already settled field");
        }
    }
}

/// Query parameters of the OAuth callback routes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code issued by the provider after user consent
    pub code: Option<String>,
}

impl CallbackQuery {
    /// The code, treating an empty parameter like a missing one.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|code| !code.is_empty())
    }
}

/// Per-request carrier mutated in place by the middleware chain.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub query: CallbackQuery,
    session: Stage<SessionId>,
    user: Stage<UserRecord>,
}

impl RequestContext {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, query: CallbackQuery) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            method,
            uri,
            headers,
            query,
            session: Stage::Pending,
            user: Stage::Pending,
        }
    }

    /// A bare `GET /` context, handy when no request is at hand.
    pub fn empty() -> Self {
        Self::new(
            Method::GET,
            Uri::from_static("/"),
            HeaderMap::new(),
            CallbackQuery::default(),
        )
    }

    pub fn session(&self) -> &Stage<SessionId> {
        &self.session
    }

    pub fn user(&self) -> &Stage<UserRecord> {
        &self.user
    }

    pub fn set_session(&mut self, session_id: SessionId) {
        self.session.settle(Stage::Resolved(session_id), "session");
    }

    pub fn mark_session_absent(&mut self) {
        self.session.settle(Stage::Absent, "session");
    }

    pub fn set_user(&mut self, user: UserRecord) {
        self.user.settle(Stage::Resolved(user), "user");
    }

    pub fn mark_user_absent(&mut self) {
        self.user.settle(Stage::Absent, "user");
    }
}

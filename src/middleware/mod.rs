//! # Middleware Components
//!
//! The request pipeline shared by the Discord routes:
//! logging → session → user resolution, run by [`MiddlewareChain`].

mod chain;
mod logging;
mod session;
mod user;

pub use chain::{Middleware, MiddlewareChain, Outcome};
pub use logging::LoggingMiddleware;
pub use session::SessionMiddleware;
pub use user::UserMiddleware;

use std::sync::Arc;

use crate::services::{session::SessionService, store::UserStore};

/// The standard chain: logging, then session, then user resolution.
pub fn default_chain(sessions: Arc<SessionService>, store: Arc<dyn UserStore>) -> MiddlewareChain {
    MiddlewareChain::new()
        .with(LoggingMiddleware)
        .with(SessionMiddleware::new(sessions))
        .with(UserMiddleware::new(store))
}

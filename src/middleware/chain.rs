//! # Middleware Runner
//!
//! Runs an ordered list of [`Middleware`]s against one [`RequestContext`].
//! Each middleware reports an explicit [`Outcome`]; the first
//! [`Outcome::Fail`] stops the chain and becomes the response, and the
//! continuation only runs once every middleware has continued.

use std::future::Future;

use async_trait::async_trait;
use axum::response::{IntoResponse, Response};
use tracing::{Instrument, debug, info_span, trace, warn};

use crate::error::AppError;
use crate::models::RequestContext;

/// Result of one middleware step
#[derive(Debug)]
pub enum Outcome {
    Continue,
    /// Stop the chain and answer with this error
    Fail(AppError),
}

/// A single request processing step
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Processes the request, enriching the context in place.
    async fn process(&self, ctx: &mut RequestContext) -> Outcome;
}

/// Ordered, immutable sequence of middlewares shared by all requests.
///
/// One `run` per inbound request; the only mutable state is the
/// request-scoped context.
#[derive(Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware to the end of the chain.
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(Box::new(middleware));
        self
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Runs every middleware in order, then hands the context to `continuation`.
    ///
    /// # Returns
    ///
    /// - The error response of the first failing middleware; later middlewares
    ///   and the continuation are skipped
    /// - Otherwise whatever `continuation` responds with. It is called exactly once.
    pub async fn run<F, Fut>(&self, mut ctx: RequestContext, continuation: F) -> Response
    where
        F: FnOnce(RequestContext) -> Fut,
        Fut: Future<Output = Response>,
    {
        let span = info_span!("middleware_chain", request_id = %ctx.request_id);

        async move {
            for middleware in &self.middlewares {
                trace!(middleware = middleware.name(), "Running middleware");

                match middleware.process(&mut ctx).await {
                    Outcome::Continue => continue,
                    Outcome::Fail(e) => {
                        warn!(
                            middleware = middleware.name(),
                            error = %e,
                            "Middleware failed, stopping chain"
                        );
                        return e.into_response();
                    }
                }
            }

            debug!("Middleware chain completed");
            continuation(ctx).await
        }
        .instrument(span)
        .await
    }
}

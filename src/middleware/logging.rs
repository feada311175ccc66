use async_trait::async_trait;
use axum::http::header;
use tracing::info;

use super::{Middleware, Outcome};
use crate::models::RequestContext;

/// Records request metadata. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn process(&self, ctx: &mut RequestContext) -> Outcome {
        let user_agent = ctx
            .headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");

        info!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = ctx.uri.path(),
            user_agent,
            "Incoming request"
        );
        Outcome::Continue
    }
}

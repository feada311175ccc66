//! # Discord Connect Pages
//!
//! `GET /{provider}/success` is the redirect target registered with Discord.
//! It always renders a page for OAuth outcomes, failures included; only a
//! failing middleware answers with a JSON error instead.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, Uri},
    response::{Html, IntoResponse, Response},
};
use tracing::{error, instrument};

use super::oauth::parse_provider;
use crate::error::AppError;
use crate::models::{AppState, CallbackQuery, RequestContext};
use crate::services::page_state::resolve_page_state;
use crate::utils::html::render_page_state;

/// Renders the outcome of connecting a Discord account.
///
/// # Returns
///
/// - `200 OK` with one of the success, not-logged-in or provider-error pages
/// - `404 Not Found` - Unknown provider
/// - JSON error response if a middleware fails
#[instrument(skip_all, fields(provider = %provider))]
pub async fn connect_result_page(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Err(e) = parse_provider(&provider) {
        return e.into_response();
    }

    let ctx = RequestContext::new(method, uri, headers, query);
    let continuation_state = Arc::clone(&state);

    state
        .chain
        .run(ctx, |ctx| async move {
            let page_state = resolve_page_state(
                continuation_state.identity_provider.as_ref(),
                ctx.user().resolved(),
                ctx.query.code(),
            )
            .await;

            match render_page_state(&page_state) {
                Ok(html) => Html(html).into_response(),
                Err(e) => {
                    error!(error = %e, "Failed to render page");
                    AppError::Internal.into_response()
                }
            }
        })
        .await
}

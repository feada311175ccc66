//! # OAuth Handlers
//!
//! API side of the Discord connect flow:
//!
//! 1. `GET /api/auth/connect/{provider}` sends the user to Discord's consent screen
//! 2. Discord redirects back with an authorization code
//! 3. `GET /api/auth/callback/{provider}` exchanges the code and answers with
//!    the connected identity as JSON
//!
//! The callback runs behind the logging → session → user middleware chain.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, info, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::models::{AppState, CallbackQuery, Provider, ProviderIdentity, RequestContext};

/// Parses the `{provider}` path segment.
pub(crate) fn parse_provider(raw: &str) -> AppResult<Provider> {
    raw.parse().map_err(|_| {
        warn!(provider = raw, "Unknown identity provider requested");
        AppError::NotFound("unknown provider")
    })
}

/// Redirects the user to the provider's authorization page.
///
/// # Returns
///
/// - `303 See Other` - Redirect to the consent screen
/// - `404 Not Found` - Unknown provider
#[instrument(skip(state))]
pub async fn connect_provider(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
) -> AppResult<Redirect> {
    parse_provider(&provider)?;
    debug!("Redirecting to provider authorization page");
    Ok(Redirect::to(&state.identity_provider.authorize_url()))
}

/// Receives the OAuth callback and connects the provider account to the
/// logged in user.
///
/// # Returns
///
/// - `200 OK` with [`ProviderIdentity`] - Account connected
/// - `400 Bad Request` - No authorization code in the query
/// - `403 Forbidden` - `{"error": "user not logged in"}`
/// - `404 Not Found` - Unknown provider
/// - `502 Bad Gateway` - Discord rejected the code, the identity request
///   failed, or the profile came back incomplete
#[instrument(skip_all, fields(provider = %provider))]
pub async fn oauth_callback(
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
            connect_account(&continuation_state, &ctx)
                .await
                .into_response()
        })
        .await
}

async fn connect_account(
    state: &AppState,
    ctx: &RequestContext,
) -> AppResult<Json<ProviderIdentity>> {
    let Some(user) = ctx.user().resolved() else {
        warn!("OAuth callback without a logged in user");
        return Err(AppError::not_logged_in());
    };

    let Some(code) = ctx.query.code() else {
        warn!(user_id = user.id, "OAuth callback without an authorization code");
        return Err(AppError::BadRequest("authorization code is missing"));
    };

    let updated_user = state.identity_provider.exchange_code(user.id, code).await?;
    let identity = state.identity_provider.fetch_identity(&updated_user).await?;

    if identity.is_incomplete() {
        warn!(user_id = user.id, "Discord returned a profile without username");
        return Err(AppError::BadGateway(
            "Discord returned an incomplete profile".to_string(),
        ));
    }

    info!(user_id = user.id, discord_user_id = %identity.user_id, "Discord account connected");
    Ok(Json(identity))
}

//! # Page State Resolution
//!
//! Decides which of the three Discord connect pages to render. Every failure
//! of the exchange or the identity fetch is turned into
//! [`PageState::ProviderError`] here, nothing is propagated to the renderer.

use tracing::{debug, info, instrument, warn};

use crate::models::{PageState, UserRecord};
use crate::services::discord::{AuthCodeExchangeError, IdentityProvider};

/// Resolves the page state for one request.
///
/// # Transitions
///
/// 1. No user → [`PageState::Unauthenticated`]
/// 2. Missing code or failed exchange → [`PageState::ProviderError`] with the error message
/// 3. Failed fetch → `ProviderError` with the error message, fetched profile
///    without username → `ProviderError` without a message
/// 4. Otherwise → [`PageState::Success`]
///
/// The exchange is called with exactly `(user.id, code)` and always before the fetch.
#[instrument(skip_all, fields(user_id = user.map(|u| u.id), has_code = code.is_some()))]
pub async fn resolve_page_state(
    provider: &dyn IdentityProvider,
    user: Option<&UserRecord>,
    code: Option<&str>,
) -> PageState {
    let Some(user) = user else {
        debug!("No user on request");
        return PageState::Unauthenticated;
    };

    let provider_error = |message: Option<String>| PageState::ProviderError {
        username: user.username.clone(),
        message,
    };

    let exchanged = match code {
        Some(code) => provider.exchange_code(user.id, code).await,
        None => Err(AuthCodeExchangeError::MissingCode),
    };
    let updated_user = match exchanged {
        Ok(updated_user) => updated_user,
        Err(e) => {
            warn!(error = %e, "Authorization code exchange failed");
            return provider_error(Some(exchange_error_message(&e)));
        }
    };

    let user_info = match provider.fetch_identity(&updated_user).await {
        Ok(user_info) => user_info,
        Err(e) => {
            warn!(error = %e, "Identity fetch failed");
            return provider_error(Some(e.to_string()));
        }
    };

    if user_info.is_incomplete() {
        // the provider answered but gave us nothing usable, no message to show
        warn!("Identity fetch returned a profile without username");
        return provider_error(None);
    }

    info!(discord_user_id = %user_info.user_id, "Discord account connected");
    PageState::Success {
        user_info,
        username: user.username.clone(),
    }
}

/// Text shown in the page's error log. Storage failures stay internal.
fn exchange_error_message(e: &AuthCodeExchangeError) -> String {
    match e {
        AuthCodeExchangeError::Store(_) => "Database error".to_string(),
        e => e.to_string(),
    }
}

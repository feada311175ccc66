//! # Page Rendering
//!
//! Renders a [`PageState`] with the askama templates under `templates/`.
//! The match below is exhaustive on purpose: a new page state does not
//! compile until it has a page.

use askama::Template;

use super::constant::DISCORD_BUGS_FEEDBACK_URL;
use crate::models::{PageState, ProviderIdentity};

/// Where a user goes to retry connecting
const RETRY_PATH: &str = "/api/auth/connect/discord";
const LOGIN_PATH: &str = "/login";
const CONTINUE_PATH: &str = "/curriculum";

#[derive(Template)]
#[template(path = "discord_success.html")]
struct DiscordSuccessPage<'a> {
    user_info: &'a ProviderIdentity,
    username: &'a str,
    continue_path: &'a str,
}

/// Shared page for both failure states.
#[derive(Template)]
#[template(path = "discord_error.html")]
struct DiscordErrorPage<'a> {
    /// `None` when nobody is logged in
    username: Option<&'a str>,
    /// Shown in the error log block when present
    message: Option<&'a str>,
    nav_path: &'a str,
    nav_text: &'a str,
    support_url: &'a str,
    curriculum_path: &'a str,
}

/// Renders the HTML page for a resolved page state.
///
/// # Errors
///
/// Returns an [`askama::Error`] if template rendering fails.
pub fn render_page_state(state: &PageState) -> askama::Result<String> {
    match state {
        PageState::Unauthenticated => DiscordErrorPage {
            username: None,
            message: None,
            nav_path: LOGIN_PATH,
            nav_text: "Log In Here",
            support_url: DISCORD_BUGS_FEEDBACK_URL,
            curriculum_path: CONTINUE_PATH,
        }
        .render(),
        PageState::ProviderError { username, message } => DiscordErrorPage {
            username: Some(username.as_str()),
            message: message.as_deref(),
            nav_path: RETRY_PATH,
            nav_text: "Try Again",
            support_url: DISCORD_BUGS_FEEDBACK_URL,
            curriculum_path: CONTINUE_PATH,
        }
        .render(),
        PageState::Success {
            user_info,
            username,
        } => DiscordSuccessPage {
            user_info,
            username,
            continue_path: CONTINUE_PATH,
        }
        .render(),
    }
}

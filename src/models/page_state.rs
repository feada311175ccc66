//! # Page State
//!
//! Renderer-facing outcome of the Discord connect flow for one request.

use super::ProviderIdentity;

/// The three possible outcomes of `GET /{provider}/success`.
///
/// Computed once per request and never mutated afterwards. Renderers match on
/// it exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    /// No logged in user on the request.
    Unauthenticated,
    /// Exchange or identity fetch failed, or Discord returned an incomplete
    /// profile. `message` is `None` in the incomplete profile case.
    ProviderError {
        username: String,
        message: Option<String>,
    },
    Success {
        user_info: ProviderIdentity,
        /// Local site username
        username: String,
    },
}

impl PageState {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, PageState::Success { .. })
    }
}

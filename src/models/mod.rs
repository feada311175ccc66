mod context;
mod identity;
mod page_state;
mod provider;
mod state;
mod user;

pub use context::{CallbackQuery, RequestContext, Stage};
pub use identity::{ProviderIdentity, ProviderTokens};
pub use page_state::PageState;
pub use provider::Provider;
pub use state::AppState;
pub use user::{SessionId, UserRecord};

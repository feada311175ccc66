//! # HTTP Request Handlers
//!
//! ## Available Handlers
//!
//! - **Discord page** (`discord_page`) - Server-rendered result of the connect flow
//! - **Health Check** (`health_check`) - Application health monitoring
//! - **OAuth** (`oauth`) - Connect redirect and JSON callback

mod discord_page;
mod health_check;
mod oauth;

pub use discord_page::*;
pub use health_check::*;
pub use oauth::{connect_provider, oauth_callback};

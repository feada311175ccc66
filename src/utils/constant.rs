//! # Application Constants
//!
//! This module defines configuration constants used throughout the application.
//! These control session lifetimes, cookie names, and Discord endpoints.

use std::time::Duration;

/// Name of the cookie carrying the signed session token
pub const SESSION_COOKIE_NAME: &str = "session";

/// Lifetime of a session token
///
/// Tokens older than this are rejected by the session middleware and the
/// request is treated as unauthenticated.
pub const SESSION_TOKEN_EXPIRY: Duration = Duration::from_secs(30 * 24 * 60 * 60); // 30 days

/// Default base URL of the Discord REST API
pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Default base URL of the Discord CDN, used to build avatar URLs
pub const DEFAULT_DISCORD_CDN_BASE: &str = "https://cdn.discordapp.com";

/// OAuth scopes requested when connecting an account. Space separated.
pub const DISCORD_SCOPES: &str = "identify";

/// Number of default avatars Discord hands out to users without a custom one
pub const DISCORD_DEFAULT_AVATAR_COUNT: u64 = 6;

/// Support channel linked from every error page
pub const DISCORD_BUGS_FEEDBACK_URL: &str =
    "https://discord.com/channels/828783458469675019/836343487531712512";

/// User agent sent on every outbound Discord request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

//! # Business Logic Services
//!
//! Services encapsulate domain-specific functionality and provide clean
//! interfaces for use by HTTP handlers and middlewares.
//!
//! ## Available Services
//!
//! - **Discord** (`discord`) - OAuth code exchange and identity fetch
//! - **Page state** (`page_state`) - Outcome of the connect flow for one request
//! - **Session** (`session`) - Session token signing and validation
//! - **Store** (`store`) - User and session persistence

pub mod discord;
pub mod page_state;
pub mod session;
pub mod store;

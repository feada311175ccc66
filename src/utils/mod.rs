//! # Utility Modules
//!
//! This module contains utility functions, constants, and configuration
//! loading used throughout the application.
//!
//! ## Available Utilities
//!
//! - **Config** (`config`) - Environment-driven application configuration
//! - **Constants** (`constant`) - Application-wide configuration constants
//! - **HTML** (`html`) - Server-rendered Discord connect pages
//! - **Secret** (`secret`) - Secret loading from env vars or mounted files
//! - **Telemetry** (`telemetry`) - Tracing subscriber setup

pub mod config;
pub mod constant;
pub mod html;
pub mod secret;
pub mod telemetry;

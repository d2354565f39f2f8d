//! figdesk: a desktop shell that hosts Figma in native tabs.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod bridge;
pub mod headless;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;

#[cfg(feature = "gui")]
pub mod ui;

#![deny(unsafe_code)]

//! Shared test utilities for the keychord workspace.
//!
//! Provides a scripted keyboard harness, config builders, and tracing
//! helpers so that individual crate tests stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! keychord-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod keyboard;
pub mod tracing_setup;

pub use config::TestConfigBuilder;
pub use keyboard::{TestKeyboard, TestSession};

//! Core types, configuration, and error handling for Ripple.
//!
//! This crate provides the shared foundation used by all other Ripple crates:
//! - [`RippleError`] — unified error type using `thiserror`
//! - [`RippleConfig`] — configuration loaded from `.ripple.toml`
//! - Shared types: [`Prediction`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{HistoryConfig, MiningConfig, RippleConfig};
pub use error::RippleError;
pub use types::{OutputFormat, Prediction};

/// A convenience `Result` type for Ripple operations.
pub type Result<T> = std::result::Result<T, RippleError>;

//! Shared foundation for the Carelink backend.
//!
//! Provides configuration loading and the top-level error type used
//! across all Carelink crates.

pub mod config;
pub mod error;

pub use config::CarelinkConfig;
pub use error::{CarelinkError, Result};

//! Bounty Core Library
//!
//! Shared functionality for Bounty components:
//! - Marketplace domain model and wire types
//! - Bounty lifecycle transitions
//! - Trusted-worker directory normalisation and email parsing
//! - Configuration resolution and hierarchy
//! - Common error types and storage helpers

pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};

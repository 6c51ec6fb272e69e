//! Shared infrastructure for the Atelier media pipeline
//!
//! Provides the error taxonomy, environment-driven configuration, and
//! tracing setup used by every other crate in the workspace.

pub mod config;
pub mod db;
pub mod error;
pub mod telemetry;

pub use config::Config;
pub use error::{Error, Result};

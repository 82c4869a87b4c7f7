//! Shared utilities for the municipal database maintenance tools
//!
//! This crate provides common functionality used across all maintenance binaries:
//! - Structured logging initialization
//! - Environment variable parsing helpers
//! - MySQL connection and introspection helpers

pub mod config;
pub mod db;
pub mod logging;

pub use config::{ConfigExt, DbConfig};
pub use db::{connect, ColumnInfo};
pub use logging::init_logging;

//! td: a command-line task tracker.
//!
//! This module exports the core components for testing and integration.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod logging;
pub mod store;
pub mod types;

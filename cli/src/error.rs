//! Error handling module for the cppcheck CLI.
//!
//! This module provides a custom error type using `thiserror` for the
//! handful of failures that can happen before analysis even starts. A file
//! the analyzer can't open is not one of them — that's a per-file finding
//! handled inside `cc-drv`, not a reason to abort the run.

use thiserror::Error;

/// Main error type for the cppcheck CLI application.
#[derive(Error, Debug)]
pub enum CliError {
    /// Failed to initialize the tracing subscriber.
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// Result type alias using `CliError`.
pub type Result<T> = std::result::Result<T, CliError>;

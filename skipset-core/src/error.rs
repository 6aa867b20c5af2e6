//! Error types for skipset
//!
//! This module defines the error types used by the benchmark harness. Set
//! operations themselves never fail with recoverable errors; a negative
//! outcome (key already present, key absent) is an ordinary `false` return.

use thiserror::Error;

/// The main error type for skipset operations
#[derive(Error, Debug)]
pub enum Error {
    /// An I/O error occurred, e.g. while writing benchmark results
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A benchmark configuration was rejected
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// A specialized Result type for skipset operations
pub type Result<T> = std::result::Result<T, Error>;

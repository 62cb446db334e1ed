//! Error types for pi-digit-stream
//!
//! This module provides error handling for the library:
//! - Transport failures reaching the remote digit service
//! - Decode failures for malformed or unexpected response bodies
//! - Range failures when an upstream batch is shorter than requested
//! - Configuration validation errors with the offending key

use thiserror::Error;

/// Result type alias for pi-digit-stream operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pi-digit-stream
///
/// Every fetch-related variant is surfaced per call and leaves the stream's
/// internal accounting untouched, so retrying the same call is always safe.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "batch_size")
        key: Option<String>,
    },

    /// Transport-level failure reaching the remote endpoint (timeout, DNS,
    /// connection reset)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body is not valid JSON or lacks the expected field;
    /// indicates a service contract change
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A batch contained a character outside `0..=9`
    #[error("invalid digit character {character:?} at absolute offset {offset}")]
    InvalidDigit {
        /// Absolute digit offset at which the bad character was found
        offset: u64,
        /// The offending character
        character: char,
    },

    /// Fetched batch was shorter than expected and the cursor indexes past
    /// its end (e.g., upstream truncation near its maximum digit count)
    #[error("batch index {cursor} out of range for batch of length {len}")]
    OutOfRange {
        /// Cursor position that was requested
        cursor: usize,
        /// Actual length of the fetched batch
        len: usize,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}

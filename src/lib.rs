//! # pi-digit-stream
//!
//! Lazily-fetched, paginated stream of the decimal digits of pi.
//!
//! Digits are retrieved from a remote HTTP service (the
//! [pi.delivery](https://pi.delivery) API by default) in fixed-size batches
//! and exposed one at a time as integers `0..=9`. The stream tracks its
//! absolute offset, refills transparently when a batch runs out, and
//! honours an optional total-digit limit and cooperative cancellation.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Resumable** - A failed fetch leaves the stream unchanged; the same
//!   call can simply be retried
//! - **Mockable transport** - Fetching goes through the [`DigitSource`]
//!   trait, so the state machine tests run against a scripted source
//!
//! ## Quick Start
//!
//! ```no_run
//! use pi_digit_stream::{DigitStream, PiClient, StreamConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(PiClient::with_defaults()?);
//!     let config = StreamConfig {
//!         start: 0,
//!         batch_size: 1000,
//!         limit: Some(60),
//!     };
//!
//!     let mut stream = DigitStream::new(client, config)?;
//!     while let Some(digit) = stream.next_digit().await? {
//!         print!("{digit}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! A fetch error on one call is safe to swallow per tick: the stream stays
//! usable and the next call retries the same digit.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP client and transport abstraction
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Retry logic with exponential backoff
pub mod retry;
/// Digit stream state machine
pub mod stream;

// Re-export commonly used types
pub use client::{DigitSource, PiClient};
pub use config::{ClientConfig, RetryConfig, StreamConfig};
pub use error::{Error, Result};
pub use retry::{IsRetryable, fetch_with_retry};
pub use stream::DigitStream;

//! Digit stream state machine — buffered batch consumption, eager prefetch,
//! limit accounting, and cooperative cancellation.

use crate::client::DigitSource;
use crate::config::StreamConfig;
use crate::error::{Error, Result};
use futures::Stream;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Stateful iterator over the decimal digits of pi, fetched in batches from
/// a [`DigitSource`].
///
/// One instance serves one logical consumer: [`next_digit`] takes `&mut
/// self`, so the buffer/cursor/fetch-count triple is always mutated as one
/// step. Share the underlying source (and its connection pool) across
/// streams instead of sharing a stream.
///
/// `Ok(None)` means end-of-stream: the configured limit was reached or the
/// stream was cancelled. The two are not distinguished to the caller. An
/// `Err` is a per-call fetch problem; internal accounting is unchanged, so
/// calling again retries the same logical fetch.
///
/// [`next_digit`]: DigitStream::next_digit
pub struct DigitStream {
    source: Arc<dyn DigitSource>,
    config: StreamConfig,
    /// Count of completed batch fetches. The next fetch targets absolute
    /// offset `start + batches_fetched * batch_size`.
    batches_fetched: u64,
    /// Index into `buffer`, always in `[0, batch_size)`.
    cursor: usize,
    /// Current batch contents; empty means a fetch is required before
    /// serving.
    buffer: String,
    cancel_token: CancellationToken,
}

impl DigitStream {
    /// Create a stream over `source` with a fresh cancellation token.
    pub fn new(source: Arc<dyn DigitSource>, config: StreamConfig) -> Result<Self> {
        Self::with_cancellation(source, config, CancellationToken::new())
    }

    /// Create a stream governed by an existing cancellation token, e.g. a
    /// child token of the owning task.
    pub fn with_cancellation(
        source: Arc<dyn DigitSource>,
        config: StreamConfig,
        cancel_token: CancellationToken,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            batches_fetched: 0,
            cursor: 0,
            buffer: String::new(),
            cancel_token,
        })
    }

    /// Clone of the stream's cancellation token.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Request cancellation. Every subsequent [`next_digit`] call returns
    /// `Ok(None)` without touching the network. A fetch already in flight
    /// resolves normally.
    ///
    /// [`next_digit`]: DigitStream::next_digit
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Number of completed batch fetches so far.
    pub fn batches_fetched(&self) -> u64 {
        self.batches_fetched
    }

    /// Produce the next digit, or `None` when the stream is done.
    ///
    /// Serves from the buffered batch, transparently refilling through the
    /// source when needed. The batch following the current one is requested
    /// as soon as the current batch's last digit is served, not when the
    /// next read would miss. The prefetch is observable in fetch timing
    /// and count.
    pub async fn next_digit(&mut self) -> Result<Option<u8>> {
        if self.cancel_token.is_cancelled() {
            return Ok(None);
        }

        if let Some(limit) = self.config.limit {
            if limit == 0 {
                return Ok(None);
            }
            // Accounting is by completed fetches, so the check only
            // activates once the first batch is in. With a limit that is
            // not a multiple of batch_size this rounds the last partially
            // consumed batch up, stopping at or before the limit.
            if self.batches_fetched > 0 {
                let committed = (self.batches_fetched - 1) * self.config.batch_size as u64
                    + self.cursor as u64;
                if committed >= limit {
                    return Ok(None);
                }
            }
        }

        if self.buffer.is_empty() {
            let batch = self.fetch_next_batch().await?;
            self.commit_batch(batch);
        }

        let digit = self.digit_at(self.cursor)?;

        if self.cursor == self.config.batch_size - 1 {
            // Last slot served: prefetch the following batch now.
            let batch = self.fetch_next_batch().await?;
            self.commit_batch(batch);
        } else {
            self.cursor += 1;
        }

        Ok(Some(digit))
    }

    /// Convert into a [`futures::Stream`] of digits.
    ///
    /// The stream ends when [`next_digit`](DigitStream::next_digit) returns
    /// `Ok(None)`. A fetch error is yielded as an `Err` item and terminates
    /// the stream; keep the `DigitStream` and call
    /// [`next_digit`](DigitStream::next_digit) directly when per-call retry
    /// is needed.
    pub fn into_stream(self) -> impl Stream<Item = Result<u8>> {
        futures::stream::try_unfold(self, |mut stream| async move {
            Ok(stream.next_digit().await?.map(|digit| (digit, stream)))
        })
    }

    /// Fetch the batch at the next uncommitted absolute offset.
    ///
    /// State is untouched on failure; the caller commits the batch only
    /// after a successful fetch.
    async fn fetch_next_batch(&self) -> Result<String> {
        let offset =
            self.config.start + self.batches_fetched * self.config.batch_size as u64;
        self.source
            .fetch_digits(offset, self.config.batch_size)
            .await
            .inspect_err(|e| {
                tracing::warn!(offset, error = %e, "fetching digit batch failed");
            })
    }

    /// Install a freshly fetched batch and advance the fetch accounting.
    fn commit_batch(&mut self, batch: String) {
        self.buffer = batch;
        self.batches_fetched += 1;
        self.cursor = 0;
    }

    /// Decode the digit character at `cursor` in the current buffer.
    fn digit_at(&self, cursor: usize) -> Result<u8> {
        match self.buffer.as_bytes().get(cursor).copied() {
            Some(b) if b.is_ascii_digit() => Ok(b - b'0'),
            Some(b) => Err(Error::InvalidDigit {
                offset: self.config.start
                    + (self.batches_fetched - 1) * self.config.batch_size as u64
                    + cursor as u64,
                character: b as char,
            }),
            None => Err(Error::OutOfRange {
                cursor,
                len: self.buffer.len(),
            }),
        }
    }
}

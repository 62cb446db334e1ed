//! Configuration types for pi-digit-stream

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Stream configuration (immutable, set at construction)
///
/// Controls where a [`DigitStream`](crate::DigitStream) starts in pi's
/// decimal expansion, how many digits each HTTP call requests, and how many
/// digits the stream will yield in total.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Absolute digit offset of the first digit the stream will produce,
    /// counting the digit after the decimal point as offset 0 (default: 0)
    #[serde(default)]
    pub start: u64,

    /// Number of digits requested per HTTP call (default: 1000)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum total digits the stream will yield across its lifetime
    /// (None = unbounded)
    #[serde(default)]
    pub limit: Option<u64>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            start: 0,
            batch_size: default_batch_size(),
            limit: None,
        }
    }
}

impl StreamConfig {
    /// Validate the configuration, returning a [`Error::Config`] naming the
    /// offending key on failure
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config {
                message: "batch_size must be greater than zero".to_string(),
                key: Some("batch_size".to_string()),
            });
        }
        Ok(())
    }
}

/// HTTP client configuration for the remote digit service
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the digit service (default: "https://api.pi.delivery")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl ClientConfig {
    /// Validate the configuration, returning a [`Error::Config`] naming the
    /// offending key on failure
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::Config {
                message: "base_url must not be empty".to_string(),
                key: Some("base_url".to_string()),
            });
        }
        if let Err(e) = url::Url::parse(&self.base_url) {
            return Err(Error::Config {
                message: format!("base_url is not a valid URL: {e}"),
                key: Some("base_url".to_string()),
            });
        }
        Ok(())
    }
}

/// Retry configuration for transient failures
///
/// Consumed by [`fetch_with_retry`](crate::retry::fetch_with_retry); the
/// stream itself never retries internally.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

fn default_batch_size() -> usize {
    1000
}

fn default_base_url() -> String {
    "https://api.pi.delivery".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

/// Serialize/deserialize Duration as seconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_config_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.start, 0);
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.limit, None);
    }

    #[test]
    fn test_stream_config_rejects_zero_batch_size() {
        let config = StreamConfig {
            batch_size: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("batch_size")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_client_config_rejects_empty_base_url() {
        let config = ClientConfig {
            base_url: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_client_config_rejects_unparseable_base_url() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("base_url")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_stream_config_deserializes_with_defaults() {
        let config: StreamConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.batch_size, 1000);

        let config: StreamConfig =
            serde_json::from_str(r#"{"start": 7, "batch_size": 50, "limit": 100}"#).unwrap();
        assert_eq!(config.start, 7);
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.limit, Some(100));
    }

    #[test]
    fn test_retry_config_duration_round_trip() {
        let config = RetryConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: RetryConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.initial_delay, Duration::from_secs(1));
        assert_eq!(parsed.max_delay, Duration::from_secs(60));
    }
}

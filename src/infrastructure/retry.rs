//! Exponential backoff for outbound HTTP calls.
//!
//! Adapters classify each failure as transient or permanent; transient ones
//! are retried up to `max_retries` times with exponential backoff.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use backoff::ExponentialBackoffBuilder;
use reqwest::StatusCode;
use tracing::warn;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::config::RetryConfig;

/// Outcome of one attempt as seen by the retry loop.
pub type AttemptResult<T> = Result<T, backoff::Error<DomainError>>;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
        )
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            max_backoff,
        }
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self::new(0, Duration::from_millis(1), Duration::from_millis(1))
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn backoff(&self) -> ExponentialBackoff {
        let mut backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_backoff)
            .with_max_interval(self.max_backoff)
            .with_max_elapsed_time(None)
            .build();
        backoff.reset();
        backoff
    }

    /// Run `operation` until it succeeds, fails permanently, or runs out of retries.
    pub async fn execute<T, F, Fut>(&self, operation_name: &str, mut operation: F) -> DomainResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AttemptResult<T>>,
    {
        let max_retries = self.max_retries;
        let mut attempt: u32 = 0;

        backoff::future::retry_notify(
            self.backoff(),
            || {
                let current = attempt;
                attempt += 1;
                let fut = operation();
                async move {
                    match fut.await {
                        Err(backoff::Error::Transient { err, .. }) if current >= max_retries => {
                            Err(backoff::Error::permanent(err))
                        }
                        other => other,
                    }
                }
            },
            |err: DomainError, wait: Duration| {
                warn!(
                    operation = operation_name,
                    error = %err,
                    retry_in_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                    "Transient failure, retrying"
                );
            },
        )
        .await
    }
}

/// Rate limiting and server errors are worth retrying.
pub fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::REQUEST_TIMEOUT || status.is_server_error()
}

/// Classify a transport error for the retry loop.
pub fn classify_transport_error(service: &str, err: &reqwest::Error) -> backoff::Error<DomainError> {
    let domain = DomainError::external(service, err.to_string());
    if err.is_timeout() || err.is_connect() || err.is_request() {
        backoff::Error::transient(domain)
    } else {
        backoff::Error::permanent(domain)
    }
}

/// Classify a non-success HTTP status for the retry loop.
pub fn classify_status(service: &str, status: StatusCode, body: &str) -> backoff::Error<DomainError> {
    let domain = DomainError::external(service, format!("HTTP {status}: {body}"));
    if is_transient_status(status) {
        backoff::Error::transient(domain)
    } else {
        backoff::Error::permanent(domain)
    }
}

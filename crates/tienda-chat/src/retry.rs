//! Retry with exponential back-off and jitter for model requests.

use std::future::Future;
use std::time::Duration;

use crate::error::ChatError;

/// Timeouts, connect failures, 429 and 5xx are worth another attempt.
/// Everything else (4xx, malformed bodies, configuration) is final.
pub(crate) fn is_retriable(err: &ChatError) -> bool {
    match err {
        ChatError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ChatError::UnexpectedStatus { status, .. } => *status == 429 || (500..600).contains(status),
        ChatError::Deserialize { .. }
        | ChatError::InvalidBaseUrl(_)
        | ChatError::MissingApiKey
        | ChatError::EmptyMessage
        | ChatError::Catalog(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors. The delay doubles per attempt from `backoff_base_ms`, is capped at
/// 30 s, and carries ±25 % jitter.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ChatError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ChatError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "chat model transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

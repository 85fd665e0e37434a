//! Retry logic with exponential backoff for collaborator calls.
//!
//! Retries only transient faults ([`CollaboratorError::Unavailable`]);
//! rejections are returned immediately. Degrade decisions (last-known
//! value, neutral score, proceed-as-pending) live in the service layer,
//! not here.

use std::future::Future;
use std::time::Duration;

use crate::collaborators::CollaboratorError;

/// Call `f` up to `max_retries + 1` times with exponential backoff between
/// attempts (base_delay, 2x base_delay, 4x base_delay, ...).
///
/// Only [`CollaboratorError::Unavailable`] triggers a retry.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    base_delay: Duration,
    operation: &str,
    f: F,
) -> Result<T, CollaboratorError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, CollaboratorError>>,
{
    // Retry attempts with backoff, then one final attempt without retry.
    for attempt in 0..max_retries {
        match f().await {
            Ok(value) => return Ok(value),
            Err(CollaboratorError::Unavailable { reason }) => {
                let delay = base_delay * 2u32.pow(attempt);
                tracing::warn!(
                    operation,
                    attempt = attempt + 1,
                    max_retries,
                    "collaborator call failed, retrying in {delay:?}: {reason}"
                );
                tokio::time::sleep(delay).await;
            }
            Err(other) => return Err(other),
        }
    }
    f().await
}

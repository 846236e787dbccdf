//! Wall-clock deadline for a fallible operation.

use crate::error::GenerationError;
use std::future::Future;
use std::time::Duration;

/// Race `operation` against `limit`.
///
/// When the deadline fires first the operation future is dropped and
/// [`GenerationError::Timeout`] carries the configured duration. Otherwise the
/// operation's own result passes through unchanged.
pub async fn with_timeout<T, Fut>(limit: Duration, operation: Fut) -> Result<T, GenerationError>
where
    Fut: Future<Output = Result<T, GenerationError>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(GenerationError::Timeout {
            ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

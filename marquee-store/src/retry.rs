use std::future::Future;
use std::time::Duration;

use marquee_core::StoreResult;

const ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(50);

/// Bounded retry for transient store I/O.
///
/// Only used around idempotent operations: reads, and the lock/unlock
/// protocol (re-issuing `try_lock` for the same holder reconfirms
/// ownership, it never double-locks). Conflicts are values, not errors,
/// so they are never retried here.
pub async fn with_retry<T, F, Fut>(what: &str, mut op: F) -> StoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    let mut backoff = INITIAL_BACKOFF;
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < ATTEMPTS => {
                tracing::warn!("{what} failed (attempt {attempt}/{ATTEMPTS}), retrying: {err}");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                attempt += 1;
            }
            Err(err) => {
                tracing::error!("{what} failed after {ATTEMPTS} attempts: {err}");
                return Err(err);
            }
        }
    }
}

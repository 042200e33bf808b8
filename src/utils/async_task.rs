use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tokio::time::timeout;
use tracing::debug;
use tracing::warn;

use crate::BackoffPolicy;
use crate::NetworkError;
use crate::Result;

/// Run `task` until it succeeds, each attempt bounded by the policy timeout.
///
/// Failed attempts are retried after an exponentially growing, jittered
/// delay capped at `max_delay_ms`. `max_retries == 0` retries forever; the
/// caller bounds it by dropping the future. Otherwise the last error is
/// returned once the attempts are used up.
pub(crate) async fn task_with_timeout_and_exponential_backoff<F, T, P>(
    task: F,
    policy: BackoffPolicy,
) -> Result<P>
where
    F: Fn() -> T,
    T: std::future::Future<Output = Result<P>>,
{
    let mut attempts = 0usize;
    let mut delay = policy.base_delay();

    loop {
        let e = match timeout(policy.timeout(), task()).await {
            Ok(Ok(r)) => return Ok(r),
            Ok(Err(error)) => error,
            Err(_) => NetworkError::Timeout(policy.timeout()).into(),
        };

        attempts += 1;
        if !policy.is_unlimited() && attempts >= policy.max_retries {
            warn!("Task failed after {} attempts: {}", attempts, e);
            return Err(e);
        }

        let wait = with_jitter(delay);
        debug!("attempt {} failed: {}, retrying in {:?}", attempts, e, wait);
        sleep(wait).await;
        delay = (delay * 2).min(policy.max_delay());
    }
}

/// Spread retries of many clients by up to a quarter of the delay.
fn with_jitter(delay: Duration) -> Duration {
    let spread = delay.as_millis() as u64 / 4;
    if spread == 0 {
        return delay;
    }
    delay + Duration::from_millis(rand::thread_rng().gen_range(0..=spread))
}

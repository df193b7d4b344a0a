use crate::core::ButtonLookup;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Polls `check` until it reports `true` or `timeout` has passed.
///
/// A failing check counts as "not yet". The wait ends with that error only when the most
/// recent check failed. Every check is bounded by the time left, so a check that hangs
/// cannot stretch the wait past `timeout`.
pub async fn poll_until<F, Fut, E>(
    timeout: Duration,
    poll_interval: Duration,
    mut check: F,
) -> Result<ButtonLookup, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: Display,
{
    let deadline = Instant::now() + timeout;
    let mut last_error = None;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }

        match tokio::time::timeout(remaining, check()).await {
            Ok(Ok(true)) => return Ok(ButtonLookup::Found),
            Ok(Ok(false)) => last_error = None,
            Ok(Err(e)) => {
                tracing::debug!("Check failed, still waiting: {}", e);
                last_error = Some(e);
            }
            Err(_) => {
                tracing::debug!("Check still running at the deadline");
                break;
            }
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        tokio::time::sleep(poll_interval.min(remaining)).await;
    }

    match last_error {
        Some(e) => Err(e),
        None => Ok(ButtonLookup::TimedOut),
    }
}

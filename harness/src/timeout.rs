//! Deadline race between a run's workload and a timer
//!
//! The workload runs as a spawned task so that an expired deadline abandons
//! awaiting it without aborting in-flight handlers. Two completion signals are
//! merged first-wins: when the workload settles first the timer is dropped and
//! can never fire afterwards; when the timer fires first the run rejects with
//! a diagnostic listing every still-pending matcher, and the detached task's
//! eventual result is discarded.

use anyhow::Result;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::warn;

use crate::context::Context;
use crate::errors::HarnessError;

/// Awaits the workload, giving up once the deadline elapses
///
/// A zero deadline times out immediately. The workload's result or error is
/// propagated unchanged when it wins the race; a workload panic surfaces as
/// an error rather than unwinding into the caller.
pub async fn race(
    cx: &Context,
    mut workload: JoinHandle<Result<()>>,
    deadline: Duration,
) -> Result<()> {
    // A zero deadline has already expired; the workload is never polled
    if deadline.is_zero() {
        return Err(expired(cx, 0).await);
    }

    let timer = sleep(deadline);
    tokio::pin!(timer);

    tokio::select! {
        result = &mut workload => match result {
            Ok(outcome) => outcome,
            Err(err) => Err(anyhow::anyhow!("run workload failed: {}", err)),
        },
        _ = &mut timer => Err(expired(cx, deadline.as_millis() as u64).await),
    }
}

async fn expired(cx: &Context, duration_ms: u64) -> anyhow::Error {
    let pending = cx.pending().await;

    warn!(duration_ms, pending = pending.len(), "run deadline elapsed");

    HarnessError::Timeout {
        duration_ms,
        pending,
    }
    .into()
}

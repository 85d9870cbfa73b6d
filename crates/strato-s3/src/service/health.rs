//! Backend health probing.
//!
//! A probe is one lightweight list-buckets call raced against a timer;
//! whichever settles first decides the outcome and the loser is dropped
//! unobserved. The recurring probe loop reuses the same primitive and only
//! ever logs failures.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::backend::ObjectStorage;
use crate::{Error, Result, TRACING_TARGET_HEALTH};

/// Default bounded wait for a single health probe.
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_millis(5000);

/// Probes the backend once, with a bounded wait.
///
/// # Errors
///
/// Returns [`Error::Ping`] when the timer fires first; backend call
/// failures propagate unchanged.
pub(crate) async fn ping(backend: &dyn ObjectStorage, timeout: Duration) -> Result<bool> {
    debug!(target: TRACING_TARGET_HEALTH, timeout = ?timeout, "Probing backend");

    match tokio::time::timeout(timeout, backend.list_buckets()).await {
        Ok(Ok(_)) => Ok(true),
        Ok(Err(e)) => Err(e),
        Err(_elapsed) => Err(Error::Ping { timeout }),
    }
}

/// Arms the recurring health probe.
///
/// Each failure is logged and flips the shared healthy flag; it never stops
/// the loop. The task runs until aborted by the service's shutdown hook.
pub(crate) fn spawn_probe(
    backend: Arc<dyn ObjectStorage>,
    interval: Duration,
    healthy: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval completes immediately; the
        // startup probe already ran, so skip it.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match ping(backend.as_ref(), DEFAULT_PING_TIMEOUT).await {
                Ok(_) => {
                    if !healthy.swap(true, Ordering::Relaxed) {
                        info!(
                            target: TRACING_TARGET_HEALTH,
                            "S3 backend reachable again"
                        );
                    }
                }
                Err(e) => {
                    healthy.store(false, Ordering::Relaxed);
                    error!(
                        target: TRACING_TARGET_HEALTH,
                        error = %e,
                        "S3 backend can not be reached"
                    );
                }
            }
        }
    })
}

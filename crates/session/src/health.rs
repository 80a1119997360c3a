//! Reader health monitor
//!
//! Periodically re-enumerates readers and cancels its scope once the watched
//! reader is gone. Enumeration errors are logged and retried on the next tick;
//! only a successful enumeration without the reader counts as a loss.

use std::sync::Arc;
use std::time::Duration;

use tagrelay_pcsc::{CardSubsystem, ReaderDevice};
use tokio::task::{self, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, trace, warn};

use crate::error::Error;

/// Confirms that a reader stays attached
#[derive(Debug)]
pub struct ReaderHealthMonitor<S> {
    subsystem: Arc<S>,
    device: ReaderDevice,
    interval: Duration,
    span: Span,
}

impl<S: CardSubsystem> ReaderHealthMonitor<S> {
    /// Create a monitor checking `device` every `interval`
    pub const fn new(
        subsystem: Arc<S>,
        device: ReaderDevice,
        interval: Duration,
        span: Span,
    ) -> Self {
        Self {
            subsystem,
            device,
            interval,
            span,
        }
    }

    /// Start monitoring under `parent`
    ///
    /// Returns a scope derived from `parent` that is cancelled when the reader
    /// disappears, and the monitor task. The task ends when either scope is
    /// cancelled.
    pub fn spawn(self, parent: &CancellationToken) -> (CancellationToken, JoinHandle<()>) {
        let scope = parent.child_token();
        let span = self.span.clone();
        let handle = tokio::spawn(self.run(scope.clone()).instrument(span));
        (scope, handle)
    }

    async fn run(self, scope: CancellationToken) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = scope.cancelled() => {
                    debug!("Health monitor stopping");
                    break;
                }
                _ = ticker.tick() => match self.is_attached().await {
                    Ok(true) => trace!(reader = %self.device, "Reader still attached"),
                    Ok(false) => {
                        warn!(reader = %self.device, "Reader disconnected");
                        scope.cancel();
                        break;
                    }
                    Err(e) => warn!(error = %e, "Error checking reader health"),
                },
            }
        }
    }

    async fn is_attached(&self) -> Result<bool, Error> {
        let subsystem = Arc::clone(&self.subsystem);
        let readers = task::spawn_blocking(move || subsystem.list_readers())
            .await?
            .map_err(Error::Enumeration)?;
        Ok(readers.contains(&self.device))
    }
}

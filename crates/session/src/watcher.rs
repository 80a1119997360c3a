//! Tag presence watcher
//!
//! Issues bounded status-change waits on one reader and reports every change
//! as a [`StateChange`]. The wait blocks the calling thread, so the loop runs
//! on the blocking pool and checks its cancellation scope between waits.

use std::sync::Arc;
use std::time::Duration;

use tagrelay_pcsc::{CardSubsystem, PcscError, ReaderDevice, ReaderState};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{self, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, trace};

use crate::event::StateChange;

/// Channels of a running [`TagPresenceWatcher`]
#[derive(Debug)]
pub struct PresenceStream {
    /// Status changes, in the order they were observed
    pub events: mpsc::UnboundedReceiver<StateChange>,
    /// The error that stopped the watcher, if any
    pub errors: oneshot::Receiver<PcscError>,
    /// The watcher loop
    pub handle: JoinHandle<()>,
}

/// Watches one reader for tag arrival and removal
#[derive(Debug)]
pub struct TagPresenceWatcher<S> {
    subsystem: Arc<S>,
    device: ReaderDevice,
    timeout: Duration,
    span: Span,
}

impl<S: CardSubsystem> TagPresenceWatcher<S> {
    /// Create a watcher for `device`, waiting at most `timeout` per status call
    pub const fn new(
        subsystem: Arc<S>,
        device: ReaderDevice,
        timeout: Duration,
        span: Span,
    ) -> Self {
        Self {
            subsystem,
            device,
            timeout,
            span,
        }
    }

    /// Start watching until `scope` is cancelled or the subsystem fails
    pub fn spawn(self, scope: CancellationToken) -> PresenceStream {
        let (event_tx, events) = mpsc::unbounded_channel();
        let (error_tx, errors) = oneshot::channel();
        let handle = task::spawn_blocking(move || self.run(&scope, &event_tx, error_tx));

        PresenceStream {
            events,
            errors,
            handle,
        }
    }

    fn run(
        self,
        scope: &CancellationToken,
        events: &mpsc::UnboundedSender<StateChange>,
        errors: oneshot::Sender<PcscError>,
    ) {
        let _guard = self.span.enter();
        debug!(reader = %self.device, "Watching reader status");

        let mut states = [ReaderState::new(self.device.clone())];
        while !scope.is_cancelled() {
            match self
                .subsystem
                .wait_for_status_change(&mut states, self.timeout)
            {
                Ok(()) => {
                    let status = states[0].status;
                    trace!(
                        current = %status.current,
                        event = %status.event,
                        "Reader status changed"
                    );
                    if events.send(StateChange::new(status)).is_err() {
                        debug!("Status change receiver dropped");
                        break;
                    }
                    states[0].status.advance();
                }
                Err(e) if e.is_timeout() => continue,
                Err(e) => {
                    debug!(error = %e, "Status change wait failed");
                    if errors.send(e).is_err() {
                        debug!("Error receiver dropped");
                    }
                    return;
                }
            }
        }

        debug!("Stopped watching reader status");
    }
}

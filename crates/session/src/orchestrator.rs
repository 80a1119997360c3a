//! Session orchestrator
//!
//! Runs the boot loop: select a reader, monitor it until it fails or goes
//! away, wait, and boot again. Each monitoring phase gets its own scope
//! derived from the top-level token, so a failed phase never leaves a unit
//! running into the next boot.

use std::fmt;
use std::sync::Arc;

use tagrelay_pcsc::{CardSubsystem, ReaderDevice};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, error, info, info_span, warn};

use crate::backoff;
use crate::config::SessionConfig;
use crate::dispatch::TagDispatcher;
use crate::error::Error;
use crate::event::{Presence, StateChange};
use crate::health::ReaderHealthMonitor;
use crate::prompt::OperatorPrompt;
use crate::selector::DeviceSelector;
use crate::target::DeliveryTarget;
use crate::watcher::{PresenceStream, TagPresenceWatcher};

/// Lifecycle of a reader session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Starting or restarting
    Booting,
    /// Waiting for a reader and the operator's choice
    SelectingDevice,
    /// Watching the selected reader for tags
    Monitoring(ReaderDevice),
    /// Stopped for good
    ShuttingDown,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Booting => f.write_str("booting"),
            Self::SelectingDevice => f.write_str("selecting device"),
            Self::Monitoring(device) => write!(f, "monitoring {}", device),
            Self::ShuttingDown => f.write_str("shutting down"),
        }
    }
}

/// Composes selection, monitoring and dispatch into a reboot loop
#[derive(Debug)]
pub struct SessionOrchestrator<S, P, T> {
    subsystem: Arc<S>,
    selector: DeviceSelector<S, P>,
    dispatcher: TagDispatcher<S, T>,
    config: SessionConfig,
    state: SessionState,
    booted: bool,
    span: Span,
}

impl<S, P, T> SessionOrchestrator<S, P, T>
where
    S: CardSubsystem,
    P: OperatorPrompt,
    T: DeliveryTarget,
{
    /// Create an orchestrator logging under `span`
    pub fn new(
        subsystem: Arc<S>,
        prompt: P,
        target: T,
        config: SessionConfig,
        span: Span,
    ) -> Self {
        let selector = DeviceSelector::new(
            Arc::clone(&subsystem),
            prompt,
            config.enumeration_backoff,
            info_span!(parent: &span, "selector"),
        );
        let dispatcher = TagDispatcher::new(
            Arc::clone(&subsystem),
            target,
            config.connect,
            config.page,
            info_span!(parent: &span, "dispatch"),
        );

        Self {
            subsystem,
            selector,
            dispatcher,
            config,
            state: SessionState::Booting,
            booted: false,
            span,
        }
    }

    /// Current state
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run until `cancel` fires
    ///
    /// Failures never end the loop; they are logged and followed by a reboot
    /// after the configured delay.
    pub async fn run(&mut self, cancel: &CancellationToken) {
        let span = self.span.clone();
        self.run_inner(cancel).instrument(span).await;
    }

    async fn run_inner(&mut self, cancel: &CancellationToken) {
        while self.state != SessionState::ShuttingDown {
            let next = if cancel.is_cancelled() {
                SessionState::ShuttingDown
            } else {
                self.step(cancel).await
            };
            debug!(from = %self.state, to = %next, "Session state change");
            self.state = next;
        }
        info!("Reader session stopped");
    }

    async fn step(&mut self, cancel: &CancellationToken) -> SessionState {
        match &self.state {
            SessionState::Booting => {
                if self.booted {
                    info!("Rebooting reader session");
                } else {
                    info!("Booting reader session");
                }
                self.booted = true;
                SessionState::SelectingDevice
            }
            SessionState::SelectingDevice => match self.selector.select(cancel).await {
                Ok(Some(device)) => {
                    info!(reader = %device, "Reader selected");
                    SessionState::Monitoring(device)
                }
                Ok(None) => SessionState::ShuttingDown,
                Err(e) => {
                    error!(
                        error = %e,
                        delay = ?self.config.reboot_delay,
                        "Error selecting reader, rebooting"
                    );
                    self.reboot(cancel).await
                }
            },
            SessionState::Monitoring(device) => {
                let device = device.clone();
                match self.monitor(&device, cancel).await {
                    Ok(()) => SessionState::ShuttingDown,
                    Err(e) => {
                        error!(
                            error = %e,
                            delay = ?self.config.reboot_delay,
                            "Error scanning for tags, rebooting"
                        );
                        self.reboot(cancel).await
                    }
                }
            }
            SessionState::ShuttingDown => SessionState::ShuttingDown,
        }
    }

    async fn reboot(&self, cancel: &CancellationToken) -> SessionState {
        if backoff::wait(cancel, self.config.reboot_delay).await {
            SessionState::Booting
        } else {
            SessionState::ShuttingDown
        }
    }

    /// Watch `device` until the session is cancelled, the reader goes away or
    /// the status watch fails
    async fn monitor(
        &self,
        device: &ReaderDevice,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        info!(reader = %device, "Scanning for tags");

        let (scope, health) = ReaderHealthMonitor::new(
            Arc::clone(&self.subsystem),
            device.clone(),
            self.config.health_interval,
            info_span!("health", reader = %device),
        )
        .spawn(cancel);

        let PresenceStream {
            mut events,
            mut errors,
            handle: watcher,
        } = TagPresenceWatcher::new(
            Arc::clone(&self.subsystem),
            device.clone(),
            self.config.status_timeout,
            info_span!("watcher", reader = %device),
        )
        .spawn(scope.clone());

        let mut watching = true;
        let result = loop {
            tokio::select! {
                biased;

                _ = scope.cancelled() => {
                    break if cancel.is_cancelled() {
                        Ok(())
                    } else {
                        Err(Error::ReaderLost(device.clone()))
                    };
                }
                Some(change) = events.recv() => self.handle_change(device, &change, &scope).await,
                error = &mut errors, if watching => match error {
                    Ok(e) => break Err(Error::Watch(e)),
                    // Watcher ended without an error; the scope branch follows
                    Err(_) => watching = false,
                },
            }
        };

        scope.cancel();
        if let Err(e) = health.await {
            warn!(error = %e, "Health monitor task failed");
        }
        if let Err(e) = watcher.await {
            warn!(error = %e, "Presence watcher task failed");
        }

        result
    }

    async fn handle_change(
        &self,
        device: &ReaderDevice,
        change: &StateChange,
        scope: &CancellationToken,
    ) {
        for presence in change.transitions() {
            match presence {
                Presence::Arrived => {
                    info!(reader = %device, at = %change.occurred_at, "Tag detected");
                    if let Err(e) = self.dispatcher.dispatch(device, scope).await {
                        error!(error = %e, "Error dispatching tag contents");
                    }
                }
                Presence::Removed => {
                    info!(reader = %device, at = %change.occurred_at, "Tag removed from reader");
                }
            }
        }
    }
}

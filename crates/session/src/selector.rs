//! Reader selection

use std::sync::Arc;
use std::time::Duration;

use tagrelay_pcsc::{CardSubsystem, ReaderDevice};
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, error, info};

use crate::backoff;
use crate::error::Error;
use crate::prompt::{OperatorPrompt, parse_selection};

/// Enumerates readers and lets the operator pick one
#[derive(Debug)]
pub struct DeviceSelector<S, P> {
    subsystem: Arc<S>,
    prompt: P,
    backoff: Duration,
    span: Span,
}

impl<S: CardSubsystem, P: OperatorPrompt> DeviceSelector<S, P> {
    /// Create a selector retrying every `backoff` while no reader is attached
    pub const fn new(subsystem: Arc<S>, prompt: P, backoff: Duration, span: Span) -> Self {
        Self {
            subsystem,
            prompt,
            backoff,
            span,
        }
    }

    /// Wait for a reader and ask the operator to choose one
    ///
    /// Returns `Ok(None)` if `cancel` fires first. Invalid input starts over
    /// with a fresh enumeration. An enumeration failure is returned as is.
    pub async fn select(&self, cancel: &CancellationToken) -> Result<Option<ReaderDevice>, Error> {
        self.select_inner(cancel).instrument(self.span.clone()).await
    }

    async fn select_inner(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<ReaderDevice>, Error> {
        info!("Checking for readers");
        let mut waiting = false;

        loop {
            if cancel.is_cancelled() {
                return Ok(None);
            }

            let mut devices = self.list_readers().await?;
            if devices.is_empty() {
                if !waiting {
                    waiting = true;
                    info!("No readers found, waiting for a reader");
                }
                if !backoff::wait(cancel, self.backoff).await {
                    return Ok(None);
                }
                continue;
            }

            self.prompt.present(&devices);
            let input = tokio::select! {
                _ = cancel.cancelled() => return Ok(None),
                input = self.prompt.read_line() => input,
            };

            let line = match input {
                Ok(Ok(line)) => line,
                Ok(Err(e)) => {
                    error!(error = %e, "Error reading reader number");
                    if !backoff::wait(cancel, self.backoff).await {
                        return Ok(None);
                    }
                    continue;
                }
                Err(_) => {
                    error!("Operator input closed");
                    if !backoff::wait(cancel, self.backoff).await {
                        return Ok(None);
                    }
                    continue;
                }
            };

            match parse_selection(&line, devices.len()) {
                Ok(index) => return Ok(Some(devices.swap_remove(index))),
                Err(e) => error!(error = %e, "Invalid reader selection"),
            }
        }
    }

    async fn list_readers(&self) -> Result<Vec<ReaderDevice>, Error> {
        let subsystem = Arc::clone(&self.subsystem);
        task::spawn_blocking(move || subsystem.list_readers())
            .await?
            .map_err(Error::Enumeration)
    }
}

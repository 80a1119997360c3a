//! Per-arrival tag read and delivery

use std::sync::Arc;

use tagrelay_pcsc::{CardConnection, CardSubsystem, ConnectOptions, ReaderDevice};
use tagrelay_tag::{Tag, TagSession};
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, info, warn};

use crate::error::Error;
use crate::target::DeliveryTarget;

/// Reads an arrived tag and delivers its contents
#[derive(Debug)]
pub struct TagDispatcher<S, T> {
    subsystem: Arc<S>,
    target: T,
    options: ConnectOptions,
    page: u8,
    span: Span,
}

impl<S: CardSubsystem, T: DeliveryTarget> TagDispatcher<S, T> {
    /// Create a dispatcher reading `page` from every tag
    pub const fn new(
        subsystem: Arc<S>,
        target: T,
        options: ConnectOptions,
        page: u8,
        span: Span,
    ) -> Self {
        Self {
            subsystem,
            target,
            options,
            page,
            span,
        }
    }

    /// Read the tag on `device` and deliver its payload
    ///
    /// The connection is released before this returns, whatever the outcome.
    /// Nothing is delivered if `scope` is cancelled while the tag is read, and
    /// a delivery still in flight is abandoned once `scope` is cancelled.
    pub async fn dispatch(
        &self,
        device: &ReaderDevice,
        scope: &CancellationToken,
    ) -> Result<(), Error> {
        self.dispatch_inner(device, scope)
            .instrument(self.span.clone())
            .await
    }

    async fn dispatch_inner(
        &self,
        device: &ReaderDevice,
        scope: &CancellationToken,
    ) -> Result<(), Error> {
        info!(reader = %device, "Preparing to dispatch tag contents to target");

        let subsystem = Arc::clone(&self.subsystem);
        let device = device.clone();
        let options = self.options;
        let page = self.page;
        let span = Span::current();
        let session = task::spawn_blocking(move || {
            let _guard = span.enter();
            read_tag(&*subsystem, &device, options, page)
        })
        .await??;

        if scope.is_cancelled() {
            debug!(uid = %session.uid(), "Session cancelled during read, skipping delivery");
            return Ok(());
        }

        let payload = session.payload();
        tokio::select! {
            _ = scope.cancelled() => {
                warn!(uid = %session.uid(), "Session cancelled during delivery, abandoning it");
                return Ok(());
            }
            result = self.target.dispatch(&payload) => result?,
        }
        info!(uid = %session.uid(), len = payload.len(), "Dispatched tag contents to target");
        Ok(())
    }
}

fn read_tag<S: CardSubsystem>(
    subsystem: &S,
    device: &ReaderDevice,
    options: ConnectOptions,
    page: u8,
) -> Result<TagSession, Error> {
    debug!("Connecting to tag");
    let mut connection = subsystem
        .connect(device, options.share_mode, options.protocol)
        .map_err(|source| Error::Connect {
            device: device.clone(),
            source,
        })?;

    let result = {
        let mut tag = Tag::detect(&mut connection);
        debug!(technology = ?tag.technology(), "Connected to tag");
        TagSession::read(&mut tag, [page])
    };

    if let Err(e) = connection.disconnect(options.disposition) {
        warn!(error = %e, "Error disconnecting from tag");
    }

    result.map_err(Error::from)
}

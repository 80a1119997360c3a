//! Traits for the operating system's card service
//!
//! The reader session only needs four operations from the card service:
//! enumerate readers, connect to a tag, wait for a reader status change and
//! exchange raw command bytes. Keeping them behind these traits lets the
//! session run against PC/SC in production and a scripted subsystem in tests.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::config::{Disposition, Protocol, ShareMode};
use crate::error::PcscError;
use crate::reader::{ReaderDevice, ReaderState};

/// Trait for card services able to enumerate and watch readers
pub trait CardSubsystem: Send + Sync + 'static {
    /// Connection type returned by [`connect`](Self::connect)
    type Connection: CardConnection;

    /// List the readers currently attached
    ///
    /// An empty list is a valid result and not an error.
    fn list_readers(&self) -> Result<Vec<ReaderDevice>, PcscError>;

    /// Connect to the tag in the field of `device`
    fn connect(
        &self,
        device: &ReaderDevice,
        share_mode: ShareMode,
        protocol: Protocol,
    ) -> Result<Self::Connection, PcscError>;

    /// Block until the state of one of `states` differs from its `current`
    /// flags, or until `timeout` elapses
    ///
    /// On success the `event` flags of every slot are updated. An elapsed
    /// timeout is reported as [`PcscError::Timeout`].
    fn wait_for_status_change(
        &self,
        states: &mut [ReaderState],
        timeout: Duration,
    ) -> Result<(), PcscError>;
}

/// Trait for an open connection to a tag
///
/// A connection is owned by exactly one caller and must be released with
/// [`disconnect`](Self::disconnect) once the exchange is over.
pub trait CardConnection: Send + fmt::Debug {
    /// Send raw command bytes to the tag and return the response bytes
    fn transmit(&mut self, command: &[u8]) -> Result<Bytes, PcscError> {
        trace!(command = %hex::encode_upper(command), "Transmitting command");
        let result = self.do_transmit(command);
        match &result {
            Ok(response) => {
                trace!(response = %hex::encode_upper(response), "Received response");
            }
            Err(e) => {
                debug!(error = %e, "Transmission failed");
            }
        }
        result
    }

    /// Internal implementation of transmit
    fn do_transmit(&mut self, command: &[u8]) -> Result<Bytes, PcscError>;

    /// Release the connection
    fn disconnect(self, disposition: Disposition) -> Result<(), PcscError>
    where
        Self: Sized;
}

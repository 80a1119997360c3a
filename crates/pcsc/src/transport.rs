//! PC/SC card connection

use std::fmt;

use bytes::Bytes;
use pcsc::Card;

use crate::config::Disposition;
use crate::error::PcscError;
use crate::reader::ReaderDevice;
use crate::subsystem::CardConnection;

/// Connection to a tag through PC/SC
pub struct PcscConnection {
    /// Reader the tag sits on
    device: ReaderDevice,
    /// Card handle, until disconnected
    card: Option<Card>,
}

impl fmt::Debug for PcscConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcscConnection")
            .field("device", &self.device)
            .field("connected", &self.card.is_some())
            .finish()
    }
}

impl PcscConnection {
    pub(crate) const fn new(device: ReaderDevice, card: Card) -> Self {
        Self {
            device,
            card: Some(card),
        }
    }

    /// Get the reader this connection belongs to
    pub const fn device(&self) -> &ReaderDevice {
        &self.device
    }
}

impl CardConnection for PcscConnection {
    fn do_transmit(&mut self, command: &[u8]) -> Result<Bytes, PcscError> {
        let card = self
            .card
            .as_ref()
            .ok_or_else(|| PcscError::NoCard(self.device.to_string()))?;

        let mut response_buffer = [0u8; pcsc::MAX_BUFFER_SIZE];
        let response = card.transmit(command, &mut response_buffer)?;
        Ok(Bytes::copy_from_slice(response))
    }

    fn disconnect(mut self, disposition: Disposition) -> Result<(), PcscError> {
        match self.card.take() {
            Some(card) => card
                .disconnect(disposition.into())
                .map_err(|(_, e)| e.into()),
            None => Ok(()),
        }
    }
}

impl Drop for PcscConnection {
    fn drop(&mut self) {
        if let Some(card) = self.card.take() {
            let _ = card.disconnect(pcsc::Disposition::LeaveCard);
        }
    }
}

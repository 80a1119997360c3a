//! PC/SC implementation of the card subsystem

use std::ffi::CString;
use std::fmt;
use std::time::Duration;

use pcsc::{Context, Scope};
use tracing::debug;

use crate::config::{Protocol, ShareMode};
use crate::error::PcscError;
use crate::reader::{ReaderDevice, ReaderState};
use crate::subsystem::CardSubsystem;
use crate::transport::PcscConnection;

/// Card subsystem backed by a PC/SC context
pub struct PcscSubsystem {
    /// PC/SC context
    context: Context,
}

impl fmt::Debug for PcscSubsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcscSubsystem").finish_non_exhaustive()
    }
}

impl PcscSubsystem {
    /// Establish a user-scope PC/SC context
    pub fn establish() -> Result<Self, PcscError> {
        let context = Context::establish(Scope::User)?;
        Ok(Self { context })
    }

    /// Release the PC/SC context
    pub fn release(self) -> Result<(), PcscError> {
        self.context.release().map_err(|(_, e)| e.into())
    }
}

fn reader_name(device: &ReaderDevice) -> Result<CString, PcscError> {
    CString::new(device.name()).map_err(|_| PcscError::InvalidReaderName(device.to_string()))
}

impl CardSubsystem for PcscSubsystem {
    type Connection = PcscConnection;

    fn list_readers(&self) -> Result<Vec<ReaderDevice>, PcscError> {
        match self.context.list_readers_owned() {
            Ok(names) => Ok(names
                .into_iter()
                .map(|name| ReaderDevice::new(name.to_string_lossy().into_owned()))
                .collect()),
            // pcsc-lite reports an empty reader list as an error
            Err(pcsc::Error::NoReadersAvailable) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn connect(
        &self,
        device: &ReaderDevice,
        share_mode: ShareMode,
        protocol: Protocol,
    ) -> Result<PcscConnection, PcscError> {
        let name = reader_name(device)?;

        match self.context.connect(&name, share_mode.into(), protocol.into()) {
            Ok(card) => {
                debug!(reader = %device, ?share_mode, ?protocol, "Connected to card");
                Ok(PcscConnection::new(device.clone(), card))
            }
            Err(pcsc::Error::NoSmartcard) => Err(PcscError::NoCard(device.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn wait_for_status_change(
        &self,
        states: &mut [ReaderState],
        timeout: Duration,
    ) -> Result<(), PcscError> {
        let mut reader_states = states
            .iter()
            .map(|state| {
                Ok(pcsc::ReaderState::new(
                    reader_name(&state.device)?,
                    state.status.current.into(),
                ))
            })
            .collect::<Result<Vec<_>, PcscError>>()?;

        self.context
            .get_status_change(Some(timeout), &mut reader_states)?;

        for (state, reported) in states.iter_mut().zip(&reader_states) {
            state.status.event = reported.event_state().into();
        }

        Ok(())
    }
}

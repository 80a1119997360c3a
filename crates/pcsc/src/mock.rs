//! Scripted in-memory card subsystem for tests
//!
//! Every call pops the next scripted result; when a script runs dry the
//! subsystem falls back to a steady state: the configured reader list, a
//! status wait that sleeps for its timeout and reports [`PcscError::Timeout`],
//! and a transmission error.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::config::{Disposition, Protocol, ShareMode};
use crate::error::PcscError;
use crate::reader::{ReaderDevice, ReaderFlags, ReaderState};
use crate::subsystem::{CardConnection, CardSubsystem};

#[derive(Debug, Default)]
struct Inner {
    readers: Vec<ReaderDevice>,
    enumerations: VecDeque<Result<Vec<ReaderDevice>, PcscError>>,
    statuses: VecDeque<Result<ReaderFlags, PcscError>>,
    responses: VecDeque<Result<Bytes, PcscError>>,
    connect_failures: VecDeque<PcscError>,
    sent: Vec<Bytes>,
    list_calls: usize,
    waits: usize,
    connects: usize,
    disconnects: Vec<Disposition>,
}

/// Scripted card subsystem
///
/// Clones share the same script and call log.
#[derive(Debug, Clone, Default)]
pub struct MockSubsystem {
    inner: Arc<Mutex<Inner>>,
}

impl MockSubsystem {
    /// Create a subsystem with no readers attached
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reader list returned once the enumeration script is exhausted
    pub fn with_readers<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_readers(names);
        self
    }

    /// Replace the steady-state reader list
    pub fn set_readers<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.lock().readers = names.into_iter().map(ReaderDevice::new).collect();
    }

    /// Queue the result of one enumeration
    pub fn push_enumeration(&self, result: Result<Vec<ReaderDevice>, PcscError>) {
        self.inner.lock().enumerations.push_back(result);
    }

    /// Queue one reader state reported by the next status-change wait
    pub fn push_status(&self, flags: ReaderFlags) {
        self.inner.lock().statuses.push_back(Ok(flags));
    }

    /// Queue an error returned by the next status-change wait
    pub fn push_status_error(&self, error: PcscError) {
        self.inner.lock().statuses.push_back(Err(error));
    }

    /// Queue a tag response
    pub fn push_response<B: Into<Bytes>>(&self, response: B) {
        self.inner.lock().responses.push_back(Ok(response.into()));
    }

    /// Queue a transmission failure
    pub fn push_transmit_error(&self, error: PcscError) {
        self.inner.lock().responses.push_back(Err(error));
    }

    /// Make the next connect fail
    pub fn fail_next_connect(&self, error: PcscError) {
        self.inner.lock().connect_failures.push_back(error);
    }

    /// Number of enumerations performed
    pub fn list_calls(&self) -> usize {
        self.inner.lock().list_calls
    }

    /// Number of status-change waits issued
    pub fn waits(&self) -> usize {
        self.inner.lock().waits
    }

    /// Number of successful connects
    pub fn connects(&self) -> usize {
        self.inner.lock().connects
    }

    /// Dispositions of every disconnect, in order
    pub fn disconnects(&self) -> Vec<Disposition> {
        self.inner.lock().disconnects.clone()
    }

    /// Commands transmitted so far, in order
    pub fn sent_commands(&self) -> Vec<Bytes> {
        self.inner.lock().sent.clone()
    }
}

impl CardSubsystem for MockSubsystem {
    type Connection = MockConnection;

    fn list_readers(&self) -> Result<Vec<ReaderDevice>, PcscError> {
        let mut inner = self.inner.lock();
        inner.list_calls += 1;
        match inner.enumerations.pop_front() {
            Some(result) => result,
            None => Ok(inner.readers.clone()),
        }
    }

    fn connect(
        &self,
        device: &ReaderDevice,
        _share_mode: ShareMode,
        _protocol: Protocol,
    ) -> Result<MockConnection, PcscError> {
        let mut inner = self.inner.lock();
        if let Some(error) = inner.connect_failures.pop_front() {
            return Err(error);
        }
        inner.connects += 1;
        Ok(MockConnection {
            device: device.clone(),
            inner: Arc::clone(&self.inner),
        })
    }

    fn wait_for_status_change(
        &self,
        states: &mut [ReaderState],
        timeout: Duration,
    ) -> Result<(), PcscError> {
        let next = {
            let mut inner = self.inner.lock();
            inner.waits += 1;
            inner.statuses.pop_front()
        };

        match next {
            Some(Ok(flags)) => {
                for state in states.iter_mut() {
                    state.status.event = flags;
                }
                Ok(())
            }
            Some(Err(e)) => Err(e),
            None => {
                thread::sleep(timeout);
                Err(PcscError::Timeout)
            }
        }
    }
}

/// Connection handed out by [`MockSubsystem`]
#[derive(Debug)]
pub struct MockConnection {
    device: ReaderDevice,
    inner: Arc<Mutex<Inner>>,
}

impl MockConnection {
    /// Reader this connection was opened on
    pub const fn device(&self) -> &ReaderDevice {
        &self.device
    }
}

impl CardConnection for MockConnection {
    fn do_transmit(&mut self, command: &[u8]) -> Result<Bytes, PcscError> {
        let mut inner = self.inner.lock();
        inner.sent.push(Bytes::copy_from_slice(command));
        inner
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(PcscError::other("no scripted response")))
    }

    fn disconnect(self, disposition: Disposition) -> Result<(), PcscError> {
        self.inner.lock().disconnects.push(disposition);
        Ok(())
    }
}

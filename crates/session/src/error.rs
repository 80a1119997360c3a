//! Error types for the reader session

use tagrelay_pcsc::{PcscError, ReaderDevice};

/// Errors that end a selection, a monitoring phase or a dispatch
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Readers could not be enumerated
    #[error("Error listing readers: {0}")]
    Enumeration(#[source] PcscError),

    /// No connection could be opened to the tag
    #[error("Error connecting to tag on {device}: {source}")]
    Connect {
        /// Reader the tag was on
        device: ReaderDevice,
        /// Subsystem error
        source: PcscError,
    },

    /// The tag did not answer as expected
    #[error(transparent)]
    Tag(#[from] tagrelay_tag::Error),

    /// The payload could not be delivered
    #[error("Error dispatching contents to target: {0}")]
    Delivery(#[from] DeliveryError),

    /// The status watch stopped on a subsystem error
    #[error("Error watching reader status: {0}")]
    Watch(#[source] PcscError),

    /// The selected reader is no longer attached
    #[error("Reader disconnected: {0}")]
    ReaderLost(ReaderDevice),

    /// A blocking task panicked or was aborted
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Errors in the operator's reader choice
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// Input is not a number
    #[error("Unable to parse reader number: {0:?}")]
    NotANumber(String),

    /// Number does not match a listed reader
    #[error("Invalid reader number: {index} (expected 1 to {count})")]
    OutOfRange {
        /// Number entered
        index: usize,
        /// Readers listed
        count: usize,
    },
}

/// Errors raised by a delivery target
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Request failed or the target answered with a non-success status
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A configured header cannot be sent
    #[error("Invalid header {name:?}: {reason}")]
    InvalidHeader {
        /// Header name as configured
        name: String,
        /// Why it was rejected
        reason: String,
    },
}

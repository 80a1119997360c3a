//! Error type for tag operations

use bytes::Bytes;
use tagrelay_pcsc::PcscError;

/// Errors raised while talking to a tag
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The command could not be exchanged with the tag
    #[error("Error transmitting command: {0}")]
    Transport(#[from] PcscError),

    /// The response trailer did not report success
    #[error(
        "Expected successful response reading {operation}, received: {}",
        hex::encode_upper(.response)
    )]
    ProtocolStatus {
        /// Operation that was attempted
        operation: &'static str,
        /// Raw response, trailer included
        response: Bytes,
    },
}

impl Error {
    /// Raw response of a protocol-status error
    pub const fn response(&self) -> Option<&Bytes> {
        match self {
            Self::ProtocolStatus { response, .. } => Some(response),
            Self::Transport(_) => None,
        }
    }
}

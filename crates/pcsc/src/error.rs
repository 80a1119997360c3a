//! Error types for the card subsystem

/// Errors reported by a card subsystem
#[derive(Debug, thiserror::Error)]
pub enum PcscError {
    /// The status-change wait elapsed without a change
    #[error("Timed out waiting for a reader status change")]
    Timeout,

    /// Reader name cannot be handed to the subsystem
    #[error("Invalid reader name: {0:?}")]
    InvalidReaderName(String),

    /// No card present in reader
    #[error("No card present in reader: {0}")]
    NoCard(String),

    /// PC/SC error
    #[cfg(feature = "pcsc")]
    #[error("PC/SC error: {0}")]
    Pcsc(pcsc::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl PcscError {
    /// Whether this is the benign status-change timeout
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Create a general other error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other(message.into())
    }
}

#[cfg(feature = "pcsc")]
impl From<pcsc::Error> for PcscError {
    fn from(error: pcsc::Error) -> Self {
        match error {
            pcsc::Error::Timeout => Self::Timeout,
            other => Self::Pcsc(other),
        }
    }
}

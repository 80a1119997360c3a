//! Connection options for card sessions

#[cfg(feature = "pcsc")]
use pcsc::{
    Disposition as PcscDisposition, Protocols as PcscProtocols, ShareMode as PcscShareMode,
};

/// Sharing mode for card connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ShareMode {
    /// Exclusive access to the card
    Exclusive,
    /// Shared access to the card (default)
    #[default]
    Shared,
    /// Direct connection to the reader
    Direct,
}

#[cfg(feature = "pcsc")]
impl From<ShareMode> for PcscShareMode {
    fn from(mode: ShareMode) -> Self {
        match mode {
            ShareMode::Exclusive => Self::Exclusive,
            ShareMode::Shared => Self::Shared,
            ShareMode::Direct => Self::Direct,
        }
    }
}

/// Transmission protocol requested when connecting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Protocol {
    /// T=0
    T0,
    /// T=1, what contactless readers expose for ISO-14443 tags (default)
    #[default]
    T1,
    /// Whichever protocol the reader negotiates
    Any,
}

#[cfg(feature = "pcsc")]
impl From<Protocol> for PcscProtocols {
    fn from(protocol: Protocol) -> Self {
        match protocol {
            Protocol::T0 => Self::T0,
            Protocol::T1 => Self::T1,
            Protocol::Any => Self::ANY,
        }
    }
}

/// What happens to the card when a connection is released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Disposition {
    /// Leave the card as it is (default)
    #[default]
    Leave,
    /// Reset the card
    Reset,
    /// Power the card down
    Unpower,
    /// Eject the card, where the reader supports it
    Eject,
}

#[cfg(feature = "pcsc")]
impl From<Disposition> for PcscDisposition {
    fn from(disposition: Disposition) -> Self {
        match disposition {
            Disposition::Leave => Self::LeaveCard,
            Disposition::Reset => Self::ResetCard,
            Disposition::Unpower => Self::UnpowerCard,
            Disposition::Eject => Self::EjectCard,
        }
    }
}

/// Options used for every card connection opened on a tag arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConnectOptions {
    /// Sharing mode for card connections
    pub share_mode: ShareMode,

    /// Preferred protocol for card communication
    pub protocol: Protocol,

    /// Disposition applied on disconnect
    pub disposition: Disposition,
}

impl ConnectOptions {
    /// Create the default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sharing mode
    pub const fn with_share_mode(mut self, mode: ShareMode) -> Self {
        self.share_mode = mode;
        self
    }

    /// Set the preferred protocol
    pub const fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set the disconnect disposition
    pub const fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = disposition;
        self
    }
}

use std::fmt;

use bytes::Bytes;

/// Tag UID, displayed as colon-separated uppercase hex (`04:3A:F1:02`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uid(Bytes);

impl Uid {
    /// Create a UID from its raw bytes
    pub fn new(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }

    /// Raw UID bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

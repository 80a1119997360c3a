//! APDU command definitions
//!
//! Contactless readers accept a small set of pseudo-APDUs with class `FF`
//! that the reader answers itself instead of forwarding to the tag.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

/// A short APDU command without a data field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    cla: u8,
    ins: u8,
    p1: u8,
    p2: u8,
    le: Option<u8>,
}

impl Command {
    /// Create a command from its header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            le: None,
        }
    }

    /// Set the expected response length (Le)
    pub const fn with_le(mut self, le: u8) -> Self {
        self.le = Some(le);
        self
    }

    /// READ BINARY of `len` bytes starting at `block`
    pub const fn read_binary(block: u16, len: u8) -> Self {
        Self::new(0xFF, 0xB0, (block >> 8) as u8, block as u8).with_le(len)
    }

    /// Command class (CLA)
    pub const fn class(&self) -> u8 {
        self.cla
    }

    /// Instruction code (INS)
    pub const fn instruction(&self) -> u8 {
        self.ins
    }

    /// First parameter (P1)
    pub const fn p1(&self) -> u8 {
        self.p1
    }

    /// Second parameter (P2)
    pub const fn p2(&self) -> u8 {
        self.p2
    }

    /// Expected response length (Le)
    pub const fn expected_length(&self) -> Option<u8> {
        self.le
    }

    /// Convert to raw APDU bytes
    pub fn to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(5);

        // Header: CLA, INS, P1, P2
        buffer.put_u8(self.cla);
        buffer.put_u8(self.ins);
        buffer.put_u8(self.p1);
        buffer.put_u8(self.p2);

        if let Some(le) = self.le {
            buffer.put_u8(le);
        }

        buffer.freeze()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.to_bytes()))
    }
}

/// GET DATA for the tag UID, answered with the full UID
pub const GET_UID: Command = Command::new(0xFF, 0xCA, 0x00, 0x00).with_le(0x00);

/// READ BINARY of 16 bytes (four pages) from block 1
pub const READ_PAGES: Command = Command::read_binary(0x0001, 0x10);

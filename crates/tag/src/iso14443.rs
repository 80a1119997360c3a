//! ISO-14443 type A tags holding NDEF data (NTAG21x and compatibles)
//!
//! NTAG21x and most ISO-14443 compliant tags use 4-byte pages, user data
//! starting at page 4. NTAG213/215/216 datasheet:
//! <https://www.nxp.com/docs/en/data-sheet/NTAG213_215_216.pdf>

use bytes::Bytes;
use tagrelay_pcsc::CardConnection;
use tracing::{debug, warn};

use crate::command::{GET_UID, READ_PAGES};
use crate::error::Error;
use crate::status::StatusWord;
use crate::uid::Uid;

/// Bytes per tag page
pub const PAGE_SIZE: usize = 4;

/// First page of user data memory
pub const USER_DATA_FIRST_PAGE: u8 = 0x04;

/// Protocol client for an ISO-14443 type A tag on an open connection
///
/// The client neither connects nor disconnects; the connection belongs to
/// the caller.
#[derive(Debug)]
pub struct Iso14443Tag<'a, C> {
    connection: &'a mut C,
}

impl<'a, C: CardConnection> Iso14443Tag<'a, C> {
    /// Wrap an open connection
    pub const fn new(connection: &'a mut C) -> Self {
        Self { connection }
    }

    /// Read the UID of the tag
    ///
    /// Only SW1 of the trailer is checked; readers vary in what they put in
    /// SW2 for this command.
    pub fn read_uid(&mut self) -> Result<Uid, Error> {
        let response = self.connection.transmit(&GET_UID.to_bytes())?;

        if let Some((status, uid)) = StatusWord::from_trailer(&response) {
            if status.is_success_class() {
                return Ok(Uid::new(uid));
            }
            warn!(%status, description = status.description(), "UID read rejected");
        }

        Err(Error::ProtocolStatus {
            operation: "UID",
            response,
        })
    }

    /// Read one page of user data
    ///
    /// A response ending in `90 00` with at least one full page yields that
    /// page. Any other response is returned unmodified so the caller can
    /// decide what to do with partial data.
    pub fn read_page(&mut self, page: u8) -> Result<Bytes, Error> {
        // TODO: address READ BINARY at `page` instead of block 1 once page
        // addressing has been confirmed against NTAG21x on the tested readers.
        let response = self.connection.transmit(&READ_PAGES.to_bytes())?;

        match StatusWord::from_trailer(&response) {
            Some((status, data)) if status.is_success() && data.len() >= PAGE_SIZE => {
                let data = response.slice(..PAGE_SIZE);
                debug!(page, binary = %binary(&data), "Read page");
                Ok(data)
            }
            _ => {
                debug!(
                    page,
                    response = %hex::encode_upper(&response),
                    "Unexpected page read trailer, returning raw response"
                );
                Ok(response)
            }
        }
    }
}

fn binary(data: &[u8]) -> String {
    data.iter()
        .map(|byte| format!("{:08b}", byte))
        .collect::<Vec<_>>()
        .join(" ")
}

use std::collections::BTreeMap;

use bytes::{Bytes, BytesMut};
use tagrelay_pcsc::CardConnection;
use tracing::info;

use crate::error::Error;
use crate::tag::Tag;
use crate::uid::Uid;

/// Everything read from one tag during one presence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSession {
    uid: Uid,
    pages: BTreeMap<u8, Bytes>,
}

impl TagSession {
    /// Create an empty session for the tag with `uid`
    pub const fn new(uid: Uid) -> Self {
        Self {
            uid,
            pages: BTreeMap::new(),
        }
    }

    /// Read the UID and then each of `pages` from `tag`
    ///
    /// Stops at the first failure.
    pub fn read<C, I>(tag: &mut Tag<'_, C>, pages: I) -> Result<Self, Error>
    where
        C: CardConnection,
        I: IntoIterator<Item = u8>,
    {
        let uid = tag.read_uid()?;
        info!(%uid, "Tag UID");

        let mut session = Self::new(uid);
        for page in pages {
            let data = tag.read_page(page)?;
            session.insert_page(page, data);
        }
        Ok(session)
    }

    /// Record the data read from `page`, replacing any earlier read
    pub fn insert_page(&mut self, page: u8, data: Bytes) {
        self.pages.insert(page, data);
    }

    /// UID of the tag
    pub const fn uid(&self) -> &Uid {
        &self.uid
    }

    /// Pages read so far, by page index
    pub const fn pages(&self) -> &BTreeMap<u8, Bytes> {
        &self.pages
    }

    /// Data of every page read, concatenated in page order
    pub fn payload(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(self.pages.values().map(Bytes::len).sum());
        for data in self.pages.values() {
            buffer.extend_from_slice(data);
        }
        buffer.freeze()
    }
}

//! Tag technology dispatch

use bytes::Bytes;
use tagrelay_pcsc::CardConnection;

use crate::error::Error;
use crate::iso14443::Iso14443Tag;
use crate::uid::Uid;

/// Tag technologies understood by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagTechnology {
    /// ISO-14443 type A with 4-byte pages (NTAG21x, Ultralight)
    Iso14443A,
}

/// A tag on an open connection, typed by its technology
#[derive(Debug)]
pub enum Tag<'a, C> {
    /// ISO-14443 type A tag
    Iso14443A(Iso14443Tag<'a, C>),
}

impl<'a, C: CardConnection> Tag<'a, C> {
    /// Pick the implementation for the tag behind `connection`
    ///
    /// Only ISO-14443 type A is supported; tested with a uTrust 3700 F
    /// reader and NTAG215 tags.
    pub const fn detect(connection: &'a mut C) -> Self {
        Self::Iso14443A(Iso14443Tag::new(connection))
    }

    /// Technology of this tag
    pub const fn technology(&self) -> TagTechnology {
        match self {
            Self::Iso14443A(_) => TagTechnology::Iso14443A,
        }
    }

    /// Read the UID of the tag
    pub fn read_uid(&mut self) -> Result<Uid, Error> {
        match self {
            Self::Iso14443A(tag) => tag.read_uid(),
        }
    }

    /// Read one page of user data
    pub fn read_page(&mut self, page: u8) -> Result<Bytes, Error> {
        match self {
            Self::Iso14443A(tag) => tag.read_page(page),
        }
    }
}

//! ISO-14443 tag commands and response validation
//!
//! This crate drives the tag-level protocol once a connection to a tag is
//! open: reading the UID and reading user-data pages through the pseudo-APDUs
//! that PC/SC contactless readers understand.
//!
//! ## Overview
//!
//! - [`Command`] builds the raw APDU bytes
//! - [`StatusWord`] splits and checks the two-byte status trailer
//! - [`Iso14443Tag`] runs the UID and page reads against a [`CardConnection`]
//! - [`Tag`] selects the implementation for the detected tag technology
//! - [`TagSession`] collects what was read from one tag
//!
//! [`CardConnection`]: tagrelay_pcsc::CardConnection
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]

pub mod command;
pub mod status;

mod error;
mod iso14443;
mod session;
mod tag;
mod uid;

pub use command::Command;
pub use error::Error;
pub use iso14443::{Iso14443Tag, PAGE_SIZE, USER_DATA_FIRST_PAGE};
pub use session::TagSession;
pub use status::StatusWord;
pub use tag::{Tag, TagTechnology};
pub use uid::Uid;

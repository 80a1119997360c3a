//! Card subsystem seam for contactless tag readers
//!
//! This crate defines the operations the reader session needs from the
//! operating system's smart-card service ([`CardSubsystem`] and
//! [`CardConnection`]) together with the reader status model used to diff
//! consecutive status-change results.
//!
//! # Features
//!
//! - `pcsc` (default): [`PcscSubsystem`], backed by the system PC/SC library
//! - `mock`: [`mock::MockSubsystem`], a scripted in-memory subsystem for tests
//! - `serde`: `Deserialize`/`Serialize` for the connection options
//!
//! # Examples
//!
//! ```no_run
//! # #[cfg(feature = "pcsc")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::time::Duration;
//! use tagrelay_pcsc::{CardSubsystem, PcscSubsystem, ReaderState};
//!
//! let subsystem = PcscSubsystem::establish()?;
//! let readers = subsystem.list_readers()?;
//! let Some(reader) = readers.first() else {
//!     println!("No readers found");
//!     return Ok(());
//! };
//!
//! let mut states = [ReaderState::new(reader.clone())];
//! match subsystem.wait_for_status_change(&mut states, Duration::from_secs(1)) {
//!     Ok(()) => println!("{}: {}", reader, states[0].status.event),
//!     Err(e) if e.is_timeout() => println!("{}: no change", reader),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "pcsc"))]
//! # fn main() {}
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
mod error;
mod reader;
mod subsystem;

#[cfg(feature = "pcsc")]
mod manager;
#[cfg(feature = "pcsc")]
mod transport;

#[cfg(feature = "mock")]
pub mod mock;

pub use config::{ConnectOptions, Disposition, Protocol, ShareMode};
pub use error::PcscError;
pub use reader::{ReaderDevice, ReaderFlags, ReaderState, ReaderStatus};
pub use subsystem::{CardConnection, CardSubsystem};

#[cfg(feature = "pcsc")]
pub use manager::PcscSubsystem;
#[cfg(feature = "pcsc")]
pub use transport::PcscConnection;

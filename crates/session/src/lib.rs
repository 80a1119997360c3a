//! Reader session controller
//!
//! Drives one contactless reader from start to shutdown: the
//! [`SessionOrchestrator`] asks the [`DeviceSelector`] for a reader, starts a
//! [`ReaderHealthMonitor`] and a [`TagPresenceWatcher`] on it, and hands every
//! tag arrival to the [`TagDispatcher`], which reads the tag and delivers its
//! contents to a [`DeliveryTarget`].
//!
//! All long-running operations take a [`CancellationToken`]. Cancelling the
//! token passed to [`SessionOrchestrator::run`] stops every unit, including
//! blocking status waits, within one status timeout.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod backoff;
mod config;
mod dispatch;
mod error;
mod event;
mod health;
mod orchestrator;
mod prompt;
mod selector;
mod target;
mod watcher;

pub use config::SessionConfig;
pub use dispatch::TagDispatcher;
pub use error::{DeliveryError, Error, SelectionError};
pub use event::{Presence, StateChange};
pub use health::ReaderHealthMonitor;
pub use orchestrator::{SessionOrchestrator, SessionState};
pub use prompt::{OperatorPrompt, StdinPrompt, parse_selection};
pub use selector::DeviceSelector;
pub use target::{DeliveryTarget, HttpTarget, LogTarget};
pub use watcher::{PresenceStream, TagPresenceWatcher};

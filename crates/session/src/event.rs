//! Reader state transitions reported by the presence watcher

use chrono::{DateTime, Utc};
use tagrelay_pcsc::ReaderStatus;

/// Tag presence transition derived from a [`StateChange`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    /// A tag entered the field
    Arrived,
    /// The tag left the field
    Removed,
}

/// One reader status change, as observed by the watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    /// Flags before (`current`) and after (`event`) the change
    pub status: ReaderStatus,
    /// When the change was observed
    pub occurred_at: DateTime<Utc>,
}

impl StateChange {
    /// Record a change observed now
    pub fn new(status: ReaderStatus) -> Self {
        Self {
            status,
            occurred_at: Utc::now(),
        }
    }

    /// Presence transitions carried by this change
    ///
    /// Arrival and removal are tested independently, so a single change may
    /// report both, either or neither.
    pub fn transitions(&self) -> impl Iterator<Item = Presence> + use<> {
        [
            (self.status.just_arrived(), Presence::Arrived),
            (self.status.just_removed(), Presence::Removed),
        ]
        .into_iter()
        .filter_map(|(hit, presence)| hit.then_some(presence))
    }
}

//! Reader identity and the reader status model

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use derive_more::Display;

/// A card reader as reported by enumeration
///
/// The name is the key for connecting, waiting on status changes and health
/// checks. A reader may briefly disappear and reappear under the same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub struct ReaderDevice(String);

impl ReaderDevice {
    /// Create a reader from its enumerated name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    /// Get the reader name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ReaderDevice {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ReaderDevice {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for ReaderDevice {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Set of reader state flags
///
/// Bit values are those of the PC/SC `SCARD_STATE_*` constants so a set can be
/// passed to and from the system library unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReaderFlags(u32);

impl ReaderFlags {
    /// No state known yet
    pub const UNAWARE: Self = Self(0x0000);
    /// Reader is ignored
    pub const IGNORE: Self = Self(0x0001);
    /// State differs from the one supplied to the wait
    pub const CHANGED: Self = Self(0x0002);
    /// Reader is not recognised
    pub const UNKNOWN: Self = Self(0x0004);
    /// Reader state cannot be determined
    pub const UNAVAILABLE: Self = Self(0x0008);
    /// No tag in the field
    pub const EMPTY: Self = Self(0x0010);
    /// A tag is in the field
    pub const PRESENT: Self = Self(0x0020);
    /// The tag ATR matched a supplied pattern
    pub const ATRMATCH: Self = Self(0x0040);
    /// The tag is held exclusively by another application
    pub const EXCLUSIVE: Self = Self(0x0080);
    /// The tag is in use by another application
    pub const INUSE: Self = Self(0x0100);
    /// The tag does not respond
    pub const MUTE: Self = Self(0x0200);
    /// The tag is not powered
    pub const UNPOWERED: Self = Self(0x0400);

    const ALL: u32 = 0x07FF;

    const NAMES: [(Self, &'static str); 11] = [
        (Self::IGNORE, "IGNORE"),
        (Self::CHANGED, "CHANGED"),
        (Self::UNKNOWN, "UNKNOWN"),
        (Self::UNAVAILABLE, "UNAVAILABLE"),
        (Self::EMPTY, "EMPTY"),
        (Self::PRESENT, "PRESENT"),
        (Self::ATRMATCH, "ATRMATCH"),
        (Self::EXCLUSIVE, "EXCLUSIVE"),
        (Self::INUSE, "INUSE"),
        (Self::MUTE, "MUTE"),
        (Self::UNPOWERED, "UNPOWERED"),
    ];

    /// Build a set from raw bits, dropping bits that are not state flags
    ///
    /// PC/SC packs an event counter into the upper half of the event state,
    /// which is discarded here.
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::ALL)
    }

    /// Raw bits of this set
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Whether no flag is set
    pub const fn is_unaware(&self) -> bool {
        self.0 == 0
    }

    /// Whether every flag in `other` is set
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set every flag in `other`
    pub const fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl BitOr for ReaderFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ReaderFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

impl fmt::Display for ReaderFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unaware() {
            return write!(f, "UNAWARE");
        }

        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, " | ")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "pcsc")]
impl From<pcsc::State> for ReaderFlags {
    fn from(state: pcsc::State) -> Self {
        Self::from_bits_truncate(state.bits() as u32)
    }
}

#[cfg(feature = "pcsc")]
impl From<ReaderFlags> for pcsc::State {
    fn from(flags: ReaderFlags) -> Self {
        Self::from_bits_truncate(flags.bits() as _)
    }
}

/// Last-seen and latest-reported state of one reader
///
/// `current` is what the watcher last observed and `event` what the most
/// recent status-change call reported. Transitions are classified by diffing
/// the two, so `current` must be rolled forward with [`advance`](Self::advance)
/// before the next wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReaderStatus {
    /// State last observed by the watcher
    pub current: ReaderFlags,
    /// State reported by the latest status-change call
    pub event: ReaderFlags,
}

impl ReaderStatus {
    /// Status with nothing observed yet
    pub const fn unaware() -> Self {
        Self {
            current: ReaderFlags::UNAWARE,
            event: ReaderFlags::UNAWARE,
        }
    }

    /// Create a status from a previous and a reported state
    pub const fn new(current: ReaderFlags, event: ReaderFlags) -> Self {
        Self { current, event }
    }

    /// Whether `flag` is set in the reported state but not in the previous one
    pub const fn newly_set(&self, flag: ReaderFlags) -> bool {
        self.event.contains(flag) && !self.current.contains(flag)
    }

    /// A tag entered a field that was previously empty
    pub const fn just_arrived(&self) -> bool {
        self.newly_set(ReaderFlags::PRESENT) && self.current.contains(ReaderFlags::EMPTY)
    }

    /// The field became empty while a tag was previously present
    pub const fn just_removed(&self) -> bool {
        self.newly_set(ReaderFlags::EMPTY) && self.current.contains(ReaderFlags::PRESENT)
    }

    /// Take the reported state as the new baseline
    pub const fn advance(&mut self) {
        self.current = self.event;
    }
}

/// One reader slot of a status-change wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderState {
    /// Reader being watched
    pub device: ReaderDevice,
    /// Its status
    pub status: ReaderStatus,
}

impl ReaderState {
    /// Watch a reader starting from an unaware state
    pub const fn new(device: ReaderDevice) -> Self {
        Self {
            device,
            status: ReaderStatus::unaware(),
        }
    }
}

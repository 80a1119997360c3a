//! Session timing and connection settings

use std::time::Duration;

use tagrelay_pcsc::ConnectOptions;
use tagrelay_tag::USER_DATA_FIRST_PAGE;

/// Settings shared by the units of a reader session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Bound on each blocking status-change wait
    ///
    /// Also bounds how long a cancelled watcher may keep running.
    pub status_timeout: Duration,
    /// Period between reader health checks
    pub health_interval: Duration,
    /// Delay before rebooting after a failed selection or monitoring phase
    pub reboot_delay: Duration,
    /// Delay between enumerations while no reader is attached
    pub enumeration_backoff: Duration,
    /// How tags are connected to and released
    pub connect: ConnectOptions,
    /// Page requested from every tag
    pub page: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            status_timeout: Duration::from_secs(1),
            health_interval: Duration::from_secs(5),
            reboot_delay: Duration::from_secs(3),
            enumeration_backoff: Duration::from_secs(1),
            connect: ConnectOptions::default(),
            page: USER_DATA_FIRST_PAGE,
        }
    }
}

//! Status trailer definitions for tag responses

use std::fmt;

/// Status Word (SW1-SW2) ending every reader response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusWord {
    /// First status byte (SW1)
    pub sw1: u8,
    /// Second status byte (SW2)
    pub sw2: u8,
}

impl StatusWord {
    /// Success (90 00)
    pub const SUCCESS: Self = Self::new(0x90, 0x00);

    /// Create a new status word
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self { sw1, sw2 }
    }

    /// Split a raw response into its status trailer and the bytes before it
    ///
    /// Returns `None` if the response is too short to carry a trailer.
    pub fn from_trailer(response: &[u8]) -> Option<(Self, &[u8])> {
        let split = response.len().checked_sub(2)?;
        let (payload, trailer) = response.split_at(split);
        Some((Self::new(trailer[0], trailer[1]), payload))
    }

    /// Check if SW1 reports success, whatever SW2 says
    pub const fn is_success_class(&self) -> bool {
        self.sw1 == Self::SUCCESS.sw1
    }

    /// Check if this status word indicates success (90 00)
    pub const fn is_success(&self) -> bool {
        self.sw1 == Self::SUCCESS.sw1 && self.sw2 == Self::SUCCESS.sw2
    }

    /// Get a description of this status word as reported by contactless readers
    pub const fn description(&self) -> &'static str {
        match (self.sw1, self.sw2) {
            (0x90, 0x00) => "Success",
            (0x62, 0x82) => "End of data reached before Le bytes",
            (0x63, 0x00) => "Operation failed",
            (0x65, 0x81) => "Memory failure",
            (0x67, 0x00) => "Wrong length",
            (0x68, 0x00) => "Class byte not supported",
            (0x6A, 0x81) => "Function not supported",
            (0x6A, 0x82) => "Address out of range",
            (0x6B, 0x00) => "Wrong parameters P1-P2",
            (0x6C, _) => "Wrong Le field",
            (0x6D, 0x00) => "Instruction code not supported or invalid",
            (0x6E, 0x00) => "Class not supported",
            _ => "Unknown status word",
        }
    }
}

impl From<(u8, u8)> for StatusWord {
    fn from(tuple: (u8, u8)) -> Self {
        Self::new(tuple.0, tuple.1)
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X} {:02X}", self.sw1, self.sw2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_trailer() {
        let response = [0x04, 0x3A, 0x90, 0x00];
        let (status, payload) = StatusWord::from_trailer(&response).unwrap();
        assert_eq!(status, StatusWord::SUCCESS);
        assert_eq!(payload, &[0x04, 0x3A]);
    }

    #[test]
    fn test_from_trailer_bare_status() {
        let (status, payload) = StatusWord::from_trailer(&[0x63, 0x00]).unwrap();
        assert_eq!(status, StatusWord::new(0x63, 0x00));
        assert!(payload.is_empty());
    }

    #[test]
    fn test_from_trailer_too_short() {
        assert!(StatusWord::from_trailer(&[]).is_none());
        assert!(StatusWord::from_trailer(&[0x90]).is_none());
    }

    #[test]
    fn test_success_checks() {
        assert!(StatusWord::new(0x90, 0x00).is_success());
        assert!(StatusWord::new(0x90, 0x01).is_success_class());
        assert!(!StatusWord::new(0x90, 0x01).is_success());
        assert!(!StatusWord::new(0x63, 0x00).is_success_class());
    }

    #[test]
    fn test_display_and_description() {
        assert_eq!(StatusWord::new(0x6A, 0x81).to_string(), "6A 81");
        assert_eq!(
            StatusWord::new(0x6A, 0x81).description(),
            "Function not supported"
        );
        assert_eq!(StatusWord::new(0x6C, 0x10).description(), "Wrong Le field");
    }
}

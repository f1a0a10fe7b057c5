//! GetFirmwareVersion response decoding.

use core::fmt;

/// Firmware identification returned by GetFirmwareVersion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirmwareVersion {
    /// IC identifier (0x32 for the PN532).
    pub ic: u8,
    /// Firmware major version.
    pub version: u8,
    /// Firmware revision.
    pub revision: u8,
    /// Supported-protocols bitmask.
    pub support: u8,
}

impl FirmwareVersion {
    /// Decode the 4-byte result payload; `None` if it is too short.
    #[must_use]
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        if payload.len() < 4 {
            return None;
        }
        Some(Self {
            ic: payload[0],
            version: payload[1],
            revision: payload[2],
            support: payload[3],
        })
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} (IC 0x{:02X}, support 0x{:02X})",
            self.version, self.revision, self.ic, self.support
        )
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::string::ToString;

    use super::*;

    #[test]
    fn test_from_payload() {
        let fw = FirmwareVersion::from_payload(&[0x32, 0x01, 0x06, 0x07]).unwrap();
        assert_eq!(fw.ic, 0x32);
        assert_eq!(fw.version, 1);
        assert_eq!(fw.revision, 6);
        assert_eq!(fw.support, 0x07);
        assert_eq!(fw.to_string(), "1.6 (IC 0x32, support 0x07)");
    }

    #[test]
    fn test_from_payload_too_short() {
        assert!(FirmwareVersion::from_payload(&[0x32, 0x01, 0x06]).is_none());
    }
}

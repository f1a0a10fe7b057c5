//! PN532 UART wire protocol: frame construction, validation, and target
//! decoding.
//!
//! This crate implements the byte-exact frame format the PN532 speaks over
//! its UART interface. It performs no I/O: callers hand it byte slices and
//! get back validated payloads or distinguishable errors.
//!
//! # Frame Format
//!
//! Every exchange uses the same checksummed envelope:
//!
//! ```text
//! 00 00 FF <LEN> <LCS> <TFI> <DATA...> <DCS> 00
//! ```
//!
//! - `00 00 FF` - preamble and start code
//! - `LEN` - number of data bytes, counting the TFI
//! - `LCS` - length checksum, `LEN + LCS == 0 (mod 256)`
//! - `TFI` - frame identifier: `0xD4` host-to-device, `0xD5` device-to-host
//! - `DCS` - data checksum, two's-complement negation of the sum of `TFI`
//!   and all data bytes
//!
//! Before answering a command frame the device sends a fixed 6-byte
//! acknowledgement, [`frame::ACK_FRAME`].
//!
//! # Example
//!
//! ```
//! use pn532_proto::{commands, frame};
//!
//! let mut buf = [0u8; frame::MAX_FRAME_SIZE];
//! let len = frame::encode_command(&mut buf, commands::GET_FIRMWARE_VERSION, &[]).unwrap();
//! assert_eq!(&buf[..len], &[0x00, 0x00, 0xFF, 0x02, 0xFE, 0xD4, 0x02, 0x2A, 0x00]);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//! - **`heapless`**: Enable `encode_command_vec()`
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod frame;
pub mod target;
pub mod version;

// Re-export types at crate root for convenience
pub use frame::{decode_ack, decode_response, encode_command, DecodeError, EncodeError};
pub use target::{decode_passive_target, TagUid};
pub use version::FirmwareVersion;

/// PN532 command opcodes used by the host engine.
pub mod commands {
    /// GetFirmwareVersion: returns IC, version, revision and support bytes.
    pub const GET_FIRMWARE_VERSION: u8 = 0x02;
    /// SAMConfiguration: selects the security-access-module operating mode.
    pub const SAM_CONFIGURATION: u8 = 0x14;
    /// InListPassiveTarget: lists passive targets in the RF field.
    pub const IN_LIST_PASSIVE_TARGET: u8 = 0x4A;
}

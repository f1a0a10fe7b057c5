//! PN532 UART session engine and tag-presence debouncing.
//!
//! This crate drives a PN532 over a serial line and turns its noisy,
//! intermittent read results into stable presence events. It is
//! platform-agnostic: the serial line and the reset pin are injected
//! through the [`SerialLink`] and [`ResetLine`] traits, so the engine runs
//! unchanged against real hardware or scripted mocks.
//!
//! # Overview
//!
//! - [`transport`]: raw byte I/O over the injected serial line —
//!   buffer-clearing writes, bounded busy-poll waits, reset sequencing
//! - [`session`]: the command/ACK/response exchange, wake-up and retry
//!   policy ([`Pn532Session`])
//! - [`tracker`]: the pure debounce state machine
//!   ([`TagPresenceTracker`])
//! - [`monitor`]: one session plus one tracker behind a single `poll()`
//!   ([`TagMonitor`])
//!
//! # Concurrency
//!
//! The protocol is strictly half-duplex: exactly one thread may own a
//! session at a time. Programs that want several observers run one polling
//! thread that owns the [`TagMonitor`] and publish [`PresenceState`]
//! snapshots or [`PresenceEvent`]s to everyone else. Every call is bounded
//! by its timeout; there is no mid-call abort, so shutdown waits for the
//! in-flight poll to return.
//!
//! # Errors
//!
//! Timeouts and empty reads are normal during polling (no tag in the
//! field) and never surface past the session: they collapse to "no tag
//! this poll". Frame corruption — bad ACK, bad checksum, wrong opcode
//! echo — means the transport lost frame sync; the session latches
//! [`session::SessionState::Faulted`] and refuses further commands until
//! it is re-initialized from a fresh reset.

pub mod monitor;
pub mod session;
pub mod tracker;
pub mod transport;

// Re-export main types at crate root
pub use monitor::TagMonitor;
pub use session::{Pn532Session, SessionConfig, SessionError, SessionState};
pub use tracker::{PresenceEvent, PresenceState, TagPresenceTracker};
pub use transport::{ResetLine, SerialLink, Transport, TransportConfig, TransportError};

// The engine hands UIDs straight through from the protocol layer.
pub use pn532_proto::{FirmwareVersion, TagUid};

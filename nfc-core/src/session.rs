//! PN532 command session: wake-up, command/ACK/response exchange, retry
//! policy.
//!
//! # Session lifecycle
//!
//! ```text
//! Uninitialized --initialize()--> Ready --(per command)--> Ready
//!        |                          |
//!        +------- wake-up failed ---+--- frame corruption ---> Faulted
//! ```
//!
//! `Faulted` is terminal until [`Pn532Session::initialize`] runs a fresh
//! reset sequence. During `initialize` the session is awaiting wake-up;
//! during [`Pn532Session::call`] it is busy — both are transient and
//! scoped to the call.
//!
//! # Failure semantics
//!
//! Timeouts are the overwhelmingly common case (no tag in the field, no
//! event pending), so they are *results*, not errors: a call that gets no
//! answer returns `Ok(None)`. Only frame corruption — bad ACK, bad
//! checksum, wrong opcode echo — is fatal, because it means frame sync is
//! lost and nothing short of a hardware reset recovers it safely.

use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;

use pn532_proto::frame::{self, DecodeError, EncodeError, ACK_FRAME, ENVELOPE_SIZE, MAX_FRAME_SIZE};
use pn532_proto::{commands, target, FirmwareVersion, TagUid};

use crate::transport::{ResetLine, SerialLink, Transport, TransportError};

/// Wake-up preamble: a run of `0x55` followed by zero padding, long enough
/// to resynchronize the device's UART parser after reset.
const WAKEUP_SEQUENCE: [u8; 14] = [
    0x55, 0x55, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// The device's first post-reset response is unreliable by design of its
/// boot firmware; a single extra wake-up attempt resolves nearly all
/// transient failures.
const WAKEUP_ATTEMPTS: usize = 2;

/// SAMConfiguration parameters: normal mode, timeout 0x14, IRQ enabled.
const SAM_PARAMS: [u8; 3] = [0x01, 0x14, 0x01];

/// Result bytes in a GetFirmwareVersion response.
const FIRMWARE_RESPONSE_LEN: usize = 4;

/// Result bytes in an InListPassiveTarget response for one target.
const TARGET_RESPONSE_LEN: usize = 19;

/// Framing around the result bytes of a response: envelope plus TFI and
/// opcode echo.
const RESPONSE_OVERHEAD: usize = ENVELOPE_SIZE + 2;

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed but not yet woken up.
    Uninitialized,
    /// Wake-up completed; commands are accepted.
    Ready,
    /// Frame sync lost or wake-up failed; commands are refused until
    /// re-initialization.
    Faulted,
}

/// Error type for session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// [`Pn532Session::initialize`] has not succeeded yet.
    #[error("session not initialized")]
    NotInitialized,
    /// The session is faulted; re-initialize before issuing commands.
    #[error("session faulted; re-initialize before issuing commands")]
    Faulted,
    /// The device never answered the wake-up sequence.
    #[error("device did not answer wake-up")]
    WakeupFailed,
    /// The 6 bytes read where the ACK belongs were not the ACK.
    #[error("acknowledge mismatch; frame sync lost")]
    BadAck,
    /// The response frame failed validation.
    #[error("response frame invalid: {0:?}")]
    BadFrame(DecodeError),
    /// The command could not be encoded.
    #[error("command rejected: {0:?}")]
    Encode(EncodeError),
    /// The underlying transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Timing and RF parameters for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Readiness timeout for ordinary commands.
    pub command_timeout: Duration,
    /// Readiness timeout for the firmware-version probe.
    pub probe_timeout: Duration,
    /// Readiness timeout when polling for a tag; short, because "no tag"
    /// manifests as this timeout expiring.
    pub target_timeout: Duration,
    /// Pause after writing the wake-up preamble.
    pub wakeup_settle: Duration,
    /// Card baud rate selector for InListPassiveTarget; `0x00` is 106
    /// kbps ISO14443 Type A.
    pub card_baud: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_millis(1000),
            probe_timeout: Duration::from_millis(500),
            target_timeout: Duration::from_millis(100),
            wakeup_settle: Duration::from_millis(100),
            card_baud: 0x00,
        }
    }
}

/// A command session with one PN532 over one transport.
///
/// Owns the transport exclusively; the protocol is half-duplex
/// request/response and must never be driven from two execution contexts
/// at once.
pub struct Pn532Session<L, R> {
    transport: Transport<L, R>,
    config: SessionConfig,
    state: SessionState,
}

impl<L: SerialLink, R: ResetLine> Pn532Session<L, R> {
    /// Create a session over `transport`. No I/O happens until
    /// [`initialize`](Self::initialize).
    pub fn new(transport: Transport<L, R>, config: SessionConfig) -> Self {
        Self {
            transport,
            config,
            state: SessionState::Uninitialized,
        }
    }

    /// Current session state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Reset the device and bring the session to `Ready`.
    ///
    /// Runs the hardware reset sequence, then wake-up (preamble, settle,
    /// SAM configuration) followed by a firmware-version probe. If the
    /// probe fails the full wake-up is retried exactly once; a second
    /// failure latches `Faulted`.
    pub fn initialize(&mut self) -> Result<FirmwareVersion, SessionError> {
        self.state = SessionState::Uninitialized;
        self.transport.reset_sequence()?;

        let mut last_err = None;
        for attempt in 1..=WAKEUP_ATTEMPTS {
            match self.wake_up().and_then(|()| self.probe_firmware()) {
                Ok(Some(firmware)) => {
                    self.state = SessionState::Ready;
                    info!("PN532 ready, firmware {firmware}");
                    return Ok(firmware);
                }
                Ok(None) => {
                    warn!("wake-up attempt {attempt}/{WAKEUP_ATTEMPTS}: no answer to firmware probe");
                }
                Err(err) => {
                    warn!("wake-up attempt {attempt}/{WAKEUP_ATTEMPTS} failed: {err}");
                    last_err = Some(err);
                }
            }
        }

        self.state = SessionState::Faulted;
        Err(last_err.unwrap_or(SessionError::WakeupFailed))
    }

    /// Exchange one command with the device.
    ///
    /// Returns `Ok(None)` when the device gave no response within
    /// `timeout` — the normal signal for "nothing happened yet". A
    /// low-level write failure also yields `Ok(None)` after an implicit
    /// re-wake-up, since one write glitch should not kill the session.
    ///
    /// # Errors
    ///
    /// Frame corruption ([`SessionError::BadAck`],
    /// [`SessionError::BadFrame`]) latches `Faulted`; subsequent calls are
    /// refused until [`initialize`](Self::initialize) runs again.
    pub fn call(
        &mut self,
        opcode: u8,
        params: &[u8],
        expected_len: usize,
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, SessionError> {
        match self.state {
            SessionState::Ready => {}
            SessionState::Uninitialized => return Err(SessionError::NotInitialized),
            SessionState::Faulted => return Err(SessionError::Faulted),
        }

        match self.exchange(opcode, params, expected_len, timeout, true) {
            Err(err @ (SessionError::BadAck | SessionError::BadFrame(_))) => {
                warn!("protocol violation on command 0x{opcode:02X}: {err}; session faulted");
                self.state = SessionState::Faulted;
                Err(err)
            }
            other => other,
        }
    }

    /// Query the device firmware version.
    ///
    /// `Ok(None)` when the device gave no (usable) answer in time.
    pub fn firmware_version(&mut self) -> Result<Option<FirmwareVersion>, SessionError> {
        let response = self.call(
            commands::GET_FIRMWARE_VERSION,
            &[],
            FIRMWARE_RESPONSE_LEN,
            self.config.probe_timeout,
        )?;
        Ok(response.as_deref().and_then(FirmwareVersion::from_payload))
    }

    /// Poll for one passive target, returning its UID if a single tag is
    /// in the field.
    ///
    /// Every transient condition — readiness timeout, no target, short or
    /// inconsistent target data — collapses to `Ok(None)`. Callers poll
    /// this at high frequency; "no tag" must be cheap and silent.
    pub fn read_target(&mut self) -> Result<Option<TagUid>, SessionError> {
        let params = [0x01, self.config.card_baud];
        let response = self.call(
            commands::IN_LIST_PASSIVE_TARGET,
            &params,
            TARGET_RESPONSE_LEN,
            self.config.target_timeout,
        )?;
        Ok(response.as_deref().and_then(target::decode_passive_target))
    }

    /// One command/ACK/response round trip, without state bookkeeping.
    ///
    /// `rewake_on_write_failure` is false when called from inside
    /// [`wake_up`](Self::wake_up), so a dead line cannot recurse.
    fn exchange(
        &mut self,
        opcode: u8,
        params: &[u8],
        expected_len: usize,
        timeout: Duration,
        rewake_on_write_failure: bool,
    ) -> Result<Option<Vec<u8>>, SessionError> {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = frame::encode_command(&mut buf, opcode, params).map_err(SessionError::Encode)?;

        if let Err(err) = self.transport.clear_and_write(&buf[..len]) {
            if !rewake_on_write_failure {
                return Err(err.into());
            }
            warn!("command 0x{opcode:02X} write failed: {err}; re-waking device");
            if let Err(wake_err) = self.wake_up() {
                debug!("re-wake-up after write failure failed too: {wake_err}");
            }
            return Ok(None);
        }

        if !self.transport.wait_for_data(timeout)? {
            return Ok(None);
        }
        let ack = self.transport.read_exact_available(ACK_FRAME.len())?;
        if !frame::decode_ack(&ack) {
            return Err(SessionError::BadAck);
        }

        if !self.transport.wait_for_data(timeout)? {
            return Ok(None);
        }
        let raw = self
            .transport
            .read_exact_available(expected_len + RESPONSE_OVERHEAD)?;
        let payload = frame::decode_response(&raw, opcode).map_err(SessionError::BadFrame)?;
        Ok(Some(payload.to_vec()))
    }

    /// Resynchronize the device's UART parser and configure the SAM.
    ///
    /// The device will not answer other commands reliably before SAM
    /// configuration, so it is part of wake-up rather than a separate
    /// step. The SAM response itself carries no information.
    fn wake_up(&mut self) -> Result<(), SessionError> {
        self.transport.clear_and_write(&WAKEUP_SEQUENCE)?;
        thread::sleep(self.config.wakeup_settle);
        self.exchange(
            commands::SAM_CONFIGURATION,
            &SAM_PARAMS,
            0,
            self.config.command_timeout,
            false,
        )?;
        Ok(())
    }

    fn probe_firmware(&mut self) -> Result<Option<FirmwareVersion>, SessionError> {
        let response = self.exchange(
            commands::GET_FIRMWARE_VERSION,
            &[],
            FIRMWARE_RESPONSE_LEN,
            self.config.probe_timeout,
            false,
        )?;
        Ok(response.as_deref().and_then(FirmwareVersion::from_payload))
    }

    #[cfg(test)]
    pub(crate) fn transport_mut(&mut self) -> &mut Transport<L, R> {
        &mut self.transport
    }
}

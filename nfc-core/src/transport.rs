//! Raw serial transport: injected byte stream, bounded waits, reset line.
//!
//! Waiting for data is an explicit sleep-and-recheck loop with a
//! configurable interval; every wait is bounded by a caller-supplied
//! timeout, so nothing here blocks indefinitely.

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// A byte stream to the device, typically a UART.
///
/// Implementations must never block indefinitely: `read` only drains bytes
/// that are already buffered (the transport asks `available` first), and
/// any internal read timeout should be short.
pub trait SerialLink {
    /// Write all bytes to the line.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Read into `buf`, returning the number of bytes read.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Number of received bytes waiting to be read.
    fn available(&mut self) -> io::Result<usize>;

    /// Discard all received bytes that have not been read yet.
    fn clear_input(&mut self) -> io::Result<()>;
}

/// The device's hardware reset line.
///
/// A single blocking primitive: drive the line low for `low_hold`, back
/// high, then give the firmware `high_settle` to boot.
pub trait ResetLine {
    /// Pulse the reset line.
    fn pulse_reset(&mut self, low_hold: Duration, high_settle: Duration) -> io::Result<()>;
}

/// Timing parameters for the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Sleep between availability checks in [`Transport::wait_for_data`].
    pub poll_interval: Duration,
    /// How long the reset line is held low.
    pub reset_low_hold: Duration,
    /// Settle time after releasing the reset line.
    pub reset_high_settle: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            reset_low_hold: Duration::from_millis(500),
            reset_high_settle: Duration::from_millis(100),
        }
    }
}

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Zero bytes were buffered when the protocol step required at least
    /// one.
    #[error("no data available on the serial line")]
    NoData,
    /// The underlying link failed.
    #[error("serial I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Owns the serial line and the reset line.
///
/// All reads and writes for one device go through one `Transport`; the
/// protocol is half-duplex and interleaved access corrupts in-flight
/// frames.
pub struct Transport<L, R> {
    link: L,
    reset: R,
    config: TransportConfig,
}

impl<L: SerialLink, R: ResetLine> Transport<L, R> {
    /// Create a transport over an opened link and a claimed reset line.
    pub fn new(link: L, reset: R, config: TransportConfig) -> Self {
        Self {
            link,
            reset,
            config,
        }
    }

    /// Discard any unread input, then write `bytes`.
    ///
    /// Dropping stale bytes is deliberate: leftovers from a previous
    /// exchange would otherwise corrupt the next frame parse.
    pub fn clear_and_write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.link.clear_input()?;
        self.link.write(bytes)?;
        Ok(())
    }

    /// Read up to `max` bytes that are already buffered.
    ///
    /// Returns fewer bytes than `max` when fewer are available; fails with
    /// [`TransportError::NoData`] when nothing is buffered at all. Never
    /// waits for more data to arrive.
    pub fn read_exact_available(&mut self, max: usize) -> Result<Vec<u8>, TransportError> {
        let available = self.link.available()?;
        let count = available.min(max);
        if count == 0 {
            return Err(TransportError::NoData);
        }
        let mut buf = vec![0u8; count];
        let n = self.link.read(&mut buf)?;
        buf.truncate(n);
        if buf.is_empty() {
            return Err(TransportError::NoData);
        }
        Ok(buf)
    }

    /// Busy-poll until data is buffered or `timeout` elapses.
    ///
    /// Returns whether data became available. Checks at least once, so a
    /// zero timeout still observes already-buffered bytes.
    pub fn wait_for_data(&mut self, timeout: Duration) -> Result<bool, TransportError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.link.available()? > 0 {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            thread::sleep(self.config.poll_interval);
        }
    }

    /// Pulse the reset line with the configured hold intervals.
    pub fn reset_sequence(&mut self) -> Result<(), TransportError> {
        self.reset
            .pulse_reset(self.config.reset_low_hold, self.config.reset_high_settle)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    #[cfg(test)]
    pub(crate) fn reset_mut(&mut self) -> &mut R {
        &mut self.reset
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted link and reset line for session tests.

    use super::*;
    use std::collections::VecDeque;

    /// A `SerialLink` that replays scripted device responses.
    ///
    /// Each write consumes the next response script entry; its bytes
    /// become available for reading. Writes and clears are recorded for
    /// assertions.
    #[derive(Default)]
    pub struct MockLink {
        /// Bytes currently readable.
        pub rx: VecDeque<u8>,
        /// Every write, in order.
        pub writes: Vec<Vec<u8>>,
        /// Queue of canned responses; one entry is drained per write.
        pub responses: VecDeque<Vec<u8>>,
        /// Number of `clear_input` calls.
        pub clears: usize,
        /// When set, `write` fails with this error kind.
        pub write_error: Option<io::ErrorKind>,
    }

    impl MockLink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue the device reaction to the next write.
        pub fn push_response(&mut self, bytes: &[u8]) {
            self.responses.push_back(bytes.to_vec());
        }
    }

    impl SerialLink for MockLink {
        fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
            if let Some(kind) = self.write_error {
                return Err(io::Error::from(kind));
            }
            self.writes.push(bytes.to_vec());
            if let Some(response) = self.responses.pop_front() {
                self.rx.extend(response);
            }
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.rx.len());
            for slot in buf.iter_mut().take(n) {
                *slot = self.rx.pop_front().unwrap_or(0);
            }
            Ok(n)
        }

        fn available(&mut self) -> io::Result<usize> {
            Ok(self.rx.len())
        }

        fn clear_input(&mut self) -> io::Result<()> {
            self.clears += 1;
            self.rx.clear();
            Ok(())
        }
    }

    /// A `ResetLine` that counts pulses.
    #[derive(Default)]
    pub struct MockReset {
        pub pulses: usize,
    }

    impl ResetLine for MockReset {
        fn pulse_reset(&mut self, _low_hold: Duration, _high_settle: Duration) -> io::Result<()> {
            self.pulses += 1;
            Ok(())
        }
    }

    /// A transport over mocks with near-zero timings so tests run fast.
    pub fn mock_transport(link: MockLink) -> Transport<MockLink, MockReset> {
        let config = TransportConfig {
            poll_interval: Duration::from_micros(10),
            reset_low_hold: Duration::ZERO,
            reset_high_settle: Duration::ZERO,
        };
        Transport::new(link, MockReset::default(), config)
    }
}

//! Serial port access for the reader.
//!
//! Adapts a [`serialport`] handle to the engine's [`SerialLink`] trait.
//! The port timeout is kept short; the engine does its own readiness
//! polling and only reads bytes it already knows are buffered.

use std::io::{self, Read, Write};
use std::time::Duration;

use nfc_core::SerialLink;
use serialport::{ClearBuffer, SerialPort};

/// Per-syscall timeout on the port itself. Reads are issued only after
/// the engine saw bytes pending, so this never governs protocol timing.
const PORT_TIMEOUT: Duration = Duration::from_millis(100);

/// A live serial connection to the reader.
pub struct TtyLink {
    port: Box<dyn SerialPort>,
}

impl TtyLink {
    /// Open `path` at `baud_rate`, 8N1.
    pub fn open(path: &str, baud_rate: u32) -> serialport::Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(PORT_TIMEOUT)
            .open()?;
        Ok(Self { port })
    }
}

impl SerialLink for TtyLink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }

    fn available(&mut self) -> io::Result<usize> {
        self.port
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(io::Error::other)
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.port
            .clear(ClearBuffer::Input)
            .map_err(io::Error::other)
    }
}

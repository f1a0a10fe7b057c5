//! Reset pin control via the Pi's GPIO header.

use std::io;
use std::thread;
use std::time::Duration;

use nfc_core::ResetLine;
use rppal::gpio::{Gpio, OutputPin};

/// The reader's RSTPD_N line on a GPIO output pin. Active low; the pin
/// idles high so the reader runs.
pub struct GpioResetLine {
    pin: OutputPin,
}

impl GpioResetLine {
    /// Claim the BCM-numbered `pin` and drive it high.
    pub fn new(pin: u8) -> rppal::gpio::Result<Self> {
        let mut pin = Gpio::new()?.get(pin)?.into_output();
        pin.set_high();
        Ok(Self { pin })
    }
}

impl ResetLine for GpioResetLine {
    fn pulse_reset(&mut self, low_hold: Duration, high_settle: Duration) -> io::Result<()> {
        self.pin.set_low();
        thread::sleep(low_hold);
        self.pin.set_high();
        thread::sleep(high_settle);
        Ok(())
    }
}

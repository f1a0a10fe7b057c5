//! Daemon configuration from the environment.

use std::env;
use std::time::Duration;

/// Runtime configuration. Every field has a default that matches the
/// common wiring (Pi UART header, reader reset on BCM 20).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Serial device the reader is attached to.
    pub device: String,
    /// UART baud rate; the PN532's HSU default.
    pub baud_rate: u32,
    /// BCM number of the GPIO pin wired to the reader's reset line.
    pub reset_pin: u8,
    /// Consecutive missed polls before a tag counts as removed.
    pub debounce_threshold: u32,
    /// Pause between poll cycles.
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: "/dev/ttyS0".to_string(),
            baud_rate: 115_200,
            reset_pin: 20,
            debounce_threshold: 3,
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl Config {
    /// Build a configuration from `NFC_*` environment variables, falling
    /// back to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            device: env::var("NFC_DEVICE").unwrap_or(defaults.device),
            baud_rate: parse_var("NFC_BAUD_RATE", defaults.baud_rate),
            reset_pin: parse_var("NFC_RESET_PIN", defaults.reset_pin),
            debounce_threshold: parse_var("NFC_DEBOUNCE_THRESHOLD", defaults.debounce_threshold),
            poll_interval: Duration::from_millis(parse_var(
                "NFC_POLL_INTERVAL_MS",
                defaults.poll_interval.as_millis() as u64,
            )),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match parse_value(&raw) {
            Some(value) => value,
            None => {
                log::warn!("ignoring unparsable {name}={raw:?}");
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_value<T: std::str::FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

//! Tag-presence daemon.
//!
//! Opens the serial port and reset pin, brings the reader up, then runs a
//! single polling thread and logs presence edges along with any content
//! registered for the tag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::Context;
use log::{info, warn};

use nfc_core::{
    Pn532Session, PresenceEvent, SessionConfig, TagMonitor, TagPresenceTracker, Transport,
    TransportConfig,
};
use nfc_display::{Config, GpioResetLine, StaticLookup, TagLookup, TtyLink};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    info!(
        "starting on {} at {} baud, reset on BCM {}",
        config.device, config.baud_rate, config.reset_pin
    );

    let link = TtyLink::open(&config.device, config.baud_rate)
        .with_context(|| format!("opening serial port {}", config.device))?;
    let reset = GpioResetLine::new(config.reset_pin)
        .with_context(|| format!("claiming GPIO pin {}", config.reset_pin))?;

    let transport = Transport::new(link, reset, TransportConfig::default());
    let session = Pn532Session::new(transport, SessionConfig::default());
    let tracker = TagPresenceTracker::new(config.debounce_threshold);
    let mut monitor = TagMonitor::new(session, tracker);

    let firmware = monitor
        .initialize()
        .context("bringing up the PN532 reader")?;
    info!("reader online, firmware {firmware}");

    let lookup = StaticLookup::new();

    let (events_tx, events_rx) = mpsc::channel();
    let poller = nfc_display::poller::spawn(monitor, config.poll_interval, events_tx)
        .context("spawning poller thread")?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::Relaxed))
            .context("installing signal handler")?;
    }

    while running.load(Ordering::Relaxed) {
        let event = match events_rx.recv_timeout(Duration::from_millis(200)) {
            Ok(event) => event,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                warn!("poller stopped unexpectedly");
                break;
            }
        };
        match event {
            PresenceEvent::TagAppeared(uid) => match lookup.lookup(&uid.to_string()) {
                Some(content) => info!("tag {uid}: showing {}", content.display_name),
                None => info!("tag {uid}: no content registered"),
            },
            PresenceEvent::TagChanged { previous, current } => {
                match lookup.lookup(&current.to_string()) {
                    Some(content) => {
                        info!("tag {previous} replaced by {current}: showing {}", content.display_name)
                    }
                    None => info!("tag {previous} replaced by {current}: no content registered"),
                }
            }
            PresenceEvent::TagRemoved(uid) => info!("tag {uid} removed"),
        }
    }

    info!("shutting down");
    poller.shutdown();
    Ok(())
}

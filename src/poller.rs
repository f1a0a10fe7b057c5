//! The single polling thread that owns the reader.
//!
//! The PN532 protocol is half-duplex, so exactly one thread drives the
//! [`TagMonitor`]. Everything else in the process sees the reader through
//! two outlets: an [`mpsc`] stream of [`PresenceEvent`]s and a shared
//! snapshot of the latest [`PresenceState`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{info, warn};

use nfc_core::{PresenceEvent, PresenceState, ResetLine, SerialLink, TagMonitor};

/// Pause before retrying initialization after a session fault.
const REINIT_BACKOFF: Duration = Duration::from_secs(2);

/// Handle to a running poller thread.
pub struct PollerHandle {
    presence: Arc<Mutex<PresenceState>>,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Latest debounced presence, as of the most recent completed poll.
    pub fn presence(&self) -> PresenceState {
        *self
            .presence
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Stop the poller and wait for the in-flight poll to finish. Polls
    /// are bounded by their timeouts, so this returns promptly.
    pub fn shutdown(mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("poller thread panicked during shutdown");
            }
        }
    }
}

/// Spawn the polling thread over an already-initialized `monitor`.
///
/// Events go to `events`; the loop also ends if the receiving side is
/// dropped. On a session error the poller re-initializes the reader
/// itself, backing off between attempts.
pub fn spawn<L, R>(
    mut monitor: TagMonitor<L, R>,
    poll_interval: Duration,
    events: Sender<PresenceEvent>,
) -> std::io::Result<PollerHandle>
where
    L: SerialLink + Send + 'static,
    R: ResetLine + Send + 'static,
{
    let presence = Arc::new(Mutex::new(monitor.presence()));
    let shutdown = Arc::new(AtomicBool::new(false));

    let thread = thread::Builder::new().name("nfc-poller".to_string()).spawn({
        let presence = Arc::clone(&presence);
        let shutdown = Arc::clone(&shutdown);
        move || {
            while !shutdown.load(Ordering::Relaxed) {
                match monitor.poll() {
                    Ok(event) => {
                        *presence.lock().unwrap_or_else(PoisonError::into_inner) =
                            monitor.presence();
                        if let Some(event) = event {
                            if events.send(event).is_err() {
                                info!("event receiver gone, poller stopping");
                                return;
                            }
                        }
                    }
                    Err(err) => {
                        warn!("poll failed: {err}; re-initializing reader");
                        thread::sleep(REINIT_BACKOFF);
                        if shutdown.load(Ordering::Relaxed) {
                            return;
                        }
                        match monitor.initialize() {
                            Ok(firmware) => info!("reader recovered, firmware {firmware}"),
                            Err(init_err) => warn!("re-initialization failed: {init_err}"),
                        }
                    }
                }
                thread::sleep(poll_interval);
            }
        }
    })?;

    Ok(PollerHandle {
        presence,
        shutdown,
        thread: Some(thread),
    })
}

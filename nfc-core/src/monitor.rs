//! Glue between the command session and the presence tracker.
//!
//! [`TagMonitor`] owns both halves and turns "poll the reader once" into
//! "tell me what changed". Hosts drive [`poll`](TagMonitor::poll) from a
//! single loop at whatever cadence suits them.

use log::debug;

use pn532_proto::FirmwareVersion;

use crate::session::{Pn532Session, SessionError};
use crate::tracker::{PresenceEvent, PresenceState, TagPresenceTracker};
use crate::transport::{ResetLine, SerialLink};

/// A polling monitor over one reader.
pub struct TagMonitor<L, R> {
    session: Pn532Session<L, R>,
    tracker: TagPresenceTracker,
}

impl<L: SerialLink, R: ResetLine> TagMonitor<L, R> {
    pub fn new(session: Pn532Session<L, R>, tracker: TagPresenceTracker) -> Self {
        Self { session, tracker }
    }

    /// Reset and wake the reader. Must succeed before [`poll`](Self::poll)
    /// produces anything but errors.
    pub fn initialize(&mut self) -> Result<FirmwareVersion, SessionError> {
        self.session.initialize()
    }

    /// Run one poll cycle: read the field, feed the tracker, return the
    /// presence edge if this cycle produced one.
    ///
    /// Session errors pass through untouched; the tracker is only fed
    /// results the session actually produced, so a faulted session cannot
    /// fabricate a removal.
    pub fn poll(&mut self) -> Result<Option<PresenceEvent>, SessionError> {
        let read = self.session.read_target()?;
        let event = self.tracker.update(read);
        if let Some(event) = &event {
            debug!("presence edge: {event:?}");
        }
        Ok(event)
    }

    /// Current debounced presence.
    #[inline]
    #[must_use]
    pub fn presence(&self) -> PresenceState {
        self.tracker.presence()
    }

    /// Access the underlying session, e.g. for state inspection.
    #[inline]
    pub fn session(&self) -> &Pn532Session<L, R> {
        &self.session
    }
}

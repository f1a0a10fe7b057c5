//! Debounced tag presence tracking.
//!
//! Raw poll results flicker: a tag sitting still on the antenna reads
//! fine most polls and misses occasionally, and the brief gap while a tag
//! is swapped must not read as removal plus arrival of nothing. The
//! tracker turns the raw `Option<TagUid>` stream into clean edge events
//! by requiring several consecutive misses before a removal, while
//! arrivals and swaps fire immediately.

use pn532_proto::TagUid;

/// What the tracker currently believes about the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    /// No tag believed present.
    Absent,
    /// This tag believed present.
    Present(TagUid),
}

/// An edge in tag presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceEvent {
    /// A tag entered an empty field.
    TagAppeared(TagUid),
    /// The tag in the field was replaced by a different one. Fires
    /// immediately, without an intermediate removal.
    TagChanged { previous: TagUid, current: TagUid },
    /// The tag left the field and stayed gone long enough to believe it.
    TagRemoved(TagUid),
}

/// Debounce state machine over raw poll results.
///
/// Feed every poll result to [`update`](Self::update), including the
/// `None`s. Removal is reported only after `threshold` *consecutive*
/// misses; any successful read in between resets the count.
#[derive(Debug, Clone)]
pub struct TagPresenceTracker {
    state: PresenceState,
    misses: u32,
    threshold: u32,
}

impl TagPresenceTracker {
    /// Create a tracker that reports removal after `threshold` consecutive
    /// misses. A threshold of zero is treated as one; removal can never
    /// precede a miss.
    #[must_use]
    pub fn new(threshold: u32) -> Self {
        Self {
            state: PresenceState::Absent,
            misses: 0,
            threshold: threshold.max(1),
        }
    }

    /// Current debounced belief. During the miss window this still says
    /// `Present`.
    #[inline]
    #[must_use]
    pub fn presence(&self) -> PresenceState {
        self.state
    }

    /// Feed one poll result; returns the edge event it produced, if any.
    pub fn update(&mut self, read: Option<TagUid>) -> Option<PresenceEvent> {
        match (self.state, read) {
            (PresenceState::Absent, Some(uid)) => {
                self.state = PresenceState::Present(uid);
                self.misses = 0;
                Some(PresenceEvent::TagAppeared(uid))
            }
            (PresenceState::Present(current), Some(uid)) if uid != current => {
                self.state = PresenceState::Present(uid);
                self.misses = 0;
                Some(PresenceEvent::TagChanged {
                    previous: current,
                    current: uid,
                })
            }
            (PresenceState::Present(_), Some(_)) => {
                self.misses = 0;
                None
            }
            (PresenceState::Present(uid), None) => {
                self.misses += 1;
                if self.misses >= self.threshold {
                    self.state = PresenceState::Absent;
                    self.misses = 0;
                    Some(PresenceEvent::TagRemoved(uid))
                } else {
                    None
                }
            }
            (PresenceState::Absent, None) => None,
        }
    }
}

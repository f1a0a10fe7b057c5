//! Passive-target response decoding and tag UIDs.

use core::fmt;

/// Longest UID the PN532 reports (triple-size ISO14443A).
pub const UID_MAX_LEN: usize = 10;

/// Offset of the UID-length byte in an InListPassiveTarget result.
const UID_LENGTH_OFFSET: usize = 5;

/// A tag UID as reported by the device: 4, 7 or 10 significant bytes.
///
/// Stored inline so the type is `Copy` and never borrows from a read
/// buffer; the protocol layer hands it off and retains nothing.
///
/// `Display` renders the colon-separated uppercase hex form used as the
/// lookup key, e.g. `04:A2:2F:B1`.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TagUid {
    bytes: [u8; UID_MAX_LEN],
    len: u8,
}

impl TagUid {
    /// Create a UID from the significant bytes.
    ///
    /// Returns `None` for an empty slice or one longer than
    /// [`UID_MAX_LEN`].
    #[must_use]
    pub fn new(uid: &[u8]) -> Option<Self> {
        if uid.is_empty() || uid.len() > UID_MAX_LEN {
            return None;
        }
        let mut bytes = [0u8; UID_MAX_LEN];
        bytes[..uid.len()].copy_from_slice(uid);
        Some(Self {
            bytes,
            len: uid.len() as u8,
        })
    }

    /// The significant UID bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Number of significant bytes (4, 7 or 10 on real tags).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Always false; [`TagUid::new`] rejects empty UIDs.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Display for TagUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for TagUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TagUid({self})")
    }
}

/// Extract the tag UID from an InListPassiveTarget result payload.
///
/// The payload layout is `[count, tg, SENS_RES(2), SEL_RES, uid_len,
/// uid...]`. Returns `None` — never an error — when:
///
/// - the target count is anything other than exactly 1 (zero and
///   multi-target responses are both treated as "no tag")
/// - the payload is too short to contain the UID-length byte and the UID
///   it announces
/// - the announced UID length is zero or impossibly large
///
/// Partial or garbled reads under RF noise are expected during polling and
/// must never surface as failures.
#[must_use]
pub fn decode_passive_target(payload: &[u8]) -> Option<TagUid> {
    if payload.len() < 2 || payload[0] != 0x01 {
        return None;
    }
    if payload.len() <= UID_LENGTH_OFFSET {
        return None;
    }
    let uid_len = payload[UID_LENGTH_OFFSET] as usize;
    if uid_len == 0 || uid_len > UID_MAX_LEN {
        return None;
    }
    let uid_start = UID_LENGTH_OFFSET + 1;
    if payload.len() < uid_start + uid_len {
        return None;
    }
    TagUid::new(&payload[uid_start..uid_start + uid_len])
}

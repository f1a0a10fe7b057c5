//! Mapping from tag UIDs to display content.
//!
//! The daemon itself only cares that *some* content is associated with a
//! UID; where that association lives is the caller's business, behind
//! [`TagLookup`]. The in-memory [`StaticLookup`] covers kiosk-style
//! deployments with a fixed tag set.

use std::collections::HashMap;

/// Content associated with one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagContent {
    /// What to show, e.g. a URL or a media path.
    pub content_ref: String,
    /// Human-readable label for logs.
    pub display_name: String,
}

/// Resolves a tag UID (colon-hex form) to its content.
pub trait TagLookup {
    fn lookup(&self, uid: &str) -> Option<TagContent>;
}

/// A fixed UID-to-content table.
#[derive(Debug, Default)]
pub struct StaticLookup {
    entries: HashMap<String, TagContent>,
}

impl StaticLookup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register content for `uid`. Replaces any earlier entry.
    pub fn insert(&mut self, uid: &str, content: TagContent) {
        self.entries.insert(uid.to_uppercase(), content);
    }
}

impl TagLookup for StaticLookup {
    fn lookup(&self, uid: &str) -> Option<TagContent> {
        self.entries.get(&uid.to_uppercase()).cloned()
    }
}

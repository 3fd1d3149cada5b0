//! Snapshots of the data layer consumed by the view.
//!
//! The mediator never owns messages or threads. It reads these snapshots,
//! which the data layer pushes whenever something changes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Global counter for generating unique view IDs.
static VIEW_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a thread view.
///
/// IDs are monotonically increasing and unique within a process. Bus
/// subscribers use them to tell which view a notification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(pub u64);

impl ViewId {
    /// Generates a new unique view ID.
    pub fn new() -> Self {
        ViewId(VIEW_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

/// Message identifier. Higher ids are newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Thread identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a thread cache (a thread + a message filter).
///
/// Two snapshots with the same `CacheId` describe the same cache, possibly
/// at different versions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheId(pub String);

impl CacheId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for CacheId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Partner identifier (invitation candidates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartnerId(pub u64);

/// A message as reported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: MessageId,
}

impl MessageRef {
    pub fn new(id: u64) -> Self {
        Self { id: MessageId(id) }
    }
}

/// Snapshot of the cache currently displayed by a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub id: CacheId,
    pub thread_id: ThreadId,
    #[serde(default)]
    pub is_loading: bool,
    /// Loaded messages, oldest first.
    #[serde(default)]
    pub message_ids: Vec<MessageId>,
    /// Loaded messages that have displayable content.
    #[serde(default)]
    pub non_empty_message_ids: Vec<MessageId>,
}

impl CacheSnapshot {
    /// Creates an empty, non-loading snapshot.
    pub fn new(id: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self {
            id: CacheId::new(id),
            thread_id: ThreadId::new(thread_id),
            is_loading: false,
            message_ids: Vec::new(),
            non_empty_message_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }
}

/// Snapshot of the thread displayed by a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSnapshot {
    pub id: ThreadId,
    /// Whether the thread supports inviting partners (channels).
    #[serde(default)]
    pub has_invite_feature: bool,
    /// Newest message of the thread, transient ones included.
    #[serde(default)]
    pub last_message: Option<MessageId>,
    /// Newest message that is not transient (e.g. not a bot notice).
    #[serde(default)]
    pub last_non_transient_message: Option<MessageId>,
}

impl ThreadSnapshot {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ThreadId::new(id),
            has_invite_feature: false,
            last_message: None,
            last_non_transient_message: None,
        }
    }
}

/// Device the view is rendered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Device {
    pub is_mobile: bool,
}

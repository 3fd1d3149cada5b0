//! Component hints.
//!
//! A hint tells the renderer that something around the view changed and
//! that it may need to adjust (scroll to bottom, keep position, ...). Hints
//! are advice, not commands: the renderer decides what to do with them.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Identity of a queued hint.
///
/// Two hints with equal kind and data are still distinct if their ids
/// differ; removal always matches on id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HintId(pub u64);

/// Broad type of adjustment a hint suggests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HintKind {
    /// The displayed cache was replaced.
    ChangeOfSource,
    /// A new message arrived in the displayed thread.
    MessageReceived,
    /// The initial page of messages finished loading.
    MessagesLoaded,
    /// An older page of messages finished loading.
    MoreMessagesLoaded,
    /// The current user posted a message.
    MessagePosted,
    /// Any renderer-defined kind.
    Custom(String),
}

impl HintKind {
    pub fn as_str(&self) -> &str {
        match self {
            HintKind::ChangeOfSource => "change-of-source",
            HintKind::MessageReceived => "message-received",
            HintKind::MessagesLoaded => "messages-loaded",
            HintKind::MoreMessagesLoaded => "more-messages-loaded",
            HintKind::MessagePosted => "message-posted",
            HintKind::Custom(kind) => kind,
        }
    }

    /// Parses a kind from its string form. Unknown strings become `Custom`.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "change-of-source" => HintKind::ChangeOfSource,
            "message-received" => HintKind::MessageReceived,
            "messages-loaded" => HintKind::MessagesLoaded,
            "more-messages-loaded" => HintKind::MoreMessagesLoaded,
            "message-posted" => HintKind::MessagePosted,
            other => HintKind::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for HintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HintKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HintKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let kind = Cow::<'de, str>::deserialize(deserializer)?;
        Ok(HintKind::parse(&kind))
    }
}

/// A queued hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    pub id: HintId,
    pub kind: HintKind,
    /// Data used to fine-tune the adjustment (e.g. a message id to scroll to).
    #[serde(default)]
    pub data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_kind_string_forms() {
        assert_eq!(HintKind::ChangeOfSource.as_str(), "change-of-source");
        assert_eq!(HintKind::parse("message-received"), HintKind::MessageReceived);
        assert_eq!(
            HintKind::parse("highlight-message"),
            HintKind::Custom("highlight-message".to_string())
        );
    }

    #[test]
    fn test_hint_serializes_kind_as_string() {
        let hint = Hint {
            id: HintId(3),
            kind: HintKind::MoreMessagesLoaded,
            data: Value::Null,
        };
        let json = serde_json::to_value(&hint).unwrap();
        assert_eq!(json["kind"], "more-messages-loaded");
        assert_eq!(json["id"], 3);
    }
}

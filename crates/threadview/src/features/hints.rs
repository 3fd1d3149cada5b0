//! Component hint queue.
//!
//! Hints are appended by the view (and by renderer-side code through the
//! view) and removed one by one by the renderer once handled. Removal
//! matches on `HintId`, so duplicate `{kind, data}` pairs stay independent.

use serde_json::Value;
use threadview_core::hint::{Hint, HintId, HintKind};

#[derive(Debug, Default)]
pub struct HintQueue {
    hints: Vec<Hint>,
    next_id: u64,
}

impl HintQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hint and returns it.
    pub fn add(&mut self, kind: HintKind, data: Value) -> Hint {
        let hint = Hint {
            id: HintId(self.next_id),
            kind,
            data,
        };
        self.next_id = self.next_id.wrapping_add(1);
        self.hints.push(hint.clone());
        hint
    }

    /// Removes the hint with `id`. Returns false if it was no longer queued.
    pub fn mark_processed(&mut self, id: HintId) -> bool {
        let Some(pos) = self.hints.iter().position(|h| h.id == id) else {
            return false;
        };
        self.hints.remove(pos);
        true
    }

    /// Drops every queued hint. Ids keep increasing, so a cleared hint can
    /// never be confused with a later one.
    pub fn clear(&mut self) {
        self.hints.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hint> {
        self.hints.iter()
    }

    pub fn as_slice(&self) -> &[Hint] {
        &self.hints
    }

    pub fn len(&self) -> usize {
        self.hints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_add_keeps_order_and_duplicates() {
        let mut queue = HintQueue::new();
        queue.add(HintKind::MessageReceived, json!({"message_id": 1}));
        queue.add(HintKind::MessageReceived, json!({"message_id": 1}));
        queue.add(HintKind::MessagesLoaded, Value::Null);

        let kinds: Vec<_> = queue.iter().map(|h| h.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["message-received", "message-received", "messages-loaded"]
        );
    }

    #[test]
    fn test_mark_processed_removes_exactly_one_duplicate() {
        let mut queue = HintQueue::new();
        let first = queue.add(HintKind::MessageReceived, json!(1));
        let second = queue.add(HintKind::MessageReceived, json!(1));

        assert!(queue.mark_processed(second.id));
        assert_eq!(queue.as_slice(), &[first]);
    }

    #[test]
    fn test_mark_processed_is_idempotent() {
        let mut queue = HintQueue::new();
        let hint = queue.add(HintKind::MessagePosted, Value::Null);
        assert!(queue.mark_processed(hint.id));
        assert!(!queue.mark_processed(hint.id));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_cleared_hint_is_no_longer_listed() {
        let mut queue = HintQueue::new();
        let stale = queue.add(HintKind::MessagesLoaded, Value::Null);
        queue.clear();
        let fresh = queue.add(HintKind::MessagesLoaded, Value::Null);

        assert_ne!(stale.id, fresh.id);
        assert!(!queue.mark_processed(stale.id));
        assert_eq!(queue.len(), 1);
    }
}

//! Read receipt arbitration.
//!
//! Decides whether the thread's last non-transient message should be marked
//! as seen. The decision is pure; the request itself is an effect.

use threadview_core::model::{MessageId, ThreadId};

/// Everything the arbiter looks at.
#[derive(Debug, Clone, Copy)]
pub struct SeenInputs<'a> {
    pub thread: Option<&'a ThreadId>,
    pub last_message: Option<MessageId>,
    pub last_non_transient_message: Option<MessageId>,
    pub last_visible_message: Option<MessageId>,
    pub composer_has_focus: bool,
}

/// A read receipt to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub thread: ThreadId,
    pub message: MessageId,
}

/// Returns the receipt to send, if the user is caught up on a focused view.
pub fn arbitrate(inputs: SeenInputs<'_>) -> Option<SeenRequest> {
    let thread = inputs.thread?;
    let message = inputs.last_non_transient_message?;
    let visible = inputs.last_visible_message?;
    if Some(visible) != inputs.last_message {
        return None;
    }
    // Focus stands in for "the view is active".
    if !inputs.composer_has_focus {
        return None;
    }
    Some(SeenRequest {
        thread: thread.clone(),
        message,
    })
}

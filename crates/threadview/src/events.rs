//! View events.
//!
//! Every input to the view is an event: signals from the data layer,
//! renderer calls, and results of async work the runtime spawned.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use threadview_core::hint::{Hint, HintKind};
use threadview_core::model::{CacheId, CacheSnapshot, Device, MessageRef, PartnerId, ThreadSnapshot};

use crate::common::TimerId;
use crate::features::scroll::ScrollOffset;

/// A change of one external input.
///
/// A `Vec<Signal>` is committed as one batch: every signal is applied
/// before derived fields and reactions run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", content = "value", rename_all = "snake_case")]
pub enum Signal {
    /// The cache displayed by the view (new identity or new version).
    SourceCache(Option<CacheSnapshot>),
    /// The thread displayed by the view.
    Thread(Option<ThreadSnapshot>),
    Device(Option<Device>),
    ComposerFocus(bool),
    /// Whether the owner of the view wants a top bar.
    ViewerTopbar(bool),
}

#[derive(Debug, Clone)]
pub enum ViewEvent {
    /// A batch of input changes.
    Signals(Vec<Signal>),

    /// Renderer: queue a hint.
    AddHint { kind: HintKind, data: Value },

    /// Renderer: a hint was handled. The hint may already be gone from the
    /// queue (cleared by a cache change); it is still reported.
    HintProcessed { hint: Hint },

    /// Renderer: a message became visible.
    VisibleMessage(MessageRef),

    /// Renderer: scroll state of a cache (`None` means the current cache).
    ScrollRecorded {
        cache: Option<CacheId>,
        height: Option<ScrollOffset>,
        position: Option<ScrollOffset>,
    },

    /// Renderer: toggle auto-scroll on received messages.
    SetAutoScroll(bool),

    /// Renderer: partner search results for the invitation form.
    InvitationSearch {
        term: String,
        results: Vec<PartnerId>,
    },

    /// Renderer: toggle a partner in the invitation form.
    InvitationToggle { partner: PartnerId },

    /// Runtime: the loader timer elapsed.
    LoaderTimerElapsed { timer: TimerId },

    /// The view is being torn down.
    Destroy,
}

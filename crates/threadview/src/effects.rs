//! View effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O, timers and notifications only; the reducer never
//! performs them directly.
//!
//! ## Cancellation
//!
//! Tokens travel inside the effects. The runtime cancels them on
//! `CancelTask` and races timers against them, so the reducer decides what
//! to cancel while the runtime executes it.

use std::time::Duration;

use threadview_core::hint::Hint;
use threadview_core::model::{CacheId, MessageId, ThreadId};
use tokio_util::sync::CancellationToken;

use crate::common::TimerId;

#[derive(Debug)]
pub enum ViewEffect {
    /// Fire `LoaderTimerElapsed { timer }` after `delay` unless `cancel` fires first.
    StartLoaderTimer {
        timer: TimerId,
        delay: Duration,
        cancel: CancellationToken,
    },

    /// Cancel a pending timer or the whole view.
    CancelTask { token: CancellationToken },

    /// Ask the data layer to reload the cache.
    RequestCacheRefresh { cache: CacheId },

    /// Ask the data layer to mark every message of the cache as read.
    RequestMarkAllAsRead { cache: CacheId },

    /// Persist a read receipt. `token` is the view's lifetime token; a result
    /// arriving after it was cancelled is discarded.
    MarkAsSeen {
        thread: ThreadId,
        message: MessageId,
        token: CancellationToken,
    },

    /// Announce on the bus that a hint was processed.
    PublishHintProcessed { hint: Hint },
}

//! Effect handlers.
//!
//! Pure async functions performing the I/O behind effects. They never touch
//! view state; the runtime spawns them and routes their results.

use std::sync::Arc;
use std::time::Duration;

use threadview_core::data::DataLayer;
use threadview_core::model::{MessageId, ThreadId};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::ViewError;
use crate::common::TimerId;
use crate::events::ViewEvent;

/// Waits `delay`, unless `cancel` fires first.
///
/// Returns the firing event, or `None` when cancelled.
pub async fn loader_timer(
    timer: TimerId,
    delay: Duration,
    cancel: CancellationToken,
) -> Option<ViewEvent> {
    tokio::select! {
        () = cancel.cancelled() => {
            debug!(?timer, "loader timer cancelled");
            None
        }
        () = tokio::time::sleep(delay) => Some(ViewEvent::LoaderTimerElapsed { timer }),
    }
}

/// Sends a read receipt.
///
/// The request is not cancelled with the view. When it completes after the
/// view was destroyed (`token` cancelled), the outcome is discarded whatever
/// it is; otherwise a failure is returned for the unhandled-error channel.
pub async fn mark_as_seen(
    data: Arc<dyn DataLayer>,
    thread: ThreadId,
    message: MessageId,
    token: CancellationToken,
) -> Option<ViewError> {
    let result = data.mark_as_seen(thread.clone(), message).await;
    if token.is_cancelled() {
        debug!(%thread, %message, ?result, "view destroyed during mark-as-seen, dropping result");
        return None;
    }
    result
        .err()
        .map(|source| ViewError::MarkAsSeen {
            thread,
            message,
            source,
        })
}

#[cfg(test)]
mod tests {
    use threadview_core::data::{DataError, RecordingDataLayer};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_loader_timer_fires_after_delay() {
        let event = loader_timer(
            TimerId(3),
            Duration::from_millis(400),
            CancellationToken::new(),
        )
        .await;
        assert!(matches!(
            event,
            Some(ViewEvent::LoaderTimerElapsed { timer: TimerId(3) })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loader_timer_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let event = loader_timer(TimerId(1), Duration::from_millis(400), cancel).await;
        assert!(event.is_none());
    }

    #[tokio::test]
    async fn test_mark_as_seen_failure_is_reported() {
        let data = RecordingDataLayer::new();
        data.fail_mark_as_seen(DataError::Request("offline".into()));

        let error = mark_as_seen(
            Arc::new(data),
            ThreadId::new("general"),
            MessageId(5),
            CancellationToken::new(),
        )
        .await;
        assert!(matches!(error, Some(ViewError::MarkAsSeen { message: MessageId(5), .. })));
    }

    #[tokio::test]
    async fn test_mark_as_seen_failure_after_destroy_is_swallowed() {
        let data = RecordingDataLayer::new();
        data.fail_mark_as_seen(DataError::RecordDeleted("general".into()));
        let token = CancellationToken::new();
        token.cancel();

        let error = mark_as_seen(Arc::new(data.clone()), ThreadId::new("general"), MessageId(5), token).await;
        assert!(error.is_none());
        assert_eq!(data.seen_requests().len(), 1);
    }
}

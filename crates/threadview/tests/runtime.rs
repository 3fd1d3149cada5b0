use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use serde_json::{Value, json};
use threadview::scroll::ScrollMemory;
use threadview::{Signal, ViewError, ViewEvent, ViewRuntime};
use threadview_core::bus::{BusEvent, HintBus};
use threadview_core::config::ViewConfig;
use threadview_core::data::{DataError, DataLayer, DataRequest, RecordingDataLayer};
use threadview_core::hint::HintKind;
use threadview_core::model::{
    CacheId, CacheSnapshot, MessageId, MessageRef, ThreadId, ThreadSnapshot,
};

fn runtime_with(data: Arc<dyn DataLayer>) -> ViewRuntime {
    ViewRuntime::new(
        ViewConfig::default(),
        ScrollMemory::new(),
        data,
        HintBus::default(),
    )
    .unwrap()
}

fn cache(id: &str, is_loading: bool) -> Signal {
    Signal::SourceCache(Some(CacheSnapshot::new(id, "general").loading(is_loading)))
}

fn caught_up(runtime: &mut ViewRuntime) {
    runtime.apply(vec![
        cache("general/all", false),
        Signal::Thread(Some(ThreadSnapshot {
            last_message: Some(MessageId(10)),
            last_non_transient_message: Some(MessageId(10)),
            ..ThreadSnapshot::new("general")
        })),
        Signal::ComposerFocus(true),
    ]);
    runtime.handle_visible_message(MessageRef::new(10));
}

#[tokio::test(start_paused = true)]
async fn test_slow_load_shows_spinner_once_delay_elapses() {
    let mut runtime = runtime_with(Arc::new(RecordingDataLayer::new()));
    runtime.apply(vec![cache("general/all", true)]);
    assert!(runtime.view().is_preparing_loading());

    tokio::time::sleep(Duration::from_millis(399)).await;
    runtime.pump();
    assert!(!runtime.view().is_loading());

    runtime.next_event().await;
    assert!(runtime.view().is_loading());
    assert!(!runtime.view().is_preparing_loading());
}

#[tokio::test(start_paused = true)]
async fn test_fast_load_never_shows_spinner() {
    let mut runtime = runtime_with(Arc::new(RecordingDataLayer::new()));
    runtime.apply(vec![cache("general/all", true)]);

    tokio::time::sleep(Duration::from_millis(100)).await;
    runtime.apply(vec![cache("general/all", false)]);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(runtime.pump(), 0);
    assert!(!runtime.view().is_loading());
    assert!(!runtime.view().is_preparing_loading());
}

#[tokio::test(start_paused = true)]
async fn test_destroy_cancels_pending_timer() {
    let mut runtime = runtime_with(Arc::new(RecordingDataLayer::new()));
    runtime.apply(vec![cache("general/all", true)]);
    let lifetime = runtime.view().lifetime().clone();

    runtime.destroy();
    assert!(lifetime.is_cancelled());
}

#[tokio::test]
async fn test_cache_change_requests_refresh_and_mark_all_as_read() {
    let data = RecordingDataLayer::new();
    let mut runtime = runtime_with(Arc::new(data.clone()));
    runtime.apply(vec![cache("general/all", false)]);

    let id = CacheId::new("general/all");
    assert_eq!(
        data.requests(),
        vec![DataRequest::Refresh(id.clone()), DataRequest::MarkAllAsRead(id)]
    );
    let kinds: Vec<_> = runtime.view().hints().iter().map(|h| h.kind.clone()).collect();
    assert_eq!(kinds, vec![HintKind::ChangeOfSource]);
}

#[tokio::test(start_paused = true)]
async fn test_mark_as_seen_sent_when_caught_up() {
    let data = RecordingDataLayer::new();
    let mut runtime = runtime_with(Arc::new(data.clone()));
    caught_up(&mut runtime);

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(
        data.seen_requests(),
        vec![(ThreadId::new("general"), MessageId(10))]
    );
}

#[tokio::test]
async fn test_mark_as_seen_failure_reaches_error_channel() {
    let data = RecordingDataLayer::new();
    data.fail_mark_as_seen(DataError::Request("offline".into()));
    let mut runtime = runtime_with(Arc::new(data));
    caught_up(&mut runtime);

    let error = runtime.next_error().await.unwrap();
    assert!(matches!(
        error,
        ViewError::MarkAsSeen {
            source: DataError::Request(_),
            ..
        }
    ));
}

/// Data layer whose read receipts fail after a delay.
struct SlowFailingDataLayer;

impl DataLayer for SlowFailingDataLayer {
    fn request_cache_refresh(&self, _cache: &CacheId) {}

    fn request_mark_all_as_read(&self, _cache: &CacheId) {}

    fn mark_as_seen(
        &self,
        thread: ThreadId,
        _message: MessageId,
    ) -> BoxFuture<'static, Result<(), DataError>> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Err(DataError::RecordDeleted(thread.0))
        })
    }
}

#[tokio::test(start_paused = true)]
async fn test_mark_as_seen_failure_after_destroy_is_swallowed() {
    let mut runtime = runtime_with(Arc::new(SlowFailingDataLayer));
    caught_up(&mut runtime);
    runtime.dispatch(ViewEvent::Destroy);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(runtime.try_next_error().is_none());
}

#[tokio::test]
async fn test_hint_processed_is_published_on_bus() {
    let bus = HintBus::default();
    let mut rx = bus.subscribe();
    let mut runtime = ViewRuntime::new(
        ViewConfig::default(),
        ScrollMemory::new(),
        Arc::new(RecordingDataLayer::new()),
        bus,
    )
    .unwrap();

    let first = runtime
        .add_hint(HintKind::MessageReceived, json!({"message_id": 3}))
        .unwrap();
    let second = runtime
        .add_hint(HintKind::MessageReceived, json!({"message_id": 3}))
        .unwrap();

    runtime.mark_hint_processed(&first);
    let BusEvent::HintProcessed { view, hint } = rx.try_recv().unwrap();
    assert_eq!(view, runtime.view().id());
    assert_eq!(hint.id, first.id);
    assert_eq!(runtime.view().hints(), std::slice::from_ref(&second));

    // Already removed: the queue is untouched but listeners still hear it.
    runtime.mark_hint_processed(&first);
    let BusEvent::HintProcessed { hint, .. } = rx.try_recv().unwrap();
    assert_eq!(hint.id, first.id);
    assert_eq!(runtime.view().hints(), std::slice::from_ref(&second));
}

#[tokio::test]
async fn test_cleared_hint_is_still_published_when_processed() {
    let bus = HintBus::default();
    let mut rx = bus.subscribe();
    let mut runtime = ViewRuntime::new(
        ViewConfig::default(),
        ScrollMemory::new(),
        Arc::new(RecordingDataLayer::new()),
        bus,
    )
    .unwrap();
    runtime.apply(vec![cache("a", false)]);
    let stale = runtime
        .add_hint(HintKind::MessagesLoaded, Value::Null)
        .unwrap();

    runtime.apply(vec![cache("b", false)]);
    assert!(runtime.view().hints().iter().all(|h| h.id != stale.id));

    runtime.mark_hint_processed(&stale);
    let BusEvent::HintProcessed { view, hint } = rx.try_recv().unwrap();
    assert_eq!(view, runtime.view().id());
    assert_eq!(hint, stale);
    assert_eq!(runtime.view().hints().len(), 1);
}

#[tokio::test]
async fn test_scroll_memory_outlives_the_view() {
    let data: Arc<dyn DataLayer> = Arc::new(RecordingDataLayer::new());
    let mut runtime = runtime_with(Arc::clone(&data));
    runtime.apply(vec![cache("a", false)]);
    runtime.record_scroll(None, 500, 120);
    runtime.apply(vec![cache("b", false)]);
    // Late report for the cache the renderer just left.
    runtime.record_scroll(Some(CacheId::new("c")), 90, 10);
    assert_eq!(runtime.view().thread_cache_initial_scroll_height(), None);
    let memory = runtime.destroy();
    assert_eq!(memory.len(), 2);

    let mut next =
        ViewRuntime::new(ViewConfig::default(), memory, data, HintBus::default()).unwrap();
    next.apply(vec![cache("a", false)]);
    assert_eq!(next.view().thread_cache_initial_scroll_height(), Some(500));
    assert_eq!(next.view().thread_cache_initial_scroll_position(), Some(120));

    next.apply(vec![cache("c", false)]);
    assert_eq!(next.view().thread_cache_initial_scroll_height(), Some(90));

    next.apply(vec![cache("d", false)]);
    assert_eq!(next.view().thread_cache_initial_scroll_height(), None);
}

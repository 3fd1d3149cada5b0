//! Scenario replay.
//!
//! A script is a list of steps applied in order to one view:
//!
//! ```json
//! {
//!   "steps": [
//!     { "step": "signals", "signals": [
//!       { "signal": "source_cache", "value": { "id": "general/all", "thread_id": "general", "is_loading": true } }
//!     ] },
//!     { "step": "wait", "ms": 450 },
//!     { "step": "add_hint", "kind": "message-received", "data": { "message_id": 12 } },
//!     { "step": "process_hint", "kind": "change-of-source" },
//!     { "step": "destroy" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use threadview::derived::SendShortcut;
use threadview::scroll::{ScrollMemory, ScrollOffset, ScrollSnapshot};
use threadview::{Signal, ThreadView, ViewEvent, ViewRuntime};
use threadview_core::bus::{BusEvent, HintBus};
use threadview_core::config::ViewConfig;
use threadview_core::data::{DataError, DataLayer, DataRequest, RecordingDataLayer};
use threadview_core::hint::{Hint, HintKind};
use threadview_core::model::{CacheId, MessageId, MessageRef, PartnerId, ThreadId, ViewId};
use tracing::{debug, info};

/// How long the replay lets in-flight requests settle before reporting.
const SETTLE: Duration = Duration::from_millis(10);

#[derive(Debug, Deserialize)]
struct Script {
    /// Makes every read receipt fail with this message.
    #[serde(default)]
    fail_mark_as_seen: Option<String>,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
enum Step {
    Signals {
        signals: Vec<Signal>,
    },
    AddHint {
        kind: HintKind,
        #[serde(default)]
        data: Value,
    },
    /// Marks the oldest queued hint of `kind` as processed.
    ProcessHint {
        kind: HintKind,
    },
    Visible {
        message: u64,
    },
    /// Scroll report for `cache`, or for the current cache when omitted.
    Scroll {
        #[serde(default)]
        cache: Option<CacheId>,
        height: ScrollOffset,
        position: ScrollOffset,
    },
    AutoScroll {
        enabled: bool,
    },
    InvitationSearch {
        term: String,
        #[serde(default)]
        results: Vec<u64>,
    },
    InvitationToggle {
        partner: u64,
    },
    Wait {
        ms: u64,
    },
    Destroy,
}

#[derive(Debug, Serialize)]
struct Report {
    view: Snapshot,
    hints: Vec<Hint>,
    published: Vec<Hint>,
    requests: Vec<String>,
    errors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Snapshot {
    id: ViewId,
    destroyed: bool,
    source_cache: Option<CacheId>,
    is_loading: bool,
    is_preparing_loading: bool,
    has_topbar: bool,
    channel_invitation_form_active: bool,
    input_send_shortcuts: Option<&'static [SendShortcut]>,
    initial_scroll_height: Option<ScrollOffset>,
    initial_scroll_position: Option<ScrollOffset>,
    /// Full pair remembered for the current cache.
    remembered_scroll: Option<ScrollSnapshot>,
    remembered_caches: usize,
    messages: Vec<MessageId>,
    non_empty_messages: Vec<MessageId>,
    auto_scroll_on_message_received: bool,
}

impl From<&ThreadView> for Snapshot {
    fn from(view: &ThreadView) -> Self {
        Self {
            id: view.id(),
            destroyed: view.is_destroyed(),
            source_cache: view.source_cache_id().cloned(),
            is_loading: view.is_loading(),
            is_preparing_loading: view.is_preparing_loading(),
            has_topbar: view.has_topbar(),
            channel_invitation_form_active: view.channel_invitation_form_active(),
            input_send_shortcuts: view.input_send_shortcuts(),
            initial_scroll_height: view.thread_cache_initial_scroll_height(),
            initial_scroll_position: view.thread_cache_initial_scroll_position(),
            remembered_scroll: view
                .source_cache_id()
                .and_then(|cache| view.scroll_memory().initial(cache)),
            remembered_caches: view.scroll_memory().len(),
            messages: view.messages().to_vec(),
            non_empty_messages: view.non_empty_messages().to_vec(),
            auto_scroll_on_message_received: view.has_auto_scroll_on_message_received(),
        }
    }
}

/// Data layer that logs every request before recording it.
struct LoggingDataLayer {
    inner: RecordingDataLayer,
}

impl DataLayer for LoggingDataLayer {
    fn request_cache_refresh(&self, cache: &CacheId) {
        info!(%cache, "refresh requested");
        self.inner.request_cache_refresh(cache);
    }

    fn request_mark_all_as_read(&self, cache: &CacheId) {
        info!(%cache, "mark all as read requested");
        self.inner.request_mark_all_as_read(cache);
    }

    fn mark_as_seen(
        &self,
        thread: ThreadId,
        message: MessageId,
    ) -> BoxFuture<'static, Result<(), DataError>> {
        info!(%thread, %message, "mark as seen requested");
        self.inner.mark_as_seen(thread, message)
    }
}

fn describe(request: &DataRequest) -> String {
    match request {
        DataRequest::Refresh(cache) => format!("refresh {cache}"),
        DataRequest::MarkAllAsRead(cache) => format!("mark-all-as-read {cache}"),
        DataRequest::MarkAsSeen(thread, message) => format!("mark-as-seen {thread} {message}"),
    }
}

pub async fn run(path: &Path, config: ViewConfig) -> Result<()> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script from {}", path.display()))?;
    let script: Script = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse script from {}", path.display()))?;

    let report = replay(script, config).await?;
    let json = serde_json::to_string_pretty(&report).context("serialize report")?;
    println!("{json}");
    Ok(())
}

async fn replay(script: Script, config: ViewConfig) -> Result<Report> {
    let recorder = RecordingDataLayer::new();
    if let Some(message) = script.fail_mark_as_seen {
        recorder.fail_mark_as_seen(DataError::Request(message));
    }
    let data = Arc::new(LoggingDataLayer {
        inner: recorder.clone(),
    });

    let bus = HintBus::new(config.hint_bus_capacity);
    let mut published_rx = bus.subscribe();
    let mut runtime = ViewRuntime::new(config, ScrollMemory::new(), data, bus)?;

    for (index, step) in script.steps.into_iter().enumerate() {
        debug!(index, ?step, "replaying step");
        apply_step(&mut runtime, step).await;
    }

    tokio::time::sleep(SETTLE).await;
    runtime.pump();

    let mut errors = Vec::new();
    while let Some(err) = runtime.try_next_error() {
        errors.push(format!("{:#}", anyhow::Error::new(err)));
    }
    let mut published = Vec::new();
    while let Ok(BusEvent::HintProcessed { hint, .. }) = published_rx.try_recv() {
        published.push(hint);
    }

    Ok(Report {
        view: Snapshot::from(runtime.view()),
        hints: runtime.view().hints().to_vec(),
        published,
        requests: recorder.requests().iter().map(describe).collect(),
        errors,
    })
}

async fn apply_step(runtime: &mut ViewRuntime, step: Step) {
    match step {
        Step::Signals { signals } => runtime.apply(signals),
        Step::AddHint { kind, data } => {
            runtime.add_hint(kind, data);
        }
        Step::ProcessHint { kind } => {
            let hint = runtime
                .view()
                .hints()
                .iter()
                .find(|hint| hint.kind == kind)
                .cloned();
            match hint {
                Some(hint) => runtime.mark_hint_processed(&hint),
                None => debug!(%kind, "no queued hint of this kind"),
            }
        }
        Step::Visible { message } => runtime.handle_visible_message(MessageRef::new(message)),
        Step::Scroll {
            cache,
            height,
            position,
        } => runtime.record_scroll(cache, height, position),
        Step::AutoScroll { enabled } => runtime.set_auto_scroll(enabled),
        Step::InvitationSearch { term, results } => {
            runtime.invitation_search(term, results.into_iter().map(PartnerId).collect());
        }
        Step::InvitationToggle { partner } => runtime.invitation_toggle(PartnerId(partner)),
        Step::Wait { ms } => {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            runtime.pump();
        }
        Step::Destroy => runtime.dispatch(ViewEvent::Destroy),
    }
}

//! View runtime - owns the view, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here. The
//! reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! Spawned work (timers) sends its resulting `ViewEvent` to `inbox_tx`. The
//! owner drains the inbox with `pump` (non-blocking) or `next_event`
//! (awaits one event), which keeps every state change on the owner's task.
//!
//! Methods spawning work must be called from within a tokio runtime.

mod handlers;

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use threadview_core::bus::{BusEvent, HintBus};
use threadview_core::config::ViewConfig;
use threadview_core::data::DataLayer;
use threadview_core::hint::{Hint, HintKind};
use threadview_core::model::{CacheId, MessageRef, PartnerId};
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::ViewError;
use crate::effects::ViewEffect;
use crate::events::{Signal, ViewEvent};
use crate::features::scroll::{ScrollMemory, ScrollOffset};
use crate::state::ThreadView;
use crate::update;

/// Runtime around one `ThreadView`.
///
/// Dropping the runtime cancels the view's pending timers like `destroy`
/// does, but `destroy` also hands the scroll memory back.
pub struct ViewRuntime {
    view: ThreadView,
    data: Arc<dyn DataLayer>,
    bus: HintBus,
    inbox_tx: mpsc::UnboundedSender<ViewEvent>,
    inbox_rx: mpsc::UnboundedReceiver<ViewEvent>,
    errors_tx: mpsc::UnboundedSender<ViewError>,
    errors_rx: mpsc::UnboundedReceiver<ViewError>,
}

impl ViewRuntime {
    /// Creates a runtime with a fresh view.
    pub fn new(
        config: ViewConfig,
        scroll: ScrollMemory,
        data: Arc<dyn DataLayer>,
        bus: HintBus,
    ) -> Result<Self, ViewError> {
        let view = ThreadView::new(config, scroll)?;
        Ok(Self::with_view(view, data, bus))
    }

    /// Creates a runtime around an existing view.
    pub fn with_view(view: ThreadView, data: Arc<dyn DataLayer>, bus: HintBus) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        Self {
            view,
            data,
            bus,
            inbox_tx,
            inbox_rx,
            errors_tx,
            errors_rx,
        }
    }

    pub fn view(&self) -> &ThreadView {
        &self.view
    }

    pub fn bus(&self) -> &HintBus {
        &self.bus
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Runs an event through the reducer and executes the resulting effects.
    pub fn dispatch(&mut self, event: ViewEvent) {
        let effects = update::update(&mut self.view, event);
        self.execute_effects(effects);
    }

    /// Commits a batch of input changes.
    pub fn apply(&mut self, signals: Vec<Signal>) {
        self.dispatch(ViewEvent::Signals(signals));
    }

    /// Queues a hint and returns it. `None` once the view is destroyed.
    pub fn add_hint(&mut self, kind: HintKind, data: Value) -> Option<Hint> {
        if self.view.is_destroyed() {
            return None;
        }
        self.dispatch(ViewEvent::AddHint { kind, data });
        self.view.hints().last().cloned()
    }

    /// Removes `hint` from the queue if still there and publishes it on the bus.
    pub fn mark_hint_processed(&mut self, hint: &Hint) {
        self.dispatch(ViewEvent::HintProcessed { hint: hint.clone() });
    }

    pub fn handle_visible_message(&mut self, message: MessageRef) {
        self.dispatch(ViewEvent::VisibleMessage(message));
    }

    /// Records the scroll state of `cache`, or of the current cache if `None`.
    pub fn record_scroll(
        &mut self,
        cache: Option<CacheId>,
        height: ScrollOffset,
        position: ScrollOffset,
    ) {
        self.dispatch(ViewEvent::ScrollRecorded {
            cache,
            height: Some(height),
            position: Some(position),
        });
    }

    pub fn set_auto_scroll(&mut self, enabled: bool) {
        self.dispatch(ViewEvent::SetAutoScroll(enabled));
    }

    pub fn invitation_search(&mut self, term: impl Into<String>, results: Vec<PartnerId>) {
        self.dispatch(ViewEvent::InvitationSearch {
            term: term.into(),
            results,
        });
    }

    pub fn invitation_toggle(&mut self, partner: PartnerId) {
        self.dispatch(ViewEvent::InvitationToggle { partner });
    }

    /// Tears the view down and returns the scroll memory for the next view.
    pub fn destroy(mut self) -> ScrollMemory {
        self.dispatch(ViewEvent::Destroy);
        std::mem::take(&mut self.view.scroll)
    }

    // ========================================================================
    // Inbox
    // ========================================================================

    /// Dispatches every event waiting in the inbox. Returns how many ran.
    pub fn pump(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.inbox_rx.try_recv() {
            self.dispatch(event);
            count += 1;
        }
        count
    }

    /// Waits for one inbox event and dispatches it.
    pub async fn next_event(&mut self) {
        // The runtime holds a sender, so the channel never closes.
        if let Some(event) = self.inbox_rx.recv().await {
            self.dispatch(event);
        }
    }

    /// Returns the next failure that was not handled by the view, if any.
    pub fn try_next_error(&mut self) -> Option<ViewError> {
        self.errors_rx.try_recv().ok()
    }

    /// Waits for the next failure that was not handled by the view.
    pub async fn next_error(&mut self) -> Option<ViewError> {
        self.errors_rx.recv().await
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<ViewEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async effect and sends its event, if any, to the inbox.
    fn spawn_effect<Fut>(&self, fut: Fut)
    where
        Fut: Future<Output = Option<ViewEvent>> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            if let Some(event) = fut.await {
                let _ = tx.send(event);
            }
        });
    }

    fn execute_effect(&mut self, effect: ViewEffect) {
        match effect {
            ViewEffect::StartLoaderTimer {
                timer,
                delay,
                cancel,
            } => {
                self.spawn_effect(handlers::loader_timer(timer, delay, cancel));
            }
            ViewEffect::CancelTask { token } => {
                token.cancel();
            }
            ViewEffect::RequestCacheRefresh { cache } => {
                self.data.request_cache_refresh(&cache);
            }
            ViewEffect::RequestMarkAllAsRead { cache } => {
                self.data.request_mark_all_as_read(&cache);
            }
            ViewEffect::MarkAsSeen {
                thread,
                message,
                token,
            } => {
                let data = Arc::clone(&self.data);
                let errors = self.errors_tx.clone();
                tokio::spawn(async move {
                    if let Some(err) = handlers::mark_as_seen(data, thread, message, token).await {
                        error!(%err, "mark-as-seen request failed");
                        let _ = errors.send(err);
                    }
                });
            }
            ViewEffect::PublishHintProcessed { hint } => {
                let delivered = self.bus.publish(BusEvent::HintProcessed {
                    view: self.view.id(),
                    hint,
                });
                debug!(view = ?self.view.id(), delivered, "hint processed");
            }
        }
    }
}

impl Drop for ViewRuntime {
    fn drop(&mut self) {
        self.view.lifetime().cancel();
    }
}

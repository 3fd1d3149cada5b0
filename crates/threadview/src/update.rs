//! View reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(view, event)`
//! and executes the returned effects.
//!
//! Input changes are applied first, then the dependency graph recomputes
//! derived fields and runs reactions in schedule order.

use std::sync::Arc;

use serde_json::Value;
use threadview_core::hint::HintKind;
use threadview_core::model::{CacheId, CacheSnapshot, MessageRef, ThreadId, ThreadSnapshot};
use tracing::{debug, trace};

use crate::effects::ViewEffect;
use crate::events::{Signal, ViewEvent};
use crate::features::derived::{self, reconcile_invitation_form, reconcile_topbar};
use crate::features::loading::LoaderCommand;
use crate::features::scroll::ScrollOffset;
use crate::features::seen::{SeenInputs, arbitrate};
use crate::state::{Field, ThreadView};

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute. A destroyed view ignores every event.
pub fn update(view: &mut ThreadView, event: ViewEvent) -> Vec<ViewEffect> {
    if view.destroyed {
        trace!(view = ?view.id, ?event, "event after destroy ignored");
        return vec![];
    }

    let mut effects = Vec::new();
    match event {
        ViewEvent::Signals(signals) => {
            let changed = apply_signals(view, signals);
            propagate(view, changed, &mut effects);
        }
        ViewEvent::AddHint { kind, data } => {
            view.hints.add(kind, data);
        }
        ViewEvent::HintProcessed { hint } => {
            if !view.hints.mark_processed(hint.id) {
                trace!(view = ?view.id, hint = ?hint.id, "hint no longer queued");
            }
            effects.push(ViewEffect::PublishHintProcessed { hint });
        }
        ViewEvent::VisibleMessage(message) => {
            if handle_visible_message(view, message) {
                propagate(view, vec![Field::LastVisibleMessage], &mut effects);
            }
        }
        ViewEvent::ScrollRecorded {
            cache,
            height,
            position,
        } => {
            if record_scroll(view, cache, height, position) {
                propagate(view, vec![Field::ScrollMemory], &mut effects);
            }
        }
        ViewEvent::SetAutoScroll(enabled) => {
            view.auto_scroll_on_message_received = enabled;
        }
        ViewEvent::InvitationSearch { term, results } => {
            if let Some(form) = view.invitation_form.as_mut() {
                form.set_search(term, results);
            }
        }
        ViewEvent::InvitationToggle { partner } => {
            if let Some(form) = view.invitation_form.as_mut() {
                form.toggle(partner);
            }
        }
        ViewEvent::LoaderTimerElapsed { timer } => {
            let still_loading = view.source_cache.as_ref().is_some_and(|c| c.is_loading);
            view.loading.on_timer_elapsed(timer, still_loading);
        }
        ViewEvent::Destroy => destroy(view, &mut effects),
    }
    effects
}

/// Keeps the highest message id reported visible in the current epoch.
/// Returns true if it changed.
fn handle_visible_message(view: &mut ThreadView, message: MessageRef) -> bool {
    match view.last_visible_message {
        Some(current) if current >= message.id => false,
        _ => {
            view.last_visible_message = Some(message.id);
            true
        }
    }
}

fn record_scroll(
    view: &mut ThreadView,
    cache: Option<CacheId>,
    height: Option<ScrollOffset>,
    position: Option<ScrollOffset>,
) -> bool {
    let Some(cache) = cache.or_else(|| view.source_cache_id().cloned()) else {
        debug!(view = ?view.id, "scroll reported without a cache, ignoring");
        return false;
    };
    match (height, position) {
        (Some(height), Some(position)) => view.scroll.record(&cache, height, position),
        (Some(height), None) => view.scroll.record_height(&cache, height),
        (None, Some(position)) => view.scroll.record_position(&cache, position),
        (None, None) => return false,
    }
    trace!(view = ?view.id, %cache, entries = view.scroll.len(), "scroll recorded");
    true
}

fn destroy(view: &mut ThreadView, effects: &mut Vec<ViewEffect>) {
    debug!(view = ?view.id, "destroying view");
    view.destroyed = true;
    if let Some(token) = view.loading.shutdown() {
        effects.push(ViewEffect::CancelTask { token });
    }
    effects.push(ViewEffect::CancelTask {
        token: view.lifetime.clone(),
    });
}

// ============================================================================
// Signals
// ============================================================================

/// Applies a batch of input changes. Returns the source fields that changed.
fn apply_signals(view: &mut ThreadView, signals: Vec<Signal>) -> Vec<Field> {
    let mut changed = Vec::new();
    for signal in signals {
        match signal {
            Signal::SourceCache(cache) => {
                changed.extend(diff_cache(view.source_cache.as_ref(), cache.as_ref()));
                view.source_cache = cache;
            }
            Signal::Thread(thread) => {
                if view.thread == thread {
                    continue;
                }
                if thread_identity(view.thread.as_ref()) != thread_identity(thread.as_ref()) {
                    changed.push(Field::ThreadIdentity);
                }
                view.thread = thread;
                changed.push(Field::Thread);
            }
            Signal::Device(device) => {
                if view.device != device {
                    view.device = device;
                    changed.push(Field::Device);
                }
            }
            Signal::ComposerFocus(focus) => {
                if view.composer_has_focus != focus {
                    view.composer_has_focus = focus;
                    changed.push(Field::ComposerFocus);
                }
            }
            Signal::ViewerTopbar(has_topbar) => {
                if view.viewer_has_topbar != has_topbar {
                    view.viewer_has_topbar = has_topbar;
                    changed.push(Field::ViewerTopbar);
                }
            }
        }
    }
    changed
}

/// The part of a thread the invitation form depends on. New messages in the
/// same thread leave it unchanged.
fn thread_identity(thread: Option<&ThreadSnapshot>) -> Option<(&ThreadId, bool)> {
    thread.map(|t| (&t.id, t.has_invite_feature))
}

/// Compares two versions of the source cache. Identity is the cache id.
fn diff_cache(old: Option<&CacheSnapshot>, new: Option<&CacheSnapshot>) -> Vec<Field> {
    let mut changed = Vec::new();
    if old.map(|c| &c.id) != new.map(|c| &c.id) {
        changed.push(Field::SourceCache);
    }
    if old.is_some_and(|c| c.is_loading) != new.is_some_and(|c| c.is_loading) {
        changed.push(Field::CacheLoading);
    }
    let messages = |c: Option<&CacheSnapshot>| {
        c.map(|c| (c.message_ids.clone(), c.non_empty_message_ids.clone()))
    };
    if messages(old) != messages(new) {
        changed.push(Field::CacheMessages);
    }
    changed
}

// ============================================================================
// Propagation
// ============================================================================

fn propagate(view: &mut ThreadView, changed: Vec<Field>, effects: &mut Vec<ViewEffect>) {
    if changed.is_empty() {
        return;
    }
    let schedule = Arc::clone(&view.schedule);
    let evaluated = schedule.propagate(changed, |node| evaluate(view, node.field, effects));
    trace!(view = ?view.id, ?evaluated, "propagation pass");
}

/// Recomputes one derived field or runs one reaction. Returns the fields
/// whose value changed.
fn evaluate(view: &mut ThreadView, field: Field, effects: &mut Vec<ViewEffect>) -> Vec<Field> {
    match field {
        Field::OnSourceCacheChanged => on_source_cache_changed(view, effects),
        Field::OnCacheLoadingChanged => {
            on_cache_loading_changed(view, effects);
            vec![]
        }
        Field::MarkSeen => {
            mark_seen(view, effects);
            vec![]
        }
        Field::LastMessage => {
            let value = view.thread.as_ref().and_then(|t| t.last_message);
            set(&mut view.derived.last_message, value, field)
        }
        Field::LastNonTransientMessage => {
            let value = view
                .thread
                .as_ref()
                .and_then(|t| t.last_non_transient_message);
            set(&mut view.derived.last_non_transient_message, value, field)
        }
        Field::HasTopbar => {
            let value = view.viewer_has_topbar;
            set(&mut view.derived.has_topbar, value, field)
        }
        Field::Topbar => changed_if(
            reconcile_topbar(&mut view.topbar, view.derived.has_topbar),
            field,
        ),
        Field::ChannelInvitationForm => changed_if(
            reconcile_invitation_form(&mut view.invitation_form, view.thread.as_ref()),
            field,
        ),
        Field::InputSendShortcuts => {
            let value = derived::input_send_shortcuts(view.thread.as_ref(), view.device.as_ref());
            set(&mut view.derived.input_send_shortcuts, value, field)
        }
        Field::InitialScrollHeight => {
            let value = view
                .source_cache_id()
                .and_then(|cache| view.scroll.height(cache));
            set(&mut view.derived.initial_scroll_height, value, field)
        }
        Field::InitialScrollPosition => {
            let value = view
                .source_cache_id()
                .and_then(|cache| view.scroll.position(cache));
            set(&mut view.derived.initial_scroll_position, value, field)
        }
        Field::Messages => {
            let value = view
                .source_cache
                .as_ref()
                .map(|c| c.message_ids.clone())
                .unwrap_or_default();
            set(&mut view.derived.messages, value, field)
        }
        Field::NonEmptyMessages => {
            let value = view
                .source_cache
                .as_ref()
                .map(|c| c.non_empty_message_ids.clone())
                .unwrap_or_default();
            set(&mut view.derived.non_empty_messages, value, field)
        }
        Field::SourceCache
        | Field::CacheLoading
        | Field::CacheMessages
        | Field::Thread
        | Field::ThreadIdentity
        | Field::Device
        | Field::ComposerFocus
        | Field::ViewerTopbar
        | Field::ScrollMemory
        | Field::LastVisibleMessage => vec![],
    }
}

fn set<T: PartialEq>(slot: &mut T, value: T, field: Field) -> Vec<Field> {
    if *slot == value {
        return vec![];
    }
    *slot = value;
    vec![field]
}

fn changed_if(changed: bool, field: Field) -> Vec<Field> {
    if changed { vec![field] } else { vec![] }
}

// ============================================================================
// Reactions
// ============================================================================

/// Starts a new epoch: stale hints are dropped before anything reads the
/// new cache.
fn on_source_cache_changed(view: &mut ThreadView, effects: &mut Vec<ViewEffect>) -> Vec<Field> {
    debug!(view = ?view.id, cache = ?view.source_cache_id(), "source cache changed");
    view.hints.clear();
    view.hints.add(HintKind::ChangeOfSource, Value::Null);

    if let Some(cache) = view.source_cache_id().cloned() {
        effects.push(ViewEffect::RequestCacheRefresh {
            cache: cache.clone(),
        });
        effects.push(ViewEffect::RequestMarkAllAsRead { cache });
    }

    if view.last_visible_message.take().is_some() {
        vec![Field::LastVisibleMessage]
    } else {
        vec![]
    }
}

fn on_cache_loading_changed(view: &mut ThreadView, effects: &mut Vec<ViewEffect>) {
    let is_loading = view.source_cache.as_ref().is_some_and(|c| c.is_loading);
    let command = view
        .loading
        .on_loading_changed(is_loading, &mut view.timers, &view.lifetime);
    match command {
        Some(LoaderCommand::Start { timer, cancel }) => {
            effects.push(ViewEffect::StartLoaderTimer {
                timer,
                delay: view.config.loader_delay(),
                cancel,
            });
        }
        Some(LoaderCommand::Cancel(token)) => {
            effects.push(ViewEffect::CancelTask { token });
        }
        None => {}
    }
}

fn mark_seen(view: &mut ThreadView, effects: &mut Vec<ViewEffect>) {
    let decision = arbitrate(SeenInputs {
        thread: view.thread.as_ref().map(|t| &t.id),
        last_message: view.derived.last_message,
        last_non_transient_message: view.derived.last_non_transient_message,
        last_visible_message: view.last_visible_message,
        composer_has_focus: view.composer_has_focus,
    });
    if let Some(request) = decision {
        debug!(view = ?view.id, thread = %request.thread, message = %request.message, "marking as seen");
        effects.push(ViewEffect::MarkAsSeen {
            thread: request.thread,
            message: request.message,
            token: view.lifetime.clone(),
        });
    }
}

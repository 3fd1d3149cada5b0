//! Debounced loading indicator.
//!
//! The cache's own `is_loading` flag flips as soon as a load starts. Showing
//! a spinner right away makes fast loads flicker, so the view only surfaces
//! a load once it has lasted `delay`:
//!
//! ```text
//!   Idle --loading--> Preparing --timer, still loading--> Showing
//!                        |   \--timer, done----------------> Idle
//!                        \--done--> Idle        Showing --done--> Idle
//! ```

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::common::{TimerId, TimerSeq, TimerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingPhase {
    /// No load in progress (or none surfaced yet and none pending).
    #[default]
    Idle,
    /// A load started; the timer is running and the spinner is hidden.
    Preparing,
    /// The load outlived the delay; the spinner is shown.
    Showing,
}

/// Timer command produced by a transition, executed by the runtime.
#[derive(Debug, Clone)]
pub enum LoaderCommand {
    Start {
        timer: TimerId,
        cancel: CancellationToken,
    },
    Cancel(CancellationToken),
}

#[derive(Debug, Default)]
pub struct LoadingDebouncer {
    phase: LoadingPhase,
    timer: TimerState,
}

impl LoadingDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LoadingPhase {
        self.phase
    }

    /// Whether the spinner should be shown.
    pub fn is_loading(&self) -> bool {
        self.phase == LoadingPhase::Showing
    }

    /// Whether a load is known but not surfaced yet.
    pub fn is_preparing_loading(&self) -> bool {
        self.phase == LoadingPhase::Preparing
    }

    pub fn pending_timer(&self) -> Option<TimerId> {
        self.timer.active
    }

    /// Reacts to the displayed cache's loading flag.
    ///
    /// The new timer's token is a child of `parent`, so cancelling the
    /// view's lifetime token also cancels the timer.
    pub fn on_loading_changed(
        &mut self,
        is_loading: bool,
        timers: &mut TimerSeq,
        parent: &CancellationToken,
    ) -> Option<LoaderCommand> {
        if is_loading {
            if self.phase != LoadingPhase::Idle {
                return None;
            }
            let timer = timers.next_id();
            let cancel = parent.child_token();
            if let Some(stale) = self.timer.start(timer, cancel.clone()) {
                stale.cancel();
            }
            self.phase = LoadingPhase::Preparing;
            debug!(?timer, "load started, delaying spinner");
            return Some(LoaderCommand::Start { timer, cancel });
        }

        if self.phase != LoadingPhase::Idle {
            debug!(phase = ?self.phase, "load finished");
        }
        self.phase = LoadingPhase::Idle;
        self.timer.take().map(LoaderCommand::Cancel)
    }

    /// Applies a timer firing. `is_loading` is the cache's flag at firing
    /// time. Returns false for stale firings, which are ignored.
    pub fn on_timer_elapsed(&mut self, timer: TimerId, is_loading: bool) -> bool {
        if !self.timer.finish_if_active(timer) {
            debug!(?timer, "ignoring stale loader timer");
            return false;
        }
        if self.phase != LoadingPhase::Preparing {
            return false;
        }
        self.phase = if is_loading {
            LoadingPhase::Showing
        } else {
            LoadingPhase::Idle
        };
        debug!(phase = ?self.phase, "loader timer elapsed");
        true
    }

    /// Drops any pending timer. Returns its token so the caller can cancel it.
    pub fn shutdown(&mut self) -> Option<CancellationToken> {
        self.phase = LoadingPhase::Idle;
        self.timer.take()
    }
}

use tokio_util::sync::CancellationToken;

/// Identity of a scheduled timer.
///
/// A firing carries the id of the timer that produced it, so the reducer can
/// drop firings of timers that were replaced or cancelled meanwhile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

#[derive(Debug, Default)]
pub struct TimerSeq {
    next: u64,
}

impl TimerSeq {
    pub fn next_id(&mut self) -> TimerId {
        let id = TimerId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// The single pending timer of a slice (stored in state, mutated only by the reducer).
#[derive(Debug, Default, Clone)]
pub struct TimerState {
    pub active: Option<TimerId>,
    pub cancel: Option<CancellationToken>,
}

impl TimerState {
    /// Replaces the pending timer. Returns the token of the replaced one.
    pub fn start(&mut self, id: TimerId, cancel: CancellationToken) -> Option<CancellationToken> {
        self.active = Some(id);
        self.cancel.replace(cancel)
    }

    /// Clears the timer if `id` is the pending one.
    pub fn finish_if_active(&mut self, id: TimerId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.active = None;
            self.cancel = None;
        }
        ok
    }

    /// Clears the pending timer. Returns its token so the caller can cancel it.
    pub fn take(&mut self) -> Option<CancellationToken> {
        self.active = None;
        self.cancel.take()
    }
}

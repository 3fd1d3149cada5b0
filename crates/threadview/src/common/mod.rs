//! Shared helpers for the view slices.

mod timer;

pub use timer::{TimerId, TimerSeq, TimerState};

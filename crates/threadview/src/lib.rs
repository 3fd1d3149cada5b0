//! Thread view mediator.
//!
//! Sits between a thread's message cache and the renderer. It derives what
//! the renderer should show (top bar, shortcuts, loading spinner, initial
//! scroll), queues hints telling the renderer how to react to changes, and
//! sends read receipts when the user is caught up.
//!
//! - `update` is the reducer: `ViewEvent` in, `ViewEffect`s out.
//! - `ViewRuntime` owns a `ThreadView` and executes effects on tokio.

pub mod common;
pub mod effects;
mod error;
pub mod events;
pub mod features;
pub mod graph;
pub mod runtime;
pub mod state;
pub mod update;

pub use error::ViewError;
pub use events::{Signal, ViewEvent};
pub use features::{derived, hints, loading, scroll, seen};
pub use runtime::ViewRuntime;
pub use state::ThreadView;

use thiserror::Error;
use threadview_core::data::DataError;
use threadview_core::model::{MessageId, ThreadId};

use crate::graph::GraphError;

/// Errors surfaced by a view.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The dependency graph is invalid.
    #[error("invalid view dependency graph")]
    Graph(#[from] GraphError),

    /// The data layer failed to persist a read receipt.
    #[error("failed to mark message {message} of thread {thread} as seen")]
    MarkAsSeen {
        thread: ThreadId,
        message: MessageId,
        #[source]
        source: DataError,
    },
}

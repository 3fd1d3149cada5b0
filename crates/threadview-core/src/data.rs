//! Data layer collaborator.
//!
//! The view asks the data layer to refresh caches and to persist read
//! receipts. Implementations live outside this workspace (RPC, storage);
//! `RecordingDataLayer` is an in-memory implementation for tools and tests.

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::model::{CacheId, MessageId, ThreadId};

/// Failure reported by the data layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataError {
    /// The record the request targeted no longer exists.
    #[error("record {0} was deleted")]
    RecordDeleted(String),
    /// The backend rejected or failed the request.
    #[error("data layer request failed: {0}")]
    Request(String),
}

/// Operations the view delegates to the data layer.
pub trait DataLayer: Send + Sync {
    /// Asks the cache to reload its messages.
    fn request_cache_refresh(&self, cache: &CacheId);

    /// Asks the cache to mark all of its messages as read.
    fn request_mark_all_as_read(&self, cache: &CacheId);

    /// Persists that `message` is the last message seen in `thread`.
    fn mark_as_seen(
        &self,
        thread: ThreadId,
        message: MessageId,
    ) -> BoxFuture<'static, Result<(), DataError>>;
}

/// A request received by `RecordingDataLayer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataRequest {
    Refresh(CacheId),
    MarkAllAsRead(CacheId),
    MarkAsSeen(ThreadId, MessageId),
}

/// In-memory data layer recording every request.
///
/// `mark_as_seen` resolves with the configured outcome.
#[derive(Debug, Clone, Default)]
pub struct RecordingDataLayer {
    requests: Arc<Mutex<Vec<DataRequest>>>,
    seen_outcome: Arc<Mutex<Option<DataError>>>,
}

impl RecordingDataLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `mark_as_seen` calls fail with `error`.
    pub fn fail_mark_as_seen(&self, error: DataError) {
        *self
            .seen_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Returns all requests received so far.
    pub fn requests(&self) -> Vec<DataRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the `mark_as_seen` requests received so far.
    pub fn seen_requests(&self) -> Vec<(ThreadId, MessageId)> {
        self.requests()
            .into_iter()
            .filter_map(|request| match request {
                DataRequest::MarkAsSeen(thread, message) => Some((thread, message)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, request: DataRequest) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
    }
}

impl DataLayer for RecordingDataLayer {
    fn request_cache_refresh(&self, cache: &CacheId) {
        self.record(DataRequest::Refresh(cache.clone()));
    }

    fn request_mark_all_as_read(&self, cache: &CacheId) {
        self.record(DataRequest::MarkAllAsRead(cache.clone()));
    }

    fn mark_as_seen(
        &self,
        thread: ThreadId,
        message: MessageId,
    ) -> BoxFuture<'static, Result<(), DataError>> {
        self.record(DataRequest::MarkAsSeen(thread, message));
        let outcome = self
            .seen_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Box::pin(async move {
            match outcome {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_layer_records_in_order() {
        let layer = RecordingDataLayer::new();
        layer.request_cache_refresh(&CacheId::new("a"));
        layer.request_mark_all_as_read(&CacheId::new("a"));
        layer
            .mark_as_seen(ThreadId::new("t"), MessageId(4))
            .await
            .unwrap();

        assert_eq!(
            layer.requests(),
            vec![
                DataRequest::Refresh(CacheId::new("a")),
                DataRequest::MarkAllAsRead(CacheId::new("a")),
                DataRequest::MarkAsSeen(ThreadId::new("t"), MessageId(4)),
            ]
        );
    }

    #[tokio::test]
    async fn test_recording_layer_configured_failure() {
        let layer = RecordingDataLayer::new();
        layer.fail_mark_as_seen(DataError::Request("offline".into()));
        let result = layer.mark_as_seen(ThreadId::new("t"), MessageId(1)).await;
        assert_eq!(result, Err(DataError::Request("offline".into())));
        assert_eq!(layer.seen_requests().len(), 1);
    }
}

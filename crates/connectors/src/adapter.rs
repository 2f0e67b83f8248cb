use crate::error::CollectionError;
use async_trait::async_trait;
use model::{events::FeedEvent, pagination::query::Query, records::row::ResultSet};
use tokio::sync::mpsc;

/// Client for an ordered, continuously changing collection.
///
/// Implementations own connection management, retries and timeouts; the
/// cursor engine only issues one-shot fetches and persistent listens.
#[async_trait]
pub trait OrderedCollection: Send + Sync {
    /// Runs `query` once and returns its rows in sort order.
    async fn fetch(&self, query: &Query) -> Result<ResultSet, CollectionError>;

    /// Opens a live subscription over `query`.
    ///
    /// The feed first reports every row of the range as `Added`, followed by
    /// `Loaded` once the initial load is complete. Dropping the feed detaches
    /// the subscription.
    async fn listen(&self, query: &Query) -> Result<LiveFeed, CollectionError>;
}

/// Sending half of a live subscription, held by the collection.
pub type FeedSender = mpsc::UnboundedSender<FeedEvent>;

/// Receiving half of a live subscription.
#[derive(Debug)]
pub struct LiveFeed {
    rx: mpsc::UnboundedReceiver<FeedEvent>,
}

impl LiveFeed {
    pub fn channel() -> (FeedSender, LiveFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, LiveFeed { rx })
    }

    /// Waits for the next event. Returns `None` once the collection closed
    /// the subscription.
    pub async fn recv(&mut self) -> Option<FeedEvent> {
        self.rx.recv().await
    }

    /// Stops receiving; the collection notices on its next send.
    pub fn detach(mut self) {
        self.rx.close();
    }
}

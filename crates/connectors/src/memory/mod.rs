use crate::{
    adapter::{FeedSender, LiveFeed, OrderedCollection},
    error::CollectionError,
};
use async_trait::async_trait;
use model::{
    events::FeedEvent,
    pagination::query::{Limit, Query},
    records::row::{ResultSet, RowSnapshot},
};
use serde_json::Value;
use std::{collections::BTreeMap, path::Path, sync::Arc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

mod store;

struct Listener {
    query: Query,
    tx: FeedSender,
    last: Vec<RowSnapshot>,
}

#[derive(Default)]
struct Inner {
    rows: BTreeMap<String, RowSnapshot>,
    listeners: Vec<Listener>,
    fetch_log: Vec<Query>,
    unavailable: Option<String>,
}

/// In-memory ordered collection with live listeners.
///
/// Every mutation re-evaluates the open listens and pushes the resulting
/// `Added`/`Removed`/`Moved` events followed by a `Loaded` snapshot.
#[derive(Clone, Default)]
pub struct MemoryCollection {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = RowSnapshot>) -> Self {
        let inner = Inner {
            rows: rows.into_iter().map(|r| (r.id.clone(), r)).collect(),
            ..Default::default()
        };
        MemoryCollection {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Loads a JSON array of rows (`{"id": .., "value": .., "priority": ..}`).
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CollectionError> {
        let path = path.as_ref();
        let source = tokio::fs::read_to_string(path).await.map_err(|e| {
            CollectionError::Generic(format!("Failed to read {}: {e}", path.display()))
        })?;
        let rows: Vec<RowSnapshot> = serde_json::from_str(&source)?;
        Ok(Self::from_rows(rows))
    }

    /// Inserts `row`, replacing any row with the same id.
    pub async fn upsert(&self, row: RowSnapshot) {
        let mut inner = self.inner.lock().await;
        debug!(row_id = %row.id, "memory collection upsert");
        inner.rows.insert(row.id.clone(), row);
        inner.broadcast();
    }

    /// Replaces the payload of an existing row, keeping its priority.
    pub async fn set_value(&self, id: &str, value: Value) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(row) = inner.rows.get_mut(id) else {
            return false;
        };
        row.value = value;
        inner.broadcast();
        true
    }

    pub async fn remove(&self, id: &str) -> Option<RowSnapshot> {
        let mut inner = self.inner.lock().await;
        let removed = inner.rows.remove(id);
        if removed.is_some() {
            inner.broadcast();
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.rows.is_empty()
    }

    /// Every query passed to `fetch`, in order.
    pub async fn fetch_log(&self) -> Vec<Query> {
        self.inner.lock().await.fetch_log.clone()
    }

    pub async fn clear_fetch_log(&self) {
        self.inner.lock().await.fetch_log.clear();
    }

    /// Number of listens whose feed is still attached.
    pub async fn listener_count(&self) -> usize {
        let mut inner = self.inner.lock().await;
        inner.listeners.retain(|l| !l.tx.is_closed());
        inner.listeners.len()
    }

    /// Makes every subsequent fetch and listen fail until cleared.
    pub async fn set_unavailable(&self, reason: Option<String>) {
        self.inner.lock().await.unavailable = reason;
    }
}

impl Inner {
    fn check_available(&self) -> Result<(), CollectionError> {
        match &self.unavailable {
            Some(reason) => Err(CollectionError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn broadcast(&mut self) {
        let rows = &self.rows;
        self.listeners.retain_mut(|listener| {
            let current = store::evaluate(rows, &listener.query);
            if current == listener.last {
                return !listener.tx.is_closed();
            }

            let mut events = store::diff(&listener.query.order, &listener.last, &current);
            events.push(FeedEvent::Loaded(ResultSet::new(current.clone())));
            listener.last = current;

            for event in events {
                if listener.tx.send(event).is_err() {
                    debug!(query = %listener.query, "dropping detached listener");
                    return false;
                }
            }
            true
        });
    }
}

fn validate(query: &Query) -> Result<(), CollectionError> {
    match query.limit {
        Some(Limit::First(0)) | Some(Limit::Last(0)) => Err(CollectionError::InvalidQuery(
            format!("limit must be positive: {query}"),
        )),
        _ => Ok(()),
    }
}

#[async_trait]
impl OrderedCollection for MemoryCollection {
    async fn fetch(&self, query: &Query) -> Result<ResultSet, CollectionError> {
        validate(query)?;
        let mut inner = self.inner.lock().await;
        inner.check_available()?;
        inner.fetch_log.push(query.clone());

        let rows = store::evaluate(&inner.rows, query);
        debug!(query = %query, returned = rows.len(), "memory collection fetch");
        Ok(ResultSet::new(rows))
    }

    async fn listen(&self, query: &Query) -> Result<LiveFeed, CollectionError> {
        validate(query)?;
        let mut inner = self.inner.lock().await;
        inner.check_available()?;

        let (tx, feed) = LiveFeed::channel();
        let initial = store::evaluate(&inner.rows, query);
        for row in &initial {
            if tx.send(FeedEvent::Added(row.clone())).is_err() {
                warn!(query = %query, "listener detached during initial load");
            }
        }
        let _ = tx.send(FeedEvent::Loaded(ResultSet::new(initial.clone())));

        debug!(query = %query, rows = initial.len(), "memory collection listen");
        inner.listeners.push(Listener {
            query: query.clone(),
            tx,
            last: initial,
        });
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::pagination::cursor::OrderBy;
    use serde_json::json;

    fn keyed(ids: &[&str]) -> MemoryCollection {
        MemoryCollection::from_rows(ids.iter().map(|id| RowSnapshot::new(*id, json!({}))))
    }

    #[tokio::test]
    async fn listen_replays_rows_then_loaded() {
        let collection = keyed(&["a", "b"]);
        let mut feed = collection
            .listen(&Query::ordered(OrderBy::Key))
            .await
            .unwrap();

        assert!(matches!(feed.recv().await, Some(FeedEvent::Added(r)) if r.id == "a"));
        assert!(matches!(feed.recv().await, Some(FeedEvent::Added(r)) if r.id == "b"));
        assert!(matches!(feed.recv().await, Some(FeedEvent::Loaded(rs)) if rs.num_children() == 2));
    }

    #[tokio::test]
    async fn mutations_reach_open_listeners() {
        let collection = keyed(&["a", "c"]);
        let mut feed = collection
            .listen(&Query::ordered(OrderBy::Key).limit_to_first(2))
            .await
            .unwrap();
        for _ in 0..3 {
            feed.recv().await.unwrap();
        }

        collection.upsert(RowSnapshot::new("b", json!({}))).await;

        assert!(matches!(feed.recv().await, Some(FeedEvent::Removed(r)) if r.id == "c"));
        assert!(matches!(feed.recv().await, Some(FeedEvent::Added(r)) if r.id == "b"));
        match feed.recv().await {
            Some(FeedEvent::Loaded(rs)) => assert_eq!(rs.ids(), vec!["a", "b"]),
            other => panic!("expected loaded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn detached_listeners_are_pruned() {
        let collection = keyed(&["a"]);
        let feed = collection
            .listen(&Query::ordered(OrderBy::Key))
            .await
            .unwrap();
        assert_eq!(collection.listener_count().await, 1);

        feed.detach();
        assert_eq!(collection.listener_count().await, 0);
    }

    #[tokio::test]
    async fn fetch_is_logged_and_can_fail() {
        let collection = keyed(&["a", "b", "c"]);
        let query = Query::ordered(OrderBy::Key).limit_to_first(2);

        let rows = collection.fetch(&query).await.unwrap();
        assert_eq!(rows.ids(), vec!["a", "b"]);
        assert_eq!(collection.fetch_log().await, vec![query.clone()]);

        collection.set_unavailable(Some("offline".into())).await;
        assert!(matches!(
            collection.fetch(&query).await,
            Err(CollectionError::Unavailable(_))
        ));
    }
}

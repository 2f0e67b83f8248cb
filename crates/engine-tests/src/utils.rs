#![allow(dead_code)]

use connectors::MemoryCollection;
use engine_config::CursorSettings;
use engine_runtime::{CursorOptions, OffsetCursor, OffsetHandle};
use model::{events::KeyNotice, pagination::cursor::OrderBy, records::row::RowSnapshot};
use serde_json::json;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

/// Rows `k01..kNN` ordered by id.
pub fn keyed_rows(n: usize) -> MemoryCollection {
    MemoryCollection::from_rows((1..=n).map(|i| RowSnapshot::new(format!("k{i:02}"), json!(i))))
}

/// Rows `(id, score)` stored as `{"score": score}` records.
pub fn scored_rows(rows: &[(&str, f64)]) -> MemoryCollection {
    MemoryCollection::from_rows(
        rows.iter()
            .map(|(id, score)| RowSnapshot::new(*id, json!({ "score": score }))),
    )
}

pub fn spawn_cursor(collection: &MemoryCollection, field: OrderBy, max: usize) -> OffsetHandle {
    spawn_cursor_with(collection, field, max, CursorSettings::default())
}

pub fn spawn_cursor_with(
    collection: &MemoryCollection,
    field: OrderBy,
    max: usize,
    settings: CursorSettings,
) -> OffsetHandle {
    let options = CursorOptions {
        field,
        collection: Arc::new(collection.clone()),
        max,
    };
    OffsetCursor::spawn(options, settings).expect("spawn cursor")
}

/// Lets forwarded feed events reach the cursor, without reaching the
/// recache quiet period.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Waits past the longest recache delay and lets the recache resolve.
pub async fn settle_recache() {
    tokio::time::sleep(Duration::from_millis(2_000)).await;
}

/// Collects every notice delivered to an observer.
#[derive(Clone, Default)]
pub struct NoticeLog {
    seen: Arc<Mutex<Vec<KeyNotice>>>,
}

impl NoticeLog {
    pub fn observer(&self) -> impl FnMut(&KeyNotice) + Send + 'static {
        let sink = self.seen.clone();
        move |notice: &KeyNotice| sink.lock().expect("notice log").push(notice.clone())
    }

    pub fn len(&self) -> usize {
        self.seen.lock().expect("notice log").len()
    }

    pub fn last(&self) -> Option<KeyNotice> {
        self.seen.lock().expect("notice log").last().cloned()
    }

    pub fn row_ids(&self) -> Vec<Option<String>> {
        self.seen
            .lock()
            .expect("notice log")
            .iter()
            .map(|n| n.row_id.clone())
            .collect()
    }
}

use crate::{
    core::value::SortValue,
    pagination::{cursor::KeyResolution, query::Query},
    records::row::{ResultSet, RowSnapshot},
};
use serde::Serialize;
use std::fmt::Debug;

/// A trait for events flowing through the cursor engine.
pub trait Event: Send + Sync + Debug + 'static {
    /// Returns a unique identifier for this event type.
    fn event_type(&self) -> &'static str;
}

/// Events delivered by a live subscription on the collection.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A row entered the subscribed range.
    Added(RowSnapshot),

    /// A row changed its position inside the subscribed range.
    Moved(RowSnapshot),

    /// A row left the subscribed range.
    Removed(RowSnapshot),

    /// The full contents of the range. Sent once the initial load is
    /// complete and again after every change.
    Loaded(ResultSet),
}

impl Event for FeedEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FeedEvent::Added(_) => "child_added",
            FeedEvent::Moved(_) => "child_moved",
            FeedEvent::Removed(_) => "child_removed",
            FeedEvent::Loaded(_) => "value",
        }
    }
}

/// Delivered to observers whenever the boundary at the current offset changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyNotice {
    /// Sort value of the boundary row, if one is resolved.
    pub value: Option<SortValue>,
    /// Id of the boundary row, if one is resolved.
    pub row_id: Option<String>,
    /// Query starting at the boundary; `None` while the boundary is unknown.
    pub reference: Option<Query>,
}

impl KeyNotice {
    pub fn new(resolution: &KeyResolution, base: &Query) -> Self {
        let boundary = resolution.boundary();
        KeyNotice {
            value: boundary.map(|k| k.sort_value.clone()),
            row_id: boundary.map(|k| k.row_id.clone()),
            reference: base.positioned_at(resolution),
        }
    }
}

impl Event for KeyNotice {
    fn event_type(&self) -> &'static str {
        "cursor.key_changed"
    }
}

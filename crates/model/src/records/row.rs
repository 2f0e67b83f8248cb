use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single row as delivered by the ordered collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSnapshot {
    /// Unique row identifier.
    pub id: String,
    /// The row payload.
    pub value: Value,
    /// Optional priority marker used when ordering by priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Value>,
}

impl RowSnapshot {
    pub fn new(id: impl Into<String>, value: Value) -> Self {
        RowSnapshot {
            id: id.into(),
            value,
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: Value) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Looks up a named child of the row payload.
    pub fn child(&self, field: &str) -> Option<&Value> {
        self.value.as_object().and_then(|obj| obj.get(field))
    }
}

/// Rows returned by a one-shot fetch or carried by a load-complete event,
/// in sort order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    rows: Vec<RowSnapshot>,
}

impl ResultSet {
    pub fn new(rows: Vec<RowSnapshot>) -> Self {
        ResultSet { rows }
    }

    pub fn num_children(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RowSnapshot> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[RowSnapshot] {
        &self.rows
    }

    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.id.as_str()).collect()
    }
}

impl IntoIterator for ResultSet {
    type Item = RowSnapshot;
    type IntoIter = std::vec::IntoIter<RowSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a RowSnapshot;
    type IntoIter = std::slice::Iter<'a, RowSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

use crate::pagination::cursor::{BoundaryKey, KeyResolution, OrderBy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Row count bound applied to an ordered query.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// Keep the first `n` rows of the range.
    First(usize),

    /// Keep the last `n` rows of the range.
    Last(usize),
}

impl Limit {
    pub fn count(&self) -> usize {
        match self {
            Limit::First(n) | Limit::Last(n) => *n,
        }
    }
}

/// An ordered range over the collection.
///
/// Queries are plain values; the collection client decides how to run them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub order: OrderBy,
    pub start: Option<BoundaryKey>,
    pub limit: Option<Limit>,
}

impl Query {
    /// The unbounded base query for an ordering.
    pub fn ordered(order: OrderBy) -> Self {
        Query {
            order,
            start: None,
            limit: None,
        }
    }

    /// Starts the range at `key` (inclusive).
    pub fn start_at(mut self, key: BoundaryKey) -> Self {
        self.start = Some(key);
        self
    }

    pub fn limit_to_first(mut self, n: usize) -> Self {
        self.limit = Some(Limit::First(n));
        self
    }

    pub fn limit_to_last(mut self, n: usize) -> Self {
        self.limit = Some(Limit::Last(n));
        self
    }

    /// The query positioned at a resolved boundary.
    ///
    /// `None` keeps the base query unchanged; an unknown boundary has no
    /// reference at all.
    pub fn positioned_at(&self, resolution: &KeyResolution) -> Option<Query> {
        match resolution {
            KeyResolution::None => Some(self.clone()),
            KeyResolution::Unknown => None,
            KeyResolution::Resolved(key) => Some(self.clone().start_at(key.clone())),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "orderBy={}", self.order)?;
        if let Some(start) = &self.start {
            write!(f, " startAt={start}")?;
        }
        match self.limit {
            Some(Limit::First(n)) => write!(f, " limitToFirst={n}"),
            Some(Limit::Last(n)) => write!(f, " limitToLast={n}"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn positions_reference_by_resolution() {
        let base = Query::ordered(OrderBy::Key);
        let key = BoundaryKey::new(json!("k5"), "k5");

        assert_eq!(base.positioned_at(&KeyResolution::None), Some(base.clone()));
        assert_eq!(base.positioned_at(&KeyResolution::Unknown), None);

        let positioned = base
            .positioned_at(&KeyResolution::Resolved(key.clone()))
            .unwrap();
        assert_eq!(positioned.start, Some(key));
        assert_eq!(positioned.limit, None);
    }

    #[test]
    fn renders_compact_description() {
        let q = Query::ordered(OrderBy::Child("score".into()))
            .start_at(BoundaryKey::new(json!(10), "a"))
            .limit_to_first(11);

        assert_eq!(q.to_string(), "orderBy=score startAt=(10, a) limitToFirst=11");
    }
}

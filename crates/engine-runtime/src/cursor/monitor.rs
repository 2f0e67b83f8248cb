use engine_core::KeyCache;
use model::pagination::query::Query;

/// Query watching for rows past the last known boundary, plus the row count
/// it reports while nothing new exists.
pub fn monitor_query(base: &Query, cache: &KeyCache) -> (Query, usize) {
    match cache.last() {
        Some(anchor) => (base.clone().start_at(anchor.clone()).limit_to_first(2), 1),
        None => (base.clone().limit_to_first(1), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::pagination::{
        cursor::{BoundaryKey, OrderBy},
        query::Limit,
    };
    use serde_json::json;

    #[test]
    fn empty_cache_watches_collection_start() {
        let base = Query::ordered(OrderBy::Key);
        let (q, baseline) = monitor_query(&base, &KeyCache::new());

        assert_eq!(baseline, 0);
        assert_eq!(q.start, None);
        assert_eq!(q.limit, Some(Limit::First(1)));
    }

    #[test]
    fn anchored_monitor_counts_the_anchor() {
        let base = Query::ordered(OrderBy::Key);
        let mut cache = KeyCache::new();
        cache.push(BoundaryKey::new(json!("a"), "a"));
        cache.push(BoundaryKey::new(json!("b"), "b"));

        let (q, baseline) = monitor_query(&base, &cache);

        assert_eq!(baseline, 1);
        assert_eq!(q.start.map(|k| k.row_id), Some("b".to_string()));
        assert_eq!(q.limit, Some(Limit::First(2)));
    }
}

use crate::error::CursorError;
use connectors::OrderedCollection;
use engine_core::{KeyCache, Metrics};
use model::pagination::{cursor::BoundaryKey, query::Query};
use tracing::{debug, warn};

/// One bounded page request issued while growing the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthStep {
    pub query: Query,
    pub limit: usize,
    /// The page begins at the last cached boundary, which is already known.
    pub anchor: Option<BoundaryKey>,
}

/// Plans the next page needed to cover `target`, or `None` when the cache
/// already reaches it.
pub fn plan_step(
    base: &Query,
    cache: &KeyCache,
    target: usize,
    page_size: usize,
) -> Option<GrowthStep> {
    let len = cache.len();
    if target <= len {
        return None;
    }

    let needed = (target - len).min(page_size);
    let step = match cache.last() {
        Some(anchor) => GrowthStep {
            limit: needed + 1,
            query: base.clone().start_at(anchor.clone()).limit_to_first(needed + 1),
            anchor: Some(anchor.clone()),
        },
        None => GrowthStep {
            limit: needed,
            query: base.clone().limit_to_first(needed),
            anchor: None,
        },
    };
    Some(step)
}

/// Pulls pages until the cache covers `target` or the collection runs out
/// of rows.
///
/// Returns whether the boundary at `target` changed.
pub async fn grow(
    collection: &dyn OrderedCollection,
    base: &Query,
    cache: &mut KeyCache,
    target: usize,
    page_size: usize,
    max_steps: usize,
    metrics: &Metrics,
) -> Result<bool, CursorError> {
    let before = cache.get(target);
    let mut steps = 0usize;

    while let Some(step) = plan_step(base, cache, target, page_size) {
        if steps >= max_steps {
            return Err(CursorError::RunawayGrowth {
                steps: max_steps,
                offset: target,
            });
        }
        steps += 1;

        debug!(query = %step.query, cached = cache.len(), target, "Fetching growth page");
        let page = collection.fetch(&step.query).await?;
        metrics.increment_fetches(1);

        let mut rows = page.iter();
        if let Some(anchor) = &step.anchor {
            let first = rows.next().map(|row| base.order.boundary(row)).transpose()?;
            if first.as_ref() != Some(anchor) {
                // The anchor row left the collection; cached offsets are stale.
                warn!(anchor = %anchor, "Growth anchor no longer leads its page, restarting");
                cache.clear();
                continue;
            }
        }

        let mut appended = 0u64;
        for row in rows {
            cache.push(base.order.boundary(row)?);
            appended += 1;
        }
        metrics.increment_keys_cached(appended);

        if page.num_children() < step.limit {
            break;
        }
    }

    let changed = cache.get(target) != before;
    debug!(target, cached = cache.len(), steps, changed, "Growth settled");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::MemoryCollection;
    use model::{
        pagination::{cursor::{KeyResolution, OrderBy}, query::Limit},
        records::row::RowSnapshot,
    };
    use serde_json::json;

    fn keyed(n: usize) -> MemoryCollection {
        MemoryCollection::from_rows((1..=n).map(|i| RowSnapshot::new(format!("k{i:02}"), json!(i))))
    }

    #[test]
    fn first_step_has_no_anchor() {
        let base = Query::ordered(OrderBy::Key);
        let step = plan_step(&base, &KeyCache::new(), 25, 10).unwrap();

        assert_eq!(step.limit, 10);
        assert_eq!(step.anchor, None);
        assert_eq!(step.query.limit, Some(Limit::First(10)));
    }

    #[test]
    fn continuation_overlaps_by_one_row() {
        let base = Query::ordered(OrderBy::Key);
        let mut cache = KeyCache::new();
        for i in 1..=10 {
            let id = format!("k{i:02}");
            cache.push(BoundaryKey::new(json!(id.clone()), id));
        }

        let step = plan_step(&base, &cache, 13, 10).unwrap();
        assert_eq!(step.limit, 4);
        assert_eq!(step.anchor.as_ref().map(|k| k.row_id.as_str()), Some("k10"));
        assert!(plan_step(&base, &cache, 10, 10).is_none());
    }

    #[tokio::test]
    async fn grows_in_pages_until_target_is_cached() {
        let collection = keyed(30);
        let base = Query::ordered(OrderBy::Key);
        let mut cache = KeyCache::new();
        let metrics = Metrics::new();

        let changed = grow(&collection, &base, &mut cache, 25, 10, 100, &metrics)
            .await
            .unwrap();

        assert!(changed);
        assert_eq!(cache.len(), 25);
        assert_eq!(cache.get(25).row_id(), Some("k25"));
        assert_eq!(metrics.snapshot().fetches, 3);
        assert_eq!(metrics.snapshot().keys_cached, 25);
    }

    #[tokio::test]
    async fn settles_short_when_collection_runs_out() {
        let collection = keyed(3);
        let base = Query::ordered(OrderBy::Key);
        let mut cache = KeyCache::new();

        let changed = grow(&collection, &base, &mut cache, 5, 10, 100, &Metrics::new())
            .await
            .unwrap();

        assert!(!changed);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(5), KeyResolution::Unknown);
    }

    #[tokio::test]
    async fn covered_target_issues_no_fetch() {
        let collection = keyed(5);
        let base = Query::ordered(OrderBy::Key);
        let mut cache = KeyCache::new();
        let metrics = Metrics::new();
        grow(&collection, &base, &mut cache, 4, 10, 100, &metrics)
            .await
            .unwrap();
        collection.clear_fetch_log().await;

        let changed = grow(&collection, &base, &mut cache, 2, 10, 100, &metrics)
            .await
            .unwrap();

        assert!(!changed);
        assert!(collection.fetch_log().await.is_empty());
    }

    #[tokio::test]
    async fn caps_runaway_growth() {
        let collection = keyed(30);
        let base = Query::ordered(OrderBy::Key);
        let mut cache = KeyCache::new();

        let err = grow(&collection, &base, &mut cache, 10, 1, 3, &Metrics::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CursorError::RunawayGrowth { steps: 3, offset: 10 }
        ));
    }

    #[tokio::test]
    async fn missing_anchor_restarts_from_collection_start() {
        let collection = keyed(6);
        let base = Query::ordered(OrderBy::Key);
        let mut cache = KeyCache::new();
        let metrics = Metrics::new();
        grow(&collection, &base, &mut cache, 3, 10, 100, &metrics)
            .await
            .unwrap();

        collection.remove("k03").await;
        grow(&collection, &base, &mut cache, 5, 10, 100, &metrics)
            .await
            .unwrap();

        assert_eq!(cache.get(3).row_id(), Some("k04"));
        assert_eq!(cache.get(5).row_id(), Some("k06"));
    }

    #[tokio::test]
    async fn scalar_rows_cannot_order_by_child() {
        let collection = MemoryCollection::from_rows(vec![RowSnapshot::new("a", json!(1))]);
        let base = Query::ordered(OrderBy::Child("score".into()));
        let mut cache = KeyCache::new();

        let err = grow(&collection, &base, &mut cache, 1, 10, 100, &Metrics::new())
            .await
            .unwrap_err();

        assert!(matches!(err, CursorError::Extract(_)));
    }
}

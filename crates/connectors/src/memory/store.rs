use model::{
    core::value::SortValue,
    events::FeedEvent,
    pagination::{
        cursor::{BoundaryKey, OrderBy},
        query::{Limit, Query},
    },
    records::row::RowSnapshot,
};
use std::{cmp::Ordering, collections::BTreeMap};

/// Position of a row under an ordering. Rows that cannot be ordered by a
/// child field sort as `null`, matching how the collection treats them.
pub(crate) fn position_of(order: &OrderBy, row: &RowSnapshot) -> BoundaryKey {
    BoundaryKey {
        sort_value: order.sort_value(row).unwrap_or(SortValue::Null),
        row_id: row.id.clone(),
    }
}

/// Evaluates `query` against the full set of rows.
pub(crate) fn evaluate(rows: &BTreeMap<String, RowSnapshot>, query: &Query) -> Vec<RowSnapshot> {
    let mut ordered: Vec<(BoundaryKey, &RowSnapshot)> = rows
        .values()
        .map(|row| (position_of(&query.order, row), row))
        .collect();
    ordered.sort_by(|a, b| a.0.position_cmp(&b.0));

    let in_range = ordered.into_iter().filter(|(pos, _)| match &query.start {
        Some(start) => pos.position_cmp(start) != Ordering::Less,
        None => true,
    });

    let selected: Vec<RowSnapshot> = in_range.map(|(_, row)| row.clone()).collect();
    match query.limit {
        Some(Limit::First(n)) => selected.into_iter().take(n).collect(),
        Some(Limit::Last(n)) => {
            let skip = selected.len().saturating_sub(n);
            selected.into_iter().skip(skip).collect()
        }
        None => selected,
    }
}

/// Computes the structural events that turn `old` into `new`.
///
/// A row that stays in range is reported as moved only when its own sort
/// value changed and its relative position among the surviving rows changed.
pub(crate) fn diff(order: &OrderBy, old: &[RowSnapshot], new: &[RowSnapshot]) -> Vec<FeedEvent> {
    let old_ids: BTreeMap<&str, &RowSnapshot> = old.iter().map(|r| (r.id.as_str(), r)).collect();
    let new_ids: BTreeMap<&str, &RowSnapshot> = new.iter().map(|r| (r.id.as_str(), r)).collect();

    let mut events = Vec::new();

    for row in old {
        if !new_ids.contains_key(row.id.as_str()) {
            events.push(FeedEvent::Removed(row.clone()));
        }
    }

    for row in new {
        if !old_ids.contains_key(row.id.as_str()) {
            events.push(FeedEvent::Added(row.clone()));
        }
    }

    let old_common: Vec<&str> = old
        .iter()
        .map(|r| r.id.as_str())
        .filter(|id| new_ids.contains_key(id))
        .collect();
    let new_common: Vec<&str> = new
        .iter()
        .map(|r| r.id.as_str())
        .filter(|id| old_ids.contains_key(id))
        .collect();

    for (new_idx, id) in new_common.iter().enumerate() {
        let old_idx = old_common.iter().position(|o| o == id);
        if old_idx == Some(new_idx) {
            continue;
        }
        let (Some(before), Some(after)) = (old_ids.get(id), new_ids.get(id)) else {
            continue;
        };
        if position_of(order, before) != position_of(order, after) {
            events.push(FeedEvent::Moved((*after).clone()));
        }
    }

    events
}

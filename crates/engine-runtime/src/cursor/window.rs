use model::pagination::{cursor::KeyResolution, query::Query};

/// First offset covered by the live window around `offset`.
pub fn window_start(offset: usize, page_size: usize, cap: usize) -> usize {
    offset
        .saturating_sub(page_size)
        .max(offset.saturating_sub(cap))
}

/// The window query ending at the boundary row of `offset`.
///
/// `start_key` is the cached resolution of `start`. Returns `None` when the
/// start boundary is not cached.
pub fn window_query(
    base: &Query,
    start_key: &KeyResolution,
    start: usize,
    offset: usize,
) -> Option<Query> {
    let positioned = base.positioned_at(start_key)?;
    let rows = if start == 0 { offset } else { offset - start + 1 };
    Some(positioned.limit_to_first(rows))
}

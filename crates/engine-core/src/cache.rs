use model::pagination::cursor::{BoundaryKey, KeyResolution};

/// Append-only mapping from 1-based offsets to boundary keys.
///
/// Index `i` holds the boundary for offset `i + 1`. The only way to shrink
/// the cache is [`KeyCache::clear`].
#[derive(Debug, Clone, Default)]
pub struct KeyCache {
    keys: Vec<BoundaryKey>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Resolves the boundary for `offset`.
    pub fn get(&self, offset: usize) -> KeyResolution {
        if offset == 0 {
            return KeyResolution::None;
        }
        match self.keys.get(offset - 1) {
            Some(key) => KeyResolution::Resolved(key.clone()),
            None => KeyResolution::Unknown,
        }
    }

    /// The last cached boundary, used as the anchor for the next page.
    pub fn last(&self) -> Option<&BoundaryKey> {
        self.keys.last()
    }

    pub fn push(&mut self, key: BoundaryKey) {
        self.keys.push(key);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn keys(&self) -> &[BoundaryKey] {
        &self.keys
    }
}

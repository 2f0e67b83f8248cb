use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    fetches: AtomicU64,
    keys_cached: AtomicU64,
    recaches: AtomicU64,
    subscriptions: AtomicU64,
    notifications: AtomicU64,
}

/// Counters shared between a cursor and whoever inspects it.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// One-shot growth queries issued
    pub fetches: u64,
    /// Boundary keys appended to the cache
    pub keys_cached: u64,
    /// Debounced recaches executed
    pub recaches: u64,
    /// Window and empty-offset subscriptions attached
    pub subscriptions: u64,
    /// Notifications delivered to observers
    pub notifications: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn increment_fetches(&self, count: u64) {
        self.inner.fetches.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_keys_cached(&self, count: u64) {
        self.inner.keys_cached.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_recaches(&self, count: u64) {
        self.inner.recaches.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_subscriptions(&self, count: u64) {
        self.inner.subscriptions.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_notifications(&self, count: u64) {
        self.inner.notifications.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fetches: self.inner.fetches.load(Ordering::Relaxed),
            keys_cached: self.inner.keys_cached.load(Ordering::Relaxed),
            recaches: self.inner.recaches.load(Ordering::Relaxed),
            subscriptions: self.inner.subscriptions.load(Ordering::Relaxed),
            notifications: self.inner.notifications.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

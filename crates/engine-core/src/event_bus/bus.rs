use crate::metrics::Metrics;
use model::{
    events::{Event, KeyNotice},
    pagination::{cursor::KeyResolution, query::Query},
};
use tracing::debug;

/// Receives boundary changes from a cursor.
pub trait KeyObserver: Send + 'static {
    fn on_key(&mut self, notice: &KeyNotice);
}

impl<F> KeyObserver for F
where
    F: FnMut(&KeyNotice) + Send + 'static,
{
    fn on_key(&mut self, notice: &KeyNotice) {
        (*self)(notice)
    }
}

/// A handle that can be used to stop observing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Fans out boundary changes to observers, suppressing repeats.
pub struct NotificationBus {
    observers: Vec<(ObserverId, Box<dyn KeyObserver>)>,
    next_id: u64,
    // None until something has been delivered since the last reset.
    last_notified: Option<KeyResolution>,
    metrics: Metrics,
}

impl NotificationBus {
    pub fn new(metrics: Metrics) -> Self {
        NotificationBus {
            observers: Vec::new(),
            next_id: 0,
            last_notified: None,
            metrics,
        }
    }

    /// Registers `observer` and immediately hands it `current`.
    pub fn observe(
        &mut self,
        mut observer: Box<dyn KeyObserver>,
        current: &KeyResolution,
        base: &Query,
    ) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;

        observer.on_key(&KeyNotice::new(current, base));
        self.observers.push((id, observer));

        debug!(observer_id = id.0, observers = self.observers.len(), "Observer registered");
        id
    }

    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        let removed = self.observers.len() != before;
        if removed {
            debug!(observer_id = id.0, "Observer removed");
        }
        removed
    }

    /// Delivers `resolution` unless it equals the last delivered value.
    /// Returns whether observers were invoked.
    pub fn notify(&mut self, resolution: &KeyResolution, base: &Query) -> bool {
        if self.last_notified.as_ref() == Some(resolution) {
            return false;
        }
        self.last_notified = Some(resolution.clone());

        let notice = KeyNotice::new(resolution, base);
        debug!(
            event_type = notice.event_type(),
            key = %resolution,
            observers = self.observers.len(),
            "Publishing key change"
        );
        for (_, observer) in self.observers.iter_mut() {
            observer.on_key(&notice);
        }
        self.metrics.increment_notifications(1);
        true
    }

    /// Forgets the last delivered value so the next `notify` always fires.
    pub fn forget(&mut self) {
        self.last_notified = None;
    }

    pub fn last_notified(&self) -> Option<&KeyResolution> {
        self.last_notified.as_ref()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

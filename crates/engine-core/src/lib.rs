pub mod cache;
pub mod debounce;
pub mod event_bus;
pub mod metrics;

pub use cache::KeyCache;
pub use debounce::RateLimiter;
pub use event_bus::bus::{KeyObserver, NotificationBus, ObserverId};
pub use metrics::{Metrics, MetricsSnapshot};

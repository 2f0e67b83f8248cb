pub mod growth;
pub mod monitor;
pub mod subscription;
pub mod window;

use crate::{
    actor::{Actor, ActorContext, ActorRef, CursorMsg, spawn_actor},
    error::{ActorError, CursorError},
    handle::OffsetHandle,
};
use async_trait::async_trait;
use connectors::OrderedCollection;
use engine_config::CursorSettings;
use engine_core::{KeyCache, Metrics, NotificationBus, RateLimiter};
use model::{
    events::{Event, FeedEvent},
    pagination::{
        cursor::{KeyResolution, OrderBy},
        query::Query,
    },
};
use serde::Serialize;
use std::{fmt, sync::Arc};
use subscription::{Subscription, WatchKind, WatchSlot};
use tracing::{debug, error, info, trace, warn};

/// Construction parameters of a cursor.
#[derive(Clone)]
pub struct CursorOptions {
    /// Field the collection is ordered by.
    pub field: OrderBy,
    pub collection: Arc<dyn OrderedCollection>,
    /// Page size used for growth and the live window.
    pub max: usize,
}

impl fmt::Debug for CursorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorOptions")
            .field("field", &self.field)
            .field("max", &self.max)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Nothing resolved yet, or destroyed.
    Idle,
    /// Paging boundary keys into the cache.
    Growing,
    /// Window attached, waiting for its initial load.
    Subscribing,
    Settled,
    /// Growth ran out of rows; watching for the offset to fill.
    EmptyWatching,
    /// A resolution failed fatally.
    Faulted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Growing => "growing",
            Phase::Subscribing => "subscribing",
            Phase::Settled => "settled",
            Phase::EmptyWatching => "empty_watching",
            Phase::Faulted => "faulted",
        };
        f.write_str(name)
    }
}

/// Point-in-time view of a cursor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CursorStatus {
    pub offset: usize,
    pub phase: Phase,
    pub cached_keys: usize,
    pub watching: bool,
    pub recache_pending: bool,
}

/// Maps an offset to the boundary row of the page ending there, and keeps
/// that mapping current while the collection changes.
pub struct OffsetCursor {
    collection: Arc<dyn OrderedCollection>,
    base: Query,
    page_size: usize,
    settings: CursorSettings,

    offset: usize,
    cache: KeyCache,
    phase: Phase,
    fault: Option<String>,

    watch: WatchSlot,
    generation: u64,
    bus: NotificationBus,

    limiter: Option<RateLimiter>,
    self_ref: Option<ActorRef<CursorMsg>>,
    metrics: Metrics,
}

impl OffsetCursor {
    /// Starts a cursor actor and returns the handle driving it.
    pub fn spawn(
        options: CursorOptions,
        settings: CursorSettings,
    ) -> Result<OffsetHandle, CursorError> {
        settings.validate()?;
        if options.max == 0 {
            return Err(CursorError::InvalidPageSize(options.max));
        }

        let metrics = Metrics::new();
        let cursor = OffsetCursor {
            base: Query::ordered(options.field.clone()),
            collection: options.collection,
            page_size: options.max,
            settings: settings.clone(),
            offset: 0,
            cache: KeyCache::new(),
            phase: Phase::Idle,
            fault: None,
            watch: WatchSlot::default(),
            generation: 0,
            bus: NotificationBus::new(metrics.clone()),
            limiter: None,
            self_ref: None,
            metrics: metrics.clone(),
        };

        let name = format!("cursor[{}]", options.field);
        let (actor_ref, task) = spawn_actor(name, settings.mailbox_capacity(), cursor);
        actor_ref.try_send(CursorMsg::SetActorRef(actor_ref.clone()))?;

        Ok(OffsetHandle::new(actor_ref, metrics, task))
    }

    fn current(&self) -> KeyResolution {
        self.cache.get(self.offset)
    }

    fn notify(&mut self) {
        let current = self.current();
        self.bus.notify(&current, &self.base);
    }

    /// Resolves the boundary at the current offset and attaches the matching
    /// subscription.
    async fn resolve(&mut self) -> Result<(), CursorError> {
        self.watch.detach();

        match self.current() {
            KeyResolution::None => {
                self.phase = Phase::Settled;
                self.notify();
            }
            KeyResolution::Unknown => {
                self.phase = Phase::Growing;
                let changed = growth::grow(
                    self.collection.as_ref(),
                    &self.base,
                    &mut self.cache,
                    self.offset,
                    self.page_size,
                    self.settings.max_growth_steps(),
                    &self.metrics,
                )
                .await?;

                if changed || !self.current().is_unknown() {
                    self.subscribe_window().await?;
                } else {
                    self.watch_empty_offset().await?;
                    self.notify();
                }
            }
            KeyResolution::Resolved(_) => self.subscribe_window().await?,
        }
        Ok(())
    }

    async fn subscribe_window(&mut self) -> Result<(), CursorError> {
        let start = window::window_start(self.offset, self.page_size, self.settings.window_cap());
        let query = window::window_query(&self.base, &self.cache.get(start), start, self.offset)
            .ok_or_else(|| {
                CursorError::Faulted(format!("window start {start} is not cached"))
            })?;

        self.attach(query, WatchKind::Window).await?;
        self.phase = Phase::Subscribing;
        Ok(())
    }

    async fn watch_empty_offset(&mut self) -> Result<(), CursorError> {
        let (query, baseline) = monitor::monitor_query(&self.base, &self.cache);
        self.attach(query, WatchKind::EmptyOffset { baseline }).await?;
        self.phase = Phase::EmptyWatching;
        Ok(())
    }

    async fn attach(&mut self, query: Query, kind: WatchKind) -> Result<(), CursorError> {
        let actor_ref = self
            .self_ref
            .clone()
            .ok_or_else(|| CursorError::Faulted("cursor is not initialized".into()))?;

        self.generation += 1;
        let subscription = Subscription::attach(
            self.collection.as_ref(),
            query,
            kind,
            self.generation,
            actor_ref,
        )
        .await?;
        self.watch.replace(subscription);
        self.metrics.increment_subscriptions(1);
        Ok(())
    }

    fn schedule_recache(&self) {
        if matches!(self.phase, Phase::Growing | Phase::Subscribing) {
            trace!(phase = %self.phase, "Recache suppressed while resolving");
            return;
        }
        if let Some(limiter) = &self.limiter {
            limiter.trigger();
        }
    }

    fn fail(&mut self, err: &CursorError) {
        self.watch.detach();
        self.phase = Phase::Faulted;
        self.fault = Some(err.to_string());
    }

    async fn go_to(&mut self, offset: usize) -> Result<(), CursorError> {
        if offset == self.offset {
            if self.phase == Phase::Faulted {
                let reason = self.fault.clone().unwrap_or_default();
                return Err(CursorError::Faulted(reason));
            }
            return Ok(());
        }

        info!(from = self.offset, to = offset, "Moving cursor");
        self.bus.forget();
        self.offset = offset;
        self.fault = None;

        if let Err(e) = self.resolve().await {
            error!(offset, error = %e, "Failed to resolve offset");
            self.fail(&e);
            return Err(e);
        }
        Ok(())
    }

    async fn recache(&mut self) {
        if matches!(self.phase, Phase::Idle | Phase::Faulted) {
            debug!(phase = %self.phase, "Ignoring recache");
            return;
        }

        self.metrics.increment_recaches(1);
        debug!(offset = self.offset, cached = self.cache.len(), "Recaching");
        self.cache.clear();

        if let Err(e) = self.resolve().await {
            error!(offset = self.offset, error = %e, "Recache failed");
            self.fail(&e);
        }
    }

    fn destroy(&mut self) {
        self.watch.detach();
        if let Some(limiter) = &self.limiter {
            limiter.cancel();
        }
        self.offset = 0;
        self.cache.clear();
        self.bus.forget();
        self.phase = Phase::Idle;
        self.fault = None;
    }

    fn on_feed(&mut self, generation: u64, event: FeedEvent) {
        let Some(kind) = self.watch.current(generation) else {
            trace!(generation, event_type = event.event_type(), "Dropping stale feed event");
            return;
        };

        match (kind, event) {
            (WatchKind::Window, FeedEvent::Loaded(_)) => {
                if self.phase == Phase::Subscribing {
                    self.phase = Phase::Settled;
                }
                self.notify();
            }
            (WatchKind::Window, FeedEvent::Added(_) | FeedEvent::Removed(_)) => {
                self.schedule_recache();
            }
            (WatchKind::Window, FeedEvent::Moved(row)) => {
                if self.current().row_id() == Some(row.id.as_str()) {
                    self.schedule_recache();
                }
            }
            (WatchKind::EmptyOffset { baseline }, FeedEvent::Loaded(rows)) => {
                if rows.num_children() > baseline {
                    debug!(
                        rows = rows.num_children(),
                        baseline, "Empty offset filled, recaching"
                    );
                    self.watch.detach();
                    self.schedule_recache();
                }
            }
            (WatchKind::EmptyOffset { .. }, _) => {}
        }
    }

    fn status(&self) -> CursorStatus {
        CursorStatus {
            offset: self.offset,
            phase: self.phase,
            cached_keys: self.cache.len(),
            watching: self.watch.active().is_some(),
            recache_pending: self.limiter.as_ref().is_some_and(|l| l.is_pending()),
        }
    }
}

#[async_trait]
impl Actor<CursorMsg> for OffsetCursor {
    async fn on_start(&mut self, ctx: &ActorContext) -> Result<(), ActorError> {
        info!(actor = ctx.name(), page_size = self.page_size, "Cursor actor started");
        Ok(())
    }

    async fn handle(&mut self, msg: CursorMsg, ctx: &ActorContext) -> Result<(), ActorError> {
        match msg {
            CursorMsg::SetActorRef(actor_ref) => {
                let target = actor_ref.clone();
                let limiter = RateLimiter::spawn(self.settings.recache(), move || {
                    let target = target.clone();
                    tokio::spawn(async move {
                        if target.send(CursorMsg::Recache).await.is_err() {
                            trace!("Cursor gone before recache");
                        }
                    });
                });
                self.limiter = Some(limiter);
                self.self_ref = Some(actor_ref);
            }

            CursorMsg::GoTo { offset, reply } => {
                let result = self.go_to(offset).await;
                let _ = reply.send(result);
            }

            CursorMsg::GetOffset { reply } => {
                let _ = reply.send(self.offset);
            }

            CursorMsg::GetKey { offset, reply } => {
                let _ = reply.send(self.cache.get(offset));
            }

            CursorMsg::Observe { observer, reply } => {
                let current = self.current();
                let id = self.bus.observe(observer, &current, &self.base);
                let _ = reply.send(id);
            }

            CursorMsg::Unobserve { id, reply } => {
                let _ = reply.send(self.bus.unobserve(id));
            }

            CursorMsg::Destroy { reply } => {
                info!(actor = ctx.name(), "Destroying cursor state");
                self.destroy();
                let _ = reply.send(());
            }

            CursorMsg::Status { reply } => {
                let _ = reply.send(self.status());
            }

            CursorMsg::Feed { generation, event } => self.on_feed(generation, event),

            CursorMsg::Recache => self.recache().await,

            CursorMsg::Shutdown => {
                info!(actor = ctx.name(), "Shutting down cursor");
                ctx.stop();
            }
        }
        Ok(())
    }

    async fn on_stop(&mut self, ctx: &ActorContext) -> Result<(), ActorError> {
        self.watch.detach();
        self.limiter = None;
        self.self_ref = None;
        if self.phase == Phase::Faulted {
            warn!(actor = ctx.name(), fault = ?self.fault, "Cursor stopped while faulted");
        } else {
            info!(actor = ctx.name(), "Cursor actor stopped");
        }
        Ok(())
    }
}

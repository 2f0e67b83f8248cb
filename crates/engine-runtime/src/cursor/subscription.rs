use crate::{
    actor::{ActorRef, CursorMsg},
    error::CursorError,
};
use connectors::OrderedCollection;
use model::pagination::query::Query;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// What a live subscription is watching for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchKind {
    /// Rows up to and including the current boundary.
    Window,

    /// Rows past the last known boundary while the offset has none.
    EmptyOffset { baseline: usize },
}

/// A live subscription whose events are forwarded into the cursor mailbox.
///
/// Dropping it detaches the subscription.
#[derive(Debug)]
pub struct Subscription {
    kind: WatchKind,
    generation: u64,
    query: Query,
    cancel: CancellationToken,
}

impl Subscription {
    pub async fn attach(
        collection: &dyn OrderedCollection,
        query: Query,
        kind: WatchKind,
        generation: u64,
        actor_ref: ActorRef<CursorMsg>,
    ) -> Result<Self, CursorError> {
        let mut feed = collection.listen(&query).await?;
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    event = feed.recv() => match event {
                        Some(event) => {
                            let msg = CursorMsg::Feed { generation, event };
                            if actor_ref.send(msg).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
            trace!(generation, "Subscription forwarder finished");
            feed.detach();
        });

        debug!(query = %query, ?kind, generation, "Subscription attached");
        Ok(Subscription {
            kind,
            generation,
            query,
            cancel,
        })
    }

    pub fn kind(&self) -> WatchKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &Query {
        &self.query
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// The single subscription slot shared by the window and the empty-offset
/// monitor.
#[derive(Debug, Default)]
pub struct WatchSlot {
    active: Option<Subscription>,
}

impl WatchSlot {
    /// Installs `subscription`, detaching whatever was attached before.
    pub fn replace(&mut self, subscription: Subscription) {
        self.detach();
        self.active = Some(subscription);
    }

    pub fn detach(&mut self) {
        if let Some(previous) = self.active.take() {
            debug!(generation = previous.generation, "Subscription detached");
        }
    }

    /// The kind of the subscription that produced `generation`, if it is
    /// still attached.
    pub fn current(&self, generation: u64) -> Option<WatchKind> {
        self.active
            .as_ref()
            .filter(|s| s.generation == generation)
            .map(|s| s.kind)
    }

    pub fn active(&self) -> Option<&Subscription> {
        self.active.as_ref()
    }
}

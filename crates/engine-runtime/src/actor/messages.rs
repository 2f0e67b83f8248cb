use crate::{
    actor::ActorRef,
    cursor::CursorStatus,
    error::CursorError,
};
use engine_core::{KeyObserver, ObserverId};
use model::{events::FeedEvent, pagination::cursor::KeyResolution};
use std::fmt;
use tokio::sync::oneshot;

pub type Reply<T> = oneshot::Sender<T>;

/// Messages for the offset cursor actor.
pub enum CursorMsg {
    /// Initialize the actor with its own reference for recache scheduling.
    SetActorRef(ActorRef<CursorMsg>),

    /// Move to a new offset and resolve its boundary.
    GoTo {
        offset: usize,
        reply: Reply<Result<(), CursorError>>,
    },

    GetOffset {
        reply: Reply<usize>,
    },

    /// Look up a cached boundary without fetching.
    GetKey {
        offset: usize,
        reply: Reply<KeyResolution>,
    },

    Observe {
        observer: Box<dyn KeyObserver>,
        reply: Reply<ObserverId>,
    },

    Unobserve {
        id: ObserverId,
        reply: Reply<bool>,
    },

    /// Detach and reset everything except the observers.
    Destroy {
        reply: Reply<()>,
    },

    Status {
        reply: Reply<CursorStatus>,
    },

    /// An event forwarded from a live subscription.
    Feed { generation: u64, event: FeedEvent },

    /// Fired by the rate limiter once a burst of changes has settled.
    Recache,

    /// Graceful shutdown.
    Shutdown,
}

impl fmt::Debug for CursorMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorMsg::SetActorRef(actor) => f.debug_tuple("SetActorRef").field(&actor.name()).finish(),
            CursorMsg::GoTo { offset, .. } => f.debug_struct("GoTo").field("offset", offset).finish(),
            CursorMsg::GetOffset { .. } => f.write_str("GetOffset"),
            CursorMsg::GetKey { offset, .. } => {
                f.debug_struct("GetKey").field("offset", offset).finish()
            }
            CursorMsg::Observe { .. } => f.write_str("Observe"),
            CursorMsg::Unobserve { id, .. } => f.debug_struct("Unobserve").field("id", id).finish(),
            CursorMsg::Destroy { .. } => f.write_str("Destroy"),
            CursorMsg::Status { .. } => f.write_str("Status"),
            CursorMsg::Feed { generation, event } => f
                .debug_struct("Feed")
                .field("generation", generation)
                .field("event", event)
                .finish(),
            CursorMsg::Recache => f.write_str("Recache"),
            CursorMsg::Shutdown => f.write_str("Shutdown"),
        }
    }
}

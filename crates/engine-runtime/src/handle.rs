use crate::{
    actor::{ActorRef, CursorMsg},
    cursor::CursorStatus,
    error::CursorError,
};
use engine_core::{KeyObserver, Metrics, MetricsSnapshot, ObserverId};
use model::pagination::cursor::KeyResolution;
use tokio::{sync::oneshot, task::JoinHandle};
use tracing::debug;

/// Client side of a running cursor.
///
/// Every call is a message to the cursor actor, so calls are applied in the
/// order they are made. Dropping the handle stops the cursor.
pub struct OffsetHandle {
    actor: ActorRef<CursorMsg>,
    metrics: Metrics,
    task: Option<JoinHandle<()>>,
}

impl OffsetHandle {
    pub(crate) fn new(actor: ActorRef<CursorMsg>, metrics: Metrics, task: JoinHandle<()>) -> Self {
        OffsetHandle {
            actor,
            metrics,
            task: Some(task),
        }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> CursorMsg,
    ) -> Result<T, CursorError> {
        Ok(self.actor.ask(build).await?)
    }

    /// Moves to `offset` and resolves its boundary.
    ///
    /// Returns once growth finished and the matching subscription is
    /// attached; observers hear about the new boundary when the window's
    /// initial load arrives.
    pub async fn go_to(&self, offset: usize) -> Result<(), CursorError> {
        self.request(|reply| CursorMsg::GoTo { offset, reply })
            .await?
    }

    pub async fn get_offset(&self) -> Result<usize, CursorError> {
        self.request(|reply| CursorMsg::GetOffset { reply }).await
    }

    /// The cached boundary for `offset`. Never fetches.
    pub async fn get_key(&self, offset: usize) -> Result<KeyResolution, CursorError> {
        self.request(|reply| CursorMsg::GetKey { offset, reply })
            .await
    }

    /// Registers `observer`; it is called right away with the current
    /// boundary.
    pub async fn observe<O>(&self, observer: O) -> Result<ObserverId, CursorError>
    where
        O: KeyObserver,
    {
        let observer: Box<dyn KeyObserver> = Box::new(observer);
        self.request(|reply| CursorMsg::Observe { observer, reply })
            .await
    }

    pub async fn unobserve(&self, id: ObserverId) -> Result<bool, CursorError> {
        self.request(|reply| CursorMsg::Unobserve { id, reply })
            .await
    }

    /// Detaches the live subscription and resets the cursor to offset 0.
    /// Observers stay registered.
    pub async fn destroy(&self) -> Result<(), CursorError> {
        self.request(|reply| CursorMsg::Destroy { reply }).await
    }

    pub async fn status(&self) -> Result<CursorStatus, CursorError> {
        self.request(|reply| CursorMsg::Status { reply }).await
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Stops the cursor and waits for its task to finish.
    pub async fn shutdown(mut self) -> Result<(), CursorError> {
        self.actor.send(CursorMsg::Shutdown).await?;
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| CursorError::Faulted(format!("cursor task failed: {e}")))?;
        }
        Ok(())
    }
}

impl Drop for OffsetHandle {
    fn drop(&mut self) {
        if self.task.is_none() {
            return;
        }
        if self.actor.try_send(CursorMsg::Shutdown).is_ok() {
            return;
        }
        // Mailbox full: deliver the shutdown once there is room.
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let actor = self.actor.clone();
            runtime.spawn(async move {
                if actor.send(CursorMsg::Shutdown).await.is_err() {
                    debug!("Cursor already stopped");
                }
            });
        }
    }
}

use crate::error::ActorError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::{mpsc, oneshot};

/// Per-actor state shared with the event loop.
#[derive(Debug, Clone)]
pub struct ActorContext {
    name: Arc<str>,
    stopping: Arc<AtomicBool>,
}

impl ActorContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            stopping: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Leave the event loop once the current message is handled. Senders
    /// held elsewhere (subscription forwarders, timers) do not keep the
    /// actor alive after this.
    pub fn stop(&self) {
        self.stopping.store(true, Ordering::Release);
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }
}

/// A single-owner state machine driven by messages of type `M`.
///
/// `handle` is never called concurrently, so implementations own their
/// state outright and only suspend while awaiting I/O.
#[async_trait]
pub trait Actor<M>: Send + 'static
where
    M: Send + Debug + 'static,
{
    async fn on_start(&mut self, _ctx: &ActorContext) -> Result<(), ActorError> {
        Ok(())
    }

    async fn handle(&mut self, msg: M, ctx: &ActorContext) -> Result<(), ActorError>;

    /// Runs after the last message, whichever way the loop ended.
    async fn on_stop(&mut self, _ctx: &ActorContext) -> Result<(), ActorError> {
        Ok(())
    }
}

/// Address of a running actor.
#[derive(Debug)]
pub struct ActorRef<M>
where
    M: Send + Debug + 'static,
{
    name: Arc<str>,
    tx: mpsc::Sender<M>,
}

impl<M> Clone for ActorRef<M>
where
    M: Send + Debug + 'static,
{
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            tx: self.tx.clone(),
        }
    }
}

impl<M> ActorRef<M>
where
    M: Send + Debug + 'static,
{
    pub fn new(name: impl Into<String>, tx: mpsc::Sender<M>) -> Self {
        Self {
            name: Arc::from(name.into()),
            tx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waits for mailbox room, then enqueues `msg`.
    pub async fn send(&self, msg: M) -> Result<(), ActorError> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| ActorError::MailboxClosed(self.name.to_string()))
    }

    /// Enqueues `msg` only if the mailbox has room right now.
    pub fn try_send(&self, msg: M) -> Result<(), ActorError> {
        self.tx
            .try_send(msg)
            .map_err(|_| ActorError::MailboxClosed(self.name.to_string()))
    }

    /// Sends the message built around a reply channel and waits for the
    /// answer.
    pub async fn ask<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> M) -> Result<T, ActorError> {
        let (reply, answer) = oneshot::channel();
        self.send(build(reply)).await?;
        answer
            .await
            .map_err(|_| ActorError::NoReply(self.name.to_string()))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

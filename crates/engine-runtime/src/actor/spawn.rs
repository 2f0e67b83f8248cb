use crate::actor::{Actor, ActorContext, ActorRef};
use std::fmt::Debug;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, trace};

/// Runs `actor` on its own task with a bounded mailbox.
///
/// The loop ends when every `ActorRef` is gone or the actor calls
/// [`ActorContext::stop`]; messages still queued at that point are dropped.
pub fn spawn_actor<M, A>(
    name: impl Into<String>,
    mailbox_capacity: usize,
    mut actor: A,
) -> (ActorRef<M>, JoinHandle<()>)
where
    A: Actor<M>,
    M: Send + Debug + 'static,
{
    let name = name.into();
    let (tx, mut mailbox) = mpsc::channel::<M>(mailbox_capacity);
    let actor_ref = ActorRef::new(name.clone(), tx);
    let ctx = ActorContext::new(name);

    let task = tokio::spawn(async move {
        if let Err(e) = actor.on_start(&ctx).await {
            error!(actor = %ctx.name(), error = %e, "Actor failed to start");
            return;
        }

        let mut handled = 0u64;
        while !ctx.is_stopping() {
            let Some(msg) = mailbox.recv().await else {
                break;
            };
            trace!(actor = %ctx.name(), ?msg, "Handling message");
            if let Err(e) = actor.handle(msg, &ctx).await {
                error!(actor = %ctx.name(), error = %e, "Actor failed to handle message");
            }
            handled += 1;
        }

        mailbox.close();
        debug!(actor = %ctx.name(), handled, "Actor loop finished");
        if let Err(e) = actor.on_stop(&ctx).await {
            error!(actor = %ctx.name(), error = %e, "Actor failed to stop cleanly");
        }
    });

    (actor_ref, task)
}

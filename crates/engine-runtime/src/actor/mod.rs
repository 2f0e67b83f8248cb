#[allow(clippy::module_inception)]
pub mod actor;
pub mod messages;
pub mod spawn;

pub use actor::{Actor, ActorContext, ActorRef};
pub use messages::CursorMsg;
pub use spawn::spawn_actor;

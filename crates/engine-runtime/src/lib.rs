pub mod actor;
pub mod cursor;
pub mod error;
pub mod handle;

pub use cursor::{CursorOptions, CursorStatus, OffsetCursor, Phase};
pub use error::{ActorError, CursorError};
pub use handle::OffsetHandle;

#[cfg(test)]
mod tests;

pub mod adapter;
pub mod error;
pub mod memory;

pub use adapter::{FeedSender, LiveFeed, OrderedCollection};
pub use error::CollectionError;
pub use memory::MemoryCollection;

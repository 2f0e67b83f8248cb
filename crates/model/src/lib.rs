pub mod core;
pub mod error;
pub mod events;
pub mod pagination;
pub mod records;

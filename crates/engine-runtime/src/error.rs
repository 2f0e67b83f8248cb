use connectors::error::CollectionError;
use engine_config::settings::error::SettingsError;
use model::error::ExtractError;
use thiserror::Error;

/// Errors surfaced by an offset cursor.
#[derive(Debug, Error)]
pub enum CursorError {
    /// A row could not be turned into a boundary key.
    #[error("Key extraction failed: {0}")]
    Extract(#[from] ExtractError),

    /// Growth kept paging without settling.
    #[error(
        "Tried to fetch more than {steps} pages to determine the boundary at offset {offset}; giving up"
    )]
    RunawayGrowth { steps: usize, offset: usize },

    /// The collection rejected or failed a request.
    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),

    /// Invalid cursor configuration.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// The page size must be at least one row.
    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),

    /// A previous resolution failed fatally; `destroy` or a new offset clears it.
    #[error("Cursor faulted: {0}")]
    Faulted(String),

    /// The cursor actor is gone or stopped before answering.
    #[error("Actor error: {0}")]
    Actor(#[from] ActorError),
}

/// Failures talking to an actor.
#[derive(Debug, Error)]
pub enum ActorError {
    #[error("Mailbox of {0} is closed")]
    MailboxClosed(String),

    #[error("{0} stopped before replying")]
    NoReply(String),
}

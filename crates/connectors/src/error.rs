use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectionError {
    /// The collection could not serve the request.
    #[error("Collection unavailable: {0}")]
    Unavailable(String),

    /// The query cannot be executed by this collection.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Failed to load rows into the collection.
    #[error("Failed to load rows: {0}")]
    Load(#[from] serde_json::Error),

    /// Generic collection error.
    #[error("Collection error: {0}")]
    Generic(String),
}

use connectors::CollectionError;
use engine_config::SettingsError;
use engine_runtime::CursorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read input file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to deserialize the change script as JSON: {0}")]
    ScriptDeserialize(#[from] serde_json::Error),

    #[error("Failed to load rows: {0}")]
    Collection(#[from] CollectionError),

    #[error("Invalid cursor settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Cursor error: {0}")]
    Cursor(#[from] CursorError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cursor did not settle at offset {0}")]
    Unsettled(usize),
}

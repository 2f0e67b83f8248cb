use crate::error::CliError;
use connectors::MemoryCollection;
use model::records::row::RowSnapshot;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// One mutation applied by `pager watch`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Change {
    Upsert { row: RowSnapshot },
    Remove { id: String },
}

impl Change {
    pub async fn apply(&self, collection: &MemoryCollection) {
        match self {
            Change::Upsert { row } => {
                info!(row_id = %row.id, "Applying upsert");
                collection.upsert(row.clone()).await;
            }
            Change::Remove { id } => {
                info!(row_id = %id, "Applying remove");
                collection.remove(id).await;
            }
        }
    }
}

pub async fn load(path: impl AsRef<Path>) -> Result<Vec<Change>, CliError> {
    let source = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&source)?)
}

use thiserror::Error;

/// Errors raised while deriving a boundary key from a row.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error(
        "A value of type {found} was found in row '{row_id}', but rows are ordered by child field \
         \"{field}\". Pagination requires all records to be objects to determine an offset value."
    )]
    NotARecord {
        field: String,
        row_id: String,
        found: &'static str,
    },
}

use crate::{
    core::value::{SortValue, compare_sort_values, type_name},
    error::ExtractError,
    records::row::RowSnapshot,
};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, convert::Infallible, fmt, str::FromStr};

/// Selects the field a collection is ordered by.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderBy {
    /// Order by the unique row id (`$key`).
    Key,

    /// Order by the row's priority marker (`$priority`).
    Priority,

    /// Order by a named child of the row payload.
    Child(String),
}

impl FromStr for OrderBy {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "$key" => OrderBy::Key,
            "$priority" => OrderBy::Priority,
            other => OrderBy::Child(other.to_string()),
        })
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBy::Key => write!(f, "$key"),
            OrderBy::Priority => write!(f, "$priority"),
            OrderBy::Child(name) => write!(f, "{name}"),
        }
    }
}

impl OrderBy {
    /// Extracts the sort value of `row` for this ordering.
    ///
    /// Ordering by a named child requires every row payload to be an object;
    /// anything else cannot yield a meaningful offset and is rejected.
    pub fn sort_value(&self, row: &RowSnapshot) -> Result<SortValue, ExtractError> {
        match self {
            OrderBy::Key => Ok(SortValue::String(row.id.clone())),
            OrderBy::Priority => Ok(row.priority.clone().unwrap_or(SortValue::Null)),
            OrderBy::Child(field) => match row.value.as_object() {
                Some(obj) => Ok(obj.get(field).cloned().unwrap_or(SortValue::Null)),
                None => Err(ExtractError::NotARecord {
                    field: field.clone(),
                    row_id: row.id.clone(),
                    found: type_name(&row.value),
                }),
            },
        }
    }

    /// Builds the boundary record for `row`.
    pub fn boundary(&self, row: &RowSnapshot) -> Result<BoundaryKey, ExtractError> {
        Ok(BoundaryKey {
            sort_value: self.sort_value(row)?,
            row_id: row.id.clone(),
        })
    }
}

/// The sort value and id of the row occupying a given offset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BoundaryKey {
    pub sort_value: SortValue,
    pub row_id: String,
}

impl BoundaryKey {
    pub fn new(sort_value: SortValue, row_id: impl Into<String>) -> Self {
        BoundaryKey {
            sort_value,
            row_id: row_id.into(),
        }
    }

    /// Position comparison: sort value first, row id as tie-breaker.
    pub fn position_cmp(&self, other: &BoundaryKey) -> Ordering {
        compare_sort_values(&self.sort_value, &other.sort_value)
            .then_with(|| self.row_id.cmp(&other.row_id))
    }
}

impl fmt::Display for BoundaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.sort_value, self.row_id)
    }
}

/// Result of looking up the boundary for an offset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum KeyResolution {
    /// Offset 0: the start of the collection.
    None,

    /// The offset lies beyond the cached keys.
    Unknown,

    /// The cached boundary for the offset.
    Resolved(BoundaryKey),
}

impl KeyResolution {
    pub fn boundary(&self) -> Option<&BoundaryKey> {
        match self {
            KeyResolution::Resolved(key) => Some(key),
            _ => None,
        }
    }

    pub fn row_id(&self) -> Option<&str> {
        self.boundary().map(|k| k.row_id.as_str())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, KeyResolution::Unknown)
    }
}

impl fmt::Display for KeyResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyResolution::None => write!(f, "none"),
            KeyResolution::Unknown => write!(f, "unknown"),
            KeyResolution::Resolved(key) => write!(f, "{key}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_order_selectors() {
        assert_eq!("$key".parse::<OrderBy>().unwrap(), OrderBy::Key);
        assert_eq!("$priority".parse::<OrderBy>().unwrap(), OrderBy::Priority);
        assert_eq!(
            "score".parse::<OrderBy>().unwrap(),
            OrderBy::Child("score".into())
        );
    }

    #[test]
    fn extracts_each_kind_of_sort_value() {
        let row = RowSnapshot::new("r1", json!({"score": 7})).with_priority(json!(3));

        assert_eq!(OrderBy::Key.sort_value(&row).unwrap(), json!("r1"));
        assert_eq!(OrderBy::Priority.sort_value(&row).unwrap(), json!(3));
        assert_eq!(
            OrderBy::Child("score".into()).sort_value(&row).unwrap(),
            json!(7)
        );
        assert_eq!(
            OrderBy::Child("missing".into()).sort_value(&row).unwrap(),
            json!(null)
        );
    }

    #[test]
    fn child_ordering_rejects_scalar_rows() {
        let row = RowSnapshot::new("r1", json!(42));
        let err = OrderBy::Child("score".into()).boundary(&row).unwrap_err();

        match err {
            ExtractError::NotARecord { field, found, .. } => {
                assert_eq!(field, "score");
                assert_eq!(found, "number");
            }
        }
    }

    #[test]
    fn row_id_breaks_sort_value_ties() {
        let a = BoundaryKey::new(json!(1), "a");
        let b = BoundaryKey::new(json!(1), "b");
        let c = BoundaryKey::new(json!(0), "z");

        assert_eq!(a.position_cmp(&b), Ordering::Less);
        assert_eq!(c.position_cmp(&a), Ordering::Less);
    }
}

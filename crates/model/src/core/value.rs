use serde_json::Value;
use std::cmp::Ordering;

/// Sort values are plain JSON values; a row's position is determined by its
/// sort value first and its row id second.
pub type SortValue = Value;

/// Rank of a value's type within the ordering:
/// `null < false < true < numbers < strings < arrays < objects`.
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(false) => 1,
        Value::Bool(true) => 2,
        Value::Number(_) => 3,
        Value::String(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
    }
}

/// Total order over sort values as the collection orders them.
pub fn compare_sort_values(a: &Value, b: &Value) -> Ordering {
    type_rank(a).cmp(&type_rank(b)).then_with(|| match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        // Structured values have no natural order; fall back to their
        // canonical text so the order is at least stable.
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            a.to_string().cmp(&b.to_string())
        }
        _ => Ordering::Equal,
    })
}

/// Human readable type name, used in extraction errors.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn orders_types_before_values() {
        let mut values = vec![
            json!({"a": 1}),
            json!("b"),
            json!(3),
            json!(true),
            json!(null),
            json!(false),
            json!("a"),
            json!(1.5),
        ];
        values.sort_by(compare_sort_values);

        assert_eq!(
            values,
            vec![
                json!(null),
                json!(false),
                json!(true),
                json!(1.5),
                json!(3),
                json!("a"),
                json!("b"),
                json!({"a": 1}),
            ]
        );
    }

    #[test]
    fn integer_and_float_compare_numerically() {
        assert_eq!(compare_sort_values(&json!(2), &json!(2.0)), Ordering::Equal);
        assert_eq!(compare_sort_values(&json!(-1), &json!(0.5)), Ordering::Less);
    }
}

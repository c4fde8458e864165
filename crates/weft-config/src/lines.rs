//! Reading newline-delimited JSON produced by import resolution.

use serde_json::{Map, Value};

/// Iterate the JSON objects in `lines`, one per non-empty line.
///
/// Blank lines and `{}` are skipped. Lines that are not valid JSON objects
/// are logged and skipped: a single malformed import must not block the
/// rest of the merge.
pub(crate) fn json_objects<'a>(
    lines: &'a str,
    domain: &'static str,
) -> impl Iterator<Item = Map<String, Value>> + 'a {
    lines
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != "{}")
        .filter_map(move |line| match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => Some(map),
            Ok(other) => {
                tracing::debug!(domain, kind = %json_kind(&other), "skipping non-object import line");
                None
            }
            Err(e) => {
                tracing::debug!(domain, error = %e, "skipping malformed import line");
                None
            }
        })
}

/// Iterate every JSON value in `lines`, one per non-empty line.
///
/// Unlike [`json_objects`], scalars are kept so callers can accept
/// shorthand forms such as `"write-all"`. Malformed lines are logged and
/// skipped.
pub(crate) fn json_values<'a>(
    lines: &'a str,
    domain: &'static str,
) -> impl Iterator<Item = Value> + 'a {
    lines
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(move |line| match serde_json::from_str::<Value>(line) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(domain, error = %e, "skipping malformed import line");
                None
            }
        })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_blank_empty_and_malformed() {
        let input = "\n{}\n{\"a\": 1}\nnot json\n[1,2]\n  {\"b\": 2}  \n";
        let objects: Vec<_> = json_objects(input, "test").collect();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].get("a"), Some(&Value::from(1)));
        assert_eq!(objects[1].get("b"), Some(&Value::from(2)));
    }

    #[test]
    fn test_values_keep_scalars() {
        let input = "\n\"write-all\"\nnot json\n{\"a\": 1}\n";
        let values: Vec<_> = json_values(input, "test").collect();
        assert_eq!(values, vec![Value::from("write-all"), serde_json::json!({"a": 1})]);
    }
}

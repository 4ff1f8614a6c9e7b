//! Minimal `$.a.b[0]` selector over `serde_json::Value`.

use serde_json::Value;

/// Returns the value at `path`, or `None` when any segment is missing.
///
/// Supports the root `$`, dotted object keys and `[index]` array access.
pub fn select<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix('$').unwrap_or(path);
    let mut current = value;

    for segment in path.split('.').filter(|segment| !segment.is_empty()) {
        let (key, indexes) = match segment.find('[') {
            Some(position) => segment.split_at(position),
            None => (segment, ""),
        };

        if !key.is_empty() {
            current = current.get(key)?;
        }

        for index in indexes
            .split(|c| c == '[' || c == ']')
            .filter(|index| !index.is_empty())
        {
            current = current.get(index.parse::<usize>().ok()?)?;
        }
    }

    Some(current)
}

/// Renders a JSON value the way it reads in an assertion message or a binding.
pub fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

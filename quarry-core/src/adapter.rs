//! Engine-agnostic helpers for adapter authors.

use serde_json::Value;

/// Cast a semi-structured field reference before a typed comparison.
///
/// Document-typed columns yield text when addressed by path, so comparing
/// them with numbers or booleans needs an explicit cast. Non-semi-structured
/// references, and comparisons against any other kind of value, are returned
/// unchanged.
pub fn cast_if_semistructured(field_ref: &str, is_semistructured: bool, sample: &Value) -> String {
    if !is_semistructured {
        return field_ref.to_string();
    }
    match sample {
        Value::Number(_) => format!("{}::numeric", field_ref),
        Value::Bool(_) => format!("{}::boolean", field_ref),
        _ => field_ref.to_string(),
    }
}

/// `courses_def` → `CoursesDef`.
pub fn snake_to_camel(s: &str) -> String {
    s.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Apply [`snake_to_camel`] to every segment of a dotted relation path.
pub fn relation_path_to_camel(path: &str) -> String {
    path.split('.')
        .map(snake_to_camel)
        .collect::<Vec<_>>()
        .join(".")
}

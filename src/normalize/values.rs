//! Example and default value reshaping.
//!
//! OpenAPI carries a singular `example` keyword and a named `examples` map;
//! JSON Schema wants an `examples` array. Primitive values are kept
//! directly; object/array values are pushed onto an ancestor stack so that
//! descendant nodes can recover "their" slice of the value through a
//! reverse JSON-pointer search.

use serde_json::{Map, Value};

use crate::pointer::{resolve_pointer, split_path};

/// Outcome of reshaping a node's `example`/`examples` keywords.
#[derive(Debug, Default)]
pub struct ExampleReshape {
    /// Primitive values that become the node's `examples` array.
    pub examples: Vec<Value>,
    /// Non-primitive values pushed onto the descendant search stack.
    pub pushed: Vec<Value>,
}

/// Anything that isn't an object or array.
pub fn is_primitive(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

/// Extract and remove `example`/`examples` from a node.
///
/// - A singular `example` keeps only primitive content: a primitive value
///   directly, an array value element-by-element. Object and whole-array
///   values go to the descendant stack instead.
/// - A named `examples` map is flattened to its `value` members in
///   declaration order, skipping any whose value is a bare `$ref`
///   (deliberately-unresolved circular reference).
/// - A 3.1-style `examples` array keeps its primitive members.
pub fn collect_examples(node: &mut Map<String, Value>) -> ExampleReshape {
    let mut out = ExampleReshape::default();

    if let Some(example) = node.remove("example") {
        match example {
            Value::Array(arr) => {
                out.pushed.push(Value::Array(arr.clone()));
                out.examples.extend(arr.into_iter().filter(is_primitive));
            }
            Value::Object(obj) => {
                out.pushed.push(Value::Object(obj));
            }
            primitive => out.examples.push(primitive),
        }
    }

    if let Some(examples) = node.remove("examples") {
        match examples {
            Value::Object(named) => {
                for (_, entry) in named {
                    let value = match &entry {
                        Value::Object(obj) if obj.contains_key("value") => {
                            obj.get("value").cloned().unwrap_or(Value::Null)
                        }
                        other => other.clone(),
                    };
                    if value.get("$ref").is_some() {
                        continue;
                    }
                    if is_primitive(&value) {
                        out.examples.push(value);
                    } else {
                        out.pushed.push(value);
                    }
                }
            }
            Value::Array(arr) => {
                for value in arr {
                    if is_primitive(&value) {
                        out.examples.push(value);
                    } else {
                        out.pushed.push(value);
                    }
                }
            }
            primitive => out.examples.push(primitive),
        }
    }

    out
}

/// Best-effort reverse search for a value belonging to `location`.
///
/// Builds pointer suffixes from the leaf outward (`/c`, `/b/c`, `/a/b/c`)
/// and tries each against every candidate value, nearest ancestor first.
/// The first primitive hit wins.
///
/// Known quirk, preserved deliberately: because the leaf-most suffix is
/// tried first, a sibling property sharing a leaf name with an unrelated
/// ancestor value can be misattributed. Compatibility with existing
/// rendered output matters more than correcting it.
pub fn search_by_pointer(location: &str, candidates: &[Value]) -> Option<Value> {
    let segments = split_path(location);
    if segments.is_empty() || candidates.is_empty() {
        return None;
    }

    // "/a/b/c" → ["/c", "/b/c", "/a/b/c"]
    let mut suffixes = Vec::with_capacity(segments.len());
    let mut suffix = String::new();
    for segment in segments.iter().rev() {
        suffix = format!(
            "/{}{}",
            crate::pointer::escape_pointer_segment(segment),
            suffix
        );
        suffixes.push(suffix.clone());
    }

    for suffix in &suffixes {
        for candidate in candidates.iter().rev() {
            if let Some(found) = resolve_pointer(candidate, suffix) {
                if is_primitive(found) {
                    return Some(found.clone());
                }
            }
        }
    }

    None
}

/// Deduplicate an enum array, order-preserving, first occurrence wins.
pub fn dedupe_enum(node: &mut Map<String, Value>) {
    let Some(Value::Array(values)) = node.get("enum") else {
        return;
    };
    let mut seen: Vec<Value> = Vec::with_capacity(values.len());
    for v in values {
        if !seen.contains(v) {
            seen.push(v.clone());
        }
    }
    node.insert("enum".to_string(), Value::Array(seen));
}

/// Append a line to a node's description, creating it if absent.
pub fn append_description(node: &mut Map<String, Value>, line: &str) {
    let existing = node
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let combined = if existing.is_empty() {
        line.to_string()
    } else {
        format!("{existing}\n\n{line}")
    };
    node.insert("description".to_string(), Value::String(combined));
}

/// Render a JSON value for embedding in a description line.
pub fn describe_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ===========================================================================
// Tests
// ===========================================================================

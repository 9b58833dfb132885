//! Schema-driven sample data generation.
//!
//! Produces one representative value for a schema: objects recurse per
//! property, arrays wrap one element sample, primitives come from a
//! type/format lookup table. Polymorphism resolves by merging (`allOf`)
//! or first-branch selection (`anyOf`/`oneOf`) — deliberately not a
//! combinatorial expansion.
//!
//! `None` maps the cases where no sample exists: a failed `allOf` merge
//! and the legacy `type: file`.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::normalize::merge;

/// Read/write-only directionality for sampling.
///
/// Request-side sampling includes `writeOnly` and excludes `readOnly`;
/// response-side sampling is the reverse. Defaults exclude both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleOptions {
    pub include_read_only: bool,
    pub include_write_only: bool,
}

/// Generate a sample value for `schema`.
///
/// Memoized per call, keyed by serialized schema content: repeated
/// structurally-identical subtrees (common in dereferenced documents)
/// sample once.
pub fn sample_from_schema(schema: &Value, opts: &SampleOptions) -> Option<Value> {
    let mut memo = HashMap::new();
    sample(schema, opts, &mut memo)
}

fn sample(
    schema: &Value,
    opts: &SampleOptions,
    memo: &mut HashMap<String, Option<Value>>,
) -> Option<Value> {
    let key = serde_json::to_string(schema).unwrap_or_default();
    if let Some(cached) = memo.get(&key) {
        return cached.clone();
    }
    let result = sample_uncached(schema, opts, memo);
    memo.insert(key, result.clone());
    result
}

fn sample_uncached(
    schema: &Value,
    opts: &SampleOptions,
    memo: &mut HashMap<String, Option<Value>>,
) -> Option<Value> {
    let node = schema.as_object()?;

    if node.contains_key("allOf") {
        return match merge::merge_all_of(node) {
            Some(merged) => sample(&Value::Object(merged), opts, memo),
            None => {
                tracing::debug!("allOf merge failed during sampling");
                None
            }
        };
    }

    for key in ["anyOf", "oneOf"] {
        let Some(Value::Array(branches)) = node.get(key) else {
            continue;
        };
        let samples: Vec<Option<Value>> = branches
            .iter()
            .map(|branch| sample(branch, opts, memo))
            .collect();
        return match samples.len() {
            0 => None,
            1 => samples.into_iter().next().flatten(),
            // First branch wins; a later non-empty branch only wins when
            // the first produced nothing.
            _ => samples.into_iter().flatten().next(),
        };
    }

    if let Some(example) = node.get("example") {
        let mut example = example.clone();
        strip_ref_markers(&mut example);
        return Some(example);
    }

    let type_name = inferred_type(node);

    match type_name.as_str() {
        "object" => Some(object_sample(node, opts, memo)),
        "array" => array_sample(node, opts, memo),
        "file" => None,
        other => {
            if let Some(Value::Array(variants)) = node.get("enum") {
                return enum_sample(node, variants);
            }
            if let Some(variant) = node.get("enum").filter(|v| !v.is_array() && !v.is_null()) {
                // Scalar enum definitions get array-normalized.
                return Some(variant.clone());
            }
            primitive_sample(node, other)
        }
    }
}

/// The node's effective type: declared (first non-null entry of a type
/// array), or inferred from shape keywords.
fn inferred_type(node: &Map<String, Value>) -> String {
    match node.get("type") {
        Some(Value::String(t)) => return t.clone(),
        Some(Value::Array(arr)) => {
            if let Some(t) = arr
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null")
            {
                return t.to_string();
            }
        }
        _ => {}
    }
    if node.contains_key("properties") || node.contains_key("additionalProperties") {
        "object".to_string()
    } else if node.contains_key("items") {
        "array".to_string()
    } else {
        String::new()
    }
}

fn object_sample(
    node: &Map<String, Value>,
    opts: &SampleOptions,
    memo: &mut HashMap<String, Option<Value>>,
) -> Value {
    let mut out = Map::new();

    if let Some(Value::Object(props)) = node.get("properties") {
        for (name, prop) in props {
            if skip_property(prop, opts) {
                continue;
            }
            if let Some(value) = sample(prop, opts, memo) {
                out.insert(name.clone(), value);
            }
        }
    }

    match node.get("additionalProperties") {
        Some(Value::Bool(true)) => {
            out.insert("additionalProp".to_string(), json!({}));
        }
        Some(ap @ Value::Object(_)) => {
            let value = if ap.as_object().is_some_and(Map::is_empty) {
                Some(json!({}))
            } else {
                sample(ap, opts, memo)
            };
            if let Some(value) = value {
                out.insert("additionalProp".to_string(), value);
            }
        }
        _ => {}
    }

    Value::Object(out)
}

fn skip_property(prop: &Value, opts: &SampleOptions) -> bool {
    let flag = |key: &str| prop.get(key).and_then(Value::as_bool) == Some(true);
    flag("deprecated")
        || (flag("readOnly") && !opts.include_read_only)
        || (flag("writeOnly") && !opts.include_write_only)
}

fn array_sample(
    node: &Map<String, Value>,
    opts: &SampleOptions,
    memo: &mut HashMap<String, Option<Value>>,
) -> Option<Value> {
    let Some(items) = node.get("items").filter(|v| v.is_object()) else {
        return Some(json!([]));
    };

    // Polymorphic items sample one element per branch.
    for key in ["anyOf", "oneOf"] {
        if let Some(Value::Array(branches)) = items.get(key) {
            let samples: Vec<Value> = branches
                .iter()
                .filter_map(|branch| sample(branch, opts, memo))
                .collect();
            return Some(Value::Array(samples));
        }
    }

    match sample(items, opts, memo) {
        Some(element) => Some(json!([element])),
        None => Some(json!([])),
    }
}

fn enum_sample(node: &Map<String, Value>, variants: &[Value]) -> Option<Value> {
    if let Some(default) = node.get("default").filter(|v| !v.is_null()) {
        return Some(default.clone());
    }
    variants.first().cloned()
}

fn primitive_sample(node: &Map<String, Value>, type_name: &str) -> Option<Value> {
    let default = node.get("default");
    let format = node.get("format").and_then(Value::as_str).unwrap_or("");

    let value = match type_name {
        "string" | "" => {
            if let Some(d) = default.filter(|d| d.is_string()) {
                return Some(d.clone());
            }
            if type_name.is_empty() {
                tracing::warn!("sampling a schema with no inferable type");
                return Some(Value::String("Unknown Type: ".to_string()));
            }
            match format {
                "email" => json!("user@example.com"),
                "date-time" => json!("2024-01-01T00:00:00Z"),
                "date" => json!("2024-01-01"),
                "uuid" => json!("3fa85f64-5717-4562-b3fc-2c963f66afa6"),
                "hostname" => json!("example.com"),
                "ipv4" => json!("198.51.100.42"),
                "ipv6" => json!("2001:db8:85a3::8a2e:370:7334"),
                _ => json!("string"),
            }
        }
        "number" => {
            if let Some(d) = default.filter(|d| d.is_number()) {
                return Some(d.clone());
            }
            if format == "float" || format == "double" {
                json!(0.0)
            } else {
                json!(0)
            }
        }
        "integer" => {
            if let Some(d) = default.filter(|d| d.is_number()) {
                return Some(d.clone());
            }
            json!(0)
        }
        "boolean" => {
            if let Some(d) = default.filter(|d| d.is_boolean()) {
                return Some(d.clone());
            }
            json!(true)
        }
        other => {
            tracing::warn!(r#type = other, "unknown schema type during sampling");
            Value::String(format!("Unknown Type: {other}"))
        }
    };

    Some(value)
}

/// Remove `$$ref` marker keys some dereferencing tools leave behind.
fn strip_ref_markers(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.remove("$$ref");
            for v in map.values_mut() {
                strip_ref_markers(v);
            }
        }
        Value::Array(arr) => {
            for v in arr {
                strip_ref_markers(v);
            }
        }
        _ => {}
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(schema: Value) -> Option<Value> {
        sample_from_schema(&schema, &SampleOptions::default())
    }

    #[test]
    fn test_primitives() {
        assert_eq!(run(json!({ "type": "boolean" })), Some(json!(true)));
        assert_eq!(run(json!({ "type": "integer" })), Some(json!(0)));
        assert_eq!(run(json!({ "type": "number" })), Some(json!(0)));
        assert_eq!(run(json!({ "type": "string" })), Some(json!("string")));
    }

    #[test]
    fn test_string_formats() {
        let cases = [
            ("email", "user@example.com"),
            ("date-time", "2024-01-01T00:00:00Z"),
            ("date", "2024-01-01"),
            ("uuid", "3fa85f64-5717-4562-b3fc-2c963f66afa6"),
            ("hostname", "example.com"),
            ("ipv4", "198.51.100.42"),
            ("ipv6", "2001:db8:85a3::8a2e:370:7334"),
        ];
        for (format, expected) in cases {
            assert_eq!(
                run(json!({ "type": "string", "format": format })),
                Some(json!(expected)),
                "format {format}"
            );
        }
    }

    #[test]
    fn test_defaults_of_matching_type_respected() {
        assert_eq!(
            run(json!({ "type": "string", "default": "hi" })),
            Some(json!("hi"))
        );
        assert_eq!(
            run(json!({ "type": "integer", "default": 7 })),
            Some(json!(7))
        );
        assert_eq!(
            run(json!({ "type": "boolean", "default": false })),
            Some(json!(false))
        );
        // A mismatched default falls through to the table.
        assert_eq!(
            run(json!({ "type": "integer", "default": "nope" })),
            Some(json!(0))
        );
    }

    #[test]
    fn test_enum_prefers_default_then_first() {
        assert_eq!(
            run(json!({ "type": "string", "enum": ["two", "one"], "default": "one" })),
            Some(json!("one"))
        );
        assert_eq!(
            run(json!({ "type": "string", "enum": ["two", "one"] })),
            Some(json!("two"))
        );
    }

    #[test]
    fn test_unknown_type_placeholder() {
        assert_eq!(
            run(json!({ "type": "dog" })),
            Some(json!("Unknown Type: dog"))
        );
    }

    #[test]
    fn test_type_file_yields_nothing() {
        assert_eq!(run(json!({ "type": "file" })), None);
    }

    #[test]
    fn test_object_with_additional_properties() {
        assert_eq!(
            run(json!({
                "type": "object",
                "properties": { "dog": { "type": "string" } },
                "additionalProperties": { "type": "string" }
            })),
            Some(json!({ "dog": "string", "additionalProp": "string" }))
        );
    }

    #[test]
    fn test_additional_properties_true() {
        assert_eq!(
            run(json!({ "type": "object", "additionalProperties": true })),
            Some(json!({ "additionalProp": {} }))
        );
    }

    #[test]
    fn test_read_write_only_exclusivity() {
        let schema = json!({
            "type": "object",
            "properties": {
                "id": { "type": "integer", "readOnly": true },
                "secret": { "type": "string", "writeOnly": true },
                "name": { "type": "string" }
            }
        });

        assert_eq!(
            sample_from_schema(&schema, &SampleOptions::default()),
            Some(json!({ "name": "string" }))
        );
        assert_eq!(
            sample_from_schema(
                &schema,
                &SampleOptions { include_read_only: true, ..SampleOptions::default() }
            ),
            Some(json!({ "id": 0, "name": "string" }))
        );
        assert_eq!(
            sample_from_schema(
                &schema,
                &SampleOptions { include_write_only: true, ..SampleOptions::default() }
            ),
            Some(json!({ "secret": "string", "name": "string" }))
        );
    }

    #[test]
    fn test_deprecated_properties_skipped() {
        assert_eq!(
            run(json!({
                "type": "object",
                "properties": {
                    "old": { "type": "string", "deprecated": true },
                    "new": { "type": "string" }
                }
            })),
            Some(json!({ "new": "string" }))
        );
    }

    #[test]
    fn test_array_without_items_is_empty() {
        assert_eq!(run(json!({ "type": "array" })), Some(json!([])));
    }

    #[test]
    fn test_array_wraps_one_sample() {
        assert_eq!(
            run(json!({ "type": "array", "items": { "type": "integer" } })),
            Some(json!([0]))
        );
    }

    #[test]
    fn test_polymorphic_items_sample_every_branch() {
        assert_eq!(
            run(json!({
                "type": "array",
                "items": {
                    "oneOf": [{ "type": "string" }, { "type": "integer" }]
                }
            })),
            Some(json!(["string", 0]))
        );
    }

    #[test]
    fn test_oneof_takes_first_branch() {
        assert_eq!(
            run(json!({ "oneOf": [{ "type": "integer" }, { "type": "string" }] })),
            Some(json!(0))
        );
    }

    #[test]
    fn test_oneof_skips_empty_first_branch() {
        assert_eq!(
            run(json!({ "oneOf": [{ "type": "file" }, { "type": "string" }] })),
            Some(json!("string"))
        );
    }

    #[test]
    fn test_allof_merges_before_sampling() {
        assert_eq!(
            run(json!({
                "allOf": [
                    { "type": "object", "properties": { "a": { "type": "string" } } },
                    { "type": "object", "properties": { "b": { "type": "integer" } } }
                ]
            })),
            Some(json!({ "a": "string", "b": 0 }))
        );
    }

    #[test]
    fn test_allof_merge_failure_yields_nothing() {
        assert_eq!(
            run(json!({ "allOf": [{ "type": "string" }, { "type": "integer" }] })),
            None
        );
    }

    #[test]
    fn test_example_returned_with_ref_markers_stripped() {
        assert_eq!(
            run(json!({
                "type": "object",
                "example": {
                    "$$ref": "#/components/schemas/Pet",
                    "name": "rex",
                    "owner": { "$$ref": "#/components/schemas/Owner", "id": 1 }
                }
            })),
            Some(json!({ "name": "rex", "owner": { "id": 1 } }))
        );
    }

    #[test]
    fn test_type_array_uses_first_non_null() {
        assert_eq!(run(json!({ "type": ["string", "null"] })), Some(json!("string")));
        assert_eq!(run(json!({ "type": ["null", "integer"] })), Some(json!(0)));
    }
}

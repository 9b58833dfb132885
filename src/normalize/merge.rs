//! Failure-tolerant `allOf` merge ("merge-or-drop").
//!
//! Folds a node's `allOf` branches (plus its sibling keywords, treated as an
//! implicit first branch) into one flat schema. Merge semantics follow JSON
//! Schema intersection where that is cheap and well-defined; where branches
//! are genuinely incompatible (e.g. `string` vs `integer` types) the merge
//! reports failure and the caller drops the `allOf` entirely rather than
//! failing the whole schema. Real-world definitions are full of broken
//! compositions and a dropped `allOf` still renders.
//!
//! Resolver policies:
//! - `description`: last branch wins
//! - `enum`: concatenated (deduped later in the pipeline)
//! - `example` / `format` / everything unrecognized: first branch wins
//! - `required`: union
//! - numeric bounds: tightened
//! - `properties` / `items`: recursive merge

use std::collections::HashSet;

use serde_json::{Map, Value};

/// Merge a node carrying `allOf` into a single flat node.
///
/// Returns `None` when any pair of branches is incompatible; the caller is
/// expected to drop the `allOf` keyword and continue with the siblings.
pub fn merge_all_of(node: &Map<String, Value>) -> Option<Map<String, Value>> {
    let branches = match node.get("allOf") {
        Some(Value::Array(arr)) => arr.clone(),
        // allOf that isn't an array is unusable
        _ => return None,
    };

    let mut siblings = node.clone();
    siblings.remove("allOf");

    let mut acc = siblings;
    for branch in branches {
        let overlay = match branch {
            Value::Object(m) => m,
            // Boolean/true-ish branches add nothing; treat as empty.
            _ => Map::new(),
        };
        acc = merge_two(acc, overlay)?;
    }

    Some(acc)
}

/// Merge two schema objects; `overlay` is the later branch.
fn merge_two(base: Map<String, Value>, overlay: Map<String, Value>) -> Option<Map<String, Value>> {
    let mut result = base;

    for (key, value) in overlay {
        match key.as_str() {
            "properties" => merge_properties(&mut result, value)?,
            "required" => merge_required(&mut result, value),
            "type" => intersect_type(&mut result, value)?,
            "enum" => concat_enum(&mut result, value),
            // Later branches override earlier descriptions.
            "description" => {
                result.insert(key, value);
            }
            "minimum" | "exclusiveMinimum" | "minLength" | "minItems" | "minProperties" => {
                tighten(&mut result, &key, value, true);
            }
            "maximum" | "exclusiveMaximum" | "maxLength" | "maxItems" | "maxProperties" => {
                tighten(&mut result, &key, value, false);
            }
            "items" => merge_items(&mut result, value)?,
            "additionalProperties" => merge_additional_properties(&mut result, value)?,
            // First branch wins for everything else: example, format,
            // title, x-* extensions, readOnly/writeOnly, ...
            _ => {
                result.entry(key).or_insert(value);
            }
        }
    }

    Some(result)
}

/// Shared property keys merge recursively; new keys are added.
fn merge_properties(result: &mut Map<String, Value>, overlay_val: Value) -> Option<()> {
    let Value::Object(overlay_props) = overlay_val else {
        return Some(());
    };
    let base_props = result
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    let base_map = base_props.as_object_mut()?;

    for (prop, val) in overlay_props {
        match (base_map.remove(&prop), val) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                let merged = merge_two(existing, incoming)?;
                base_map.insert(prop, Value::Object(merged));
            }
            (Some(existing), _) => {
                // Non-object property schema — keep the first definition.
                base_map.insert(prop, existing);
            }
            (None, incoming) => {
                base_map.insert(prop, incoming);
            }
        }
    }
    Some(())
}

/// Union `required` arrays, deduplicated, base order first.
fn merge_required(result: &mut Map<String, Value>, overlay_val: Value) {
    let Value::Array(overlay_arr) = overlay_val else {
        return;
    };
    let base_req = result
        .entry("required")
        .or_insert_with(|| Value::Array(Vec::new()));
    let Some(base_arr) = base_req.as_array_mut() else {
        return;
    };

    let mut seen: HashSet<String> = base_arr
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect();
    for item in overlay_arr {
        if let Some(s) = item.as_str() {
            if seen.insert(s.to_string()) {
                base_arr.push(item);
            }
        }
    }
}

/// Intersect `type` keywords. Incompatible scalar types fail the merge.
fn intersect_type(result: &mut Map<String, Value>, overlay_val: Value) -> Option<()> {
    let Some(existing) = result.get("type") else {
        result.insert("type".to_string(), overlay_val);
        return Some(());
    };

    let base_set = type_set(existing);
    let overlay_set = type_set(&overlay_val);
    if base_set.is_empty() || overlay_set.is_empty() {
        // Malformed type value — keep the base and move on.
        return Some(());
    }

    let mut intersection: Vec<String> = base_set
        .iter()
        .filter(|t| overlay_set.contains(*t))
        .cloned()
        .collect();

    // integer is a subtype of number: `number` ∩ `integer` = `integer`.
    if intersection.is_empty()
        && base_set.iter().any(|t| t == "number" || t == "integer")
        && overlay_set.iter().any(|t| t == "number" || t == "integer")
    {
        intersection.push("integer".to_string());
    }

    match intersection.len() {
        0 => None,
        1 => {
            if let Some(only) = intersection.into_iter().next() {
                result.insert("type".to_string(), Value::String(only));
            }
            Some(())
        }
        _ => {
            result.insert(
                "type".to_string(),
                Value::Array(intersection.into_iter().map(Value::String).collect()),
            );
            Some(())
        }
    }
}

fn type_set(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(arr) => arr
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    }
}

/// Concatenate enum arrays; dedupe happens downstream.
fn concat_enum(result: &mut Map<String, Value>, overlay_val: Value) {
    let Value::Array(overlay_arr) = overlay_val else {
        return;
    };
    let base = result
        .entry("enum")
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Some(base_arr) = base.as_array_mut() {
        base_arr.extend(overlay_arr);
    }
}

/// Tighten a numeric bound: lower bounds take the larger value, upper
/// bounds the smaller.
fn tighten(result: &mut Map<String, Value>, key: &str, value: Value, lower: bool) {
    let incoming = value.as_f64();
    let existing = result.get(key).and_then(Value::as_f64);
    match (existing, incoming) {
        (Some(e), Some(i)) => {
            let keep_incoming = if lower { i > e } else { i < e };
            if keep_incoming {
                result.insert(key.to_string(), value);
            }
        }
        _ => {
            result.insert(key.to_string(), value);
        }
    }
}

fn merge_items(result: &mut Map<String, Value>, overlay_val: Value) -> Option<()> {
    match (result.remove("items"), overlay_val) {
        (Some(Value::Object(base)), Value::Object(overlay)) => {
            let merged = merge_two(base, overlay)?;
            result.insert("items".to_string(), Value::Object(merged));
        }
        (Some(existing), _) => {
            result.insert("items".to_string(), existing);
        }
        (None, incoming) => {
            result.insert("items".to_string(), incoming);
        }
    }
    Some(())
}

fn merge_additional_properties(result: &mut Map<String, Value>, overlay_val: Value) -> Option<()> {
    match (result.remove("additionalProperties"), overlay_val) {
        // `false` is the strictest setting and wins.
        (Some(Value::Bool(false)), _) | (_, Value::Bool(false)) => {
            result.insert("additionalProperties".to_string(), Value::Bool(false));
        }
        (Some(Value::Object(base)), Value::Object(overlay)) => {
            let merged = merge_two(base, overlay)?;
            result.insert("additionalProperties".to_string(), Value::Object(merged));
        }
        (Some(existing), _) => {
            result.insert("additionalProperties".to_string(), existing);
        }
        (None, incoming) => {
            result.insert("additionalProperties".to_string(), incoming);
        }
    }
    Some(())
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(node: Value) -> Option<Value> {
        merge_all_of(node.as_object().unwrap()).map(Value::Object)
    }

    #[test]
    fn test_merge_object_properties() {
        let merged = run(json!({
            "allOf": [
                { "type": "object", "properties": { "a": { "type": "string" } } },
                { "type": "object", "properties": { "b": { "type": "integer" } } }
            ]
        }))
        .unwrap();

        assert_eq!(merged["type"], "object");
        assert_eq!(merged["properties"]["a"], json!({ "type": "string" }));
        assert_eq!(merged["properties"]["b"], json!({ "type": "integer" }));
    }

    #[test]
    fn test_incompatible_types_fail() {
        assert!(run(json!({
            "allOf": [{ "type": "string" }, { "type": "integer" }]
        }))
        .is_none());
    }

    #[test]
    fn test_number_integer_narrows() {
        let merged = run(json!({
            "allOf": [{ "type": "number" }, { "type": "integer" }]
        }))
        .unwrap();
        assert_eq!(merged["type"], "integer");
    }

    #[test]
    fn test_description_last_wins() {
        let merged = run(json!({
            "allOf": [
                { "type": "string", "description": "first" },
                { "type": "string", "description": "second" }
            ]
        }))
        .unwrap();
        assert_eq!(merged["description"], "second");
    }

    #[test]
    fn test_example_and_format_first_wins() {
        let merged = run(json!({
            "allOf": [
                { "type": "string", "example": "alpha", "format": "hostname" },
                { "type": "string", "example": "beta", "format": "email" }
            ]
        }))
        .unwrap();
        assert_eq!(merged["example"], "alpha");
        assert_eq!(merged["format"], "hostname");
    }

    #[test]
    fn test_enum_concatenated() {
        let merged = run(json!({
            "allOf": [
                { "type": "string", "enum": ["a", "b"] },
                { "type": "string", "enum": ["b", "c"] }
            ]
        }))
        .unwrap();
        // Duplicates survive here; the normalizer dedupes later.
        assert_eq!(merged["enum"], json!(["a", "b", "b", "c"]));
    }

    #[test]
    fn test_required_union() {
        let merged = run(json!({
            "allOf": [
                { "required": ["a", "b"] },
                { "required": ["b", "c"] }
            ]
        }))
        .unwrap();
        assert_eq!(merged["required"], json!(["a", "b", "c"]));
    }

    #[test]
    fn test_bounds_tighten() {
        let merged = run(json!({
            "allOf": [
                { "type": "integer", "minimum": 0, "maximum": 100 },
                { "type": "integer", "minimum": 10, "maximum": 50 }
            ]
        }))
        .unwrap();
        assert_eq!(merged["minimum"], 10);
        assert_eq!(merged["maximum"], 50);
    }

    #[test]
    fn test_siblings_participate_as_first_branch() {
        let merged = run(json!({
            "title": "Sibling",
            "allOf": [{ "type": "object", "properties": { "a": { "type": "string" } } }]
        }))
        .unwrap();
        assert_eq!(merged["title"], "Sibling");
        assert_eq!(merged["type"], "object");
    }

    #[test]
    fn test_shared_property_conflict_fails() {
        assert!(run(json!({
            "allOf": [
                { "type": "object", "properties": { "a": { "type": "string" } } },
                { "type": "object", "properties": { "a": { "type": "integer" } } }
            ]
        }))
        .is_none());
    }

    #[test]
    fn test_additional_properties_false_wins() {
        let merged = run(json!({
            "allOf": [
                { "type": "object", "additionalProperties": { "type": "string" } },
                { "type": "object", "additionalProperties": false }
            ]
        }))
        .unwrap();
        assert_eq!(merged["additionalProperties"], json!(false));
    }

    #[test]
    fn test_non_array_allof_fails() {
        assert!(run(json!({ "allOf": { "type": "string" } })).is_none());
    }
}

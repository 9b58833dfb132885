//! The OpenAPI-Schema-to-JSON-Schema normalizer.
//!
//! Recursively rewrites a (possibly malformed) OpenAPI Schema Object into a
//! JSON-Schema-draft-compatible object. Per node, in order:
//!
//! 1. `$ref` short-circuit — log the pointer, return the node untouched
//! 2. `allOf` merge-or-drop
//! 3. `anyOf`/`oneOf` restructuring (sibling `properties`/`items` absorbed)
//! 4. `discriminator.mapping` logging
//! 5. type repair (`properties` → object, `items` → array, else string)
//! 6. `nullable`/type-array folding, mixed-type `oneOf` splitting
//! 7. `example`/`examples` reshaping + ancestor reverse search
//! 8. array recursion (`items` synthesis, object reclassification)
//! 9. object recursion (property hiding, boolean-`required` promotion)
//! 10. numeric format bounds
//! 11. global default injection
//! 12. default cleanup (objects, enums, empty strings)
//! 13. enum dedupe / description folding
//! 14. keyword cleanup + transformer hook
//!
//! The normalizer never fails: malformed input is repaired where the intent
//! is clear and passed through where it is not. The only hard error in this
//! crate lives in [`crate::pointer::find_schema_definition`].

pub mod bounds;
pub mod merge;
pub mod values;

use serde_json::{json, Map, Value};

use crate::options::{LoggedRef, NormalizeContext, NormalizeOptions, RefKind};
use crate::pointer::build_path;

/// The result of normalizing a schema fragment.
#[derive(Debug)]
pub struct NormalizedSchema {
    pub schema: Value,
    /// Every `$ref` / discriminator-mapping pointer left unresolved.
    /// Non-empty means the fragment contains circular references and
    /// consumers may want to bundle `components` alongside it.
    pub logged_refs: Vec<LoggedRef>,
}

/// Normalize a schema fragment with a fresh context.
pub fn to_json_schema(schema: &Value, opts: &NormalizeOptions) -> NormalizedSchema {
    let mut logged = Vec::new();
    let ctx = NormalizeContext::default();
    let schema = normalize(schema, opts, &ctx, &mut logged);
    NormalizedSchema {
        schema,
        logged_refs: logged,
    }
}

/// Normalize one node. See the module docs for the per-node pipeline.
pub fn normalize(
    schema: &Value,
    opts: &NormalizeOptions,
    ctx: &NormalizeContext<'_>,
    logged: &mut Vec<LoggedRef>,
) -> Value {
    let mut node: Map<String, Value> = match schema {
        Value::Object(m) => m.clone(),
        // `true` is the permissive boolean schema; anything else malformed.
        _ => Map::new(),
    };

    // 1. Circular-ref short-circuit.
    if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
        logged.push(LoggedRef {
            reference: reference.to_string(),
            kind: RefKind::Ref,
        });
        return finish(Value::Object(node), ctx);
    }

    if hidden(&node, opts) {
        return finish(json!({}), ctx);
    }

    // 2. allOf merge-or-drop.
    if node.contains_key("allOf") {
        match merge::merge_all_of(&node) {
            Some(merged) => node = merged,
            None => {
                tracing::debug!(location = %ctx.location, "dropping unmergeable allOf");
                node.remove("allOf");
            }
        }
        // The merge can surface a nested circular $ref.
        if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
            logged.push(LoggedRef {
                reference: reference.to_string(),
                kind: RefKind::Ref,
            });
            return finish(Value::Object(node), ctx);
        }
        if hidden(&node, opts) {
            return finish(json!({}), ctx);
        }
    }

    // 4. Discriminator mapping targets are logically refs.
    if let Some(mapping) = node
        .get("discriminator")
        .and_then(|d| d.get("mapping"))
        .and_then(Value::as_object)
    {
        for target in mapping.values().filter_map(Value::as_str) {
            logged.push(LoggedRef {
                reference: target.to_string(),
                kind: RefKind::Discriminator,
            });
        }
    }

    // 3. anyOf/oneOf restructuring.
    let sibling_props = node.get("properties").cloned();
    let sibling_items = node.get("items").cloned();
    for key in ["anyOf", "oneOf"] {
        let Some(Value::Array(branches)) = node.get(key).cloned() else {
            continue;
        };
        let mut out = Vec::with_capacity(branches.len());
        for (i, branch) in branches.into_iter().enumerate() {
            let branch = absorb_siblings(branch, &sibling_props, &sibling_items);
            let child = ctx.child(build_path(&ctx.location, &[&i.to_string()]));
            let mut walked = normalize(&branch, opts, &child, logged);
            // The synthesis above can leak a boolean `required` flag.
            if let Some(obj) = walked.as_object_mut() {
                if matches!(obj.get("required"), Some(Value::Bool(_))) {
                    obj.remove("required");
                }
            }
            out.push(walked);
        }
        node.insert(key.to_string(), Value::Array(out));
    }
    let polymorphic = node.contains_key("anyOf") || node.contains_key("oneOf");

    // 5. Type repair. RequestBody-shaped objects (they carry `content`)
    // are not schemas and keep their shape.
    if !node.contains_key("type") && !polymorphic && !node.contains_key("content") {
        let inferred = if node.contains_key("properties") {
            "object"
        } else if node.contains_key("items") {
            "array"
        } else {
            "string"
        };
        node.insert("type".to_string(), Value::String(inferred.to_string()));
    }

    // 6. nullable folding, type-array dedupe, mixed-type splitting.
    fold_nullable(&mut node);
    if let Some(branches) = split_mixed_types(&node) {
        let mut out = Vec::with_capacity(branches.len());
        for (i, branch) in branches.into_iter().enumerate() {
            let child = ctx.child(build_path(&ctx.location, &[&i.to_string()]));
            out.push(normalize(&Value::Object(branch), opts, &child, logged));
        }
        let mut split = Map::new();
        split.insert("oneOf".to_string(), Value::Array(out));
        return finish(Value::Object(split), ctx);
    }

    let mut types = type_list(&node);
    let mut is_obj = types.iter().any(|t| t == "object");
    let mut is_arr = types.iter().any(|t| t == "array");

    // 8 (repair half): properties on an "array" means it was never one.
    if is_arr
        && !node.contains_key("items")
        && (node.contains_key("properties") || node.contains_key("additionalProperties"))
    {
        node.insert("type".to_string(), Value::String("object".to_string()));
        types = vec!["object".to_string()];
        is_obj = true;
        is_arr = false;
    }
    let is_primitive_node = !is_obj && !is_arr && !types.is_empty() && !polymorphic;

    // 7. Example/default reshaping.
    let reshape = values::collect_examples(&mut node);
    let mut child_examples = ctx.prev_example_values.clone();
    child_examples.extend(reshape.pushed);
    let mut child_defaults = ctx.prev_default_values.clone();
    if let Some(default) = node.get("default") {
        if !values::is_primitive(default) {
            child_defaults.push(default.clone());
        }
    }

    let mut examples = reshape.examples;
    if examples.is_empty() && is_primitive_node {
        if let Some(found) = values::search_by_pointer(&ctx.location, &ctx.prev_example_values) {
            examples.push(found);
        }
    }
    if !examples.is_empty() {
        node.insert("examples".to_string(), Value::Array(examples));
    }

    // 8. Array recursion.
    if is_arr {
        match node.get("items") {
            None => {
                node.insert("items".to_string(), json!({}));
            }
            Some(Value::Object(m)) if m.is_empty() => {
                // A synthesized/empty items stays `{}` so repeated
                // normalization is a fixed point.
            }
            Some(Value::Object(_)) => {
                let items = node.remove("items").unwrap_or(Value::Null);
                let child = child_context(
                    ctx,
                    build_path(&ctx.location, &["0"]),
                    &child_examples,
                    &child_defaults,
                );
                let walked = normalize(&items, opts, &child, logged);
                node.insert("items".to_string(), walked);
            }
            // Boolean or otherwise malformed items: pass through.
            Some(_) => {}
        }
    }

    // 9. Object recursion.
    if is_obj {
        if let Some(Value::Object(props)) = node.remove("properties") {
            let mut new_props = Map::new();
            let mut promoted: Vec<String> = Vec::new();
            let mut deleted_any = false;

            for (name, prop) in props {
                let child = child_context(
                    ctx,
                    build_path(&ctx.location, &[&name]),
                    &child_examples,
                    &child_defaults,
                );
                let mut walked = normalize(&prop, opts, &child, logged);

                // Non-standard input repair: a boolean `required` on a
                // property belongs in the parent's required array.
                if let Some(obj) = walked.as_object_mut() {
                    if let Some(Value::Bool(flag)) = obj.get("required").cloned() {
                        obj.remove("required");
                        if flag {
                            promoted.push(name.clone());
                        }
                    }
                }

                // `{}` only comes back when read/write-only hiding emptied
                // the property.
                if walked.as_object().is_some_and(Map::is_empty) {
                    deleted_any = true;
                    continue;
                }
                new_props.insert(name, walked);
            }

            if new_props.is_empty() && deleted_any {
                // Hiding emptied the whole object; callers treat `{}` as
                // "omit".
                return finish(json!({}), ctx);
            }
            node.insert("properties".to_string(), Value::Object(new_props));

            if !promoted.is_empty() {
                let required = node
                    .entry("required")
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Some(arr) = required.as_array_mut() {
                    for name in promoted {
                        let v = Value::String(name);
                        if !arr.contains(&v) {
                            arr.push(v);
                        }
                    }
                }
            }
        }

        if let Some(Value::Object(ap)) = node.get("additionalProperties") {
            if !ap.is_empty() {
                let ap = node.remove("additionalProperties").unwrap_or(Value::Null);
                let child = child_context(
                    ctx,
                    ctx.location.clone(),
                    &child_examples,
                    &child_defaults,
                );
                let walked = normalize(&ap, opts, &child, logged);
                node.insert("additionalProperties".to_string(), walked);
            }
        }

        // Consumers always need a fillable shape.
        if !node.contains_key("properties") && !node.contains_key("additionalProperties") {
            node.insert("additionalProperties".to_string(), Value::Bool(true));
        }
    }

    // 10. Numeric format bounds.
    bounds::apply_format_bounds(&mut node);

    // 11/12. Defaults: ancestor search, then global override wins.
    if is_primitive_node && !node.contains_key("default") {
        if let Some(found) = values::search_by_pointer(&ctx.location, &ctx.prev_default_values) {
            node.insert("default".to_string(), found);
        }
    }
    if let Some(globals) = &opts.global_defaults {
        let doc = Value::Object(globals.clone());
        if let Some(found) = crate::pointer::resolve_pointer(&doc, &ctx.location) {
            if !found.is_null() {
                node.insert("default".to_string(), found.clone());
            }
        }
    }
    if is_obj {
        // Object defaults were pushed into the descendant stack above.
        node.remove("default");
    }

    // 13. Enum handling.
    values::dedupe_enum(&mut node);
    if node.contains_key("enum") {
        if opts.add_enums_to_descriptions {
            if let Some(Value::Array(variants)) = node.get("enum").cloned() {
                let listed: Vec<String> = variants
                    .iter()
                    .map(|v| format!("`{}`", values::describe_value(v)))
                    .collect();
                values::append_description(
                    &mut node,
                    &format!("Valid values: {}", listed.join(", ")),
                );
            }
        } else if let Some(default) = node.get("default").cloned() {
            if !default.is_null() {
                values::append_description(
                    &mut node,
                    &format!("Default: `{}`", values::describe_value(&default)),
                );
                node.remove("default");
            }
        }
    }

    // 12 (tail): empty-string defaults are only meaningful when the
    // parameter explicitly allows empty values.
    if node.get("default") == Some(&Value::String(String::new()))
        && node.get("allowEmptyValue").and_then(Value::as_bool) != Some(true)
    {
        node.remove("default");
    }

    // 14. Cleanup.
    if polymorphic {
        node.remove("items");
        node.remove("properties");
    }
    node.remove("externalDocs");
    node.remove("xml");

    finish(Value::Object(node), ctx)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn finish(value: Value, ctx: &NormalizeContext<'_>) -> Value {
    match ctx.transformer {
        Some(transform) => transform(value),
        None => value,
    }
}

fn hidden(node: &Map<String, Value>, opts: &NormalizeOptions) -> bool {
    let flag = |key: &str| node.get(key).and_then(Value::as_bool) == Some(true);
    (opts.hide_read_only_properties && flag("readOnly"))
        || (opts.hide_write_only_properties && flag("writeOnly"))
}

fn child_context<'a>(
    ctx: &NormalizeContext<'a>,
    location: String,
    examples: &[Value],
    defaults: &[Value],
) -> NormalizeContext<'a> {
    NormalizeContext {
        location,
        prev_example_values: examples.to_vec(),
        prev_default_values: defaults.to_vec(),
        transformer: ctx.transformer,
    }
}

fn type_list(node: &Map<String, Value>) -> Vec<String> {
    match node.get("type") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    }
}

/// Wrap an `anyOf`/`oneOf` branch so it absorbs the parent's sibling
/// `properties`/`items` instead of discarding them (a non-standard but
/// common authoring pattern).
fn absorb_siblings(
    branch: Value,
    sibling_props: &Option<Value>,
    sibling_items: &Option<Value>,
) -> Value {
    if sibling_props.is_none() && sibling_items.is_none() {
        return branch;
    }
    if !branch.is_object() || branch.get("$ref").is_some() {
        return branch;
    }

    let mut constraint = Map::new();
    if let Some(props) = sibling_props {
        constraint.insert("properties".to_string(), props.clone());
    }
    if let Some(items) = sibling_items {
        constraint.insert("items".to_string(), items.clone());
    }
    json!({ "allOf": [branch, Value::Object(constraint)] })
}

/// Fold OAS-3.0 `nullable: true` into the type, then dedupe/collapse
/// type arrays.
fn fold_nullable(node: &mut Map<String, Value>) {
    let nullable = matches!(node.remove("nullable"), Some(Value::Bool(true)));
    if nullable {
        match node.get("type").cloned() {
            Some(Value::String(t)) => {
                node.insert(
                    "type".to_string(),
                    json!([t, "null"]),
                );
            }
            Some(Value::Array(mut arr)) => {
                arr.push(Value::String("null".to_string()));
                node.insert("type".to_string(), Value::Array(arr));
            }
            _ => {}
        }
    }

    if let Some(Value::Array(arr)) = node.get("type") {
        let mut deduped: Vec<Value> = Vec::with_capacity(arr.len());
        for t in arr {
            if !deduped.contains(t) {
                deduped.push(t.clone());
            }
        }
        let folded = if deduped.len() == 1 {
            deduped.into_iter().next().unwrap_or(Value::Null)
        } else {
            Value::Array(deduped)
        };
        node.insert("type".to_string(), folded);
    }
}

const SHARED_METADATA: &[&str] = &["description", "deprecated", "title", "readOnly", "writeOnly"];

fn relevant_keywords(type_name: &str) -> &'static [&'static str] {
    match type_name {
        "array" => &["items", "uniqueItems", "minItems", "maxItems"],
        "object" => &[
            "properties",
            "required",
            "additionalProperties",
            "minProperties",
            "maxProperties",
        ],
        "string" => &["format", "enum", "pattern", "minLength", "maxLength", "default"],
        "number" | "integer" => &["format", "enum", "minimum", "maximum", "multipleOf", "default"],
        _ => &[],
    }
}

/// When a type array mixes a non-primitive (`array`/`boolean`/`object`)
/// with other types, split each type into its own `oneOf` branch carrying
/// only the keywords relevant to it plus shared metadata.
fn split_mixed_types(node: &Map<String, Value>) -> Option<Vec<Map<String, Value>>> {
    let Some(Value::Array(arr)) = node.get("type") else {
        return None;
    };
    let names: Vec<String> = arr
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect();
    if names.len() < 2 {
        return None;
    }
    let has_non_primitive = names
        .iter()
        .any(|t| matches!(t.as_str(), "array" | "boolean" | "object"));
    if !has_non_primitive {
        return None;
    }

    let mut branches = Vec::with_capacity(names.len());
    for name in names {
        let mut branch = Map::new();
        branch.insert("type".to_string(), Value::String(name.clone()));
        for key in relevant_keywords(&name) {
            if let Some(v) = node.get(*key) {
                branch.insert((*key).to_string(), v.clone());
            }
        }
        for key in SHARED_METADATA {
            if let Some(v) = node.get(*key) {
                branch.insert((*key).to_string(), v.clone());
            }
        }
        branches.push(branch);
    }
    Some(branches)
}

// ===========================================================================
// Tests
// ===========================================================================

//! Parameter and request-body assembly.
//!
//! Packages an operation's parameters and request body into per-location
//! JSON Schema groups, each normalized through [`crate::normalize`]. The
//! heavy lifting (repair, merge, reshaping) lives in the normalizer; this
//! module handles media-type selection, grouping, deprecated-property
//! partitioning and component bundling.

pub mod response;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::dialect::schema_dialect;
use crate::mime;
use crate::normalize::{normalize, NormalizedSchema};
use crate::operation::Operation;
use crate::options::{LoggedRef, NormalizeContext, NormalizeOptions};
use crate::pointer::build_path;

/// Where a parameter group lives. Body and formData share the same
/// precedence slot; a request body is one or the other, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamLocation {
    Path,
    Query,
    Body,
    FormData,
    Cookie,
    Header,
}

impl ParamLocation {
    fn from_in(location: &str) -> Option<ParamLocation> {
        match location {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            "cookie" => Some(ParamLocation::Cookie),
            "header" => Some(ParamLocation::Header),
            _ => None,
        }
    }

    /// Fixed rendering order: path, query, body/formData, cookie, header.
    fn precedence(self) -> u8 {
        match self {
            ParamLocation::Path => 0,
            ParamLocation::Query => 1,
            ParamLocation::Body | ParamLocation::FormData => 2,
            ParamLocation::Cookie => 3,
            ParamLocation::Header => 4,
        }
    }
}

/// One assembled schema group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaWrapper {
    #[serde(rename = "type")]
    pub kind: ParamLocation,
    pub label: String,
    pub schema: Value,
    /// Deprecated properties split out of `schema`, same shape as the
    /// primary wrapper. Absent when nothing is deprecated.
    #[serde(rename = "deprecatedProps", skip_serializing_if = "Option::is_none")]
    pub deprecated_props: Option<Box<SchemaWrapper>>,
}

/// Assemble an operation's request body and parameters into ordered
/// schema groups. Returns `None` when the operation has neither.
pub fn get_parameters_as_json_schema(
    operation: &Operation<'_>,
    opts: &NormalizeOptions,
) -> Option<Vec<SchemaWrapper>> {
    let document = operation.document();
    let dialect = schema_dialect(document);
    let mut logged: Vec<LoggedRef> = Vec::new();
    let mut wrappers: Vec<SchemaWrapper> = Vec::new();

    if let Some(body) = request_body_wrapper(operation, opts, &mut logged) {
        wrappers.push(body);
    }
    wrappers.extend(parameter_wrappers(operation, opts, &mut logged));

    if wrappers.is_empty() {
        return None;
    }

    wrappers.sort_by_key(|w| w.kind.precedence());

    let components = if logged.is_empty() {
        None
    } else {
        bundled_components(document, opts)
    };
    for wrapper in &mut wrappers {
        finalize_schema(&mut wrapper.schema, &dialect, components.as_ref());
        if let Some(dep) = &mut wrapper.deprecated_props {
            finalize_schema(&mut dep.schema, &dialect, None);
        }
    }

    Some(wrappers)
}

// ---------------------------------------------------------------------------
// Request body
// ---------------------------------------------------------------------------

fn request_body_wrapper(
    operation: &Operation<'_>,
    opts: &NormalizeOptions,
    logged: &mut Vec<LoggedRef>,
) -> Option<SchemaWrapper> {
    let body = operation.request_body()?;
    let content = body.get("content")?.as_object()?;
    let (media_type, media_object) = preferred_media_type(content)?;

    let kind = if mime::is_form_url_encoded(&media_type) {
        ParamLocation::FormData
    } else {
        ParamLocation::Body
    };

    let schema = media_object.get("schema").cloned().unwrap_or(json!({}));
    let ctx = NormalizeContext {
        prev_example_values: seed_example_stack(&media_object),
        ..NormalizeContext::default()
    };
    let mut normalized = normalize(&schema, opts, &ctx, logged);

    // Hiding can empty the whole body; an empty wrapper renders as noise.
    if normalized.as_object().is_some_and(Map::is_empty) {
        return None;
    }

    if let (Some(obj), Some(description)) = (
        normalized.as_object_mut(),
        body.get("description").and_then(Value::as_str),
    ) {
        if !obj.contains_key("description") {
            obj.insert(
                "description".to_string(),
                Value::String(description.to_string()),
            );
        }
    }

    let deprecated_props = partition_deprecated(&mut normalized, kind);
    Some(SchemaWrapper {
        kind,
        label: String::new(),
        schema: normalized,
        deprecated_props,
    })
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

fn parameter_wrappers(
    operation: &Operation<'_>,
    opts: &NormalizeOptions,
    logged: &mut Vec<LoggedRef>,
) -> Vec<SchemaWrapper> {
    // One group per location, keyed in first-seen order.
    let mut groups: Vec<(ParamLocation, Map<String, Value>, Vec<Value>)> = Vec::new();

    for param in operation.parameters() {
        let Some(name) = param.get("name").and_then(Value::as_str) else {
            continue;
        };
        let Some(kind) = param
            .get("in")
            .and_then(Value::as_str)
            .and_then(ParamLocation::from_in)
        else {
            continue;
        };

        let schema = parameter_schema(&param);
        let ctx = NormalizeContext {
            location: build_path("", &[name]),
            ..NormalizeContext::default()
        };
        let normalized = normalize(&schema, opts, &ctx, logged);

        let index = match groups.iter().position(|(k, _, _)| *k == kind) {
            Some(i) => i,
            None => {
                groups.push((kind, Map::new(), Vec::new()));
                groups.len() - 1
            }
        };
        let group = &mut groups[index];
        group.1.insert(name.to_string(), normalized);
        if param.get("required").and_then(Value::as_bool) == Some(true) {
            group.2.push(Value::String(name.to_string()));
        }
    }

    groups
        .into_iter()
        .map(|(kind, properties, required)| {
            let mut schema = json!({
                "type": "object",
                "properties": Value::Object(properties),
                "required": Value::Array(required),
            });
            let deprecated_props = partition_deprecated(&mut schema, kind);
            SchemaWrapper {
                kind,
                label: label_for(kind).to_string(),
                schema,
                deprecated_props,
            }
        })
        .collect()
}

fn label_for(kind: ParamLocation) -> &'static str {
    match kind {
        ParamLocation::Path => "Path Params",
        ParamLocation::Query => "Query Params",
        ParamLocation::Body => "Body Params",
        ParamLocation::FormData => "Form Data",
        ParamLocation::Cookie => "Cookie Params",
        ParamLocation::Header => "Headers",
    }
}

/// Build the schema to normalize for one parameter: its `schema`, or the
/// preferred entry of its `content` map, with sibling `example`/`examples`/
/// `deprecated` merged in.
fn parameter_schema(param: &Value) -> Value {
    let mut schema = match param.get("schema") {
        Some(s) => s.clone(),
        None => param
            .get("content")
            .and_then(Value::as_object)
            .and_then(preferred_media_type)
            .and_then(|(_, media)| media.get("schema").cloned())
            .unwrap_or(json!({})),
    };

    if let Some(obj) = schema.as_object_mut() {
        for key in ["example", "examples", "deprecated", "description", "allowEmptyValue"] {
            if let Some(v) = param.get(key) {
                obj.entry(key.to_string()).or_insert_with(|| v.clone());
            }
        }
    }
    schema
}

// ---------------------------------------------------------------------------
// Shared machinery
// ---------------------------------------------------------------------------

/// Pick the media type to render: exact `application/json` first, then any
/// JSON-compatible type (vendor `+json` suffixes included), then the `*/*`
/// wildcard, then the first declared.
pub(crate) fn preferred_media_type(
    content: &Map<String, Value>,
) -> Option<(String, Value)> {
    let pick = |pred: &dyn Fn(&str) -> bool| {
        content
            .iter()
            .find(|(mt, _)| pred(mt.as_str()))
            .map(|(mt, v)| (mt.clone(), v.clone()))
    };

    pick(&|mt| mt == "application/json")
        .or_else(|| pick(&mime::is_json))
        .or_else(|| pick(&mime::is_wildcard))
        .or_else(|| content.iter().next().map(|(mt, v)| (mt.clone(), v.clone())))
}

/// Seed the ancestor-example stack from a Media Type Object's own
/// `example`/`examples` so descendant primitives can recover their slice.
pub(crate) fn seed_example_stack(media_object: &Value) -> Vec<Value> {
    let mut stack = Vec::new();
    if let Some(example) = media_object.get("example") {
        stack.push(example.clone());
    }
    if let Some(named) = media_object.get("examples").and_then(Value::as_object) {
        for entry in named.values() {
            let value = entry.get("value").unwrap_or(entry);
            if value.get("$ref").is_some() {
                continue;
            }
            stack.push(value.clone());
        }
    }
    stack
}

/// Split top-level `deprecated: true` properties out of `schema` into a
/// parallel wrapper. Required and readOnly properties stay put: hiding a
/// required field breaks form submission, and readOnly fields are already
/// handled by the hide options.
pub(crate) fn partition_deprecated(
    schema: &mut Value,
    kind: ParamLocation,
) -> Option<Box<SchemaWrapper>> {
    let obj = schema.as_object_mut()?;
    let required: Vec<String> = obj
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    let props = obj.get_mut("properties")?.as_object_mut()?;
    let movable: Vec<String> = props
        .iter()
        .filter(|(name, prop)| {
            prop.get("deprecated").and_then(Value::as_bool) == Some(true)
                && !required.contains(name)
                && prop.get("readOnly").and_then(Value::as_bool) != Some(true)
        })
        .map(|(name, _)| name.clone())
        .collect();

    if movable.is_empty() {
        return None;
    }

    let mut moved = Map::new();
    for name in movable {
        if let Some(prop) = props.remove(&name) {
            moved.insert(name, prop);
        }
    }

    Some(Box::new(SchemaWrapper {
        kind,
        label: String::new(),
        schema: json!({ "type": "object", "properties": Value::Object(moved) }),
        deprecated_props: None,
    }))
}

/// Normalize every schema under `components.schemas` so a bundled copy is
/// self-consistent with the wrapper it rides along with.
pub(crate) fn bundled_components(document: &Value, opts: &NormalizeOptions) -> Option<Value> {
    let components = document.get("components")?.as_object()?;
    let mut bundled = components.clone();

    if let Some(Value::Object(schemas)) = bundled.get("schemas").cloned() {
        let mut transformed = Map::new();
        for (name, schema) in schemas {
            let NormalizedSchema { schema, .. } =
                crate::normalize::to_json_schema(&schema, opts);
            transformed.insert(name, schema);
        }
        bundled.insert("schemas".to_string(), Value::Object(transformed));
    }

    Some(Value::Object(bundled))
}

/// Stamp the dialect marker and (when circular refs were logged) the
/// bundled components onto a wrapper schema.
pub(crate) fn finalize_schema(schema: &mut Value, dialect: &str, components: Option<&Value>) {
    let Some(obj) = schema.as_object_mut() else {
        return;
    };
    obj.insert(
        "$schema".to_string(),
        Value::String(dialect.to_string()),
    );
    if let Some(components) = components {
        obj.insert("components".to_string(), components.clone());
    }
}

// ===========================================================================
// Tests
// ===========================================================================

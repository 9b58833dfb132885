//! Response-as-JSON-Schema assembly.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::dialect::schema_dialect;
use crate::normalize::normalize;
use crate::operation::Operation;
use crate::options::{LoggedRef, NormalizeContext, NormalizeOptions};

use super::{bundled_components, finalize_schema, preferred_media_type, seed_example_stack};

/// One renderable schema derived from a response: the body content and,
/// separately, a synthetic object schema for its headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSchema {
    /// The schema's own top-level type, defaulted to `string` when the
    /// normalized body reduced to something untyped (e.g. a bare circular
    /// `$ref`) so consumers always have a renderable placeholder.
    #[serde(rename = "type")]
    pub kind: String,
    pub schema: Value,
    /// The status code this schema belongs to (`"200"`, `"4xx"`, ...).
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Build schema groups for one status code of an operation's responses.
///
/// Returns `None` when the status is absent, or when it carries neither
/// content nor headers.
pub fn get_response_as_json_schema(
    operation: &Operation<'_>,
    status: &str,
    opts: &NormalizeOptions,
) -> Option<Vec<ResponseSchema>> {
    let response = operation.response(status)?;
    let content = response
        .get("content")
        .and_then(Value::as_object)
        .filter(|c| !c.is_empty());
    let headers = response
        .get("headers")
        .and_then(Value::as_object)
        .filter(|h| !h.is_empty());
    if content.is_none() && headers.is_none() {
        return None;
    }

    let document = operation.document();
    let dialect = schema_dialect(document);
    let description = response
        .get("description")
        .and_then(Value::as_str)
        .map(String::from);

    let mut logged: Vec<LoggedRef> = Vec::new();
    let mut out = Vec::new();

    if let Some((_, media_object)) = content.and_then(preferred_media_type) {
        let schema = media_object.get("schema").cloned().unwrap_or(json!({}));
        let ctx = NormalizeContext {
            prev_example_values: seed_example_stack(&media_object),
            ..NormalizeContext::default()
        };
        let normalized = normalize(&schema, opts, &ctx, &mut logged);
        out.push(ResponseSchema {
            kind: reported_type(&normalized),
            schema: normalized,
            label: status.to_string(),
            description: description.clone(),
        });
    }

    if let Some(headers) = headers {
        out.push(header_schema(headers, status, opts, &mut logged));
    }

    let components = if logged.is_empty() {
        None
    } else {
        bundled_components(document, opts)
    };
    for entry in &mut out {
        finalize_schema(&mut entry.schema, &dialect, components.as_ref());
    }

    Some(out)
}

fn reported_type(schema: &Value) -> String {
    match schema.get("type") {
        Some(Value::String(t)) => t.clone(),
        // Type arrays and untyped results (circular refs, bare oneOf)
        // report as string so the renderer has a fallback.
        _ => "string".to_string(),
    }
}

/// One property per header name, each normalized from the header's own
/// `schema` (OAS ≤3.0.3 header shape).
fn header_schema(
    headers: &Map<String, Value>,
    status: &str,
    opts: &NormalizeOptions,
    logged: &mut Vec<LoggedRef>,
) -> ResponseSchema {
    let mut properties = Map::new();
    for (name, header) in headers {
        let schema = header.get("schema").cloned().unwrap_or(json!({}));
        let ctx = NormalizeContext::default();
        let mut normalized = normalize(&schema, opts, &ctx, logged);
        if let (Some(obj), Some(description)) = (
            normalized.as_object_mut(),
            header.get("description").and_then(Value::as_str),
        ) {
            obj.entry("description".to_string())
                .or_insert_with(|| Value::String(description.to_string()));
        }
        properties.insert(name.clone(), normalized);
    }

    ResponseSchema {
        kind: "object".to_string(),
        schema: json!({ "type": "object", "properties": Value::Object(properties) }),
        label: format!("Response Headers ({status})"),
        description: None,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

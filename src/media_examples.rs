//! Curated example extraction from Media Type Objects.
//!
//! Prefers author-supplied `example`/`examples` values; falls back to the
//! sample generator when none exist. XML media types never get a
//! synthesized sample — there is no sensible JSON rendition to show.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::mime;
use crate::operation::Operation;
use crate::samples::{sample_from_schema, SampleOptions};

/// One curated or synthesized example for a media type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaTypeExample {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub value: Value,
}

/// All examples grouped per media type for one request body or response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleGroup {
    /// Status code for responses, empty for request bodies.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub status: String,
    #[serde(rename = "mediaTypes")]
    pub media_types: Map<String, Value>,
    /// Set for responses that carry headers but no content.
    #[serde(rename = "onlyHeaders", skip_serializing_if = "std::ops::Not::not", default)]
    pub only_headers: bool,
}

/// Extract examples from one Media Type Object.
///
/// Order of preference: the singular `example` (one entry), then the named
/// `examples` map in declaration order (entries whose `value` is a bare
/// circular `$ref` are skipped, the map key becomes the `title`), then a
/// generated sample from the schema.
pub fn get_media_type_examples(
    media_type: &str,
    media_object: &Value,
    opts: &SampleOptions,
) -> Vec<MediaTypeExample> {
    if let Some(example) = media_object.get("example") {
        return vec![MediaTypeExample {
            summary: None,
            title: None,
            description: None,
            value: example.clone(),
        }];
    }

    if let Some(named) = media_object.get("examples").and_then(Value::as_object) {
        let extracted: Vec<MediaTypeExample> = named
            .iter()
            .filter_map(|(key, entry)| {
                let value = entry.get("value").unwrap_or(entry);
                if value.get("$ref").is_some() {
                    return None;
                }
                Some(MediaTypeExample {
                    summary: field(entry, "summary"),
                    title: Some(key.clone()),
                    description: field(entry, "description"),
                    value: value.clone(),
                })
            })
            .collect();
        if !extracted.is_empty() {
            return extracted;
        }
    }

    if mime::is_xml(media_type) {
        return Vec::new();
    }

    let Some(schema) = media_object.get("schema") else {
        return Vec::new();
    };
    match sample_from_schema(schema, opts) {
        Some(value) => vec![MediaTypeExample {
            summary: None,
            title: None,
            description: None,
            value,
        }],
        None => Vec::new(),
    }
}

fn field(entry: &Value, key: &str) -> Option<String> {
    entry.get(key).and_then(Value::as_str).map(String::from)
}

/// Request-body examples. Write-only properties are included, read-only
/// excluded: this is the payload a client would send.
pub fn get_request_body_examples(operation: &Operation<'_>) -> Vec<ExampleGroup> {
    let opts = SampleOptions {
        include_write_only: true,
        ..SampleOptions::default()
    };
    let Some(content) = operation
        .request_body()
        .and_then(|b| b.get("content"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    match content_examples(content, &opts) {
        Some(media_types) => vec![ExampleGroup {
            status: String::new(),
            media_types,
            only_headers: false,
        }],
        None => Vec::new(),
    }
}

/// Response examples for every declared status code. Read-only properties
/// are included, write-only excluded: this is what a server returns.
pub fn get_response_examples(operation: &Operation<'_>) -> Vec<ExampleGroup> {
    let opts = SampleOptions {
        include_read_only: true,
        ..SampleOptions::default()
    };
    let Some(responses) = operation.schema().get("responses").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut groups = Vec::new();
    for (status, response) in responses {
        let content = response.get("content").and_then(Value::as_object);
        let media_types = content.and_then(|c| content_examples(c, &opts));

        match media_types {
            Some(media_types) => groups.push(ExampleGroup {
                status: status.clone(),
                media_types,
                only_headers: false,
            }),
            None => {
                // Header-only responses stay representable through a
                // sentinel entry.
                let has_headers = response
                    .get("headers")
                    .and_then(Value::as_object)
                    .is_some_and(|h| !h.is_empty());
                if has_headers {
                    let mut media_types = Map::new();
                    media_types.insert("*/*".to_string(), json!([]));
                    groups.push(ExampleGroup {
                        status: status.clone(),
                        media_types,
                        only_headers: true,
                    });
                }
            }
        }
    }
    groups
}

/// Request-body examples for every callback operation, keyed the way the
/// document nests them: `callbacks[id][expression][method]`.
pub fn get_callback_examples(operation: &Operation<'_>) -> Map<String, Value> {
    let mut out = Map::new();
    let Some(callbacks) = operation.callbacks() else {
        return out;
    };

    for (id, expressions) in callbacks {
        let Some(expressions) = expressions.as_object() else {
            continue;
        };
        let mut per_expression = Map::new();
        for (expression, methods) in expressions {
            let Some(methods) = methods.as_object() else {
                continue;
            };
            let mut per_method = Map::new();
            for (method, callback_op) in methods {
                let nested = Operation::from_parts(operation.document(), callback_op);
                let groups = get_request_body_examples(&nested);
                if let Some(group) = groups.into_iter().next() {
                    per_method.insert(
                        method.clone(),
                        Value::Object(group.media_types),
                    );
                }
            }
            if !per_method.is_empty() {
                per_expression.insert(expression.clone(), Value::Object(per_method));
            }
        }
        if !per_expression.is_empty() {
            out.insert(id.clone(), Value::Object(per_expression));
        }
    }
    out
}

/// Build the per-media-type examples map for one `content` map. `None`
/// when no media type produced anything.
fn content_examples(
    content: &Map<String, Value>,
    opts: &SampleOptions,
) -> Option<Map<String, Value>> {
    let mut media_types = Map::new();
    for (media_type, media_object) in content {
        let examples = get_media_type_examples(media_type, media_object, opts);
        if examples.is_empty() {
            continue;
        }
        let serialized = serde_json::to_value(examples).unwrap_or(Value::Array(Vec::new()));
        media_types.insert(media_type.clone(), serialized);
    }
    if media_types.is_empty() {
        None
    } else {
        Some(media_types)
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

    fn extract(media_type: &str, media_object: Value) -> Vec<MediaTypeExample> {
        get_media_type_examples(media_type, &media_object, &SampleOptions::default())
    }

    #[test]
    fn test_singular_example_preferred() {
        let out = extract(
            "application/json",
            json!({
                "example": { "name": "rex" },
                "examples": { "other": { "value": "ignored" } },
                "schema": { "type": "string" }
            }),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, json!({ "name": "rex" }));
        assert!(out[0].title.is_none());
    }

    #[test]
    fn test_named_examples_in_declaration_order() {
        let out = extract(
            "application/json",
            json!({
                "examples": {
                    "cat": { "summary": "a cat", "value": { "name": "felix" } },
                    "dog": { "description": "a dog", "value": { "name": "rex" } }
                }
            }),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title.as_deref(), Some("cat"));
        assert_eq!(out[0].summary.as_deref(), Some("a cat"));
        assert_eq!(out[1].title.as_deref(), Some("dog"));
        assert_eq!(out[1].description.as_deref(), Some("a dog"));
    }

    #[test]
    fn test_circular_ref_example_skipped() {
        let out = extract(
            "application/json",
            json!({
                "examples": {
                    "broken": { "value": { "$ref": "#/components/examples/loop" } },
                    "ok": { "value": "fine" }
                }
            }),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, json!("fine"));
    }

    #[test]
    fn test_sample_fallback() {
        let out = extract(
            "application/json",
            json!({ "schema": { "type": "object", "properties": { "a": { "type": "integer" } } } }),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, json!({ "a": 0 }));
    }

    #[test]
    fn test_xml_never_synthesized() {
        let out = extract("application/xml", json!({ "schema": { "type": "string" } }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_request_body_includes_write_only() {
        let document = json!({
            "openapi": "3.0.3",
            "paths": {
                "/pets": {
                    "post": {
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "id": { "type": "integer", "readOnly": true },
                                            "secret": { "type": "string", "writeOnly": true }
                                        }
                                    }
                                }
                            }
                        },
                        "responses": {}
                    }
                }
            }
        });
        let op = Operation::from_document(&document, "/pets", "post").unwrap();
        let groups = get_request_body_examples(&op);
        assert_eq!(groups.len(), 1);
        let examples = &groups[0].media_types["application/json"];
        assert_eq!(examples[0]["value"], json!({ "secret": "string" }));
    }

    #[test]
    fn test_response_includes_read_only() {
        let document = json!({
            "openapi": "3.0.3",
            "paths": {
                "/pets": {
                    "get": {
                        "responses": {
                            "200": {
                                "description": "ok",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "id": { "type": "integer", "readOnly": true },
                                                "secret": { "type": "string", "writeOnly": true }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        });
        let op = Operation::from_document(&document, "/pets", "get").unwrap();
        let groups = get_response_examples(&op);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].status, "200");
        let examples = &groups[0].media_types["application/json"];
        assert_eq!(examples[0]["value"], json!({ "id": 0 }));
    }

    #[test]
    fn test_header_only_response_sentinel() {
        let document = json!({
            "openapi": "3.0.3",
            "paths": {
                "/pets": {
                    "get": {
                        "responses": {
                            "204": {
                                "description": "no content",
                                "headers": {
                                    "X-Next": { "schema": { "type": "string" } }
                                }
                            }
                        }
                    }
                }
            }
        });
        let op = Operation::from_document(&document, "/pets", "get").unwrap();
        let groups = get_response_examples(&op);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].only_headers);
        assert_eq!(groups[0].media_types["*/*"], json!([]));
    }

    #[test]
    fn test_callback_examples() {
        let document = json!({
            "openapi": "3.0.3",
            "paths": {
                "/subscribe": {
                    "post": {
                        "callbacks": {
                            "onEvent": {
                                "{$request.body#/url}": {
                                    "post": {
                                        "requestBody": {
                                            "content": {
                                                "application/json": {
                                                    "example": { "event": "created" }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        },
                        "responses": {}
                    }
                }
            }
        });
        let op = Operation::from_document(&document, "/subscribe", "post").unwrap();
        let out = get_callback_examples(&op);
        let examples = &out["onEvent"]["{$request.body#/url}"]["post"]["application/json"];
        assert_eq!(examples[0]["value"], json!({ "event": "created" }));
    }
}

//! `$schema` dialect marker selection.
//!
//! Normalized output is stamped with the JSON Schema dialect the source
//! document implies: draft-04 for OAS 3.0.x, the document's own
//! `jsonSchemaDialect` when present, or the 2020-12 default for OAS 3.1.

use serde_json::Value;

/// The dialect reported for OAS 3.0.x-derived schemas.
pub const DRAFT_04: &str = "http://json-schema.org/draft-04/schema#";

/// The default dialect for OAS 3.1 documents.
pub const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema#";

/// Pick the `$schema` value for schemas derived from `document`.
pub fn schema_dialect(document: &Value) -> String {
    if let Some(dialect) = document.get("jsonSchemaDialect").and_then(Value::as_str) {
        return dialect.to_string();
    }

    let version = document
        .get("openapi")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if version.starts_with("3.1") {
        DRAFT_2020_12.to_string()
    } else {
        DRAFT_04.to_string()
    }
}

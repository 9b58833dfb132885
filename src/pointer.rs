//! JSON Pointer utilities (RFC 6901) and `$ref` resolution.
//!
//! Provides the escaping/path-building helpers used by the normalizer's
//! location tracking, plus [`find_schema_definition`] — the one place in
//! this crate that turns a dangling `$ref` into a hard error.

use std::borrow::Cow;

use serde_json::Value;

use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// JSON Pointer escaping (RFC 6901)
// ---------------------------------------------------------------------------

/// Escape a single path segment per RFC 6901.
///
/// - `~` → `~0`
/// - `/` → `~1`
///
/// Returns `Cow::Borrowed` when no escaping is needed (the common case).
pub fn escape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') || segment.contains('/') {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Unescape a single path segment per RFC 6901.
///
/// Order matters: unescape `~1` first to avoid double-unescaping.
pub fn unescape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains("~0") || segment.contains("~1") {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Build a JSON Pointer path by appending segments to a parent path.
///
/// Each segment is escaped per RFC 6901 before joining.
pub fn build_path(parent: &str, segments: &[&str]) -> String {
    let mut path = parent.to_string();
    for segment in segments {
        path.push('/');
        path.push_str(&escape_pointer_segment(segment));
    }
    path
}

/// Split a JSON Pointer path into decoded segments.
///
/// Strips a leading `#` fragment identifier (if present), splits on `/`,
/// and unescapes each segment per RFC 6901.
pub fn split_path(path: &str) -> Vec<String> {
    let stripped = path.strip_prefix('#').unwrap_or(path);
    if stripped.is_empty() {
        return Vec::new();
    }

    let mut segments = stripped.split('/');
    if stripped.starts_with('/') {
        segments.next();
    }

    segments
        .map(|s| unescape_pointer_segment(s).into_owned())
        .collect()
}

/// Resolve a JSON Pointer against a document, returning `None` on any miss.
///
/// Accepts both fragment (`#/components/...`) and bare (`/components/...`)
/// forms. Traversal through a non-container (including `null`) is a miss,
/// never an error — callers using this for best-effort value search rely on
/// that.
pub fn resolve_pointer<'a>(root: &'a Value, pointer: &str) -> Option<&'a Value> {
    let stripped = pointer.strip_prefix('#').unwrap_or(pointer);
    if stripped.is_empty() {
        return Some(root);
    }
    let path = stripped.strip_prefix('/')?;

    let mut current = root;
    for segment in path.split('/') {
        let key = unescape_pointer_segment(segment);
        match current {
            Value::Object(obj) => {
                current = obj.get(key.as_ref())?;
            }
            Value::Array(arr) => {
                let idx: usize = key.parse().ok()?;
                current = arr.get(idx)?;
            }
            _ => return None,
        }
    }

    Some(current)
}

// ---------------------------------------------------------------------------
// $ref resolution
// ---------------------------------------------------------------------------

/// Resolve a `$ref` string against a document.
///
/// Segments are percent-decoded and RFC 6901-unescaped, so refs like
/// `#/components/schemas/pet%20store` and `#/paths/~1pets~1{id}/get` both
/// work. Only root-relative (`#/...`) refs are supported; anything else is
/// an [`SchemaError::InvalidPointer`]. A pointer that walks off the document
/// is [`SchemaError::MissingDefinition`] — the single hard failure boundary
/// in this crate.
pub fn find_schema_definition(reference: &str, document: &Value) -> Result<Value, SchemaError> {
    let original = reference.trim();
    if original.is_empty() {
        return Err(SchemaError::InvalidPointer {
            pointer: reference.to_string(),
        });
    }

    let Some(path) = original.strip_prefix('#') else {
        return Err(SchemaError::InvalidPointer {
            pointer: original.to_string(),
        });
    };

    if path.is_empty() {
        return Ok(document.clone());
    }

    let Some(path) = path.strip_prefix('/') else {
        // Anchor-style fragments ("#Foo") are not JSON Pointer syntax.
        return Err(SchemaError::InvalidPointer {
            pointer: original.to_string(),
        });
    };

    let mut current = document;
    for segment in path.split('/') {
        let decoded = percent_decode(segment);
        let key = unescape_pointer_segment(&decoded);
        let next = match current {
            Value::Object(obj) => obj.get(key.as_ref()),
            Value::Array(arr) => key.parse::<usize>().ok().and_then(|i| arr.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| SchemaError::MissingDefinition {
            reference: original.to_string(),
        })?;
    }

    Ok(current.clone())
}

/// Decode `%XX` escapes in a pointer segment. Malformed escapes pass
/// through untouched.
fn percent_decode(segment: &str) -> String {
    if !segment.contains('%') {
        return segment.to_string();
    }

    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(hi), Some(lo)) = (
                bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16)),
                bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16)),
            ) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(out).unwrap_or_else(|_| segment.to_string())
}

// ===========================================================================
// Tests
// ===========================================================================

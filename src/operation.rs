//! Borrowed view of one operation inside an OpenAPI document.
//!
//! Pure data accessors over `serde_json::Value`, no repair logic. The
//! assemblers and example extractors consume this view; everything
//! algorithmic lives in [`crate::normalize`] and friends.

use serde_json::{Map, Value};

/// One `(path, method)` entry of a document's `paths` map.
#[derive(Debug, Clone, Copy)]
pub struct Operation<'a> {
    document: &'a Value,
    path_item: &'a Value,
    operation: &'a Value,
}

impl<'a> Operation<'a> {
    /// Look up `paths[path][method]`. The method is matched
    /// case-insensitively against the lowercase OpenAPI keys.
    pub fn from_document(document: &'a Value, path: &str, method: &str) -> Option<Operation<'a>> {
        let path_item = document.get("paths")?.get(path)?;
        let operation = path_item.get(method.to_ascii_lowercase())?;
        if !operation.is_object() {
            return None;
        }
        Some(Operation {
            document,
            path_item,
            operation,
        })
    }

    /// Wrap an already-extracted operation object, e.g. a callback's
    /// nested operation that has no `paths` entry of its own.
    pub fn from_parts(document: &'a Value, operation: &'a Value) -> Operation<'a> {
        Operation {
            document,
            path_item: operation,
            operation,
        }
    }

    pub fn document(&self) -> &'a Value {
        self.document
    }

    /// The raw operation object.
    pub fn schema(&self) -> &'a Value {
        self.operation
    }

    /// Operation-level parameters merged with inherited path-level
    /// ("common") parameters. Identity is `(name, in)`; an operation-level
    /// parameter always overrides the common one with the same identity.
    pub fn parameters(&self) -> Vec<Value> {
        let own = parameter_list(self.operation);
        let common: &[Value] = if std::ptr::eq(self.path_item, self.operation) {
            &[]
        } else {
            parameter_list(self.path_item)
        };

        let mut merged: Vec<Value> = own.to_vec();
        for candidate in common {
            let identity = parameter_identity(candidate);
            let overridden = identity.is_some()
                && own.iter().any(|p| parameter_identity(p) == identity);
            if !overridden {
                merged.push(candidate.clone());
            }
        }
        merged
    }

    pub fn request_body(&self) -> Option<&'a Value> {
        self.operation.get("requestBody").filter(|v| v.is_object())
    }

    pub fn response(&self, status: &str) -> Option<&'a Value> {
        self.operation.get("responses")?.get(status)
    }

    pub fn callbacks(&self) -> Option<&'a Map<String, Value>> {
        self.operation.get("callbacks")?.as_object()
    }

    pub fn is_deprecated(&self) -> bool {
        self.operation.get("deprecated").and_then(Value::as_bool) == Some(true)
    }
}

fn parameter_list(node: &Value) -> &[Value] {
    node.get("parameters")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn parameter_identity(param: &Value) -> Option<(&str, &str)> {
    Some((
        param.get("name").and_then(Value::as_str)?,
        param.get("in").and_then(Value::as_str)?,
    ))
}

// ===========================================================================
// Tests
// ===========================================================================

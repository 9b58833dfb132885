//! Options and recursion context for normalization.
//!
//! ## Serialization format
//!
//! [`NormalizeOptions`] fields serialize in `kebab-case` (e.g.
//! `hide-read-only-properties`). This naming is part of the public contract
//! for config files.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options for normalizing an OpenAPI Schema Object into JSON Schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct NormalizeOptions {
    /// Default-value overrides, looked up by the node's JSON Pointer
    /// location. When a location resolves inside this map, the found value
    /// replaces the node's `default` unconditionally.
    pub global_defaults: Option<Map<String, Value>>,
    /// Drop `readOnly` properties (request-side rendering).
    pub hide_read_only_properties: bool,
    /// Drop `writeOnly` properties (response-side rendering).
    pub hide_write_only_properties: bool,
    /// Append backtick-quoted enum values to node descriptions instead of
    /// folding the default into the description.
    pub add_enums_to_descriptions: bool,
}

/// Post-hoc hook applied to every node the normalizer returns.
pub type Transformer<'a> = &'a dyn Fn(Value) -> Value;

/// How a logged pointer was encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// A literal `$ref` left in place (circular).
    Ref,
    /// A `discriminator.mapping` target — logically equivalent to a ref.
    Discriminator,
}

/// A pointer the normalizer encountered but did not resolve.
///
/// Consumers use these to decide whether to bundle the document's
/// `components` map alongside the output schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedRef {
    pub reference: String,
    pub kind: RefKind,
}

/// Recursion context threaded through every normalizer call.
///
/// The ancestor stacks are append-only: a child call receives its parent's
/// stack plus any value the parent contributed, and sibling calls never see
/// each other's additions.
#[derive(Default)]
pub struct NormalizeContext<'a> {
    /// JSON Pointer of the current node within its root schema fragment.
    pub location: String,
    /// Ancestor `example`/`examples` data values, root-first.
    pub prev_example_values: Vec<Value>,
    /// Ancestor `default` data values, root-first.
    pub prev_default_values: Vec<Value>,
    /// Hook applied to every returned node.
    pub transformer: Option<Transformer<'a>>,
}

impl<'a> NormalizeContext<'a> {
    /// Child context at `location`, inheriting the ancestor stacks.
    pub(crate) fn child(&self, location: String) -> NormalizeContext<'a> {
        NormalizeContext {
            location,
            prev_example_values: self.prev_example_values.clone(),
            prev_default_values: self.prev_default_values.clone(),
            transformer: self.transformer,
        }
    }
}

impl std::fmt::Debug for NormalizeContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizeContext")
            .field("location", &self.location)
            .field("prev_example_values", &self.prev_example_values)
            .field("prev_default_values", &self.prev_default_values)
            .field("transformer", &self.transformer.map(|_| "<fn>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_serde_round_trip() {
        let opts = NormalizeOptions {
            global_defaults: Some(Map::from_iter([(
                "id".to_string(),
                Value::from(1234),
            )])),
            hide_read_only_properties: true,
            hide_write_only_properties: false,
            add_enums_to_descriptions: true,
        };

        let json = serde_json::to_string(&opts).unwrap();
        assert!(json.contains("\"hide-read-only-properties\""));
        assert!(json.contains("\"add-enums-to-descriptions\""));

        let back: NormalizeOptions = serde_json::from_str(&json).unwrap();
        assert!(back.hide_read_only_properties);
        assert!(!back.hide_write_only_properties);
        assert_eq!(back.global_defaults.unwrap()["id"], 1234);
    }

    #[test]
    fn test_child_context_inherits_stacks() {
        let mut ctx = NormalizeContext::default();
        ctx.prev_example_values.push(Value::from("x"));

        let child = ctx.child("/a".to_string());
        assert_eq!(child.location, "/a");
        assert_eq!(child.prev_example_values, vec![Value::from("x")]);
    }
}

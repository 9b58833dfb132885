//! Error types for schema resolution.
//!
//! Almost every code path in this crate degrades gracefully on malformed
//! input rather than failing; the one hard failure boundary is a `$ref`
//! that cannot be resolved against the supplied document.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    /// A `$ref` pointer did not resolve to anything in the document.
    #[error("Could not find a definition for {reference}.")]
    MissingDefinition { reference: String },

    /// A `$ref` that is empty, external, or not JSON Pointer syntax.
    #[error("Invalid $ref pointer: {pointer}")]
    InvalidPointer { pointer: String },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

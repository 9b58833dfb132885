//! Transform OpenAPI Schema Objects into presentable JSON Schema, example
//! payloads and sample data.
//!
//! The input is an already-dereferenced OpenAPI 3.0.x / 3.1.x document (a
//! `serde_json::Value`); only deliberately-circular `$ref`s remain. The
//! crate then offers three consumer surfaces:
//!
//! - [`normalize::to_json_schema`] — the core normalizer: repairs malformed
//!   schemas, merges `allOf`, restructures `anyOf`/`oneOf`, folds
//!   `nullable`, reshapes `example`/`examples`, applies numeric format
//!   bounds and read/write-only hiding. It never fails; broken input
//!   degrades to something renderable.
//! - [`assemble`] — packages an operation's parameters, request body and
//!   responses into per-location schema groups ready for form rendering.
//! - [`samples`] / [`media_examples`] — generate representative payloads
//!   from schemas and extract curated examples from Media Type Objects.
//!
//! The one hard failure in the crate is
//! [`pointer::find_schema_definition`] on an unresolvable `$ref`; every
//! other path degrades gracefully (see `SchemaError`).

pub mod assemble;
pub mod dialect;
pub mod error;
pub mod media_examples;
pub mod mime;
pub mod normalize;
pub mod operation;
pub mod options;
pub mod pointer;
pub mod samples;

pub use assemble::response::{get_response_as_json_schema, ResponseSchema};
pub use assemble::{get_parameters_as_json_schema, ParamLocation, SchemaWrapper};
pub use dialect::schema_dialect;
pub use error::SchemaError;
pub use media_examples::{
    get_callback_examples, get_media_type_examples, get_request_body_examples,
    get_response_examples, ExampleGroup, MediaTypeExample,
};
pub use normalize::{to_json_schema, NormalizedSchema};
pub use operation::Operation;
pub use options::{LoggedRef, NormalizeContext, NormalizeOptions, RefKind, Transformer};
pub use pointer::find_schema_definition;
pub use samples::{sample_from_schema, SampleOptions};

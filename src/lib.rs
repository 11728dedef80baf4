//! OpenAPI/JSON-Schema documents as data, plus schema synthesis by
//! reflection.
//!
//! Two halves:
//! - A closed, recursive model of schema nodes ([`SchemaObject`]) and
//!   generic JSON values ([`AnyValue`]), with hand-written codecs mapping
//!   the tag-driven wire shape to in-memory variants.
//! - Reflective synthesizers that derive those models from any
//!   `serde::Serialize` value by driving its own serialization logic
//!   against a shape-capturing serializer, deduplicating repeated nominal
//!   types into a named component table ([`SchemaSynthesizer`]).
//!
//! Single-threaded and synchronous throughout: every operation is a pure
//! structural transformation. The component table is caller-owned and
//! last-write-wins; serialize access if you must share it.

pub mod codec;
pub mod error;
pub mod reference;
pub mod schema;
pub mod synth;
pub mod value;

pub use codec::DecodeError;
pub use error::SynthError;
pub use reference::{Reference, ReferenceOr};
pub use schema::{CompositeKind, PrimitiveKind, SchemaObject, SchemaRef, Xml};
pub use synth::{SchemaSynthesizer, schema_of, value_of};
pub use value::AnyValue;

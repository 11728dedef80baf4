//! Error taxonomy for the reflective synthesizers.
//!
//! Structural decode failures stay on serde's own `de::Error` channel (the
//! schema decoder raises them with the offending field name); this type
//! covers the synthesis path, where we sit on the serializer side and must
//! supply the `ser::Error` carrier ourselves.

use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynthError {
    /// The driven value's own `Serialize` impl failed; propagated unchanged.
    #[error("{0}")]
    Message(String),

    /// Keyed containers can only be captured when their keys are strings.
    #[error("map keys must be strings, found {0}")]
    NonStringKey(&'static str),

    /// The value model carries integers as i64 only.
    #[error("integer out of range for the value model")]
    IntegerOutOfRange,
}

impl serde::ser::Error for SynthError {
    fn custom<T: Display>(msg: T) -> Self {
        SynthError::Message(msg.to_string())
    }
}

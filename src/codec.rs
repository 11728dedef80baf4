//! Decode helpers with JSON-path context in error messages.
//!
//! Schema documents nest deeply, so a bare "missing field `items`" is close
//! to useless; these wrappers report where in the document the decode fell
//! over.

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::schema::SchemaObject;
use crate::value::AnyValue;

/// Structural decode failure plus the JSON path that produced it.
#[derive(Debug, Error)]
#[error("at JSON path {path}: {source}")]
pub struct DecodeError {
    pub path: String,
    #[source]
    pub source: serde_json::Error,
}

pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, DecodeError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        DecodeError { path, source: err.into_inner() }
    })
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        DecodeError { path, source: err.into_inner() }
    })
}

/// Decode one schema node from JSON text.
pub fn schema_from_str(src: &str) -> Result<SchemaObject, DecodeError> {
    from_str_with_path(src)
}

/// Decode one generic value from JSON text.
pub fn value_from_str(src: &str) -> Result<AnyValue, DecodeError> {
    from_str_with_path(src)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_names_the_json_path() {
        // the nested array schema is missing its `items`
        let src = r#"{
            "type": "object",
            "properties": {
                "tags": { "type": "array" }
            }
        }"#;
        let err = schema_from_str(src).unwrap_err();
        assert!(
            err.path.contains("properties"),
            "path should descend into the document: {}",
            err.path
        );
    }

    #[test]
    fn well_formed_documents_decode() {
        let schema = schema_from_str(r#"{ "type": "boolean" }"#).unwrap();
        assert_eq!(schema, SchemaObject::boolean());

        let value = value_from_str(r#"{ "a": [1, true, null] }"#).unwrap();
        assert_eq!(value.get("a").and_then(|a| a.get_index(1)), Some(&AnyValue::Bool(true)));
    }
}

//! Reference wrapper: inline value vs named `$ref` pointer.

use serde::{Deserialize, Serialize};

/// Named pointer into a components table, e.g. `#/components/schemas/User`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "$ref")]
    pub ref_path: String,
}

impl Reference {
    pub fn new(ref_path: impl Into<String>) -> Self {
        Self { ref_path: ref_path.into() }
    }

    /// Pointer to a named component schema.
    pub fn schema(name: &str) -> Self {
        Self::new(format!("#/components/schemas/{name}"))
    }
}

/// Either an inline value or a named reference, wherever the schema format
/// allows `$ref`. `Ref` is probed first on decode: only objects carrying a
/// `$ref` key match it, everything else falls through to `Item`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceOr<T> {
    Ref(Reference),
    Item(T),
}

impl<T> ReferenceOr<T> {
    pub fn item(value: T) -> Self {
        ReferenceOr::Item(value)
    }

    pub fn reference(name: &str) -> Self {
        ReferenceOr::Ref(Reference::schema(name))
    }

    pub fn as_item(&self) -> Option<&T> {
        match self {
            ReferenceOr::Item(v) => Some(v),
            ReferenceOr::Ref(_) => None,
        }
    }

    pub fn as_ref_path(&self) -> Option<&str> {
        match self {
            ReferenceOr::Ref(r) => Some(&r.ref_path),
            ReferenceOr::Item(_) => None,
        }
    }
}

impl<T> From<T> for ReferenceOr<T> {
    fn from(value: T) -> Self {
        ReferenceOr::Item(value)
    }
}

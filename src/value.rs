//! Generic JSON value model.
//!
//! `AnyValue` is the schemaless half of the crate: a closed recursive sum
//! over everything JSON can carry. Schema documents use it for example
//! values and arbitrary metadata where no registered decoder applies.

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

// ------------------------------- Model ------------------------------------ //

/// Any JSON-compatible value. Exactly one variant is active at a time.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyValue {
    String(String),
    Bool(bool),
    Int(i64),
    Double(f64),
    Object(IndexMap<String, AnyValue>),
    Array(Vec<AnyValue>),
    Null,
}

impl AnyValue {
    /// Build an object value from key/value pairs.
    pub fn object<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, AnyValue)>,
    {
        AnyValue::Object(entries.into_iter().collect())
    }

    /// Build an array value from elements.
    pub fn array<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = AnyValue>,
    {
        AnyValue::Array(elements.into_iter().collect())
    }

    /// Field access by key. `Some` only for `Object` with the key present;
    /// `None` otherwise, never an error.
    pub fn get(&self, key: &str) -> Option<&AnyValue> {
        match self {
            AnyValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Element access by index. `Some` only for `Array` with `idx` in bounds.
    pub fn get_index(&self, idx: usize) -> Option<&AnyValue> {
        match self {
            AnyValue::Array(xs) => xs.get(idx),
            _ => None,
        }
    }

    /// Add or update a key on an `Object`. Silent no-op on every other
    /// variant (documented quirk, not an error).
    pub fn set(&mut self, key: impl Into<String>, value: AnyValue) {
        if let AnyValue::Object(map) = self {
            map.insert(key.into(), value);
        }
    }

    /// Remove a key from an `Object`. No-op on every other variant.
    pub fn remove(&mut self, key: &str) {
        if let AnyValue::Object(map) = self {
            map.shift_remove(key);
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AnyValue::Null)
    }
}

// literal-construction sugar
impl From<&str> for AnyValue {
    fn from(s: &str) -> Self {
        AnyValue::String(s.to_string())
    }
}
impl From<String> for AnyValue {
    fn from(s: String) -> Self {
        AnyValue::String(s)
    }
}
impl From<bool> for AnyValue {
    fn from(b: bool) -> Self {
        AnyValue::Bool(b)
    }
}
impl From<i64> for AnyValue {
    fn from(i: i64) -> Self {
        AnyValue::Int(i)
    }
}
impl From<f64> for AnyValue {
    fn from(f: f64) -> Self {
        AnyValue::Double(f)
    }
}
impl From<Vec<AnyValue>> for AnyValue {
    fn from(xs: Vec<AnyValue>) -> Self {
        AnyValue::Array(xs)
    }
}
impl From<IndexMap<String, AnyValue>> for AnyValue {
    fn from(map: IndexMap<String, AnyValue>) -> Self {
        AnyValue::Object(map)
    }
}

// ------------------------------- Encode ----------------------------------- //

impl Serialize for AnyValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            AnyValue::String(s) => serializer.serialize_str(s),
            AnyValue::Bool(b) => serializer.serialize_bool(*b),
            AnyValue::Int(i) => serializer.serialize_i64(*i),
            AnyValue::Double(f) => serializer.serialize_f64(*f),
            AnyValue::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            AnyValue::Array(xs) => {
                let mut out = serializer.serialize_seq(Some(xs.len()))?;
                for v in xs {
                    out.serialize_element(v)?;
                }
                out.end()
            }
            AnyValue::Null => serializer.serialize_unit(),
        }
    }
}

// ------------------------------- Decode ----------------------------------- //

/// Probing order mirrors the wire contract: string, bool, int, double,
/// object, array, then explicit null. The int arm runs before double, so an
/// integral double decodes as `Int` (documented non-bijection).
struct AnyValueVisitor;

impl<'de> Visitor<'de> for AnyValueVisitor {
    type Value = AnyValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<AnyValue, E> {
        Ok(AnyValue::String(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<AnyValue, E> {
        Ok(AnyValue::String(s))
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<AnyValue, E> {
        Ok(AnyValue::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, i: i64) -> Result<AnyValue, E> {
        Ok(AnyValue::Int(i))
    }

    fn visit_u64<E: de::Error>(self, u: u64) -> Result<AnyValue, E> {
        // the model only carries i64; larger magnitudes widen to double
        if u <= i64::MAX as u64 {
            Ok(AnyValue::Int(u as i64))
        } else {
            Ok(AnyValue::Double(u as f64))
        }
    }

    fn visit_f64<E: de::Error>(self, f: f64) -> Result<AnyValue, E> {
        let integral = f.is_finite()
            && f.fract() == 0.0
            && f >= i64::MIN as f64
            && f <= i64::MAX as f64;
        if integral {
            Ok(AnyValue::Int(f as i64))
        } else {
            Ok(AnyValue::Double(f))
        }
    }

    fn visit_unit<E: de::Error>(self) -> Result<AnyValue, E> {
        Ok(AnyValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<AnyValue, E> {
        Ok(AnyValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<AnyValue, D::Error> {
        deserializer.deserialize_any(AnyValueVisitor)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<AnyValue, A::Error> {
        let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(el) = seq.next_element::<AnyValue>()? {
            out.push(el);
        }
        Ok(AnyValue::Array(out))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<AnyValue, A::Error> {
        let mut out = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((k, v)) = map.next_entry::<String, AnyValue>()? {
            out.insert(k, v);
        }
        Ok(AnyValue::Object(out))
    }
}

impl<'de> Deserialize<'de> for AnyValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AnyValueVisitor)
    }
}

// ------------------------------- Tests ------------------------------------ //

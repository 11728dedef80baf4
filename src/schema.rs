//! Schema model with its tagged-wire codec.
//!
//! `SchemaObject` is a closed sum over the JSON-Schema-superset node kinds
//! OpenAPI 3.x uses. The wire shape is tag-driven (`type` vs one of
//! `oneOf`/`allOf`/`anyOf`), so encode/decode are hand-written rather than
//! derived: the in-memory variant and the wire object differ structurally.

use indexmap::{IndexMap, IndexSet};
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::reference::ReferenceOr;

/// Schema node or `$ref` to one, as the wire allows at every recursive edge.
pub type SchemaRef = ReferenceOr<SchemaObject>;

// ------------------------------- Model ------------------------------------ //

/// Scalar schema kinds carried by the `type` tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Number,
    Integer,
    Boolean,
}

impl PrimitiveKind {
    pub fn tag(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Boolean => "boolean",
        }
    }

    /// Map a wire tag to a kind. Unknown tags lean on `string` rather than
    /// failing (deliberate leniency, not an error).
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "number" => PrimitiveKind::Number,
            "integer" => PrimitiveKind::Integer,
            "boolean" => PrimitiveKind::Boolean,
            _ => PrimitiveKind::String,
        }
    }
}

/// Which composite key a `Composite` node lives under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeKind {
    OneOf,
    AllOf,
    AnyOf,
}

impl CompositeKind {
    pub fn key(self) -> &'static str {
        match self {
            CompositeKind::OneOf => "oneOf",
            CompositeKind::AllOf => "allOf",
            CompositeKind::AnyOf => "anyOf",
        }
    }
}

/// XML serialization metadata attached to object schemas.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Xml {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapped: Option<bool>,
}

/// One JSON-Schema-superset node.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaObject {
    /// Unconstrained schema; wire form is the empty object.
    Any,
    /// `{"type": <kind>}`.
    Primitive(PrimitiveKind),
    /// `{"type": "object", ...}`.
    Object {
        properties: IndexMap<String, SchemaRef>,
        required: Option<IndexSet<String>>,
        additional_properties: Option<Box<SchemaRef>>,
        xml: Option<Xml>,
    },
    /// `{"type": "array", "items": ...}`.
    Array { items: Box<SchemaRef> },
    /// One of `oneOf`/`allOf`/`anyOf` with an optional discriminator.
    Composite {
        kind: CompositeKind,
        members: Vec<SchemaRef>,
        discriminator: Option<String>,
    },
}

impl SchemaObject {
    pub fn string() -> Self {
        SchemaObject::Primitive(PrimitiveKind::String)
    }

    pub fn integer() -> Self {
        SchemaObject::Primitive(PrimitiveKind::Integer)
    }

    pub fn number() -> Self {
        SchemaObject::Primitive(PrimitiveKind::Number)
    }

    pub fn boolean() -> Self {
        SchemaObject::Primitive(PrimitiveKind::Boolean)
    }

    /// Object node with only `properties` set.
    pub fn object<I>(properties: I) -> Self
    where
        I: IntoIterator<Item = (String, SchemaRef)>,
    {
        SchemaObject::Object {
            properties: properties.into_iter().collect(),
            required: None,
            additional_properties: None,
            xml: None,
        }
    }

    pub fn array(items: SchemaRef) -> Self {
        SchemaObject::Array { items: Box::new(items) }
    }

    /// Whether this node may be registered as a named component. Every
    /// variant qualifies except `Any`: an unconstrained schema carries no
    /// information worth pointing at.
    pub fn is_referenceable(&self) -> bool {
        !matches!(self, SchemaObject::Any)
    }
}

// ------------------------------- Encode ----------------------------------- //

impl Serialize for SchemaObject {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SchemaObject::Any => serializer.serialize_map(Some(0))?.end(),
            SchemaObject::Primitive(kind) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("type", kind.tag())?;
                map.end()
            }
            SchemaObject::Object { properties, required, additional_properties, xml } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", "object")?;
                if let Some(xml) = xml {
                    map.serialize_entry("xml", xml)?;
                }
                map.serialize_entry("properties", properties)?;
                if let Some(required) = required {
                    map.serialize_entry("required", required)?;
                }
                if let Some(extra) = additional_properties {
                    map.serialize_entry("additionalProperties", extra)?;
                }
                map.end()
            }
            SchemaObject::Array { items } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "array")?;
                map.serialize_entry("items", items)?;
                map.end()
            }
            SchemaObject::Composite { kind, members, discriminator } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry(kind.key(), members)?;
                // Older emitters of this format wrote the discriminator
                // value into the `type` key; that made the node decode as a
                // primitive on the way back. We write the proper key and
                // flag the incompatibility in the test suite.
                if let Some(discriminator) = discriminator {
                    map.serialize_entry("discriminator", discriminator)?;
                }
                map.end()
            }
        }
    }
}

// ------------------------------- Decode ----------------------------------- //

/// Flat projection of every key the codec recognizes. Decode reads this
/// first, then picks the variant: `type` always wins over composite keys.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchema {
    #[serde(rename = "type")]
    type_tag: Option<String>,
    items: Option<SchemaRef>,
    properties: Option<IndexMap<String, SchemaRef>>,
    required: Option<IndexSet<String>>,
    additional_properties: Option<Box<SchemaRef>>,
    xml: Option<Xml>,
    one_of: Option<Vec<SchemaRef>>,
    all_of: Option<Vec<SchemaRef>>,
    any_of: Option<Vec<SchemaRef>>,
    discriminator: Option<String>,
}

impl RawSchema {
    /// `Err` carries the name of a required-but-missing field.
    fn into_schema(self) -> Result<SchemaObject, &'static str> {
        match self.type_tag.as_deref() {
            Some("array") => {
                let items = self.items.ok_or("items")?;
                Ok(SchemaObject::Array { items: Box::new(items) })
            }
            Some("object") => {
                let properties = self.properties.ok_or("properties")?;
                Ok(SchemaObject::Object {
                    properties,
                    required: self.required,
                    additional_properties: self.additional_properties,
                    xml: self.xml,
                })
            }
            Some(tag) => Ok(SchemaObject::Primitive(PrimitiveKind::from_tag(tag))),
            None => {
                // Fixed tie-break when several composite keys appear:
                // oneOf, then allOf, then anyOf. The format treats them as
                // mutually exclusive; the priority only settles malformed
                // input deterministically.
                let composite = [
                    (CompositeKind::OneOf, self.one_of),
                    (CompositeKind::AllOf, self.all_of),
                    (CompositeKind::AnyOf, self.any_of),
                ]
                .into_iter()
                .find_map(|(kind, members)| members.map(|m| (kind, m)));

                match composite {
                    Some((kind, members)) => Ok(SchemaObject::Composite {
                        kind,
                        members,
                        discriminator: self.discriminator,
                    }),
                    None => Ok(SchemaObject::Any),
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for SchemaObject {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawSchema::deserialize(deserializer)?;
        raw.into_schema().map_err(de::Error::missing_field)
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(src: serde_json::Value) -> SchemaObject {
        serde_json::from_value(src).unwrap()
    }

    fn roundtrip(s: &SchemaObject) -> SchemaObject {
        let src = serde_json::to_string(s).unwrap();
        serde_json::from_str(&src).unwrap()
    }

    #[test]
    fn empty_object_decodes_as_any() {
        assert_eq!(decode(json!({})), SchemaObject::Any);
        assert_eq!(serde_json::to_value(SchemaObject::Any).unwrap(), json!({}));
    }

    #[test]
    fn array_decode_requires_items() {
        let s = decode(json!({ "type": "array", "items": { "type": "string" } }));
        assert_eq!(s, SchemaObject::array(SchemaObject::string().into()));

        // re-encode reproduces the same wire object
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({ "type": "array", "items": { "type": "string" } })
        );

        let err = serde_json::from_value::<SchemaObject>(json!({ "type": "array" }))
            .unwrap_err()
            .to_string();
        assert!(err.contains("items"), "error names the missing field: {err}");
    }

    #[test]
    fn object_decode_requires_properties() {
        let err = serde_json::from_value::<SchemaObject>(json!({ "type": "object" }))
            .unwrap_err()
            .to_string();
        assert!(err.contains("properties"), "error names the missing field: {err}");
    }

    #[test]
    fn one_of_decodes_as_composite() {
        let s = decode(json!({ "oneOf": [{ "type": "string" }, { "type": "integer" }] }));
        assert_eq!(
            s,
            SchemaObject::Composite {
                kind: CompositeKind::OneOf,
                members: vec![SchemaObject::string().into(), SchemaObject::integer().into()],
                discriminator: None,
            }
        );
    }

    #[test]
    fn type_takes_precedence_over_composite_keys() {
        let s = decode(json!({
            "type": "string",
            "oneOf": [{ "type": "integer" }]
        }));
        assert_eq!(s, SchemaObject::string());
    }

    #[test]
    fn composite_tie_break_is_one_of_first() {
        // malformed input with two composite keys: decode picks oneOf
        let s = decode(json!({
            "anyOf": [{ "type": "boolean" }],
            "oneOf": [{ "type": "string" }]
        }));
        match s {
            SchemaObject::Composite { kind, .. } => assert_eq!(kind, CompositeKind::OneOf),
            other => panic!("expected composite, got {other:?}"),
        }
    }

    #[test]
    fn unknown_type_tag_defaults_to_string() {
        assert_eq!(decode(json!({ "type": "uuid" })), SchemaObject::string());
        assert_eq!(decode(json!({ "type": "null" })), SchemaObject::string());
    }

    #[test]
    fn discriminator_is_written_under_its_own_key() {
        // KNOWN INCOMPATIBILITY with legacy emitters of this format, which
        // wrote the discriminator value into the `type` key (and thereby
        // produced a node that decoded as a primitive). Documents written by
        // those emitters lose their discriminator on decode here.
        let s = SchemaObject::Composite {
            kind: CompositeKind::OneOf,
            members: vec![SchemaObject::string().into()],
            discriminator: Some("kind".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({ "oneOf": [{ "type": "string" }], "discriminator": "kind" })
        );
        assert_eq!(roundtrip(&s), s);
    }

    #[test]
    fn object_roundtrip_with_all_optional_parts() {
        let mut required = IndexSet::new();
        required.insert("name".to_string());

        let s = SchemaObject::Object {
            properties: [
                ("name".to_string(), SchemaObject::string().into()),
                ("tags".to_string(), SchemaObject::array(SchemaObject::string().into()).into()),
                ("link".to_string(), ReferenceOr::reference("Link")),
            ]
            .into_iter()
            .collect(),
            required: Some(required),
            additional_properties: Some(Box::new(SchemaObject::integer().into())),
            xml: Some(Xml { name: Some("thing".to_string()), ..Xml::default() }),
        };
        assert_eq!(roundtrip(&s), s);
    }

    #[test]
    fn primitive_roundtrips() {
        for kind in [
            PrimitiveKind::String,
            PrimitiveKind::Number,
            PrimitiveKind::Integer,
            PrimitiveKind::Boolean,
        ] {
            let s = SchemaObject::Primitive(kind);
            assert_eq!(roundtrip(&s), s);
        }
    }

    #[test]
    fn referenceable_excludes_any() {
        assert!(!SchemaObject::Any.is_referenceable());
        assert!(SchemaObject::string().is_referenceable());
        assert!(SchemaObject::object([]).is_referenceable());
        assert!(SchemaObject::array(SchemaObject::Any.into()).is_referenceable());
    }
}

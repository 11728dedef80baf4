//! Reflective synthesizers.
//!
//! Both synthesizers drive a value's own `Serialize` impl against a fake
//! serializer that records the *shape* of the calls instead of emitting
//! bytes. The schema probe reconstructs a `SchemaObject` from that shape;
//! the value probe keeps the data and yields an `AnyValue` snapshot.
//!
//! Only structure affects the schema result: field names, container kinds,
//! nested value types. Field values never do, with one caveat — sequences
//! take their item schema from the first element, and keyed maps take their
//! property set from the keys the value actually wrote.

use indexmap::IndexMap;
use serde::ser::{
    Impossible, Serialize, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant,
    SerializeTuple, SerializeTupleStruct, SerializeTupleVariant, Serializer,
};

use crate::error::SynthError;
use crate::reference::{Reference, ReferenceOr};
use crate::schema::{SchemaObject, SchemaRef};
use crate::value::AnyValue;

// ------------------------------- Front API -------------------------------- //

/// Derives schemas from arbitrary `Serialize` values, collecting named
/// component schemas as it goes.
///
/// The component table is plain last-write-wins: re-synthesizing a type
/// already present overwrites its entry, and two distinct types that share
/// a name collide destructively. Callers own the table for the duration of
/// document construction and merge it into the final components section.
pub struct SchemaSynthesizer {
    /// When off, nominal types are inlined and the table stays empty.
    pub extract_references: bool,
    pub components: IndexMap<String, SchemaObject>,
}

impl SchemaSynthesizer {
    /// Reference extraction on (the default).
    pub fn new() -> Self {
        Self { extract_references: true, components: IndexMap::new() }
    }

    /// Inline everything; never touch the component table.
    pub fn inline_only() -> Self {
        Self { extract_references: false, components: IndexMap::new() }
    }

    /// Synthesize the schema describing `value`'s shape. Named struct types
    /// land in the component table and come back as `$ref`s (unless
    /// extraction is off).
    pub fn synthesize<T>(&mut self, value: &T) -> Result<SchemaRef, SynthError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(SchemaProbe { synth: self })
    }

    /// Hand the accumulated name→schema table to the document builder.
    pub fn into_components(self) -> IndexMap<String, SchemaObject> {
        self.components
    }
}

impl Default for SchemaSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot fully-inlined schema for `value`. No component extraction.
pub fn schema_of<T>(value: &T) -> Result<SchemaObject, SynthError>
where
    T: Serialize + ?Sized,
{
    let mut synth = SchemaSynthesizer::inline_only();
    match synth.synthesize(value)? {
        ReferenceOr::Item(schema) => Ok(schema),
        // inline mode never emits references
        ReferenceOr::Ref(r) => Err(SynthError::Message(format!(
            "inline synthesis produced a reference to {}",
            r.ref_path
        ))),
    }
}

/// Snapshot `value` as an `AnyValue`, driving the same mechanism but keeping
/// the data instead of the shape.
pub fn value_of<T>(value: &T) -> Result<AnyValue, SynthError>
where
    T: Serialize + ?Sized,
{
    value.serialize(ValueProbe)
}

// ------------------------------ Schema probe ------------------------------ //

/// Shape-capturing serializer. `Ok` is the reconstructed node (possibly a
/// `$ref` when a nominal type was extracted).
struct SchemaProbe<'a> {
    synth: &'a mut SchemaSynthesizer,
}

fn inline(schema: SchemaObject) -> Result<SchemaRef, SynthError> {
    Ok(ReferenceOr::Item(schema))
}

impl<'a> Serializer for SchemaProbe<'a> {
    type Ok = SchemaRef;
    type Error = SynthError;

    type SerializeSeq = SeqProbe<'a>;
    type SerializeTuple = SeqProbe<'a>;
    type SerializeTupleStruct = SeqProbe<'a>;
    type SerializeTupleVariant = SeqProbe<'a>;
    type SerializeMap = KeyedProbe<'a>;
    type SerializeStruct = KeyedProbe<'a>;
    type SerializeStructVariant = KeyedProbe<'a>;

    fn serialize_bool(self, _: bool) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::boolean())
    }

    fn serialize_i8(self, _: i8) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::integer())
    }
    fn serialize_i16(self, _: i16) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::integer())
    }
    fn serialize_i32(self, _: i32) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::integer())
    }
    fn serialize_i64(self, _: i64) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::integer())
    }
    fn serialize_i128(self, _: i128) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::integer())
    }
    fn serialize_u8(self, _: u8) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::integer())
    }
    fn serialize_u16(self, _: u16) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::integer())
    }
    fn serialize_u32(self, _: u32) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::integer())
    }
    fn serialize_u64(self, _: u64) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::integer())
    }
    fn serialize_u128(self, _: u128) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::integer())
    }

    fn serialize_f32(self, _: f32) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::number())
    }
    fn serialize_f64(self, _: f64) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::number())
    }

    fn serialize_char(self, _: char) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::string())
    }
    fn serialize_str(self, _: &str) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::string())
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<SchemaRef, SynthError> {
        // binary payloads travel as strings on this wire
        inline(SchemaObject::string())
    }

    fn serialize_none(self) -> Result<SchemaRef, SynthError> {
        // a field that never occurs stays absent; keyed probes drop `Any`
        inline(SchemaObject::Any)
    }

    fn serialize_some<T>(self, value: &T) -> Result<SchemaRef, SynthError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(SchemaProbe { synth: self.synth })
    }

    fn serialize_unit(self) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::Any)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::Any)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Result<SchemaRef, SynthError> {
        inline(SchemaObject::string())
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<SchemaRef, SynthError>
    where
        T: Serialize + ?Sized,
    {
        // transparent wrapper
        value.serialize(SchemaProbe { synth: self.synth })
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<SchemaRef, SynthError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(SchemaProbe { synth: self.synth })
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<SeqProbe<'a>, SynthError> {
        Ok(SeqProbe { synth: self.synth, items: None })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqProbe<'a>, SynthError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqProbe<'a>, SynthError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<SeqProbe<'a>, SynthError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<KeyedProbe<'a>, SynthError> {
        Ok(KeyedProbe {
            synth: self.synth,
            name: None,
            properties: IndexMap::new(),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<KeyedProbe<'a>, SynthError> {
        Ok(KeyedProbe {
            synth: self.synth,
            name: Some(name),
            properties: IndexMap::new(),
            pending_key: None,
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<KeyedProbe<'a>, SynthError> {
        // variant shapes are value-dependent; keep them inline
        Ok(KeyedProbe {
            synth: self.synth,
            name: None,
            properties: IndexMap::new(),
            pending_key: None,
        })
    }

    fn is_human_readable(&self) -> bool {
        true
    }
}

/// Sequence shapes take their item schema from the first element.
struct SeqProbe<'a> {
    synth: &'a mut SchemaSynthesizer,
    items: Option<SchemaRef>,
}

impl SeqProbe<'_> {
    fn element<T>(&mut self, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        if self.items.is_none() {
            self.items = Some(value.serialize(SchemaProbe { synth: &mut *self.synth })?);
        }
        Ok(())
    }

    fn finish(self) -> Result<SchemaRef, SynthError> {
        // empty sequence: nothing to probe, items degrade to the
        // unconstrained placeholder
        let items = self.items.unwrap_or(ReferenceOr::Item(SchemaObject::Any));
        inline(SchemaObject::Array { items: Box::new(items) })
    }
}

impl SerializeSeq for SeqProbe<'_> {
    type Ok = SchemaRef;
    type Error = SynthError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        self.element(value)
    }

    fn end(self) -> Result<SchemaRef, SynthError> {
        self.finish()
    }
}

impl SerializeTuple for SeqProbe<'_> {
    type Ok = SchemaRef;
    type Error = SynthError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        self.element(value)
    }

    fn end(self) -> Result<SchemaRef, SynthError> {
        self.finish()
    }
}

impl SerializeTupleStruct for SeqProbe<'_> {
    type Ok = SchemaRef;
    type Error = SynthError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        self.element(value)
    }

    fn end(self) -> Result<SchemaRef, SynthError> {
        self.finish()
    }
}

impl SerializeTupleVariant for SeqProbe<'_> {
    type Ok = SchemaRef;
    type Error = SynthError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        self.element(value)
    }

    fn end(self) -> Result<SchemaRef, SynthError> {
        self.finish()
    }
}

/// Keyed shapes (structs, string-keyed maps) become object schemas. A
/// `name` marks a nominal type eligible for component extraction.
struct KeyedProbe<'a> {
    synth: &'a mut SchemaSynthesizer,
    name: Option<&'static str>,
    properties: IndexMap<String, SchemaRef>,
    pending_key: Option<String>,
}

impl KeyedProbe<'_> {
    fn property<T>(&mut self, key: String, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        let shape = value.serialize(SchemaProbe { synth: &mut *self.synth })?;
        // absent optionals stay absent: `None` probes to the unconstrained
        // schema, which is not a field
        if !matches!(shape, ReferenceOr::Item(SchemaObject::Any)) {
            self.properties.insert(key, shape);
        }
        Ok(())
    }

    fn finish(self) -> Result<SchemaRef, SynthError> {
        let schema = SchemaObject::Object {
            properties: self.properties,
            required: None,
            additional_properties: None,
            xml: None,
        };
        match self.name {
            Some(name) if self.synth.extract_references && schema.is_referenceable() => {
                // last write wins on name collision
                self.synth.components.insert(name.to_string(), schema);
                Ok(ReferenceOr::Ref(Reference::schema(name)))
            }
            _ => inline(schema),
        }
    }
}

impl SerializeMap for KeyedProbe<'_> {
    type Ok = SchemaRef;
    type Error = SynthError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        self.pending_key = Some(key.serialize(KeyCapture)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| SynthError::Message("serialize_value before serialize_key".into()))?;
        self.property(key, value)
    }

    fn end(self) -> Result<SchemaRef, SynthError> {
        self.finish()
    }
}

impl SerializeStruct for KeyedProbe<'_> {
    type Ok = SchemaRef;
    type Error = SynthError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        self.property(key.to_string(), value)
    }

    fn end(self) -> Result<SchemaRef, SynthError> {
        self.finish()
    }
}

impl SerializeStructVariant for KeyedProbe<'_> {
    type Ok = SchemaRef;
    type Error = SynthError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        self.property(key.to_string(), value)
    }

    fn end(self) -> Result<SchemaRef, SynthError> {
        self.finish()
    }
}

// ------------------------------- Key capture ------------------------------ //

/// Serializer that accepts only string-ish keys and yields the key text.
struct KeyCapture;

impl Serializer for KeyCapture {
    type Ok = String;
    type Error = SynthError;

    type SerializeSeq = Impossible<String, SynthError>;
    type SerializeTuple = Impossible<String, SynthError>;
    type SerializeTupleStruct = Impossible<String, SynthError>;
    type SerializeTupleVariant = Impossible<String, SynthError>;
    type SerializeMap = Impossible<String, SynthError>;
    type SerializeStruct = Impossible<String, SynthError>;
    type SerializeStructVariant = Impossible<String, SynthError>;

    fn serialize_str(self, s: &str) -> Result<String, SynthError> {
        Ok(s.to_string())
    }

    fn serialize_char(self, c: char) -> Result<String, SynthError> {
        Ok(c.to_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<String, SynthError> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String, SynthError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(KeyCapture)
    }

    fn serialize_bool(self, _: bool) -> Result<String, SynthError> {
        Err(SynthError::NonStringKey("bool"))
    }
    fn serialize_i8(self, _: i8) -> Result<String, SynthError> {
        Err(SynthError::NonStringKey("integer"))
    }
    fn serialize_i16(self, _: i16) -> Result<String, SynthError> {
        Err(SynthError::NonStringKey("integer"))
    }
    fn serialize_i32(self, _: i32) -> Result<String, SynthError> {
        Err(SynthError::NonStringKey("integer"))
    }
    fn serialize_i64(self, _: i64) -> Result<String, SynthError> {
        Err(SynthError::NonStringKey("integer"))
    }
    fn serialize_u8(self, _: u8) -> Result<String, SynthError> {
        Err(SynthError::NonStringKey("integer"))
    }
    fn serialize_u16(self, _: u16) -> Result<String, SynthError> {
        Err(SynthError::NonStringKey("integer"))
    }
    fn serialize_u32(self, _: u32) -> Result<String, SynthError> {
        Err(SynthError::NonStringKey("integer"))
    }
    fn serialize_u64(self, _: u64) -> Result<String, SynthError> {
        Err(SynthError::NonStringKey("integer"))
    }
    fn serialize_f32(self, _: f32) -> Result<String, SynthError> {
        Err(SynthError::NonStringKey("number"))
    }
    fn serialize_f64(self, _: f64) -> Result<String, SynthError> {
        Err(SynthError::NonStringKey("number"))
    }
    fn serialize_bytes(self, _: &[u8]) -> Result<String, SynthError> {
        Err(SynthError::NonStringKey("bytes"))
    }
    fn serialize_none(self) -> Result<String, SynthError> {
        Err(SynthError::NonStringKey("none"))
    }
    fn serialize_some<T>(self, _: &T) -> Result<String, SynthError>
    where
        T: Serialize + ?Sized,
    {
        Err(SynthError::NonStringKey("option"))
    }
    fn serialize_unit(self) -> Result<String, SynthError> {
        Err(SynthError::NonStringKey("unit"))
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<String, SynthError> {
        Err(SynthError::NonStringKey("unit struct"))
    }
    fn serialize_newtype_variant<T>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<String, SynthError>
    where
        T: Serialize + ?Sized,
    {
        Err(SynthError::NonStringKey("newtype variant"))
    }
    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq, SynthError> {
        Err(SynthError::NonStringKey("sequence"))
    }
    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple, SynthError> {
        Err(SynthError::NonStringKey("tuple"))
    }
    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct, SynthError> {
        Err(SynthError::NonStringKey("tuple struct"))
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, SynthError> {
        Err(SynthError::NonStringKey("tuple variant"))
    }
    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap, SynthError> {
        Err(SynthError::NonStringKey("map"))
    }
    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self::SerializeStruct, SynthError> {
        Err(SynthError::NonStringKey("struct"))
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, SynthError> {
        Err(SynthError::NonStringKey("struct variant"))
    }
}

// ------------------------------- Value probe ------------------------------ //

/// Data-capturing serializer: the shape *is* the value.
struct ValueProbe;

impl Serializer for ValueProbe {
    type Ok = AnyValue;
    type Error = SynthError;

    type SerializeSeq = ValueSeq;
    type SerializeTuple = ValueSeq;
    type SerializeTupleStruct = ValueSeq;
    type SerializeTupleVariant = ValueSeq;
    type SerializeMap = ValueMap;
    type SerializeStruct = ValueMap;
    type SerializeStructVariant = ValueMap;

    fn serialize_bool(self, b: bool) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::Bool(b))
    }

    fn serialize_i8(self, i: i8) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::Int(i.into()))
    }
    fn serialize_i16(self, i: i16) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::Int(i.into()))
    }
    fn serialize_i32(self, i: i32) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::Int(i.into()))
    }
    fn serialize_i64(self, i: i64) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::Int(i))
    }
    fn serialize_i128(self, i: i128) -> Result<AnyValue, SynthError> {
        i64::try_from(i).map(AnyValue::Int).map_err(|_| SynthError::IntegerOutOfRange)
    }
    fn serialize_u8(self, u: u8) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::Int(u.into()))
    }
    fn serialize_u16(self, u: u16) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::Int(u.into()))
    }
    fn serialize_u32(self, u: u32) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::Int(u.into()))
    }
    fn serialize_u64(self, u: u64) -> Result<AnyValue, SynthError> {
        i64::try_from(u).map(AnyValue::Int).map_err(|_| SynthError::IntegerOutOfRange)
    }
    fn serialize_u128(self, u: u128) -> Result<AnyValue, SynthError> {
        i64::try_from(u).map(AnyValue::Int).map_err(|_| SynthError::IntegerOutOfRange)
    }

    fn serialize_f32(self, f: f32) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::Double(f.into()))
    }
    fn serialize_f64(self, f: f64) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::Double(f))
    }

    fn serialize_char(self, c: char) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::String(c.to_string()))
    }
    fn serialize_str(self, s: &str) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::String(s.to_string()))
    }

    fn serialize_bytes(self, bytes: &[u8]) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::Array(bytes.iter().map(|b| AnyValue::Int((*b).into())).collect()))
    }

    fn serialize_none(self) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<AnyValue, SynthError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(ValueProbe)
    }

    fn serialize_unit(self) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<AnyValue, SynthError> {
        Ok(AnyValue::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<AnyValue, SynthError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(ValueProbe)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<AnyValue, SynthError>
    where
        T: Serialize + ?Sized,
    {
        // externally tagged, matching the JSON data format convention
        let inner = value.serialize(ValueProbe)?;
        Ok(AnyValue::object([(variant.to_string(), inner)]))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<ValueSeq, SynthError> {
        Ok(ValueSeq { elements: Vec::with_capacity(len.unwrap_or(0)), variant: None })
    }

    fn serialize_tuple(self, len: usize) -> Result<ValueSeq, SynthError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<ValueSeq, SynthError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<ValueSeq, SynthError> {
        Ok(ValueSeq { elements: Vec::with_capacity(len), variant: Some(variant) })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<ValueMap, SynthError> {
        Ok(ValueMap {
            entries: IndexMap::with_capacity(len.unwrap_or(0)),
            pending_key: None,
            variant: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<ValueMap, SynthError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<ValueMap, SynthError> {
        Ok(ValueMap {
            entries: IndexMap::with_capacity(len),
            pending_key: None,
            variant: Some(variant),
        })
    }

    fn is_human_readable(&self) -> bool {
        true
    }
}

struct ValueSeq {
    elements: Vec<AnyValue>,
    variant: Option<&'static str>,
}

impl ValueSeq {
    fn push<T>(&mut self, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        self.elements.push(value.serialize(ValueProbe)?);
        Ok(())
    }

    fn finish(self) -> Result<AnyValue, SynthError> {
        let array = AnyValue::Array(self.elements);
        Ok(match self.variant {
            Some(variant) => AnyValue::object([(variant.to_string(), array)]),
            None => array,
        })
    }
}

impl SerializeSeq for ValueSeq {
    type Ok = AnyValue;
    type Error = SynthError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<AnyValue, SynthError> {
        self.finish()
    }
}

impl SerializeTuple for ValueSeq {
    type Ok = AnyValue;
    type Error = SynthError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<AnyValue, SynthError> {
        self.finish()
    }
}

impl SerializeTupleStruct for ValueSeq {
    type Ok = AnyValue;
    type Error = SynthError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<AnyValue, SynthError> {
        self.finish()
    }
}

impl SerializeTupleVariant for ValueSeq {
    type Ok = AnyValue;
    type Error = SynthError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<AnyValue, SynthError> {
        self.finish()
    }
}

struct ValueMap {
    entries: IndexMap<String, AnyValue>,
    pending_key: Option<String>,
    variant: Option<&'static str>,
}

impl ValueMap {
    fn finish(self) -> Result<AnyValue, SynthError> {
        let object = AnyValue::Object(self.entries);
        Ok(match self.variant {
            Some(variant) => AnyValue::object([(variant.to_string(), object)]),
            None => object,
        })
    }
}

impl SerializeMap for ValueMap {
    type Ok = AnyValue;
    type Error = SynthError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        self.pending_key = Some(key.serialize(KeyCapture)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| SynthError::Message("serialize_value before serialize_key".into()))?;
        self.entries.insert(key, value.serialize(ValueProbe)?);
        Ok(())
    }

    fn end(self) -> Result<AnyValue, SynthError> {
        self.finish()
    }
}

impl SerializeStruct for ValueMap {
    type Ok = AnyValue;
    type Error = SynthError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        self.entries.insert(key.to_string(), value.serialize(ValueProbe)?);
        Ok(())
    }

    fn end(self) -> Result<AnyValue, SynthError> {
        self.finish()
    }
}

impl SerializeStructVariant for ValueMap {
    type Ok = AnyValue;
    type Error = SynthError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), SynthError>
    where
        T: Serialize + ?Sized,
    {
        self.entries.insert(key.to_string(), value.serialize(ValueProbe)?);
        Ok(())
    }

    fn end(self) -> Result<AnyValue, SynthError> {
        self.finish()
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PrimitiveKind;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Person {
        name: String,
        age: i32,
    }

    fn person() -> Person {
        Person { name: "ada".to_string(), age: 36 }
    }

    #[test]
    fn inline_struct_yields_bare_object_schema() {
        let schema = schema_of(&person()).unwrap();
        assert_eq!(
            schema,
            SchemaObject::object([
                ("name".to_string(), SchemaObject::string().into()),
                ("age".to_string(), SchemaObject::integer().into()),
            ])
        );
    }

    #[test]
    fn inline_mode_leaves_component_table_empty() {
        let mut synth = SchemaSynthesizer::inline_only();
        let shape = synth.synthesize(&person()).unwrap();
        assert!(synth.components.is_empty());
        assert!(shape.as_item().is_some(), "no references in inline mode");
    }

    #[test]
    fn shape_does_not_depend_on_field_values() {
        let a = schema_of(&Person { name: String::new(), age: 0 }).unwrap();
        let b = schema_of(&Person { name: "x".repeat(100), age: -7 }).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn named_type_is_extracted_and_referenced() {
        let mut synth = SchemaSynthesizer::new();
        let shape = synth.synthesize(&person()).unwrap();
        assert_eq!(shape.as_ref_path(), Some("#/components/schemas/Person"));
        assert_eq!(synth.components.len(), 1);
        assert!(synth.components.contains_key("Person"));
    }

    #[test]
    fn repeated_nominal_type_is_registered_once() {
        #[derive(Serialize)]
        struct Pair {
            left: Person,
            right: Person,
        }

        let mut synth = SchemaSynthesizer::new();
        let shape = synth
            .synthesize(&Pair { left: person(), right: person() })
            .unwrap();

        // exactly one component for Person, plus the outer Pair
        assert_eq!(synth.components.len(), 2);
        assert_eq!(shape.as_ref_path(), Some("#/components/schemas/Pair"));

        let pair = &synth.components["Pair"];
        let SchemaObject::Object { properties, .. } = pair else {
            panic!("expected object schema, got {pair:?}");
        };
        assert_eq!(properties["left"].as_ref_path(), Some("#/components/schemas/Person"));
        assert_eq!(properties["right"].as_ref_path(), Some("#/components/schemas/Person"));
    }

    #[test]
    fn resynthesis_overwrites_table_entry() {
        // two values of "the same" name collide last-write-wins
        mod a {
            #[derive(serde::Serialize)]
            pub struct Thing {
                pub id: i64,
            }
        }
        mod b {
            #[derive(serde::Serialize)]
            pub struct Thing {
                pub label: String,
            }
        }

        let mut synth = SchemaSynthesizer::new();
        synth.synthesize(&a::Thing { id: 1 }).unwrap();
        synth.synthesize(&b::Thing { label: "x".to_string() }).unwrap();

        assert_eq!(synth.components.len(), 1);
        let SchemaObject::Object { properties, .. } = &synth.components["Thing"] else {
            panic!("expected object schema");
        };
        assert!(properties.contains_key("label"), "later synthesis wins");
        assert!(!properties.contains_key("id"));
    }

    #[test]
    fn sequences_take_item_schema_from_first_element() {
        let schema = schema_of(&vec![1i64, 2, 3]).unwrap();
        assert_eq!(schema, SchemaObject::array(SchemaObject::integer().into()));
    }

    #[test]
    fn empty_sequence_degrades_to_any_items() {
        let schema = schema_of(&Vec::<String>::new()).unwrap();
        assert_eq!(schema, SchemaObject::array(SchemaObject::Any.into()));
    }

    #[test]
    fn absent_optional_fields_are_omitted() {
        #[derive(Serialize)]
        struct WithOptional {
            always: bool,
            sometimes: Option<i64>,
        }

        let schema = schema_of(&WithOptional { always: true, sometimes: None }).unwrap();
        assert_eq!(
            schema,
            SchemaObject::object([("always".to_string(), SchemaObject::boolean().into())])
        );

        let schema = schema_of(&WithOptional { always: true, sometimes: Some(1) }).unwrap();
        assert_eq!(
            schema,
            SchemaObject::object([
                ("always".to_string(), SchemaObject::boolean().into()),
                ("sometimes".to_string(), SchemaObject::integer().into()),
            ])
        );
    }

    #[test]
    fn string_keyed_maps_become_object_properties() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1i64);
        map.insert("b".to_string(), 2i64);
        let schema = schema_of(&map).unwrap();
        assert_eq!(
            schema,
            SchemaObject::object([
                ("a".to_string(), SchemaObject::integer().into()),
                ("b".to_string(), SchemaObject::integer().into()),
            ])
        );
    }

    #[test]
    fn non_string_map_keys_fail_synthesis() {
        let mut map = BTreeMap::new();
        map.insert(1i64, "x");
        let err = schema_of(&map).unwrap_err();
        assert!(matches!(err, SynthError::NonStringKey("integer")));
    }

    #[test]
    fn unit_variants_probe_as_strings() {
        #[derive(Serialize)]
        enum Mode {
            On,
        }
        let schema = schema_of(&Mode::On).unwrap();
        assert_eq!(schema, SchemaObject::Primitive(PrimitiveKind::String));
    }

    #[test]
    fn failing_serialize_propagates_unchanged() {
        struct Broken;
        impl Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("boom"))
            }
        }

        let err = schema_of(&Broken).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn value_probe_snapshots_data() {
        #[derive(Serialize)]
        struct Sample {
            name: &'static str,
            count: u32,
            ratio: f64,
            tags: Vec<&'static str>,
            missing: Option<bool>,
        }

        let v = value_of(&Sample {
            name: "acme",
            count: 3,
            ratio: 0.5,
            tags: vec!["a", "b"],
            missing: None,
        })
        .unwrap();

        assert_eq!(v.get("name"), Some(&AnyValue::from("acme")));
        assert_eq!(v.get("count"), Some(&AnyValue::Int(3)));
        assert_eq!(v.get("ratio"), Some(&AnyValue::Double(0.5)));
        assert_eq!(
            v.get("tags"),
            Some(&AnyValue::array([AnyValue::from("a"), AnyValue::from("b")]))
        );
        assert_eq!(v.get("missing"), Some(&AnyValue::Null));
    }

    #[test]
    fn value_probe_matches_json_data_model_for_enums() {
        #[derive(Serialize)]
        enum Shape {
            Unit,
            Newtype(i64),
            Tuple(i64, i64),
            Struct { x: i64 },
        }

        assert_eq!(value_of(&Shape::Unit).unwrap(), AnyValue::from("Unit"));
        assert_eq!(
            value_of(&Shape::Newtype(1)).unwrap(),
            AnyValue::object([("Newtype".to_string(), AnyValue::Int(1))])
        );
        assert_eq!(
            value_of(&Shape::Tuple(1, 2)).unwrap(),
            AnyValue::object([(
                "Tuple".to_string(),
                AnyValue::array([AnyValue::Int(1), AnyValue::Int(2)])
            )])
        );
        assert_eq!(
            value_of(&Shape::Struct { x: 1 }).unwrap(),
            AnyValue::object([(
                "Struct".to_string(),
                AnyValue::object([("x".to_string(), AnyValue::Int(1))])
            )])
        );
    }

    #[test]
    fn value_probe_rejects_out_of_range_integers() {
        let err = value_of(&u64::MAX).unwrap_err();
        assert!(matches!(err, SynthError::IntegerOutOfRange));
    }
}

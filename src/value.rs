//! Checked conversion of caller records into metadata values
//!
//! `serde_json` quietly writes `null` for `NaN` and infinities, and a
//! self-referencing record recurses until the stack runs out. Neither is
//! acceptable for structured data handed to crawlers, so records are first
//! walked by [`ValueSerializer`], which builds a [`MetadataValue`] and fails
//! with a [`SerializeError`] instead.

use crate::error::SerializeError;
use serde::ser::{self, Impossible, Serialize};
use serde_json::{Map, Number, Value};

/// Generic metadata value: null, boolean, number, string, ordered list, or
/// ordered map from string to value.
///
/// This is `serde_json::Value` built with `preserve_order`, so object keys
/// keep the order the caller inserted them in. Numbers held here are always
/// finite.
pub type MetadataValue = Value;

/// Default nesting limit, matching serde_json's parser recursion limit
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Convert any serializable record into a [`MetadataValue`] using the
/// default nesting limit.
pub fn to_metadata_value<T>(record: &T) -> Result<MetadataValue, SerializeError>
where
    T: Serialize + ?Sized,
{
    to_metadata_value_with_depth(record, DEFAULT_MAX_DEPTH)
}

/// Convert a record, failing once nesting goes deeper than `max_depth`.
pub fn to_metadata_value_with_depth<T>(
    record: &T,
    max_depth: usize,
) -> Result<MetadataValue, SerializeError>
where
    T: Serialize + ?Sized,
{
    record.serialize(ValueSerializer::new(max_depth))
}

/// Serializer producing a [`MetadataValue`] with finiteness, key and
/// depth checks.
#[derive(Debug, Clone, Copy)]
pub struct ValueSerializer {
    depth: usize,
    max_depth: usize,
}

impl ValueSerializer {
    /// Create a serializer at the root of a record
    pub fn new(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
        }
    }

    /// Serializer for one level further down
    fn nested(self) -> Result<Self, SerializeError> {
        if self.depth >= self.max_depth {
            return Err(SerializeError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }
        Ok(Self {
            depth: self.depth + 1,
            max_depth: self.max_depth,
        })
    }
}

fn single_entry(key: &str, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_owned(), value);
    Value::Object(map)
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = SerializeError;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = TupleVariantBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = StructVariantBuilder;

    fn serialize_bool(self, v: bool) -> Result<Value, SerializeError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, SerializeError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, SerializeError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, SerializeError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, SerializeError> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, SerializeError> {
        if let Ok(n) = i64::try_from(v) {
            Ok(Value::Number(n.into()))
        } else if let Ok(n) = u64::try_from(v) {
            Ok(Value::Number(n.into()))
        } else {
            Err(SerializeError::NumberOutOfRange)
        }
    }

    fn serialize_u8(self, v: u8) -> Result<Value, SerializeError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, SerializeError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, SerializeError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, SerializeError> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, SerializeError> {
        u64::try_from(v)
            .map(|n| Value::Number(n.into()))
            .map_err(|_| SerializeError::NumberOutOfRange)
    }

    fn serialize_f32(self, v: f32) -> Result<Value, SerializeError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, SerializeError> {
        Number::from_f64(v)
            .map(Value::Number)
            .ok_or(SerializeError::NonFiniteNumber)
    }

    fn serialize_char(self, v: char) -> Result<Value, SerializeError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, SerializeError> {
        Ok(Value::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, SerializeError> {
        Ok(Value::Array(
            v.iter().map(|&b| Value::Number(b.into())).collect(),
        ))
    }

    fn serialize_none(self) -> Result<Value, SerializeError> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value, SerializeError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self.nested()?)
    }

    fn serialize_unit(self) -> Result<Value, SerializeError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, SerializeError> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, SerializeError> {
        Ok(Value::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, SerializeError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self.nested()?)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, SerializeError>
    where
        T: Serialize + ?Sized,
    {
        let inner = value.serialize(self.nested()?)?;
        Ok(single_entry(variant, inner))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, SerializeError> {
        Ok(SeqBuilder {
            items: Vec::with_capacity(len.unwrap_or(0)),
            child: self.nested()?,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, SerializeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, SerializeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<TupleVariantBuilder, SerializeError> {
        Ok(TupleVariantBuilder {
            variant,
            items: Vec::with_capacity(len),
            child: self.nested()?,
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapBuilder, SerializeError> {
        Ok(MapBuilder {
            map: Map::new(),
            next_key: None,
            child: self.nested()?,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<MapBuilder, SerializeError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<StructVariantBuilder, SerializeError> {
        Ok(StructVariantBuilder {
            variant,
            map: Map::new(),
            child: self.nested()?,
        })
    }
}

/// Builder for sequences, tuples and tuple structs
pub struct SeqBuilder {
    items: Vec<Value>,
    child: ValueSerializer,
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), SerializeError>
    where
        T: Serialize + ?Sized,
    {
        self.items.push(value.serialize(self.child)?);
        Ok(())
    }

    fn end(self) -> Result<Value, SerializeError> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), SerializeError>
    where
        T: Serialize + ?Sized,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, SerializeError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), SerializeError>
    where
        T: Serialize + ?Sized,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, SerializeError> {
        ser::SerializeSeq::end(self)
    }
}

/// Builder for `{"Variant": [..]}`
pub struct TupleVariantBuilder {
    variant: &'static str,
    items: Vec<Value>,
    child: ValueSerializer,
}

impl ser::SerializeTupleVariant for TupleVariantBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), SerializeError>
    where
        T: Serialize + ?Sized,
    {
        self.items.push(value.serialize(self.child)?);
        Ok(())
    }

    fn end(self) -> Result<Value, SerializeError> {
        Ok(single_entry(self.variant, Value::Array(self.items)))
    }
}

/// Builder for maps and structs
pub struct MapBuilder {
    map: Map<String, Value>,
    next_key: Option<String>,
    child: ValueSerializer,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), SerializeError>
    where
        T: Serialize + ?Sized,
    {
        self.next_key = Some(key.serialize(MapKeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), SerializeError>
    where
        T: Serialize + ?Sized,
    {
        let key = self.next_key.take().ok_or_else(|| {
            SerializeError::Custom("serialize_value called before serialize_key".to_string())
        })?;
        let value = value.serialize(self.child)?;
        self.map.insert(key, value);
        Ok(())
    }

    fn end(self) -> Result<Value, SerializeError> {
        Ok(Value::Object(self.map))
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), SerializeError>
    where
        T: Serialize + ?Sized,
    {
        let value = value.serialize(self.child)?;
        self.map.insert(key.to_owned(), value);
        Ok(())
    }

    fn end(self) -> Result<Value, SerializeError> {
        Ok(Value::Object(self.map))
    }
}

/// Builder for `{"Variant": {..}}`
pub struct StructVariantBuilder {
    variant: &'static str,
    map: Map<String, Value>,
    child: ValueSerializer,
}

impl ser::SerializeStructVariant for StructVariantBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), SerializeError>
    where
        T: Serialize + ?Sized,
    {
        let value = value.serialize(self.child)?;
        self.map.insert(key.to_owned(), value);
        Ok(())
    }

    fn end(self) -> Result<Value, SerializeError> {
        Ok(single_entry(self.variant, Value::Object(self.map)))
    }
}

/// Map keys must come out as strings. Integers and booleans are
/// stringified the way serde_json does it.
struct MapKeySerializer;

fn key_must_be_string<T>() -> Result<T, SerializeError> {
    Err(SerializeError::KeyMustBeString)
}

impl ser::Serializer for MapKeySerializer {
    type Ok = String;
    type Error = SerializeError;

    type SerializeSeq = Impossible<String, SerializeError>;
    type SerializeTuple = Impossible<String, SerializeError>;
    type SerializeTupleStruct = Impossible<String, SerializeError>;
    type SerializeTupleVariant = Impossible<String, SerializeError>;
    type SerializeMap = Impossible<String, SerializeError>;
    type SerializeStruct = Impossible<String, SerializeError>;
    type SerializeStructVariant = Impossible<String, SerializeError>;

    fn serialize_bool(self, v: bool) -> Result<String, SerializeError> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String, SerializeError> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String, SerializeError> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String, SerializeError> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String, SerializeError> {
        Ok(v.to_string())
    }

    fn serialize_i128(self, v: i128) -> Result<String, SerializeError> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String, SerializeError> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String, SerializeError> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String, SerializeError> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String, SerializeError> {
        Ok(v.to_string())
    }

    fn serialize_u128(self, v: u128) -> Result<String, SerializeError> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, _v: f32) -> Result<String, SerializeError> {
        key_must_be_string()
    }

    fn serialize_f64(self, _v: f64) -> Result<String, SerializeError> {
        key_must_be_string()
    }

    fn serialize_char(self, v: char) -> Result<String, SerializeError> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String, SerializeError> {
        Ok(v.to_owned())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String, SerializeError> {
        key_must_be_string()
    }

    fn serialize_none(self) -> Result<String, SerializeError> {
        key_must_be_string()
    }

    fn serialize_some<T>(self, _value: &T) -> Result<String, SerializeError>
    where
        T: Serialize + ?Sized,
    {
        key_must_be_string()
    }

    fn serialize_unit(self) -> Result<String, SerializeError> {
        key_must_be_string()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String, SerializeError> {
        key_must_be_string()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String, SerializeError> {
        Ok(variant.to_owned())
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String, SerializeError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, SerializeError>
    where
        T: Serialize + ?Sized,
    {
        key_must_be_string()
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, SerializeError> {
        key_must_be_string()
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, SerializeError> {
        key_must_be_string()
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, SerializeError> {
        key_must_be_string()
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, SerializeError> {
        key_must_be_string()
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, SerializeError> {
        key_must_be_string()
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, SerializeError> {
        key_must_be_string()
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, SerializeError> {
        key_must_be_string()
    }
}

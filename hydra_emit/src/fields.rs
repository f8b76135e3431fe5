//! Collects a bean's own serde output as `(name, raw JSON)` entries.
//!
//! Each value is written by `serde_json` itself and kept verbatim, so the
//! fields come out exactly as the bean would serialize on its own.

use std::fmt::Display;

use serde::ser::{self, Impossible, Serialize, Serializer};
use serde_json::Value;
use serde_json::value::RawValue;
use thiserror::Error;

use crate::error::HydraError;
use crate::metadata::BeanType;

pub(crate) type FieldEntries = Vec<(String, Box<RawValue>)>;

#[derive(Debug, Error)]
pub(crate) enum CollectError {
    #[error("bean did not serialize to an object")]
    NotAnObject,

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

impl ser::Error for CollectError {
    fn custom<T: Display>(msg: T) -> Self {
        CollectError::Custom(msg.to_string())
    }
}

impl CollectError {
    pub(crate) fn into_hydra(self, bean: BeanType) -> HydraError {
        match self {
            CollectError::NotAnObject => HydraError::NotAnObject {
                type_name: bean.type_name().to_string(),
            },
            CollectError::Json(e) => HydraError::Serialization(e),
            CollectError::Custom(msg) => HydraError::Serialization(<serde_json::Error as ser::Error>::custom(msg)),
        }
    }
}

/// Field entries of `bean` in output order. Unit and `None` give no entries.
pub(crate) fn collect<T: Serialize + ?Sized>(bean: &T) -> Result<FieldEntries, CollectError> {
    bean.serialize(FieldCollector)
}

fn raw<T: Serialize + ?Sized>(value: &T) -> Result<Box<RawValue>, CollectError> {
    let json = serde_json::to_string(value)?;
    Ok(RawValue::from_string(json)?)
}

struct FieldCollector;

macro_rules! not_an_object {
    ($($method:ident($($arg:ty),*)),* $(,)?) => {
        $(
            fn $method(self, $(_: $arg),*) -> Result<Self::Ok, Self::Error> {
                Err(CollectError::NotAnObject)
            }
        )*
    };
}

impl Serializer for FieldCollector {
    type Ok = FieldEntries;
    type Error = CollectError;
    type SerializeSeq = Impossible<FieldEntries, CollectError>;
    type SerializeTuple = Impossible<FieldEntries, CollectError>;
    type SerializeTupleStruct = Impossible<FieldEntries, CollectError>;
    type SerializeTupleVariant = Impossible<FieldEntries, CollectError>;
    type SerializeMap = EntryCollector;
    type SerializeStruct = EntryCollector;
    type SerializeStructVariant = Impossible<FieldEntries, CollectError>;

    not_an_object! {
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
        serialize_unit_variant(&'static str, u32, &'static str),
    }

    fn serialize_none(self) -> Result<FieldEntries, CollectError> {
        Ok(Vec::new())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<FieldEntries, CollectError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<FieldEntries, CollectError> {
        Ok(Vec::new())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<FieldEntries, CollectError> {
        Ok(Vec::new())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<FieldEntries, CollectError> {
        value.serialize(self)
    }

    // `{"Variant": value}`, as serde_json writes it.
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<FieldEntries, CollectError> {
        Ok(vec![(variant.to_string(), raw(value)?)])
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, CollectError> {
        Err(CollectError::NotAnObject)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, CollectError> {
        Err(CollectError::NotAnObject)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, CollectError> {
        Err(CollectError::NotAnObject)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, CollectError> {
        Err(CollectError::NotAnObject)
    }

    fn serialize_map(self, len: Option<usize>) -> Result<EntryCollector, CollectError> {
        Ok(EntryCollector::with_capacity(len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<EntryCollector, CollectError> {
        Ok(EntryCollector::with_capacity(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, CollectError> {
        Err(CollectError::NotAnObject)
    }
}

/// Keeps duplicate keys, so a flattened bean's `@context` survives next to ours.
struct EntryCollector {
    entries: FieldEntries,
    key: Option<String>,
}

impl EntryCollector {
    fn with_capacity(len: usize) -> Self {
        EntryCollector {
            entries: Vec::with_capacity(len),
            key: None,
        }
    }
}

impl ser::SerializeMap for EntryCollector {
    type Ok = FieldEntries;
    type Error = CollectError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), CollectError> {
        let key = match serde_json::to_value(key)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return Err(CollectError::Custom("map key must be a string".to_string())),
        };
        self.key = Some(key);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CollectError> {
        let key = self
            .key
            .take()
            .ok_or_else(|| CollectError::Custom("map value written before its key".to_string()))?;
        self.entries.push((key, raw(value)?));
        Ok(())
    }

    fn end(self) -> Result<FieldEntries, CollectError> {
        Ok(self.entries)
    }
}

impl ser::SerializeStruct for EntryCollector {
    type Ok = FieldEntries;
    type Error = CollectError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<(), CollectError> {
        self.entries.push((key.to_string(), raw(value)?));
        Ok(())
    }

    fn end(self) -> Result<FieldEntries, CollectError> {
        Ok(self.entries)
    }
}

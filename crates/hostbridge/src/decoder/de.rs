// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! serde glue for the decoder.

use super::{Decoder, Slot};
use crate::descriptor::{Descriptor, ElementIndex, SerialKind};
use crate::error::DecodingError;
use crate::host::{HostRuntime, Value, ValueType};
use crate::polymorphic;
use crate::scalar;
use serde::de::{self, DeserializeSeed, IntoDeserializer, Visitor};

/// Deserializes the value at one slot of the current frame.
pub(crate) struct ValueDeserializer<'a, 'rt, R: HostRuntime + ?Sized> {
    decoder: &'a mut Decoder<'rt, R>,
    slot: Slot,
}

impl<'a, 'rt, R: HostRuntime + ?Sized> ValueDeserializer<'a, 'rt, R> {
    pub(crate) fn new(decoder: &'a mut Decoder<'rt, R>, slot: Slot) -> Self {
        Self { decoder, slot }
    }

    fn integer(&self, expected: &'static str) -> Result<i32, DecodingError> {
        self.decoder.read_integer(&self.slot, expected)
    }

    fn double(&self, expected: &'static str) -> Result<f64, DecodingError> {
        self.decoder.read_double(&self.slot, expected)
    }

    fn seq<'de, V: Visitor<'de>>(self, name: &'static str, visitor: V) -> Result<V::Value, DecodingError> {
        let decoder = self.decoder;
        decoder.begin_structure(&self.slot, &Descriptor::sized(name, SerialKind::List, 0))?;
        let value = visitor.visit_seq(ListAccess {
            decoder: &mut *decoder,
        })?;
        decoder.end_structure()?;
        Ok(value)
    }

    fn map<'de, V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        let decoder = self.decoder;
        decoder.begin_structure(&self.slot, &Descriptor::anonymous(SerialKind::Map))?;
        let value = visitor.visit_map(MapAccess {
            decoder: &mut *decoder,
            index: 0,
        })?;
        decoder.end_structure()?;
        Ok(value)
    }

    fn unit<'de, V: Visitor<'de>>(self, name: &'static str, visitor: V) -> Result<V::Value, DecodingError> {
        let decoder = self.decoder;
        decoder.begin_structure(&self.slot, &Descriptor::sized(name, SerialKind::Unit, 0))?;
        decoder.end_structure()?;
        visitor.visit_unit()
    }
}

impl<'de, 'a, 'rt, R: HostRuntime + ?Sized> de::Deserializer<'de> for ValueDeserializer<'a, 'rt, R> {
    type Error = DecodingError;

    /// Self-describing read, driven by the host value's own type.
    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        match self.decoder.peek(&self.slot)? {
            None | Some(ValueType::Undefined) => visitor.visit_unit(),
            Some(ValueType::Null) => visitor.visit_none(),
            Some(ValueType::Integer) => visitor.visit_i32(self.integer("i32")?),
            Some(ValueType::Double) => visitor.visit_f64(self.double("f64")?),
            Some(ValueType::Boolean) => visitor.visit_bool(self.decoder.read_bool(&self.slot)?),
            Some(ValueType::String) => {
                visitor.visit_string(self.decoder.read_string(&self.slot, "string")?)
            }
            Some(ValueType::Array) => self.seq("", visitor),
            Some(ValueType::Object) => self.map(visitor),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_bool(self.decoder.read_bool(&self.slot)?)
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_i8(self.integer("i8")? as i8)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_i16(self.integer("i16")? as i16)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_i32(self.integer("i32")?)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_i64(self.double("i64")? as i64)
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_u8(self.integer("u8")? as u8)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_u16(self.integer("u16")? as u16)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_u32(self.double("u32")? as u32)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_u64(self.double("u64")? as u64)
    }

    fn deserialize_i128<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, DecodingError> {
        Err(DecodingError::UnexpectedKind("i128".to_string()))
    }

    fn deserialize_u128<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, DecodingError> {
        Err(DecodingError::UnexpectedKind("u128".to_string()))
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_f32(self.double("f32")? as f32)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_f64(self.double("f64")?)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        let code = self.integer("char")?;
        let c = scalar::narrow_char(code).ok_or(DecodingError::InvalidChar(code))?;
        visitor.visit_char(c)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_string(self.decoder.read_string(&self.slot, "string")?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        self.seq("", visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        self.seq("", visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        if self.decoder.decode_not_null_mark(&self.slot)? {
            visitor.visit_some(self)
        } else {
            visitor.visit_none()
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        self.unit("", visitor)
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodingError> {
        self.unit(name, visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodingError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        self.seq("", visitor)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, DecodingError> {
        self.seq("", visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, DecodingError> {
        self.seq(name, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        self.map(visitor)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodingError> {
        let decoder = self.decoder;
        let descriptor = Descriptor::declared(name, SerialKind::Struct, fields);
        decoder.begin_structure(&self.slot, &descriptor)?;
        let value = visitor.visit_map(StructAccess {
            decoder: &mut *decoder,
            fields,
            current: None,
        })?;
        decoder.end_structure()?;
        Ok(value)
    }

    /// Fieldless variants arrive as strings, data-carrying variants as
    /// tagged objects.
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodingError> {
        let descriptor = Descriptor::declared(name, SerialKind::Union, variants);
        match self.decoder.fetch(&self.slot)? {
            Some(Value::String(value)) => {
                if descriptor.element_index(&value).is_none() {
                    return Err(DecodingError::UnknownEnumValue {
                        enum_name: name.to_string(),
                        value,
                    });
                }
                visitor.visit_enum(value.into_deserializer())
            }
            Some(Value::Object(source)) => {
                polymorphic::decode_variant(&*self.decoder, &descriptor, source, visitor)
            }
            None => Err(DecodingError::MissingValue(self.slot.to_string())),
            Some(other) => Err(DecodingError::UnexpectedType {
                expected: "string or object",
                found: other.value_type(),
                at: self.slot.to_string(),
            }),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_unit()
    }
}

/// Struct frame: yields only the declared fields present on the object.
struct StructAccess<'a, 'rt, R: HostRuntime + ?Sized> {
    decoder: &'a mut Decoder<'rt, R>,
    fields: &'static [&'static str],
    current: Option<usize>,
}

impl<'de, 'a, 'rt, R: HostRuntime + ?Sized> de::MapAccess<'de> for StructAccess<'a, 'rt, R> {
    type Error = DecodingError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, DecodingError> {
        loop {
            match self.decoder.decode_element_index()? {
                ElementIndex::Index(index) => {
                    self.current = Some(index);
                    let name: de::value::StrDeserializer<'_, DecodingError> =
                        self.fields[index].into_deserializer();
                    return seed.deserialize(name).map(Some);
                }
                // Absent on the host side; serde applies the default.
                ElementIndex::Unknown => continue,
                ElementIndex::Done => return Ok(None),
            }
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, DecodingError> {
        let index = self
            .current
            .take()
            .ok_or_else(|| DecodingError::Message("value requested before key".to_string()))?;
        let slot = self.decoder.element_slot(index)?;
        seed.deserialize(ValueDeserializer::new(&mut *self.decoder, slot))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.fields.len())
    }
}

struct ListAccess<'a, 'rt, R: HostRuntime + ?Sized> {
    decoder: &'a mut Decoder<'rt, R>,
}

impl<'de, 'a, 'rt, R: HostRuntime + ?Sized> de::SeqAccess<'de> for ListAccess<'a, 'rt, R> {
    type Error = DecodingError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, DecodingError> {
        match self.decoder.decode_element_index()? {
            ElementIndex::Index(index) => {
                let slot = self.decoder.element_slot(index)?;
                seed.deserialize(ValueDeserializer::new(&mut *self.decoder, slot))
                    .map(Some)
            }
            ElementIndex::Unknown | ElementIndex::Done => Ok(None),
        }
    }
}

/// Map frame: even positions are keys, odd positions their values.
struct MapAccess<'a, 'rt, R: HostRuntime + ?Sized> {
    decoder: &'a mut Decoder<'rt, R>,
    index: usize,
}

impl<'de, 'a, 'rt, R: HostRuntime + ?Sized> de::MapAccess<'de> for MapAccess<'a, 'rt, R> {
    type Error = DecodingError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, DecodingError> {
        match self.decoder.decode_element_index()? {
            ElementIndex::Index(index) => {
                self.index = index;
                let key = self.decoder.map_key(index)?;
                seed.deserialize(MapKeyDeserializer { key }).map(Some)
            }
            ElementIndex::Unknown | ElementIndex::Done => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, DecodingError> {
        match self.decoder.decode_element_index()? {
            ElementIndex::Index(index) => {
                self.index = index;
                let slot = self.decoder.element_slot(index)?;
                seed.deserialize(ValueDeserializer::new(&mut *self.decoder, slot))
            }
            ElementIndex::Unknown | ElementIndex::Done => Err(DecodingError::Message(format!(
                "map value missing after entry {}",
                self.index / 2
            ))),
        }
    }
}

/// Re-derives a property name as the declared key type.
struct MapKeyDeserializer {
    key: String,
}

macro_rules! reject_keys {
    ($($method:ident => $name:literal,)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, DecodingError> {
                Err(DecodingError::InvalidKeyType($name))
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for MapKeyDeserializer {
    type Error = DecodingError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_string(self.key)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_string(self.key)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_string(self.key)
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_string(self.key)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodingError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodingError> {
        if !variants.contains(&self.key.as_str()) {
            return Err(DecodingError::UnknownEnumValue {
                enum_name: name.to_string(),
                value: self.key,
            });
        }
        visitor.visit_enum(self.key.into_deserializer())
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodingError> {
        visitor.visit_unit()
    }

    reject_keys! {
        deserialize_bool => "bool",
        deserialize_i8 => "i8",
        deserialize_i16 => "i16",
        deserialize_i32 => "i32",
        deserialize_i64 => "i64",
        deserialize_u8 => "u8",
        deserialize_u16 => "u16",
        deserialize_u32 => "u32",
        deserialize_u64 => "u64",
        deserialize_f32 => "f32",
        deserialize_f64 => "f64",
        deserialize_char => "char",
        deserialize_bytes => "bytes",
        deserialize_byte_buf => "bytes",
        deserialize_option => "option",
        deserialize_unit => "unit",
        deserialize_seq => "sequence",
        deserialize_map => "map",
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, DecodingError> {
        Err(DecodingError::InvalidKeyType("unit struct"))
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value, DecodingError> {
        Err(DecodingError::InvalidKeyType("tuple"))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, DecodingError> {
        Err(DecodingError::InvalidKeyType("tuple struct"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, DecodingError> {
        Err(DecodingError::InvalidKeyType("struct"))
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! serde glue for the encoder.

use super::{Encoder, Slot};
use crate::descriptor::{Descriptor, SerialKind};
use crate::error::EncodingError;
use crate::host::{HostRuntime, Value};
use crate::scalar::Scalar;
use serde::ser::{self, Impossible, Serialize};

/// Serializes one value into the slot resolved by its parent frame.
pub(crate) struct ValueSerializer<'a, 'rt, R: HostRuntime + ?Sized> {
    encoder: &'a mut Encoder<'rt, R>,
    slot: Slot,
}

impl<'a, 'rt, R: HostRuntime + ?Sized> ValueSerializer<'a, 'rt, R> {
    pub(crate) fn new(encoder: &'a mut Encoder<'rt, R>, slot: Slot) -> Self {
        Self { encoder, slot }
    }

    fn scalar(self, scalar: Scalar<'_>) -> Result<(), EncodingError> {
        let kind = scalar.kind().name();
        self.encoder.write(self.slot, scalar.widen(), kind)
    }

    fn structure(self, descriptor: Descriptor) -> Result<Compound<'a, 'rt, R>, EncodingError> {
        self.encoder.begin_structure(self.slot, &descriptor)?;
        Ok(Compound {
            encoder: self.encoder,
        })
    }
}

macro_rules! serialize_scalars {
    ($($method:ident($ty:ty) => $variant:ident,)*) => {
        $(
            fn $method(self, v: $ty) -> Result<(), EncodingError> {
                self.scalar(Scalar::$variant(v))
            }
        )*
    };
}

impl<'a, 'rt, R: HostRuntime + ?Sized> ser::Serializer for ValueSerializer<'a, 'rt, R> {
    type Ok = ();
    type Error = EncodingError;
    type SerializeSeq = Compound<'a, 'rt, R>;
    type SerializeTuple = Compound<'a, 'rt, R>;
    type SerializeTupleStruct = Compound<'a, 'rt, R>;
    type SerializeTupleVariant = Impossible<(), EncodingError>;
    type SerializeMap = Compound<'a, 'rt, R>;
    type SerializeStruct = Compound<'a, 'rt, R>;
    type SerializeStructVariant = Compound<'a, 'rt, R>;

    serialize_scalars! {
        serialize_bool(bool) => Bool,
        serialize_i8(i8) => I8,
        serialize_i16(i16) => I16,
        serialize_i32(i32) => I32,
        serialize_i64(i64) => I64,
        serialize_u8(u8) => U8,
        serialize_u16(u16) => U16,
        serialize_u32(u32) => U32,
        serialize_u64(u64) => U64,
        serialize_f32(f32) => F32,
        serialize_f64(f64) => F64,
        serialize_char(char) => Char,
        serialize_str(&str) => Str,
    }

    fn serialize_i128(self, _v: i128) -> Result<(), EncodingError> {
        Err(EncodingError::UnexpectedKind("i128".to_string()))
    }

    fn serialize_u128(self, _v: u128) -> Result<(), EncodingError> {
        Err(EncodingError::UnexpectedKind("u128".to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<(), EncodingError> {
        let encoder = self.encoder;
        encoder.begin_structure(self.slot, &Descriptor::anonymous(SerialKind::List))?;
        for byte in v {
            let slot = encoder.encode_element_index(None)?;
            encoder.write(slot, Scalar::U8(*byte).widen(), "u8")?;
        }
        encoder.end_structure()
    }

    fn serialize_none(self) -> Result<(), EncodingError> {
        self.encoder.write(self.slot, Value::Null, "null")
    }

    fn serialize_some<T>(self, value: &T) -> Result<(), EncodingError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), EncodingError> {
        self.serialize_unit_struct("")
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<(), EncodingError> {
        let encoder = self.encoder;
        encoder.begin_structure(self.slot, &Descriptor::sized(name, SerialKind::Unit, 0))?;
        encoder.end_structure()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<(), EncodingError> {
        self.encoder
            .write(self.slot, Value::String(variant.to_string()), "enum")
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<(), EncodingError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<(), EncodingError>
    where
        T: Serialize + ?Sized,
    {
        self.encoder.arm_variant(variant)?;
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, EncodingError> {
        self.structure(Descriptor::sized("", SerialKind::List, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, EncodingError> {
        self.structure(Descriptor::sized("", SerialKind::List, len))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, EncodingError> {
        self.structure(Descriptor::sized(name, SerialKind::List, len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, EncodingError> {
        Err(EncodingError::UnexpectedKind(format!(
            "tuple variant {}::{}",
            name, variant
        )))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, EncodingError> {
        self.structure(Descriptor::sized("", SerialKind::Map, len.unwrap_or(0)))
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, EncodingError> {
        self.structure(Descriptor::sized(name, SerialKind::Struct, len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, EncodingError> {
        self.encoder.arm_variant(variant)?;
        self.structure(Descriptor::sized(variant, SerialKind::Struct, len))
    }
}

/// Open structure frame handed back to serde.
pub(crate) struct Compound<'a, 'rt, R: HostRuntime + ?Sized> {
    encoder: &'a mut Encoder<'rt, R>,
}

impl<'a, 'rt, R: HostRuntime + ?Sized> Compound<'a, 'rt, R> {
    fn element<T>(&mut self, field: Option<&'static str>, value: &T) -> Result<(), EncodingError>
    where
        T: Serialize + ?Sized,
    {
        let slot = self.encoder.encode_element_index(field)?;
        value.serialize(ValueSerializer::new(&mut *self.encoder, slot))
    }
}

impl<R: HostRuntime + ?Sized> ser::SerializeSeq for Compound<'_, '_, R> {
    type Ok = ();
    type Error = EncodingError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), EncodingError>
    where
        T: Serialize + ?Sized,
    {
        self.element(None, value)
    }

    fn end(self) -> Result<(), EncodingError> {
        self.encoder.end_structure()
    }
}

impl<R: HostRuntime + ?Sized> ser::SerializeTuple for Compound<'_, '_, R> {
    type Ok = ();
    type Error = EncodingError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), EncodingError>
    where
        T: Serialize + ?Sized,
    {
        self.element(None, value)
    }

    fn end(self) -> Result<(), EncodingError> {
        self.encoder.end_structure()
    }
}

impl<R: HostRuntime + ?Sized> ser::SerializeTupleStruct for Compound<'_, '_, R> {
    type Ok = ();
    type Error = EncodingError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), EncodingError>
    where
        T: Serialize + ?Sized,
    {
        self.element(None, value)
    }

    fn end(self) -> Result<(), EncodingError> {
        self.encoder.end_structure()
    }
}

impl<R: HostRuntime + ?Sized> ser::SerializeMap for Compound<'_, '_, R> {
    type Ok = ();
    type Error = EncodingError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), EncodingError>
    where
        T: Serialize + ?Sized,
    {
        let key = key.serialize(MapKeySerializer)?;
        self.encoder.encode_map_key(key)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), EncodingError>
    where
        T: Serialize + ?Sized,
    {
        self.element(None, value)
    }

    fn end(self) -> Result<(), EncodingError> {
        self.encoder.end_structure()
    }
}

impl<R: HostRuntime + ?Sized> ser::SerializeStruct for Compound<'_, '_, R> {
    type Ok = ();
    type Error = EncodingError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), EncodingError>
    where
        T: Serialize + ?Sized,
    {
        self.element(Some(key), value)
    }

    fn end(self) -> Result<(), EncodingError> {
        self.encoder.end_structure()
    }
}

impl<R: HostRuntime + ?Sized> ser::SerializeStructVariant for Compound<'_, '_, R> {
    type Ok = ();
    type Error = EncodingError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), EncodingError>
    where
        T: Serialize + ?Sized,
    {
        self.element(Some(key), value)
    }

    fn end(self) -> Result<(), EncodingError> {
        self.encoder.end_structure()
    }
}

/// Turns a map key into its property name. Only strings and enum variant
/// names qualify.
struct MapKeySerializer;

macro_rules! reject_keys {
    ($($method:ident($($arg:ty),*) => $name:literal,)*) => {
        $(
            fn $method(self, $(_: $arg),*) -> Result<String, EncodingError> {
                Err(EncodingError::InvalidKeyType($name))
            }
        )*
    };
}

impl ser::Serializer for MapKeySerializer {
    type Ok = String;
    type Error = EncodingError;
    type SerializeSeq = Impossible<String, EncodingError>;
    type SerializeTuple = Impossible<String, EncodingError>;
    type SerializeTupleStruct = Impossible<String, EncodingError>;
    type SerializeTupleVariant = Impossible<String, EncodingError>;
    type SerializeMap = Impossible<String, EncodingError>;
    type SerializeStruct = Impossible<String, EncodingError>;
    type SerializeStructVariant = Impossible<String, EncodingError>;

    fn serialize_str(self, v: &str) -> Result<String, EncodingError> {
        Ok(v.to_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String, EncodingError> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String, EncodingError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    reject_keys! {
        serialize_bool(bool) => "bool",
        serialize_i8(i8) => "i8",
        serialize_i16(i16) => "i16",
        serialize_i32(i32) => "i32",
        serialize_i64(i64) => "i64",
        serialize_i128(i128) => "i128",
        serialize_u8(u8) => "u8",
        serialize_u16(u16) => "u16",
        serialize_u32(u32) => "u32",
        serialize_u64(u64) => "u64",
        serialize_u128(u128) => "u128",
        serialize_f32(f32) => "f32",
        serialize_f64(f64) => "f64",
        serialize_char(char) => "char",
        serialize_bytes(&[u8]) => "bytes",
        serialize_none() => "option",
        serialize_unit() => "unit",
        serialize_unit_struct(&'static str) => "unit struct",
    }

    fn serialize_some<T>(self, _value: &T) -> Result<String, EncodingError>
    where
        T: Serialize + ?Sized,
    {
        Err(EncodingError::InvalidKeyType("option"))
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, EncodingError>
    where
        T: Serialize + ?Sized,
    {
        Err(EncodingError::InvalidKeyType("newtype variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, EncodingError> {
        Err(EncodingError::InvalidKeyType("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, EncodingError> {
        Err(EncodingError::InvalidKeyType("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, EncodingError> {
        Err(EncodingError::InvalidKeyType("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, EncodingError> {
        Err(EncodingError::InvalidKeyType("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, EncodingError> {
        Err(EncodingError::InvalidKeyType("map"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, EncodingError> {
        Err(EncodingError::InvalidKeyType("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, EncodingError> {
        Err(EncodingError::InvalidKeyType("struct variant"))
    }
}

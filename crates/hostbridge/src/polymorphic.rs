// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Polymorphic (tagged union) resolution.
//!
//! A serde enum with newtype or struct variants is a closed union. Its
//! variant table, generated by derive, is the static registry: on the way
//! out the variant's serial name is injected as the class discriminator
//! property, on the way back the discriminator is read and matched against
//! the table.
//!
//! ```text
//! Shape::Circle { radius: 2.0 }   <->   { "type": "Circle", "radius": 2.0 }
//! ```

use crate::decoder::{Decoder, Slot, Source, ValueDeserializer};
use crate::descriptor::{Descriptor, SerialKind};
use crate::error::{DecodingError, EncodingError};
use crate::host::{HostRuntime, Key, Owned, Value};
use serde::de::{self, DeserializeSeed, IntoDeserializer, Visitor};

// ---------------------------------------------------------------------------
// Encode side
// ---------------------------------------------------------------------------

/// Arm the resolver with a variant. Fails if a variant is already pending,
/// which means the payload of a union variant is itself a union.
pub(crate) fn arm(
    pending: &mut Option<&'static str>,
    variant: &'static str,
) -> Result<(), EncodingError> {
    if let Some(outer) = pending.take() {
        return Err(EncodingError::NestedPolymorphic(outer.to_string()));
    }
    *pending = Some(variant);
    Ok(())
}

/// Check that the payload kind of `variant` can carry a discriminator.
pub(crate) fn check_kind(variant: &str, kind: SerialKind) -> Result<(), EncodingError> {
    match kind {
        SerialKind::Struct | SerialKind::Map => Ok(()),
        SerialKind::Union => Err(EncodingError::NestedPolymorphic(variant.to_string())),
        other => Err(EncodingError::InvalidPolymorphicKind {
            variant: variant.to_string(),
            kind: other.name(),
        }),
    }
}

/// Reject a property that would overwrite the discriminator.
pub(crate) fn check_field(
    variant: &str,
    discriminator: &str,
    field: &str,
) -> Result<(), EncodingError> {
    if field == discriminator {
        return Err(EncodingError::DiscriminatorCollision {
            variant: variant.to_string(),
            discriminator: discriminator.to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Decode side
// ---------------------------------------------------------------------------

/// Decode a union value stored as a tagged object.
pub(crate) fn decode_variant<'de, 'rt, R, V>(
    decoder: &Decoder<'rt, R>,
    union: &Descriptor,
    source: Source<'rt, R>,
    visitor: V,
) -> Result<V::Value, DecodingError>
where
    R: HostRuntime + ?Sized,
    V: Visitor<'de>,
{
    let runtime = decoder.runtime();
    let discriminator = decoder.discriminator();
    let type_name = union.serial_name();

    let tag = match runtime.get(source.handle(), &Key::from(discriminator))? {
        Some(Value::String(tag)) => tag,
        other => {
            if let Some(handle) = other.as_ref().and_then(Value::handle) {
                runtime.release(*handle);
            }
            return Err(DecodingError::MissingDiscriminator {
                type_name: type_name.to_string(),
                discriminator: discriminator.to_string(),
            });
        }
    };

    let variant = union
        .element_index(&tag)
        .and_then(|index| union.element_name(index))
        .ok_or_else(|| DecodingError::UnknownVariant {
            type_name: type_name.to_string(),
            tag: tag.clone(),
        })?;
    log::trace!("[polymorphic] {} resolved to variant {}", type_name, variant);

    let copy = filtered_copy(runtime, source.handle(), discriminator)?;
    drop(source);

    let mut inner = Decoder::new(runtime, discriminator, copy.handle());
    let value = visitor.visit_enum(VariantDecoder {
        decoder: &mut inner,
        variant,
    })?;
    Ok(value)
}

/// Shallow copy of `object` without the discriminator property.
///
/// Nested containers are shared with the source object; every handle fetched
/// while copying is released before returning.
fn filtered_copy<'rt, R>(
    runtime: &'rt R,
    object: R::Handle,
    discriminator: &str,
) -> Result<Owned<'rt, R>, DecodingError>
where
    R: HostRuntime + ?Sized,
{
    let copy = Owned::new(runtime, runtime.create_object()?);
    for name in runtime.keys(object)? {
        if name == discriminator {
            continue;
        }
        let key = Key::Name(name);
        let Some(value) = runtime.get(object, &key)? else {
            continue;
        };
        let value = value.map_handle(|handle| Owned::new(runtime, handle));
        runtime.set(
            copy.handle(),
            &key,
            value.as_ref().map_handle(Owned::handle),
        )?;
    }
    Ok(copy)
}

struct VariantDecoder<'a, 'rt, R: HostRuntime + ?Sized> {
    decoder: &'a mut Decoder<'rt, R>,
    variant: &'static str,
}

impl<'de, 'a, 'rt, R> de::EnumAccess<'de> for VariantDecoder<'a, 'rt, R>
where
    R: HostRuntime + ?Sized,
{
    type Error = DecodingError;
    type Variant = Self;

    fn variant_seed<T>(self, seed: T) -> Result<(T::Value, Self), DecodingError>
    where
        T: DeserializeSeed<'de>,
    {
        let name: de::value::StrDeserializer<'_, DecodingError> =
            self.variant.into_deserializer();
        let value = seed.deserialize(name)?;
        Ok((value, self))
    }
}

impl<'de, 'a, 'rt, R> de::VariantAccess<'de> for VariantDecoder<'a, 'rt, R>
where
    R: HostRuntime + ?Sized,
{
    type Error = DecodingError;

    fn unit_variant(self) -> Result<(), DecodingError> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, DecodingError>
    where
        T: DeserializeSeed<'de>,
    {
        seed.deserialize(ValueDeserializer::new(self.decoder, Slot::Root))
    }

    fn tuple_variant<V>(self, _len: usize, _visitor: V) -> Result<V::Value, DecodingError>
    where
        V: Visitor<'de>,
    {
        Err(DecodingError::UnexpectedKind(format!(
            "tuple variant {}",
            self.variant
        )))
    }

    fn struct_variant<V>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodingError>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_struct(
            ValueDeserializer::new(self.decoder, Slot::Root),
            self.variant,
            fields,
            visitor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Heap;

    #[test]
    fn test_arm_rejects_nested() {
        let mut pending = None;
        arm(&mut pending, "Outer").unwrap();
        assert_eq!(pending, Some("Outer"));
        let err = arm(&mut pending, "Inner").unwrap_err();
        assert_eq!(err, EncodingError::NestedPolymorphic("Outer".into()));
    }

    #[test]
    fn test_check_kind() {
        assert!(check_kind("A", SerialKind::Struct).is_ok());
        assert!(check_kind("A", SerialKind::Map).is_ok());
        assert!(matches!(
            check_kind("A", SerialKind::List),
            Err(EncodingError::InvalidPolymorphicKind { kind: "list", .. })
        ));
        assert!(matches!(
            check_kind("A", SerialKind::Enum),
            Err(EncodingError::InvalidPolymorphicKind { kind: "enum", .. })
        ));
    }

    #[test]
    fn test_check_field_collision() {
        assert!(check_field("One", "type", "value").is_ok());
        let err = check_field("One", "type", "type").unwrap_err();
        assert_eq!(
            err.to_string(),
            "variant 'One' has a property named 'type' which conflicts with the class discriminator"
        );
    }

    #[test]
    fn test_filtered_copy_drops_discriminator() {
        let heap = Heap::new();
        let source = heap.create_object().unwrap();
        let nested = heap.create_array().unwrap();
        heap.set(source, &"type".into(), Value::String("One".into()))
            .unwrap();
        heap.set(source, &"value".into(), Value::String("x".into()))
            .unwrap();
        heap.set(source, &"items".into(), Value::Array(nested)).unwrap();
        heap.release(nested);

        let copy = filtered_copy(&heap, source, "type").unwrap();
        assert_eq!(copy.keys().unwrap(), vec!["value", "items"]);
        assert_eq!(heap.reference_count(), 2);
        drop(copy);

        // Original untouched.
        assert_eq!(heap.keys(source).unwrap(), vec!["type", "value", "items"]);
        heap.release(source);
        assert_eq!(heap.reference_count(), 0);
        assert_eq!(heap.stale_releases(), 0);
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host value tree -> typed value.
//!
//! The decoder is a `serde::Deserializer` over an explicit node stack. The
//! caller's root handle is only borrowed; every container fetched below it
//! is owned by the frame that reads it and released when the frame pops.
//!
//! Leniencies, kept on purpose:
//!
//! - a list whose property is absent or not an array decodes as empty
//! - a map whose property is `undefined` decodes as empty
//! - an optional field reads as `None` whether it is absent or `null`

mod de;
mod node;

#[cfg(test)]
mod tests;

pub(crate) use de::ValueDeserializer;
pub(crate) use node::{Slot, Source};

use crate::descriptor::{Descriptor, ElementIndex, SerialKind};
use crate::error::DecodingError;
use crate::host::{HostRuntime, Owned, Value, ValueType};
use crate::scalar;
use node::{InputKind, InputNode};
use serde::de::DeserializeOwned;

/// Single-use decoder for one root value.
pub struct Decoder<'rt, R: HostRuntime + ?Sized> {
    runtime: &'rt R,
    discriminator: String,
    root: R::Handle,
    nodes: Vec<InputNode<'rt, R>>,
}

impl<'rt, R: HostRuntime + ?Sized> Decoder<'rt, R> {
    /// Create a decoder reading from `root`. The root is never released.
    pub fn new(runtime: &'rt R, discriminator: impl Into<String>, root: R::Handle) -> Self {
        Self {
            runtime,
            discriminator: discriminator.into(),
            root,
            nodes: Vec::new(),
        }
    }

    /// Decode the root as `T`.
    ///
    /// On failure every container fetched so far is released before the
    /// error is returned.
    pub fn decode<T: DeserializeOwned>(mut self) -> Result<T, DecodingError> {
        let result = T::deserialize(ValueDeserializer::new(&mut self, Slot::Root));
        if let Err(err) = &result {
            if !self.nodes.is_empty() {
                log::debug!(
                    "[Decoder] failed with {} open frame(s), sources released: {}",
                    self.nodes.len(),
                    err
                );
                self.nodes.clear();
            }
        }
        result
    }

    pub(crate) fn runtime(&self) -> &'rt R {
        self.runtime
    }

    pub(crate) fn discriminator(&self) -> &str {
        &self.discriminator
    }

    fn parent(&self) -> Result<R::Handle, DecodingError> {
        self.nodes
            .last()
            .and_then(InputNode::handle)
            .ok_or_else(|| DecodingError::Message("no open container".to_string()))
    }

    /// Resolve `slot` to a value. Containers come back as sources: the
    /// root borrowed, anything else owned.
    pub(crate) fn fetch(&self, slot: &Slot) -> Result<Option<Value<Source<'rt, R>>>, DecodingError> {
        match slot {
            Slot::Root => Ok(Some(match self.runtime.type_of(self.root)? {
                ValueType::Array => Value::Array(Source::Borrowed(self.root)),
                _ => Value::Object(Source::Borrowed(self.root)),
            })),
            Slot::Key(key) => {
                let runtime = self.runtime;
                let value = runtime.get(self.parent()?, key)?;
                Ok(value.map(|v| v.map_handle(|h| Source::Owned(Owned::new(runtime, h)))))
            }
        }
    }

    /// Type of the value at `slot`; `None` when absent.
    pub(crate) fn peek(&self, slot: &Slot) -> Result<Option<ValueType>, DecodingError> {
        match slot {
            Slot::Root => Ok(Some(self.runtime.type_of(self.root)?)),
            Slot::Key(key) => {
                let parent = self.parent()?;
                if self.runtime.contains(parent, key)? {
                    Ok(Some(self.runtime.get_type(parent, key)?))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Whether an optional value at `slot` is present.
    ///
    /// Absent and `null` both read as not present. A present `undefined`
    /// counts as present.
    pub(crate) fn decode_not_null_mark(&self, slot: &Slot) -> Result<bool, DecodingError> {
        Ok(!matches!(self.peek(slot)?, None | Some(ValueType::Null)))
    }

    fn read_scalar(
        &self,
        slot: &Slot,
        expected: &'static str,
    ) -> Result<Value<Source<'rt, R>>, DecodingError> {
        if *slot == Slot::Root {
            return Err(DecodingError::NotAStructure(expected));
        }
        self.fetch(slot)?
            .ok_or_else(|| DecodingError::MissingValue(slot.to_string()))
    }

    fn unexpected(expected: &'static str, found: &Value<Source<'rt, R>>, slot: &Slot) -> DecodingError {
        DecodingError::UnexpectedType {
            expected,
            found: found.value_type(),
            at: slot.to_string(),
        }
    }

    pub(crate) fn read_integer(&self, slot: &Slot, expected: &'static str) -> Result<i32, DecodingError> {
        let value = self.read_scalar(slot, expected)?;
        scalar::narrow_integer(&value).ok_or_else(|| Self::unexpected(expected, &value, slot))
    }

    pub(crate) fn read_double(&self, slot: &Slot, expected: &'static str) -> Result<f64, DecodingError> {
        let value = self.read_scalar(slot, expected)?;
        scalar::narrow_double(&value).ok_or_else(|| Self::unexpected(expected, &value, slot))
    }

    pub(crate) fn read_bool(&self, slot: &Slot) -> Result<bool, DecodingError> {
        match self.read_scalar(slot, "bool")? {
            Value::Boolean(v) => Ok(v),
            other => Err(Self::unexpected("bool", &other, slot)),
        }
    }

    pub(crate) fn read_string(&self, slot: &Slot, expected: &'static str) -> Result<String, DecodingError> {
        match self.read_scalar(slot, expected)? {
            Value::String(v) => Ok(v),
            other => Err(Self::unexpected(expected, &other, slot)),
        }
    }

    /// Enter a structure: resolve its source through `slot` and push a frame.
    pub(crate) fn begin_structure(
        &mut self,
        slot: &Slot,
        descriptor: &Descriptor,
    ) -> Result<(), DecodingError> {
        let kind = descriptor.kind();
        if *slot == Slot::Root && !kind.is_structure() {
            return Err(DecodingError::NotAStructure(kind.name()));
        }
        let fetched = self.fetch(slot)?;
        let runtime = self.runtime;

        let node = match kind {
            SerialKind::List => {
                let source = match fetched {
                    Some(Value::Array(source)) => source,
                    other => {
                        log::debug!(
                            "[Decoder] {} at {} is {:?}, reading as empty list",
                            descriptor.serial_name(),
                            slot,
                            other.as_ref().map(Value::value_type)
                        );
                        Source::Owned(Owned::new(runtime, runtime.create_array()?))
                    }
                };
                let total = runtime.length(source.handle())?;
                InputNode::new(Some(source), InputKind::List, total)
            }
            SerialKind::Map => {
                let source = match fetched {
                    Some(Value::Object(source)) => source,
                    Some(Value::Undefined) => {
                        log::debug!("[Decoder] map at {} is undefined, reading as empty", slot);
                        Source::Owned(Owned::new(runtime, runtime.create_object()?))
                    }
                    None => return Err(DecodingError::MissingValue(slot.to_string())),
                    Some(other) => return Err(Self::unexpected("object", &other, slot)),
                };
                let keys = runtime.keys(source.handle())?;
                let total = keys.len() * 2;
                InputNode::new(Some(source), InputKind::Map { keys }, total)
            }
            SerialKind::Struct | SerialKind::Union => {
                let source = match fetched {
                    Some(Value::Object(source)) => source,
                    None => return Err(DecodingError::MissingValue(slot.to_string())),
                    Some(other) => return Err(Self::unexpected("object", &other, slot)),
                };
                let total = descriptor.elements_count();
                let descriptor = *descriptor;
                InputNode::new(Some(source), InputKind::Struct { descriptor }, total)
            }
            SerialKind::Unit => {
                match fetched {
                    None | Some(Value::Undefined) | Some(Value::Null) => {}
                    Some(other) => return Err(Self::unexpected("undefined", &other, slot)),
                }
                InputNode::new(None, InputKind::Unit, 0)
            }
            SerialKind::Primitive(_) | SerialKind::Enum => {
                return Err(DecodingError::UnexpectedKind(format!(
                    "{} opened as a structure",
                    kind
                )))
            }
        };

        log::trace!(
            "[Decoder] begin {} '{}' with {} element(s) at depth {}",
            kind,
            descriptor.serial_name(),
            node.total(),
            self.nodes.len()
        );
        self.nodes.push(node);
        Ok(())
    }

    /// Leave the current structure, releasing its source unless borrowed.
    pub(crate) fn end_structure(&mut self) -> Result<(), DecodingError> {
        self.nodes
            .pop()
            .ok_or_else(|| DecodingError::Message("unbalanced end of structure".to_string()))?;
        log::trace!("[Decoder] end at depth {}", self.nodes.len());
        Ok(())
    }

    /// Advance the cursor of the current frame.
    pub(crate) fn decode_element_index(&mut self) -> Result<ElementIndex, DecodingError> {
        let runtime = self.runtime;
        let node = self
            .nodes
            .last_mut()
            .ok_or_else(|| DecodingError::Message("element outside of a structure".to_string()))?;
        node.decode_element_index(runtime)
    }

    /// Slot of element `index` of the current frame.
    pub(crate) fn element_slot(&self, index: usize) -> Result<Slot, DecodingError> {
        self.nodes
            .last()
            .map(|node| node.element_slot(index))
            .ok_or_else(|| DecodingError::Message("element outside of a structure".to_string()))
    }

    /// Key of map entry `index` of the current frame.
    pub(crate) fn map_key(&self, index: usize) -> Result<String, DecodingError> {
        self.nodes
            .last()
            .and_then(|node| node.map_key(index))
            .map(str::to_string)
            .ok_or_else(|| DecodingError::Message("map key outside of a map".to_string()))
    }
}

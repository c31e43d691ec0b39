// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed value -> host value tree.
//!
//! The encoder is a `serde::Serializer` driving an explicit node stack. Each
//! structure entry pushes one `OutputNode` owning a freshly created host
//! container, which is linked into its parent right away. Leaving the
//! structure pops the frame: nested containers are released (the parent
//! keeps its own reference), the outermost one becomes the result.
//!
//! # Example
//!
//! ```
//! use hostbridge::{encode, Configuration, Heap, HostRuntime, Value};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let heap = Heap::new();
//! let root = encode(&heap, &Configuration::default(), &Point { x: 1, y: 2 }).unwrap();
//! assert_eq!(heap.get(root.handle(), &"y".into()).unwrap(), Some(Value::Integer(2)));
//! ```

mod node;
mod ser;


pub(crate) use node::Slot;

use crate::descriptor::{Descriptor, SerialKind};
use crate::error::EncodingError;
use crate::host::{HostRuntime, Owned, Value};
use crate::polymorphic;
use node::OutputNode;
use ser::ValueSerializer;
use serde::Serialize;

/// Single-use encoder for one root value.
pub struct Encoder<'rt, R: HostRuntime + ?Sized> {
    runtime: &'rt R,
    discriminator: String,
    nodes: Vec<OutputNode<'rt, R>>,
    root: Option<Owned<'rt, R>>,
    pending_variant: Option<&'static str>,
}

impl<'rt, R: HostRuntime + ?Sized> Encoder<'rt, R> {
    /// Create an encoder writing into `runtime`.
    pub fn new(runtime: &'rt R, discriminator: impl Into<String>) -> Self {
        Self {
            runtime,
            discriminator: discriminator.into(),
            nodes: Vec::new(),
            root: None,
            pending_variant: None,
        }
    }

    /// Encode `value` and return the owned root.
    ///
    /// On failure every container created so far is released before the
    /// error is returned.
    pub fn encode<T>(mut self, value: &T) -> Result<Owned<'rt, R>, EncodingError>
    where
        T: Serialize + ?Sized,
    {
        match value.serialize(ValueSerializer::new(&mut self, Slot::Root)) {
            Ok(()) => self.root.take().ok_or(EncodingError::NotAStructure("unit")),
            Err(err) => {
                let open = self.nodes.len();
                self.nodes.clear();
                self.root = None;
                self.pending_variant = None;
                log::debug!(
                    "[Encoder] failed with {} open frame(s), containers released: {}",
                    open,
                    err
                );
                Err(err)
            }
        }
    }

    /// Arm the polymorphic resolver for the next structure entry.
    pub(crate) fn arm_variant(&mut self, variant: &'static str) -> Result<(), EncodingError> {
        polymorphic::arm(&mut self.pending_variant, variant)
    }

    /// Enter a structure: create its container, link it into the parent
    /// through `slot` and push its frame.
    pub(crate) fn begin_structure(
        &mut self,
        slot: Slot,
        descriptor: &Descriptor,
    ) -> Result<(), EncodingError> {
        let kind = descriptor.kind();
        let variant = self.pending_variant.take();
        if let Some(variant) = variant {
            polymorphic::check_kind(variant, kind)?;
        }
        if slot == Slot::Root && !kind.is_structure() {
            return Err(EncodingError::NotAStructure(kind.name()));
        }

        let runtime = self.runtime;
        let container = match kind {
            SerialKind::Struct | SerialKind::Union | SerialKind::Map => {
                Some(Owned::new(runtime, runtime.create_object()?))
            }
            SerialKind::List => Some(Owned::new(runtime, runtime.create_array()?)),
            SerialKind::Unit => None,
            SerialKind::Primitive(_) | SerialKind::Enum => {
                return Err(EncodingError::UnexpectedKind(format!(
                    "{} opened as a structure",
                    kind
                )))
            }
        };

        if let (Some(variant), Some(container)) = (variant, &container) {
            runtime.set(
                container.handle(),
                &self.discriminator.as_str().into(),
                Value::String(variant.to_string()),
            )?;
        }

        let linked = match (kind, container.as_ref()) {
            (SerialKind::List, Some(c)) => Value::Array(c.handle()),
            (_, Some(c)) => Value::Object(c.handle()),
            (_, None) => Value::Undefined,
        };
        self.link(slot, linked)?;

        log::trace!(
            "[Encoder] begin {} '{}' at depth {}",
            kind,
            descriptor.serial_name(),
            self.nodes.len()
        );
        self.nodes.push(OutputNode::new(kind, container, variant));
        Ok(())
    }

    /// Leave the current structure.
    pub(crate) fn end_structure(&mut self) -> Result<(), EncodingError> {
        let node = self
            .nodes
            .pop()
            .ok_or_else(|| EncodingError::Message("unbalanced end of structure".to_string()))?;
        log::trace!(
            "[Encoder] end {:?} after {} element(s) at depth {}",
            node.kind(),
            node.position(),
            self.nodes.len()
        );
        if self.nodes.is_empty() {
            match node.into_container() {
                Some(root) => self.root = Some(root),
                None => return Err(EncodingError::NotAStructure("unit")),
            }
        }
        // Nested frames drop here; the parent holds its own reference.
        Ok(())
    }

    /// Resolve the slot for the next element of the current frame.
    pub(crate) fn encode_element_index(
        &mut self,
        field: Option<&'static str>,
    ) -> Result<Slot, EncodingError> {
        let discriminator = self.discriminator.as_str();
        let node = self
            .nodes
            .last_mut()
            .ok_or_else(|| EncodingError::Message("element outside of a structure".to_string()))?;
        node.encode_element_index(field, discriminator)
    }

    /// Record the key of the next map entry on the current frame.
    pub(crate) fn encode_map_key(&mut self, key: String) -> Result<(), EncodingError> {
        let discriminator = self.discriminator.as_str();
        let node = self
            .nodes
            .last_mut()
            .ok_or_else(|| EncodingError::Message("map key outside of a map".to_string()))?;
        node.encode_map_key(key, discriminator)
    }

    /// Write a leaf value (scalar, null or enum name).
    pub(crate) fn write(
        &mut self,
        slot: Slot,
        value: Value<R::Handle>,
        kind: &'static str,
    ) -> Result<(), EncodingError> {
        if let Some(variant) = self.pending_variant.take() {
            return Err(EncodingError::InvalidPolymorphicKind {
                variant: variant.to_string(),
                kind,
            });
        }
        if slot == Slot::Root {
            return Err(EncodingError::NotAStructure(kind));
        }
        self.link(slot, value)
    }

    fn link(&mut self, slot: Slot, value: Value<R::Handle>) -> Result<(), EncodingError> {
        let parent = match slot {
            Slot::Root => return Ok(()),
            _ => self
                .nodes
                .last()
                .and_then(OutputNode::handle)
                .ok_or_else(|| EncodingError::Message("no open container".to_string()))?,
        };
        match slot {
            Slot::Field(key) => self.runtime.set(parent, &key, value)?,
            Slot::Append => self.runtime.push(parent, value)?,
            Slot::Root => {}
        }
        Ok(())
    }
}

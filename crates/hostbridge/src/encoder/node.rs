// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Output frames of the encoder node stack.

use crate::descriptor::SerialKind;
use crate::error::EncodingError;
use crate::host::{HostRuntime, Key, Owned};
use crate::polymorphic;

/// Where the next value goes, resolved by the frame that receives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    /// The value is the result of the whole operation.
    Root,
    /// Property of the current object.
    Field(Key),
    /// Next element of the current array.
    Append,
}

/// Per-kind frame state.
#[derive(Debug)]
pub(crate) enum OutputKind {
    /// Object written field by field. `variant` is set when the object
    /// carries a class discriminator.
    Struct { variant: Option<&'static str> },
    /// Array written in traversal order.
    List,
    /// Object written as alternating key and value. The key of the entry
    /// in progress waits here until its value arrives.
    Map {
        variant: Option<&'static str>,
        pending_key: Option<String>,
    },
    /// Placeholder for a unit value; owns no container.
    Unit,
}

/// One level of the structure being written.
pub(crate) struct OutputNode<'rt, R: HostRuntime + ?Sized> {
    container: Option<Owned<'rt, R>>,
    kind: OutputKind,
    position: usize,
}

impl<'rt, R: HostRuntime + ?Sized> OutputNode<'rt, R> {
    pub(crate) fn new(
        kind: SerialKind,
        container: Option<Owned<'rt, R>>,
        variant: Option<&'static str>,
    ) -> Self {
        let kind = match kind {
            SerialKind::List => OutputKind::List,
            SerialKind::Map => OutputKind::Map {
                variant,
                pending_key: None,
            },
            SerialKind::Unit => OutputKind::Unit,
            _ => OutputKind::Struct { variant },
        };
        Self {
            container,
            kind,
            position: 0,
        }
    }

    /// Handle of the container being written.
    pub(crate) fn handle(&self) -> Option<R::Handle> {
        self.container.as_ref().map(Owned::handle)
    }

    /// Number of elements written so far.
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn kind(&self) -> &OutputKind {
        &self.kind
    }

    /// Resolve the slot of the next struct field or list element.
    pub(crate) fn encode_element_index(
        &mut self,
        field: Option<&'static str>,
        discriminator: &str,
    ) -> Result<Slot, EncodingError> {
        let slot = match (&mut self.kind, field) {
            (OutputKind::Struct { variant }, Some(name)) => {
                if let Some(variant) = variant {
                    polymorphic::check_field(variant, discriminator, name)?;
                }
                Slot::Field(Key::from(name))
            }
            (OutputKind::List, None) => Slot::Append,
            (OutputKind::Map { pending_key, .. }, None) => {
                let key = pending_key.take().ok_or_else(|| {
                    EncodingError::Message("map value written without a key".to_string())
                })?;
                Slot::Field(Key::Name(key))
            }
            (kind, _) => {
                return Err(EncodingError::UnexpectedKind(format!(
                    "element written into {:?} frame",
                    kind
                )))
            }
        };
        self.position += 1;
        Ok(slot)
    }

    /// Record the key of the next map entry.
    pub(crate) fn encode_map_key(
        &mut self,
        key: String,
        discriminator: &str,
    ) -> Result<(), EncodingError> {
        match &mut self.kind {
            OutputKind::Map {
                variant,
                pending_key,
            } => {
                if let Some(variant) = variant {
                    polymorphic::check_field(variant, discriminator, &key)?;
                }
                *pending_key = Some(key);
                Ok(())
            }
            other => Err(EncodingError::UnexpectedKind(format!(
                "map key written into {:?} frame",
                other
            ))),
        }
    }

    /// Give up the finished container.
    pub(crate) fn into_container(self) -> Option<Owned<'rt, R>> {
        self.container
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Input frames of the decoder node stack.

use crate::descriptor::{Descriptor, ElementIndex};
use crate::error::DecodingError;
use crate::host::{HostRuntime, Key, Owned};
use std::fmt;

/// Where the next value is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    /// The caller-supplied root.
    Root,
    /// Property or element of the current frame's container.
    Key(Key),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("<root>"),
            Self::Key(key) => write!(f, "{}", key),
        }
    }
}

/// A container being read: either borrowed from the caller or owned by
/// the frame and released with it.
pub(crate) enum Source<'rt, R: HostRuntime + ?Sized> {
    Borrowed(R::Handle),
    Owned(Owned<'rt, R>),
}

impl<R: HostRuntime + ?Sized> Source<'_, R> {
    pub(crate) fn handle(&self) -> R::Handle {
        match self {
            Self::Borrowed(handle) => *handle,
            Self::Owned(owned) => owned.handle(),
        }
    }
}

/// Per-kind frame state.
pub(crate) enum InputKind {
    /// Declared fields, walked in order.
    Struct { descriptor: Descriptor },
    List,
    /// Own keys of the host object, captured at entry.
    Map { keys: Vec<String> },
    Unit,
}

/// One level of the structure being read.
pub(crate) struct InputNode<'rt, R: HostRuntime + ?Sized> {
    source: Option<Source<'rt, R>>,
    kind: InputKind,
    position: usize,
    total: usize,
}

impl<'rt, R: HostRuntime + ?Sized> InputNode<'rt, R> {
    pub(crate) fn new(source: Option<Source<'rt, R>>, kind: InputKind, total: usize) -> Self {
        Self {
            source,
            kind,
            position: 0,
            total,
        }
    }

    pub(crate) fn handle(&self) -> Option<R::Handle> {
        self.source.as_ref().map(Source::handle)
    }

    /// Advance the cursor.
    ///
    /// Structs walk declared fields and report [`ElementIndex::Unknown`]
    /// for absent properties. Lists and maps synthesize sequential
    /// positions; a map has two positions per entry (key, then value).
    pub(crate) fn decode_element_index(
        &mut self,
        runtime: &R,
    ) -> Result<ElementIndex, DecodingError> {
        if self.position >= self.total {
            return Ok(ElementIndex::Done);
        }
        let index = self.position;
        self.position += 1;
        match &self.kind {
            InputKind::Struct { descriptor } => {
                let Some(name) = descriptor.element_name(index) else {
                    return Ok(ElementIndex::Done);
                };
                let handle = self.handle().ok_or_else(|| {
                    DecodingError::Message("struct frame without a source".to_string())
                })?;
                if runtime.contains(handle, &Key::from(name))? {
                    Ok(ElementIndex::Index(index))
                } else {
                    Ok(ElementIndex::Unknown)
                }
            }
            InputKind::List | InputKind::Map { .. } => Ok(ElementIndex::Index(index)),
            InputKind::Unit => Ok(ElementIndex::Done),
        }
    }

    /// Slot of the element at `index`, as returned by the cursor.
    pub(crate) fn element_slot(&self, index: usize) -> Slot {
        match &self.kind {
            InputKind::Struct { descriptor } => descriptor
                .element_name(index)
                .map_or(Slot::Root, |name| Slot::Key(Key::from(name))),
            InputKind::List => Slot::Key(Key::Index(index as u32)),
            InputKind::Map { keys } => Slot::Key(Key::Name(keys[index / 2].clone())),
            InputKind::Unit => Slot::Root,
        }
    }

    /// Map key at an even cursor position.
    pub(crate) fn map_key(&self, index: usize) -> Option<&str> {
        match &self.kind {
            InputKind::Map { keys } => keys.get(index / 2).map(String::as_str),
            _ => None,
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for the structural walk.
//!
//! serde's derive output is the reflection source: `serialize_struct` reports
//! a serial name and element count, `deserialize_struct` and
//! `deserialize_enum` report the declared names in order. A [`Descriptor`]
//! captures that information for one structure level.

use std::fmt;

/// Scalar kinds before widening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
}

impl PrimitiveKind {
    /// Rust-facing name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
            Self::String => "string",
        }
    }
}

/// Kind of a described type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerialKind {
    /// Scalar leaf.
    Primitive(PrimitiveKind),
    /// Fieldless enum, carried as its variant name.
    Enum,
    /// Named fields in declared order.
    Struct,
    /// Ordered sequence.
    List,
    /// String- or enum-keyed map.
    Map,
    /// Tagged union, carried as a struct plus discriminator.
    Union,
    /// Unit value, carried as `undefined`.
    Unit,
}

impl SerialKind {
    /// Lower-case name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Primitive(kind) => kind.name(),
            Self::Enum => "enum",
            Self::Struct => "struct",
            Self::List => "list",
            Self::Map => "map",
            Self::Union => "union",
            Self::Unit => "unit",
        }
    }

    /// Whether a value of this kind can be the root of an encode or decode.
    pub fn is_structure(self) -> bool {
        matches!(self, Self::Struct | Self::Union | Self::List | Self::Map)
    }
}

impl fmt::Display for SerialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of advancing a decode cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementIndex {
    /// Next element to read, as a declared index or a synthesized position.
    Index(usize),
    /// The declared element is absent from the host value; defaults apply.
    Unknown,
    /// Every element has been visited.
    Done,
}

/// Describes one structure level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    serial_name: &'static str,
    kind: SerialKind,
    elements: &'static [&'static str],
    count: usize,
}

impl Descriptor {
    /// Descriptor with declared element names (decode side).
    pub const fn declared(
        serial_name: &'static str,
        kind: SerialKind,
        elements: &'static [&'static str],
    ) -> Self {
        Self {
            serial_name,
            kind,
            elements,
            count: elements.len(),
        }
    }

    /// Descriptor with only an element count (encode side, where names
    /// arrive one field at a time).
    pub const fn sized(serial_name: &'static str, kind: SerialKind, count: usize) -> Self {
        Self {
            serial_name,
            kind,
            elements: &[],
            count,
        }
    }

    /// Anonymous descriptor for sequences, maps and unit.
    pub const fn anonymous(kind: SerialKind) -> Self {
        Self::sized("", kind, 0)
    }

    /// Kind of the described type.
    pub fn kind(&self) -> SerialKind {
        self.kind
    }

    /// Serial name (type or variant name).
    pub fn serial_name(&self) -> &'static str {
        self.serial_name
    }

    /// Number of elements.
    pub fn elements_count(&self) -> usize {
        self.count
    }

    /// Declared name at `index`.
    pub fn element_name(&self, index: usize) -> Option<&'static str> {
        self.elements.get(index).copied()
    }

    /// Position of `name` in declaration order; `None` is NOT_FOUND.
    pub fn element_index(&self, name: &str) -> Option<usize> {
        self.elements.iter().position(|element| *element == name)
    }
}

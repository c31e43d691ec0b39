// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host runtime adapter.
//!
//! The embedded engine owns every object and array; the bridge only ever
//! sees opaque, reference-counted handles. [`HostRuntime`] is the complete
//! capability surface the encoder and decoder rely on.
//!
//! # Reference discipline
//!
//! - Container handles returned by [`HostRuntime::create_object`],
//!   [`HostRuntime::create_array`] and [`HostRuntime::get`] are new
//!   references owned by the caller, who must release them exactly once.
//! - [`HostRuntime::set`] and [`HostRuntime::push`] store a reference to the
//!   container behind a handle; the caller's handle stays owned by the caller.
//!
//! [`Owned`] turns that contract into a scope guard.

mod heap;
mod owned;
mod scope;

pub use heap::{Heap, ObjectHandle};
pub use owned::Owned;
pub use scope::{scope, scope_with_result, Scope};

use crate::error::HostError;
use std::fmt;
use std::hash::Hash;

/// Type tag of a stored host value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Undefined,
    Null,
    Integer,
    Double,
    Boolean,
    String,
    Array,
    Object,
}

impl ValueType {
    /// Lower-case name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A host value. Containers are carried as handles of type `H`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<H> {
    Undefined,
    Null,
    Integer(i32),
    Double(f64),
    Boolean(bool),
    String(String),
    Array(H),
    Object(H),
}

impl<H> Value<H> {
    /// Type tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Undefined => ValueType::Undefined,
            Self::Null => ValueType::Null,
            Self::Integer(_) => ValueType::Integer,
            Self::Double(_) => ValueType::Double,
            Self::Boolean(_) => ValueType::Boolean,
            Self::String(_) => ValueType::String,
            Self::Array(_) => ValueType::Array,
            Self::Object(_) => ValueType::Object,
        }
    }

    /// Convert the container handle, keeping scalars as they are.
    pub fn map_handle<U>(self, f: impl FnOnce(H) -> U) -> Value<U> {
        match self {
            Self::Undefined => Value::Undefined,
            Self::Null => Value::Null,
            Self::Integer(v) => Value::Integer(v),
            Self::Double(v) => Value::Double(v),
            Self::Boolean(v) => Value::Boolean(v),
            Self::String(v) => Value::String(v),
            Self::Array(h) => Value::Array(f(h)),
            Self::Object(h) => Value::Object(f(h)),
        }
    }

    /// Borrowing view. Scalars are cloned, handles borrowed.
    pub fn as_ref(&self) -> Value<&H> {
        match self {
            Self::Undefined => Value::Undefined,
            Self::Null => Value::Null,
            Self::Integer(v) => Value::Integer(*v),
            Self::Double(v) => Value::Double(*v),
            Self::Boolean(v) => Value::Boolean(*v),
            Self::String(v) => Value::String(v.clone()),
            Self::Array(h) => Value::Array(h),
            Self::Object(h) => Value::Object(h),
        }
    }

    /// Borrow the container handle, if any.
    pub fn handle(&self) -> Option<&H> {
        match self {
            Self::Array(h) | Self::Object(h) => Some(h),
            _ => None,
        }
    }
}

/// Property key: a name for objects, a position for arrays.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Name(String),
    Index(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(index) => write!(f, "[{}]", index),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<u32> for Key {
    fn from(index: u32) -> Self {
        Self::Index(index)
    }
}

/// Capability surface of an embedded scripting runtime.
///
/// Implementations are expected to be single-threaded: every call happens on
/// the thread owning the runtime connection.
pub trait HostRuntime {
    /// Opaque, reference-counted handle to an object or array.
    type Handle: Copy + Eq + Hash + fmt::Debug;

    /// Create an empty object. The returned handle is owned by the caller.
    fn create_object(&self) -> Result<Self::Handle, HostError>;

    /// Create an empty array. The returned handle is owned by the caller.
    fn create_array(&self) -> Result<Self::Handle, HostError>;

    /// Read a property. `None` means the key is absent.
    ///
    /// A returned container handle is a new reference owned by the caller.
    fn get(
        &self,
        container: Self::Handle,
        key: &Key,
    ) -> Result<Option<Value<Self::Handle>>, HostError>;

    /// Type of a property without materializing it. Absent keys report
    /// [`ValueType::Undefined`].
    fn get_type(&self, container: Self::Handle, key: &Key) -> Result<ValueType, HostError>;

    /// Whether the key is present at all, whatever its value.
    fn contains(&self, container: Self::Handle, key: &Key) -> Result<bool, HostError>;

    /// Store a value. Container values are stored by reference.
    fn set(
        &self,
        container: Self::Handle,
        key: &Key,
        value: Value<Self::Handle>,
    ) -> Result<(), HostError>;

    /// Store an explicit null.
    fn set_null(&self, container: Self::Handle, key: &Key) -> Result<(), HostError> {
        self.set(container, key, Value::Null)
    }

    /// Store an explicit undefined.
    fn set_undefined(&self, container: Self::Handle, key: &Key) -> Result<(), HostError> {
        self.set(container, key, Value::Undefined)
    }

    /// Append to an array.
    fn push(&self, array: Self::Handle, value: Value<Self::Handle>) -> Result<(), HostError>;

    /// Own keys in native enumeration order.
    fn keys(&self, object: Self::Handle) -> Result<Vec<String>, HostError>;

    /// Number of elements of an array.
    fn length(&self, array: Self::Handle) -> Result<usize, HostError>;

    /// Whether a handle refers to an object or an array.
    fn type_of(&self, handle: Self::Handle) -> Result<ValueType, HostError>;

    /// Drop one reference.
    fn release(&self, handle: Self::Handle);

    /// Number of unreleased handles (diagnostic).
    fn reference_count(&self) -> usize;

    /// Unreleased handles (diagnostic, used by memory scopes).
    fn live_handles(&self) -> Vec<Self::Handle>;
}

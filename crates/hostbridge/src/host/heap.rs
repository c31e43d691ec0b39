// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process host runtime.
//!
//! `Heap` models the object side of an embedded JavaScript engine: objects
//! with insertion-ordered keys, arrays, primitives, `null` and `undefined`.
//! Handles behave like engine handles: each one is an independent reference
//! that must be released exactly once, and [`HostRuntime::reference_count`]
//! reports how many are still live.
//!
//! Containers are shared between handles and parents through `Rc`, so a
//! container outlives its last handle as long as some parent stores it.
//! Reference cycles are never collected.

use super::{HostRuntime, Key, Value, ValueType};
use crate::error::HostError;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Handle to an object or array living in a [`Heap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(pub u32);

type Node = Rc<RefCell<Container>>;

#[derive(Debug)]
enum Container {
    Object(IndexMap<String, Slot>),
    Array(Vec<Slot>),
}

impl Container {
    fn value_type(&self) -> ValueType {
        match self {
            Self::Object(_) => ValueType::Object,
            Self::Array(_) => ValueType::Array,
        }
    }

    fn lookup(&self, key: &Key) -> Option<&Slot> {
        match (self, key) {
            (Self::Object(map), Key::Name(name)) => map.get(name),
            (Self::Object(map), Key::Index(index)) => map.get(&index.to_string()),
            (Self::Array(items), Key::Index(index)) => items.get(*index as usize),
            (Self::Array(items), Key::Name(name)) => {
                let index: usize = name.parse().ok()?;
                items.get(index)
            }
        }
    }
}

/// Stored property value.
#[derive(Debug, Clone)]
enum Slot {
    Undefined,
    Null,
    Integer(i32),
    Double(f64),
    Boolean(bool),
    String(String),
    Ref(Node),
}

impl Slot {
    fn value_type(&self) -> ValueType {
        match self {
            Self::Undefined => ValueType::Undefined,
            Self::Null => ValueType::Null,
            Self::Integer(_) => ValueType::Integer,
            Self::Double(_) => ValueType::Double,
            Self::Boolean(_) => ValueType::Boolean,
            Self::String(_) => ValueType::String,
            Self::Ref(node) => node.borrow().value_type(),
        }
    }
}

#[derive(Debug, Default)]
struct HeapState {
    handles: HashMap<ObjectHandle, Node>,
    next_handle: u32,
    stale_releases: usize,
}

/// Single-threaded, reference-counted host runtime.
#[derive(Debug, Default)]
pub struct Heap {
    state: RefCell<HeapState>,
}

impl Heap {
    /// Create an empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `release` calls that targeted an already-released handle.
    pub fn stale_releases(&self) -> usize {
        self.state.borrow().stale_releases
    }

    fn node(&self, handle: ObjectHandle) -> Result<Node, HostError> {
        self.state
            .borrow()
            .handles
            .get(&handle)
            .cloned()
            .ok_or_else(|| HostError::StaleHandle(format!("{:?}", handle)))
    }

    fn issue(&self, node: Node) -> ObjectHandle {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        let handle = ObjectHandle(state.next_handle);
        state.handles.insert(handle, node);
        handle
    }

    fn to_slot(&self, value: Value<ObjectHandle>) -> Result<Slot, HostError> {
        Ok(match value {
            Value::Undefined => Slot::Undefined,
            Value::Null => Slot::Null,
            Value::Integer(v) => Slot::Integer(v),
            Value::Double(v) => Slot::Double(v),
            Value::Boolean(v) => Slot::Boolean(v),
            Value::String(v) => Slot::String(v),
            Value::Array(h) | Value::Object(h) => Slot::Ref(self.node(h)?),
        })
    }

    fn from_slot(&self, slot: Slot) -> Value<ObjectHandle> {
        match slot {
            Slot::Undefined => Value::Undefined,
            Slot::Null => Value::Null,
            Slot::Integer(v) => Value::Integer(v),
            Slot::Double(v) => Value::Double(v),
            Slot::Boolean(v) => Value::Boolean(v),
            Slot::String(v) => Value::String(v),
            Slot::Ref(node) => {
                let is_array = matches!(*node.borrow(), Container::Array(_));
                let handle = self.issue(node);
                if is_array {
                    Value::Array(handle)
                } else {
                    Value::Object(handle)
                }
            }
        }
    }

    fn create(&self, container: Container) -> ObjectHandle {
        self.issue(Rc::new(RefCell::new(container)))
    }
}

impl HostRuntime for Heap {
    type Handle = ObjectHandle;

    fn create_object(&self) -> Result<ObjectHandle, HostError> {
        Ok(self.create(Container::Object(IndexMap::new())))
    }

    fn create_array(&self) -> Result<ObjectHandle, HostError> {
        Ok(self.create(Container::Array(Vec::new())))
    }

    fn get(
        &self,
        container: ObjectHandle,
        key: &Key,
    ) -> Result<Option<Value<ObjectHandle>>, HostError> {
        let node = self.node(container)?;
        let slot = node.borrow().lookup(key).cloned();
        Ok(slot.map(|slot| self.from_slot(slot)))
    }

    fn get_type(&self, container: ObjectHandle, key: &Key) -> Result<ValueType, HostError> {
        let node = self.node(container)?;
        let node = node.borrow();
        Ok(node
            .lookup(key)
            .map_or(ValueType::Undefined, Slot::value_type))
    }

    fn contains(&self, container: ObjectHandle, key: &Key) -> Result<bool, HostError> {
        let node = self.node(container)?;
        let present = node.borrow().lookup(key).is_some();
        Ok(present)
    }

    fn set(
        &self,
        container: ObjectHandle,
        key: &Key,
        value: Value<ObjectHandle>,
    ) -> Result<(), HostError> {
        let slot = self.to_slot(value)?;
        let node = self.node(container)?;
        let mut node = node.borrow_mut();
        match (&mut *node, key) {
            (Container::Object(map), Key::Name(name)) => {
                map.insert(name.clone(), slot);
            }
            (Container::Object(map), Key::Index(index)) => {
                map.insert(index.to_string(), slot);
            }
            (Container::Array(items), key) => {
                let index = match key {
                    Key::Index(index) => *index as usize,
                    Key::Name(name) => name
                        .parse()
                        .map_err(|_| HostError::InvalidIndex(name.clone()))?,
                };
                if index >= items.len() {
                    items.resize(index + 1, Slot::Undefined);
                }
                items[index] = slot;
            }
        }
        Ok(())
    }

    fn push(&self, array: ObjectHandle, value: Value<ObjectHandle>) -> Result<(), HostError> {
        let slot = self.to_slot(value)?;
        let node = self.node(array)?;
        let mut node = node.borrow_mut();
        match &mut *node {
            Container::Array(items) => {
                items.push(slot);
                Ok(())
            }
            Container::Object(_) => Err(HostError::NotAnArray(format!("{:?}", array))),
        }
    }

    fn keys(&self, object: ObjectHandle) -> Result<Vec<String>, HostError> {
        let node = self.node(object)?;
        let node = node.borrow();
        Ok(match &*node {
            Container::Object(map) => map.keys().cloned().collect(),
            Container::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        })
    }

    fn length(&self, array: ObjectHandle) -> Result<usize, HostError> {
        let node = self.node(array)?;
        let node = node.borrow();
        match &*node {
            Container::Array(items) => Ok(items.len()),
            Container::Object(_) => Err(HostError::NotAnArray(format!("{:?}", array))),
        }
    }

    fn type_of(&self, handle: ObjectHandle) -> Result<ValueType, HostError> {
        let node = self.node(handle)?;
        let kind = node.borrow().value_type();
        Ok(kind)
    }

    fn release(&self, handle: ObjectHandle) {
        let mut state = self.state.borrow_mut();
        if state.handles.remove(&handle).is_none() {
            state.stale_releases += 1;
            log::warn!("[Heap::release] handle {:?} already released", handle);
        }
    }

    fn reference_count(&self) -> usize {
        self.state.borrow().handles.len()
    }

    fn live_handles(&self) -> Vec<ObjectHandle> {
        self.state.borrow().handles.keys().copied().collect()
    }
}

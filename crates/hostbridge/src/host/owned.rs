// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Ownership guard for host handles.

use super::{HostRuntime, Key, Value};
use crate::error::HostError;
use std::fmt;

/// A handle released exactly once when the guard goes out of scope.
///
/// Use [`Owned::into_raw`] to transfer the reference elsewhere.
pub struct Owned<'rt, R: HostRuntime + ?Sized> {
    runtime: &'rt R,
    handle: R::Handle,
}

impl<'rt, R: HostRuntime + ?Sized> Owned<'rt, R> {
    /// Take ownership of `handle`.
    pub fn new(runtime: &'rt R, handle: R::Handle) -> Self {
        Self { runtime, handle }
    }

    /// The guarded handle. Still owned by the guard.
    pub fn handle(&self) -> R::Handle {
        self.handle
    }

    /// Runtime the handle belongs to.
    pub fn runtime(&self) -> &'rt R {
        self.runtime
    }

    /// Give up ownership without releasing.
    pub fn into_raw(self) -> R::Handle {
        let handle = self.handle;
        std::mem::forget(self);
        handle
    }

    /// Read a property of the guarded container.
    ///
    /// Container results are wrapped in their own guard.
    pub fn get(&self, key: impl Into<Key>) -> Result<Option<Value<Owned<'rt, R>>>, HostError> {
        let runtime = self.runtime;
        let value = runtime.get(self.handle, &key.into())?;
        Ok(value.map(|v| v.map_handle(|h| Owned::new(runtime, h))))
    }

    /// Own keys of the guarded object.
    pub fn keys(&self) -> Result<Vec<String>, HostError> {
        self.runtime.keys(self.handle)
    }
}

impl<R: HostRuntime + ?Sized> Drop for Owned<'_, R> {
    fn drop(&mut self) {
        self.runtime.release(self.handle);
    }
}

impl<R: HostRuntime + ?Sized> fmt::Debug for Owned<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Owned").field(&self.handle).finish()
    }
}

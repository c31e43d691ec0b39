// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Memory scopes.
//!
//! A scope remembers which handles were live when it opened and, when it
//! closes, releases every handle issued since then that was not persisted.
//! Closing also happens during unwinding.

use super::{HostRuntime, Owned};
use std::cell::RefCell;
use std::collections::HashSet;

/// Tracks handles issued while it is open.
pub struct Scope<'rt, R: HostRuntime + ?Sized> {
    runtime: &'rt R,
    baseline: HashSet<R::Handle>,
    persisted: RefCell<HashSet<R::Handle>>,
}

impl<'rt, R: HostRuntime + ?Sized> Scope<'rt, R> {
    /// Open a scope on `runtime`.
    pub fn new(runtime: &'rt R) -> Self {
        Self {
            runtime,
            baseline: runtime.live_handles().into_iter().collect(),
            persisted: RefCell::new(HashSet::new()),
        }
    }

    /// Keep `handle` alive past the end of the scope.
    pub fn persist(&self, handle: R::Handle) {
        self.persisted.borrow_mut().insert(handle);
    }

    /// Runtime this scope watches.
    pub fn runtime(&self) -> &'rt R {
        self.runtime
    }
}

impl<R: HostRuntime + ?Sized> Drop for Scope<'_, R> {
    fn drop(&mut self) {
        let persisted = self.persisted.borrow();
        let mut released = 0usize;
        for handle in self.runtime.live_handles() {
            if !self.baseline.contains(&handle) && !persisted.contains(&handle) {
                self.runtime.release(handle);
                released += 1;
            }
        }
        if released > 0 {
            log::trace!("[Scope] released {} handle(s)", released);
        }
    }
}

/// Run `body`, then release every handle it left behind.
///
/// Handles that must outlive the scope are either persisted from inside the
/// body or handed out through [`scope_with_result`].
pub fn scope<R>(runtime: &R, body: impl FnOnce(&Scope<'_, R>))
where
    R: HostRuntime + ?Sized,
{
    let scope = Scope::new(runtime);
    body(&scope);
}

/// Run `body`, keep the handle it returns and release everything else.
pub fn scope_with_result<'rt, R>(
    runtime: &'rt R,
    body: impl FnOnce(&Scope<'rt, R>) -> Owned<'rt, R>,
) -> Owned<'rt, R>
where
    R: HostRuntime + ?Sized,
{
    let scope = Scope::new(runtime);
    let result = body(&scope);
    scope.persist(result.handle());
    result
}

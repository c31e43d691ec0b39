// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # hostbridge - typed values <-> embedded runtime object graphs
//!
//! Converts serde-described Rust values to and from the object graph of an
//! embedded scripting runtime (objects, arrays, numbers, strings, `null`,
//! `undefined`), driving the runtime only through the reference-counted
//! handles of [`HostRuntime`].
//!
//! ## Quick Start
//!
//! ```rust
//! use hostbridge::{Configuration, Heap, HostBridge, HostRuntime};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! enum Shape {
//!     Circle { radius: f64 },
//!     Square { side: f64 },
//! }
//!
//! # fn main() -> hostbridge::Result<()> {
//! let heap = Heap::new();
//! let bridge = HostBridge::new(&heap, Configuration::default())?;
//!
//! let shape = Shape::Circle { radius: 1.5 };
//! let object = bridge.to_host(&shape)?;
//! assert_eq!(heap.keys(object.handle())?, vec!["type", "radius"]);
//!
//! let back: Shape = bridge.from_host(object.handle())?;
//! assert_eq!(back, shape);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------------------------------+
//! |  HostBridge (configuration + runtime reference)                 |
//! +-------------------------------+---------------------------------+
//! |  Encoder: serde::Serializer   |  Decoder: serde::Deserializer   |
//! |  OutputNode stack             |  InputNode stack                |
//! +-------------------------------+---------------------------------+
//! |  polymorphic: discriminator injection / variant dispatch        |
//! |  scalar: widening table                                         |
//! +-----------------------------------------------------------------+
//! |  host: HostRuntime trait, Owned guard, scopes, Heap             |
//! +-----------------------------------------------------------------+
//! ```
//!
//! ## Reference counting
//!
//! A successful [`encode`] leaves exactly one new live handle: the returned
//! [`Owned`] root. A successful [`decode`] leaves none, and never releases
//! the root it was given. Any failure leaves none either.

pub mod config;
pub mod decoder;
pub mod descriptor;
pub mod encoder;
pub mod error;
pub mod host;
mod polymorphic;
pub mod scalar;

pub use config::{ConfigError, Configuration};
pub use decoder::Decoder;
pub use descriptor::{Descriptor, ElementIndex, PrimitiveKind, SerialKind};
pub use encoder::Encoder;
pub use error::{DecodingError, EncodingError, Error, HostError, Result};
pub use host::{
    scope, scope_with_result, Heap, HostRuntime, Key, ObjectHandle, Owned, Scope, Value,
    ValueType,
};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encode `value` into a new host container. The configuration is
/// validated first.
pub fn encode<'rt, R, T>(
    runtime: &'rt R,
    config: &Configuration,
    value: &T,
) -> std::result::Result<Owned<'rt, R>, EncodingError>
where
    R: HostRuntime + ?Sized,
    T: Serialize + ?Sized,
{
    config
        .validate()
        .map_err(|err| EncodingError::InvalidConfiguration(err.to_string()))?;
    Encoder::new(runtime, config.class_discriminator.as_str()).encode(value)
}

/// Decode the container behind `root`. The root stays owned by the caller.
/// The configuration is validated first.
pub fn decode<R, T>(
    runtime: &R,
    config: &Configuration,
    root: R::Handle,
) -> std::result::Result<T, DecodingError>
where
    R: HostRuntime + ?Sized,
    T: DeserializeOwned,
{
    config
        .validate()
        .map_err(|err| DecodingError::InvalidConfiguration(err.to_string()))?;
    Decoder::new(runtime, config.class_discriminator.as_str(), root).decode()
}

/// Runtime connection plus configuration.
pub struct HostBridge<'rt, R: HostRuntime + ?Sized> {
    runtime: &'rt R,
    config: Configuration,
}

impl<'rt, R: HostRuntime + ?Sized> HostBridge<'rt, R> {
    /// Create a bridge. The configuration is validated up front.
    pub fn new(runtime: &'rt R, config: Configuration) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        log::debug!(
            "[HostBridge] class discriminator '{}'",
            config.class_discriminator
        );
        Ok(Self { runtime, config })
    }

    /// Encode `value`; the caller owns the returned root.
    pub fn to_host<T>(&self, value: &T) -> std::result::Result<Owned<'rt, R>, EncodingError>
    where
        T: Serialize + ?Sized,
    {
        encode(self.runtime, &self.config, value)
    }

    /// Decode the container behind `root` without releasing it.
    pub fn from_host<T: DeserializeOwned>(
        &self,
        root: R::Handle,
    ) -> std::result::Result<T, DecodingError> {
        decode(self.runtime, &self.config, root)
    }

    pub fn runtime(&self) -> &'rt R {
        self.runtime
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for host access, encoding and decoding.
//!
//! Every failure is terminal for the current operation. By the time one of
//! these errors reaches the caller, every intermediate host value created or
//! read during the walk has already been released.

use crate::config::ConfigError;
use crate::host::ValueType;
use std::fmt::Display;
use thiserror::Error;

/// Failures reported by a [`HostRuntime`](crate::HostRuntime) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The handle was never issued or has already been released.
    #[error("stale handle: {0}")]
    StaleHandle(String),

    /// The operation needs an array but the handle refers to something else.
    #[error("handle {0} does not refer to an array")]
    NotAnArray(String),

    /// A named key was used where an array index was required.
    #[error("invalid array index: {0}")]
    InvalidIndex(String),

    /// Engine-specific failure.
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Errors raised while converting a typed value into host values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodingError {
    /// A shape with no host representation (tuple variants, 128-bit integers, ...).
    #[error("unexpected kind encountered while encoding: {0}")]
    UnexpectedKind(String),

    /// The root of an encode must be a struct, union, list or map.
    #[error("root value must be structure-shaped, found {0}")]
    NotAStructure(&'static str),

    /// Map keys must be strings or enum variant names.
    #[error("map key must be a string or an enum, found {0}")]
    InvalidKeyType(&'static str),

    /// A union variant declares a field named like the class discriminator.
    #[error(
        "variant '{variant}' has a property named '{discriminator}' which conflicts with the class discriminator"
    )]
    DiscriminatorCollision {
        /// Serial name of the offending variant.
        variant: String,
        /// Configured discriminator name.
        discriminator: String,
    },

    /// The concrete variant resolved to a kind that cannot carry a discriminator.
    #[error("variant '{variant}' cannot be encoded polymorphically: actual kind is {kind}")]
    InvalidPolymorphicKind {
        /// Serial name of the variant.
        variant: String,
        /// Kind the variant's payload resolved to.
        kind: &'static str,
    },

    /// A union variant whose payload is itself a union.
    #[error("actual value for variant '{0}' cannot be polymorphic itself")]
    NestedPolymorphic(String),

    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Host runtime failure during the walk.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Free-form error raised by a `Serialize` implementation.
    #[error("{0}")]
    Message(String),
}

/// Errors raised while converting host values into a typed value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodingError {
    /// The requested Rust shape cannot be read from a host value tree.
    #[error("unexpected kind encountered while decoding: {0}")]
    UnexpectedKind(String),

    /// The root of a decode must be a struct, union, list or map.
    #[error("root value must be structure-shaped, requested {0}")]
    NotAStructure(&'static str),

    /// The host value at `at` has the wrong type.
    #[error("expected {expected} at {at}, found {found:?}")]
    UnexpectedType {
        /// What the descriptor asked for.
        expected: &'static str,
        /// What the host holds.
        found: ValueType,
        /// Property path segment being read.
        at: String,
    },

    /// Nothing is stored at `0`.
    #[error("no value present at {0}")]
    MissingValue(String),

    /// A required, non-nullable field is absent.
    #[error("missing field '{0}'")]
    MissingField(String),

    /// A string that is not one of the enum's declared names.
    #[error("enum of type {enum_name} has unknown value {value}")]
    UnknownEnumValue {
        /// Serial name of the enum.
        enum_name: String,
        /// The unmatched string.
        value: String,
    },

    /// A union value without a readable discriminator.
    #[error("polymorphic value of type {type_name} is missing class discriminator '{discriminator}'")]
    MissingDiscriminator {
        /// Serial name of the union.
        type_name: String,
        /// Configured discriminator name.
        discriminator: String,
    },

    /// A discriminator that names no variant of the union.
    #[error("polymorphic serializer was not found for class discriminator '{tag}' of type {type_name}")]
    UnknownVariant {
        /// Serial name of the union.
        type_name: String,
        /// The unmatched discriminator value.
        tag: String,
    },

    /// Map keys can only be read back as strings or enums.
    #[error("map key must be read as a string or an enum, requested {0}")]
    InvalidKeyType(&'static str),

    /// An integer that is not a Unicode scalar value was read as `char`.
    #[error("integer {0} is not a valid char")]
    InvalidChar(i32),

    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Host runtime failure during the walk.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Free-form error raised by a `Deserialize` implementation.
    #[error("{0}")]
    Message(String),
}

impl serde::ser::Error for EncodingError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Message(msg.to_string())
    }
}

impl serde::de::Error for DecodingError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Message(msg.to_string())
    }

    fn missing_field(field: &'static str) -> Self {
        Self::MissingField(field.to_string())
    }
}

/// Umbrella error for callers that mix configuration, encoding and decoding.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Encoding failed.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Decoding failed.
    #[error(transparent)]
    Decoding(#[from] DecodingError),

    /// Direct host access failed.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Result alias over [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

use std::collections::TryReserveError;

use crate::types::LppType;

/// Errors that can occur while encoding or decoding an LPP stream.
#[derive(Debug, thiserror::Error)]
pub enum LppError {
    /// The type code is outside the IPSO catalog.
    #[error("unknown LPP type code 0x{0:02x}")]
    UnknownType(u8),

    /// The type is part of the catalog but has no encoding.
    #[error("LPP type {0} is not implemented")]
    NotImplemented(LppType),

    /// The value shape does not belong to the requested type.
    #[error("value of shape {found} cannot be written as {ty}")]
    TypeMismatch { ty: LppType, found: &'static str },

    /// Not enough free space left in the stream for the record.
    #[error("stream overflow ({required} bytes required, {free} free)")]
    Overflow { required: usize, free: usize },

    /// The value cannot be represented at the type's fixed-point scale.
    #[error("value {value} is out of range for {ty}")]
    OutOfRange { ty: LppType, value: f64 },

    /// A record header announced more payload than the stream holds.
    #[error("truncated record ({needed} bytes needed, {available} available)")]
    Truncated { needed: usize, available: usize },

    /// The supplied decode buffer does not match the requested capacity.
    #[error("buffer length mismatch (expected {expected} bytes, got {actual})")]
    BufferLength { expected: usize, actual: usize },

    /// The stream buffer could not be allocated.
    #[error("failed to allocate stream buffer: {0}")]
    Alloc(#[from] TryReserveError),
}

pub type Result<T> = std::result::Result<T, LppError>;

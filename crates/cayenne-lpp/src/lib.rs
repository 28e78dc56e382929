//! Cayenne LPP payload encoding for LoRaWAN sensor nodes.
//!
//! # Crate Structure
//!
//! - [`codec`]: Type registry, stream encoder/decoder and frame packing
//! - [`sensor`]: Mapping from sensor channels to LPP records

/// Re-export codec types.
pub mod codec {
    pub use cayenne_lpp_codec::*;
}

pub mod sensor;

pub use cayenne_lpp_codec::{LppError, LppStream, LppType, Record, Value};

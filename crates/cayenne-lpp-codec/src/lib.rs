//! Cayenne LPP (Low Power Payload) stream codec.
//!
//! Typed sensor readings are packed into a size-bounded frame for a
//! bandwidth-constrained uplink such as LoRaWAN. Every record is:
//! - A 1-byte channel number
//! - A 1-byte type code (IPSO object ID − 3200)
//! - A fixed-width big-endian payload determined by the type
//!
//! Records are concatenated with no framing, length prefix or checksum; the
//! written bytes of a stream are the frame. A write that does not fit, or whose
//! value cannot be represented, fails without touching the stream.

pub mod batch;
pub mod encoding;
pub mod error;
pub mod stream;
pub mod types;
pub mod value;

pub use batch::{
    pack_frame, pack_frames, send_all, BatchError, PackConfig, PackedFrame, Skipped, Uplink,
    DEFAULT_MAX_FRAME_SIZE,
};
pub use encoding::{Encoding, MAX_PAYLOAD_SIZE};
pub use error::{LppError, Result};
pub use stream::{decode_all, LppStream, Records, StreamBuffer};
pub use types::{LppType, CATALOG, IPSO_OBJECT_ID_BASE, RECORD_HEADER_SIZE};
pub use value::{Record, Value};

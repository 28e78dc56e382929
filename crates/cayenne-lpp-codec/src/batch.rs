//! Caller-side batching of readings into uplink frames.
//!
//! Readings are written in order. When the frame is full the packer stops and
//! the frame is shipped as is; readings the codec rejects are skipped and
//! reported. A reading too large for an empty frame is skipped as well, so
//! [`pack_frames`] always makes progress.

use tracing::{debug, warn};

use crate::error::{LppError, Result};
use crate::stream::LppStream;
use crate::value::Record;

/// Default frame ceiling: the smallest LoRaWAN application payload (51 bytes).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 51;

/// Controls frame packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackConfig {
    /// Maximum frame size in bytes, as negotiated with the network.
    pub max_frame_size: usize,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

/// A reading left out of a frame.
#[derive(Debug)]
pub struct Skipped {
    /// Position of the reading in the input slice.
    pub index: usize,
    pub record: Record,
    pub error: LppError,
}

/// One packed frame.
#[derive(Debug)]
pub struct PackedFrame {
    /// Encoded bytes, ready for the transport.
    pub bytes: Vec<u8>,
    /// Number of records in `bytes`.
    pub encoded: usize,
    /// Number of input readings processed, encoded or skipped.
    pub consumed: usize,
    /// Readings rejected while packing this frame.
    pub skipped: Vec<Skipped>,
}

impl PackedFrame {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Pack as many readings as fit into one frame.
///
/// Stops at the first reading that overflows a non-empty frame; that reading
/// and the ones after it are left for the next frame.
pub fn pack_frame(records: &[Record], config: &PackConfig) -> Result<PackedFrame> {
    let mut stream = LppStream::new(config.max_frame_size)?;
    let mut encoded = 0usize;
    let mut skipped = Vec::new();
    let mut consumed = records.len();

    for (index, record) in records.iter().enumerate() {
        match stream.write_record(record) {
            Ok(()) => encoded += 1,
            Err(LppError::Overflow { required, free }) if !stream.is_empty() => {
                debug!(
                    index,
                    required,
                    free,
                    used = stream.len(),
                    "frame full, deferring remaining readings"
                );
                consumed = index;
                break;
            }
            Err(error) => {
                warn!(
                    index,
                    channel = record.channel,
                    ty = %record.ty,
                    %error,
                    "skipping reading"
                );
                skipped.push(Skipped {
                    index,
                    record: *record,
                    error,
                });
            }
        }
    }

    Ok(PackedFrame {
        bytes: stream.as_bytes().to_vec(),
        encoded,
        consumed,
        skipped,
    })
}

/// Pack every reading, starting a new frame each time one fills up.
///
/// Empty frames (every reading skipped) are not returned. Skipped indices
/// refer to positions in `records`.
pub fn pack_frames(records: &[Record], config: &PackConfig) -> Result<Vec<PackedFrame>> {
    let mut frames = Vec::new();
    let mut offset = 0usize;

    while offset < records.len() {
        let mut frame = pack_frame(&records[offset..], config)?;
        for skip in &mut frame.skipped {
            skip.index += offset;
        }
        offset += frame.consumed;
        if !frame.is_empty() {
            frames.push(frame);
        }
    }

    debug!(frames = frames.len(), readings = records.len(), "packed readings");
    Ok(frames)
}

/// The radio transport below the codec.
pub trait Uplink {
    type Error: std::error::Error + 'static;

    /// Send one frame.
    fn send(&mut self, frame: &[u8]) -> std::result::Result<(), Self::Error>;
}

/// Errors from [`send_all`].
#[derive(Debug, thiserror::Error)]
pub enum BatchError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Codec(#[from] LppError),

    #[error("uplink send failed after {sent} frame(s)")]
    Uplink {
        sent: usize,
        #[source]
        source: E,
    },
}

/// Pack `records` and hand each frame to `uplink`. Returns the frames sent.
pub fn send_all<U: Uplink>(
    uplink: &mut U,
    records: &[Record],
    config: &PackConfig,
) -> std::result::Result<Vec<PackedFrame>, BatchError<U::Error>> {
    let frames = pack_frames(records, config)?;
    for (sent, frame) in frames.iter().enumerate() {
        uplink
            .send(&frame.bytes)
            .map_err(|source| BatchError::Uplink { sent, source })?;
    }
    Ok(frames)
}

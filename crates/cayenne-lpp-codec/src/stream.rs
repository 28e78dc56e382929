use bytes::{Buf, BufMut};
use tracing::{debug, trace};

use crate::encoding::PackError;
use crate::error::{LppError, Result};
use crate::types::{LppType, RECORD_HEADER_SIZE};
use crate::value::{Record, Value};

/// A bounded Cayenne LPP encoding or decoding session.
///
/// The buffer is allocated once, with exactly `capacity` bytes, and never
/// grows. Encoding appends records at the write cursor; decoding consumes
/// records between the read cursor and the write cursor.
#[derive(Debug)]
pub struct LppStream {
    capacity: usize,
    buf: Vec<u8>,
    rd_pos: usize,
}

/// Read-only view of a stream buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamBuffer<'a> {
    /// The written part of the buffer.
    pub data: &'a [u8],
    /// Total buffer capacity in bytes.
    pub capacity: usize,
    /// Bytes written so far (the write cursor).
    pub used: usize,
}

impl LppStream {
    /// Create an empty stream for encoding.
    pub fn new(capacity: usize) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)?;
        trace!(capacity, "created LPP encode stream");
        Ok(Self {
            capacity,
            buf,
            rd_pos: 0,
        })
    }

    /// Create a stream, optionally pre-filled for decoding.
    ///
    /// With `existing`, the bytes are copied in and the stream is considered
    /// fully written; `existing` must be exactly `capacity` bytes long.
    pub fn open(capacity: usize, existing: Option<&[u8]>) -> Result<Self> {
        let mut stream = Self::new(capacity)?;
        if let Some(bytes) = existing {
            if bytes.len() != capacity {
                return Err(LppError::BufferLength {
                    expected: capacity,
                    actual: bytes.len(),
                });
            }
            stream.buf.extend_from_slice(bytes);
            trace!(capacity, "loaded LPP decode stream");
        }
        Ok(stream)
    }

    /// Create a decoding stream over a copy of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::open(bytes.len(), Some(bytes))
    }

    /// Release the stream and its buffer.
    pub fn release(self) {
        trace!(capacity = self.capacity, "released LPP stream");
    }

    /// Rewind both cursors. The buffer is kept, its contents are not cleared.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.rd_pos = 0;
    }

    /// Total buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes still available for encoding.
    pub fn free_space(&self) -> usize {
        self.capacity - self.buf.len()
    }

    /// The written bytes; this is the frame handed to the transport.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Buffer view with capacity and used length.
    pub fn buffer(&self) -> StreamBuffer<'_> {
        StreamBuffer {
            data: &self.buf,
            capacity: self.capacity,
            used: self.buf.len(),
        }
    }

    /// Append one record.
    ///
    /// Checks run in order: type support, free space, value range. The first
    /// failing check returns and the stream is left unchanged.
    pub fn write(&mut self, channel: u8, ty: LppType, value: &Value) -> Result<()> {
        let encoding = ty.encoding().ok_or(LppError::NotImplemented(ty))?;
        if encoding != value.encoding() {
            return Err(LppError::TypeMismatch {
                ty,
                found: value.shape_name(),
            });
        }

        let required = encoding.payload_size() + RECORD_HEADER_SIZE;
        let free = self.free_space();
        if required > free {
            debug!(channel, %ty, required, free, "LPP stream full");
            return Err(LppError::Overflow { required, free });
        }

        let payload = encoding.pack(value).map_err(|err| match err {
            PackError::OutOfRange(v) => LppError::OutOfRange {
                ty,
                value: f64::from(v),
            },
            PackError::Mismatch => LppError::TypeMismatch {
                ty,
                found: value.shape_name(),
            },
        })?;

        self.buf.put_u8(channel);
        self.buf.put_u8(ty.code());
        self.buf.put_slice(payload.as_slice());
        trace!(channel, %ty, used = self.buf.len(), "LPP record written");
        Ok(())
    }

    /// Append a record whose value is written under its default type.
    pub fn write_value(&mut self, channel: u8, value: &Value) -> Result<()> {
        self.write(channel, value.default_type(), value)
    }

    /// Append a record given a raw wire type code.
    pub fn write_code(&mut self, channel: u8, code: u8, value: &Value) -> Result<()> {
        let ty = LppType::try_from(code)?;
        self.write(channel, ty, value)
    }

    /// Append a record.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        self.write(record.channel, record.ty, &record.value)
    }

    /// Decode the next record.
    ///
    /// Returns `Ok(None)` at end of stream. On error the read cursor does
    /// not move.
    pub fn read(&mut self) -> Result<Option<Record>> {
        let mut src = &self.buf[self.rd_pos..];
        if src.is_empty() {
            return Ok(None);
        }
        if src.len() < RECORD_HEADER_SIZE {
            return Err(LppError::Truncated {
                needed: RECORD_HEADER_SIZE,
                available: src.len(),
            });
        }

        let channel = src.get_u8();
        let ty = LppType::try_from(src.get_u8())?;
        let encoding = ty.encoding().ok_or(LppError::NotImplemented(ty))?;
        let size = encoding.payload_size();
        if src.remaining() < size {
            return Err(LppError::Truncated {
                needed: size,
                available: src.remaining(),
            });
        }

        let value = encoding.unpack(&mut src);
        self.rd_pos += RECORD_HEADER_SIZE + size;
        trace!(channel, %ty, rd_pos = self.rd_pos, "LPP record read");
        Ok(Some(Record { channel, ty, value }))
    }

    /// Bytes not yet consumed by [`read`](Self::read).
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.rd_pos
    }

    /// Iterate over the remaining records.
    ///
    /// Iteration stops after the first error.
    pub fn records(&mut self) -> Records<'_> {
        Records {
            stream: self,
            failed: false,
        }
    }
}

/// Iterator returned by [`LppStream::records`].
pub struct Records<'a> {
    stream: &'a mut LppStream,
    failed: bool,
}

impl Iterator for Records<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.stream.read() {
            Ok(record) => record.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Decode every record in `bytes`.
pub fn decode_all(bytes: &[u8]) -> Result<Vec<Record>> {
    LppStream::from_bytes(bytes)?.records().collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const MAX_SIZE: usize = 10;

    fn stream() -> LppStream {
        LppStream::new(MAX_SIZE).unwrap()
    }

    fn encode_one(channel: u8, ty: LppType, value: Value) -> Result<Vec<u8>> {
        let mut stream = stream();
        stream.write(channel, ty, &value)?;
        let view = stream.buffer();
        assert_eq!(view.capacity, MAX_SIZE);
        assert_eq!(view.used, view.data.len());
        Ok(view.data.to_vec())
    }

    #[test]
    fn zero_capacity_stream_is_usable() {
        let mut stream = LppStream::new(0).unwrap();
        assert_eq!(stream.free_space(), 0);
        assert!(matches!(
            stream.write(0, LppType::DigitalInput, &Value::Digital(1)),
            Err(LppError::Overflow {
                required: 3,
                free: 0
            })
        ));
        stream.release();
    }

    #[test]
    fn new_stream_is_empty() {
        let stream = stream();
        let view = stream.buffer();
        assert_eq!(view.capacity, MAX_SIZE);
        assert_eq!(view.used, 0);
        assert!(view.data.is_empty());
        assert_eq!(stream.free_space(), MAX_SIZE);
    }

    #[test]
    fn digital_input_vector() {
        let bytes = encode_one(1, LppType::DigitalInput, Value::Digital(0x05)).unwrap();
        assert_eq!(bytes, [0x01, 0x00, 0x05]);
    }

    #[test]
    fn digital_output_vector() {
        let bytes = encode_one(1, LppType::DigitalOutput, Value::Digital(0x35)).unwrap();
        assert_eq!(bytes, [0x01, 0x01, 0x35]);
    }

    #[test]
    fn analog_vectors() {
        let bytes = encode_one(3, LppType::AnalogInput, Value::Analog(5.0)).unwrap();
        assert_eq!(bytes, [0x03, 0x02, 0x01, 0xf4]);
        let bytes = encode_one(4, LppType::AnalogOutput, Value::Analog(50.0)).unwrap();
        assert_eq!(bytes, [0x04, 0x03, 0x13, 0x88]);
        let bytes = encode_one(0, LppType::AnalogInput, Value::Analog(-1.5)).unwrap();
        assert_eq!(bytes, [0x00, 0x02, 0xff, 0x6a]);
    }

    #[test]
    fn analog_out_of_range() {
        for v in [327.68, -327.69, 1000.0] {
            assert!(matches!(
                encode_one(0, LppType::AnalogInput, Value::Analog(v)),
                Err(LppError::OutOfRange { .. })
            ));
        }
    }

    #[test]
    fn temperature_vectors() {
        let celsius = |celsius| Value::Temperature { celsius };
        let bytes = encode_one(1, LppType::TemperatureSensor, celsius(32.5)).unwrap();
        assert_eq!(bytes, [0x01, 0x67, 0x01, 0x45]);
        let bytes = encode_one(2, LppType::TemperatureSensor, celsius(-4.1)).unwrap();
        assert_eq!(bytes, [0x02, 0x67, 0xff, 0xd7]);
        let bytes = encode_one(2, LppType::TemperatureSensor, celsius(3276.7)).unwrap();
        assert_eq!(bytes, [0x02, 0x67, 0x7f, 0xff]);
    }

    #[test]
    fn temperature_out_of_range() {
        for celsius in [3276.8, -3276.9] {
            assert!(matches!(
                encode_one(0, LppType::TemperatureSensor, Value::Temperature { celsius }),
                Err(LppError::OutOfRange {
                    ty: LppType::TemperatureSensor,
                    ..
                })
            ));
        }
    }

    #[test]
    fn barometer_vectors() {
        let vectors: [(u8, f32, [u8; 4]); 8] = [
            (0, 0.0, [0x00, 0x73, 0x00, 0x00]),
            (1, 100.0, [0x01, 0x73, 0x03, 0xe8]),
            (2, 100.4, [0x02, 0x73, 0x03, 0xec]),
            (3, 100.5, [0x03, 0x73, 0x03, 0xed]),
            (4, 100.6, [0x04, 0x73, 0x03, 0xee]),
            (5, 100.9, [0x05, 0x73, 0x03, 0xf1]),
            (6, 101.0, [0x06, 0x73, 0x03, 0xf2]),
            (7, 6553.5, [0x07, 0x73, 0xff, 0xff]),
        ];

        let mut stream = stream();
        for (channel, hpa, expected) in vectors {
            stream.reset();
            stream
                .write(channel, LppType::Barometer, &Value::Barometer { hpa })
                .unwrap();
            assert_eq!(stream.as_bytes(), expected, "hpa={hpa}");
        }
    }

    #[test]
    fn barometer_out_of_range() {
        for hpa in [6553.551, -0.05] {
            assert!(matches!(
                encode_one(0, LppType::Barometer, Value::Barometer { hpa }),
                Err(LppError::OutOfRange { .. })
            ));
        }
    }

    #[test]
    fn humidity_vectors() {
        let vectors: [(u8, f32, [u8; 3]); 8] = [
            (0, 0.0, [0x00, 0x68, 0x00]),
            (1, 32.0, [0x01, 0x68, 0x40]),
            (2, 32.4, [0x02, 0x68, 0x41]),
            (3, 32.5, [0x03, 0x68, 0x41]),
            (4, 32.6, [0x04, 0x68, 0x41]),
            (5, 32.9, [0x05, 0x68, 0x42]),
            (6, 33.0, [0x06, 0x68, 0x42]),
            (7, 100.0, [0x07, 0x68, 0xc8]),
        ];

        let mut stream = stream();
        for (channel, rh, expected) in vectors {
            stream.reset();
            stream
                .write(channel, LppType::HumiditySensor, &Value::Humidity { rh })
                .unwrap();
            assert_eq!(stream.as_bytes(), expected, "rh={rh}");
        }
    }

    #[test]
    fn humidity_out_of_range() {
        for rh in [100.001, -0.001] {
            assert!(matches!(
                encode_one(0, LppType::HumiditySensor, Value::Humidity { rh }),
                Err(LppError::OutOfRange { .. })
            ));
        }
    }

    #[test]
    fn illuminance_vectors() {
        let vectors: [(u8, f32, [u8; 4]); 8] = [
            (0, 0.0, [0x00, 0x65, 0x00, 0x00]),
            (1, 500.0, [0x01, 0x65, 0x01, 0xf4]),
            (2, 500.4, [0x02, 0x65, 0x01, 0xf4]),
            (3, 500.5, [0x03, 0x65, 0x01, 0xf5]),
            (4, 500.6, [0x04, 0x65, 0x01, 0xf5]),
            (5, 500.9, [0x05, 0x65, 0x01, 0xf5]),
            (6, 501.0, [0x06, 0x65, 0x01, 0xf5]),
            (7, 65535.0, [0x07, 0x65, 0xff, 0xff]),
        ];

        let mut stream = stream();
        for (channel, lux, expected) in vectors {
            stream.reset();
            stream
                .write(
                    channel,
                    LppType::IlluminanceSensor,
                    &Value::Illuminance { lux },
                )
                .unwrap();
            assert_eq!(stream.as_bytes(), expected, "lux={lux}");
        }
    }

    #[test]
    fn illuminance_out_of_range() {
        for lux in [65535.5, -0.5] {
            assert!(matches!(
                encode_one(0, LppType::IlluminanceSensor, Value::Illuminance { lux }),
                Err(LppError::OutOfRange { .. })
            ));
        }
    }

    #[test]
    fn overflow_after_three_digital_records() {
        let mut stream = stream();
        let value = Value::Digital(1);
        for channel in [0, 1, 3] {
            stream.write(channel, LppType::DigitalInput, &value).unwrap();
        }
        assert_eq!(stream.len(), 9);

        let err = stream
            .write(4, LppType::DigitalInput, &value)
            .unwrap_err();
        assert!(matches!(
            err,
            LppError::Overflow {
                required: 3,
                free: 1
            }
        ));
        assert_eq!(stream.len(), 9);
    }

    #[test]
    fn failed_writes_leave_stream_unchanged() {
        let mut stream = stream();
        stream
            .write(1, LppType::TemperatureSensor, &Value::Temperature { celsius: 20.0 })
            .unwrap();
        let before = stream.as_bytes().to_vec();

        let attempts = [
            stream.write(2, LppType::HumiditySensor, &Value::Humidity { rh: 150.0 }),
            stream.write(2, LppType::Voltage, &Value::Analog(3.3)),
            stream.write(2, LppType::Barometer, &Value::Digital(1)),
            stream.write_code(2, 0xfe, &Value::Digital(1)),
            stream.write(
                2,
                LppType::GpsLocation,
                &Value::GpsLocation {
                    latitude: 0.0,
                    longitude: 0.0,
                    altitude: 0.0,
                },
            ),
        ];
        assert!(matches!(attempts[0], Err(LppError::OutOfRange { .. })));
        assert!(matches!(
            attempts[1],
            Err(LppError::NotImplemented(LppType::Voltage))
        ));
        assert!(matches!(attempts[2], Err(LppError::TypeMismatch { .. })));
        assert!(matches!(attempts[3], Err(LppError::UnknownType(0xfe))));
        assert!(matches!(attempts[4], Err(LppError::Overflow { .. })));

        assert_eq!(stream.as_bytes(), before.as_slice());
    }

    #[test]
    fn type_check_precedes_capacity_check() {
        let mut stream = LppStream::new(0).unwrap();
        assert!(matches!(
            stream.write(0, LppType::Voltage, &Value::Analog(1.0)),
            Err(LppError::NotImplemented(_))
        ));
    }

    #[test]
    fn capacity_check_precedes_range_check() {
        let mut stream = LppStream::new(3).unwrap();
        assert!(matches!(
            stream.write(
                0,
                LppType::TemperatureSensor,
                &Value::Temperature { celsius: 9999.0 }
            ),
            Err(LppError::Overflow { .. })
        ));
    }

    #[test]
    fn reset_restores_full_capacity() {
        let mut stream = stream();
        stream.write_value(1, &Value::Digital(7)).unwrap();
        stream.write_value(2, &Value::Analog(1.0)).unwrap();
        stream.reset();
        assert_eq!(stream.free_space(), MAX_SIZE);
        assert_eq!(stream.buffer().used, 0);
        stream.reset();
        assert_eq!(stream.free_space(), MAX_SIZE);
    }

    #[test]
    fn decode_stream_starts_full() {
        let bytes = [0x01, 0x00, 0x05, 0x03, 0x02, 0x01, 0xf4, 0x00, 0x00, 0x00];
        let stream = LppStream::open(bytes.len(), Some(&bytes)).unwrap();
        let view = stream.buffer();
        assert_eq!(view.capacity, 10);
        assert_eq!(view.used, 10);
        assert_eq!(view.data, bytes);
        assert_eq!(stream.free_space(), 0);
    }

    #[test]
    fn zero_length_decode_stream() {
        let mut stream = LppStream::open(0, Some(&[])).unwrap();
        assert!(stream.read().unwrap().is_none());
    }

    #[test]
    fn open_rejects_mismatched_buffer() {
        assert!(matches!(
            LppStream::open(4, Some(&[0x01, 0x00, 0x05])),
            Err(LppError::BufferLength {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn read_decodes_every_implemented_shape() {
        let records = [
            Record::new(1, LppType::DigitalInput, Value::Digital(5)),
            Record::new(2, LppType::DigitalOutput, Value::Digital(0x35)),
            Record::new(3, LppType::AnalogInput, Value::Analog(5.0)),
            Record::new(4, LppType::AnalogOutput, Value::Analog(-12.34)),
            Record::with_default_type(5, Value::Illuminance { lux: 500.0 }),
            Record::with_default_type(6, Value::Temperature { celsius: 32.5 }),
            Record::with_default_type(7, Value::Humidity { rh: 45.5 }),
            Record::with_default_type(
                8,
                Value::Accelerometer {
                    x: 0.012,
                    y: -0.5,
                    z: 1.0,
                },
            ),
            Record::with_default_type(9, Value::Barometer { hpa: 1013.2 }),
            Record::with_default_type(
                10,
                Value::Gyrometer {
                    x: 1.5,
                    y: -2.25,
                    z: 0.0,
                },
            ),
            Record::with_default_type(
                11,
                Value::GpsLocation {
                    latitude: 42.3519,
                    longitude: -87.9094,
                    altitude: 10.0,
                },
            ),
        ];

        let mut encoder = LppStream::new(64).unwrap();
        for record in &records {
            encoder.write_record(record).unwrap();
        }

        let mut decoder = LppStream::from_bytes(encoder.as_bytes()).unwrap();
        for expected in &records {
            let got = decoder.read().unwrap().expect("record expected");
            assert_eq!(got.channel, expected.channel);
            assert_eq!(got.ty, expected.ty);
            assert_values_close(&got.value, &expected.value);
        }
        assert!(decoder.read().unwrap().is_none());
        assert_eq!(decoder.remaining(), 0);
    }

    fn assert_values_close(got: &Value, expected: &Value) {
        match (*got, *expected) {
            (Value::Digital(a), Value::Digital(b)) => assert_eq!(a, b),
            (Value::Analog(a), Value::Analog(b)) => assert_abs_diff_eq!(a, b, epsilon = 0.005),
            (Value::Illuminance { lux: a }, Value::Illuminance { lux: b }) => {
                assert_abs_diff_eq!(a, b, epsilon = 0.5)
            }
            (Value::Temperature { celsius: a }, Value::Temperature { celsius: b }) => {
                assert_abs_diff_eq!(a, b, epsilon = 0.05)
            }
            (Value::Humidity { rh: a }, Value::Humidity { rh: b }) => {
                assert_abs_diff_eq!(a, b, epsilon = 0.25)
            }
            (Value::Barometer { hpa: a }, Value::Barometer { hpa: b }) => {
                assert_abs_diff_eq!(a, b, epsilon = 0.05)
            }
            (
                Value::Accelerometer { x, y, z },
                Value::Accelerometer {
                    x: ex,
                    y: ey,
                    z: ez,
                },
            ) => {
                assert_abs_diff_eq!(x, ex, epsilon = 0.0005);
                assert_abs_diff_eq!(y, ey, epsilon = 0.0005);
                assert_abs_diff_eq!(z, ez, epsilon = 0.0005);
            }
            (
                Value::Gyrometer { x, y, z },
                Value::Gyrometer {
                    x: ex,
                    y: ey,
                    z: ez,
                },
            ) => {
                assert_abs_diff_eq!(x, ex, epsilon = 0.005);
                assert_abs_diff_eq!(y, ey, epsilon = 0.005);
                assert_abs_diff_eq!(z, ez, epsilon = 0.005);
            }
            (
                Value::GpsLocation {
                    latitude,
                    longitude,
                    altitude,
                },
                Value::GpsLocation {
                    latitude: elat,
                    longitude: elon,
                    altitude: ealt,
                },
            ) => {
                assert_abs_diff_eq!(latitude, elat, epsilon = 0.0001);
                assert_abs_diff_eq!(longitude, elon, epsilon = 0.0001);
                assert_abs_diff_eq!(altitude, ealt, epsilon = 0.01);
            }
            (got, expected) => panic!("shape mismatch: {got:?} vs {expected:?}"),
        }
    }

    #[test]
    fn read_rejects_unknown_and_unimplemented_codes() {
        let mut stream = LppStream::from_bytes(&[0x01, 0xfe, 0x00]).unwrap();
        assert!(matches!(stream.read(), Err(LppError::UnknownType(0xfe))));
        assert_eq!(stream.remaining(), 3);

        let mut stream = LppStream::from_bytes(&[0x01, 0x74, 0x00, 0x10]).unwrap();
        assert!(matches!(
            stream.read(),
            Err(LppError::NotImplemented(LppType::Voltage))
        ));
    }

    #[test]
    fn read_detects_truncated_records() {
        let mut stream = LppStream::from_bytes(&[0x01, 0x00, 0x05, 0x02, 0x67, 0x01]).unwrap();
        assert!(stream.read().unwrap().is_some());
        assert!(matches!(
            stream.read(),
            Err(LppError::Truncated {
                needed: 2,
                available: 1
            })
        ));
        assert_eq!(stream.remaining(), 3);

        let mut stream = LppStream::from_bytes(&[0x01]).unwrap();
        assert!(matches!(stream.read(), Err(LppError::Truncated { .. })));
    }

    #[test]
    fn reset_rewinds_read_cursor_of_encoder() {
        let mut stream = stream();
        stream.write_value(1, &Value::Digital(9)).unwrap();
        assert_eq!(stream.read().unwrap().unwrap().value, Value::Digital(9));
        assert!(stream.read().unwrap().is_none());
        stream.reset();
        assert!(stream.read().unwrap().is_none());
    }

    #[test]
    fn records_iterator_stops_after_error() {
        let mut stream = LppStream::from_bytes(&[0x01, 0x00, 0x05, 0x02, 0xfe]).unwrap();
        let results: Vec<_> = stream.records().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn decode_all_collects_records() {
        let records = decode_all(&[0x01, 0x67, 0x01, 0x45, 0x00, 0x68, 0xc8]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ty, LppType::TemperatureSensor);
        assert_eq!(records[1].value, Value::Humidity { rh: 100.0 });
    }
}

//! Per-type payload layouts and fixed-point conversions.
//!
//! Payloads are big-endian. Scaled values are rounded half away from zero and
//! must fit both the physical range of the type and the integer width on the
//! wire.

use bytes::{Buf, BufMut};

use crate::types::LppType;
use crate::value::Value;

/// Largest payload of any implemented type (GPS: three 24-bit fields).
pub const MAX_PAYLOAD_SIZE: usize = 9;

/// Wire layout of an implemented type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Digital,
    Analog,
    Illuminance,
    Temperature,
    Humidity,
    Accelerometer,
    Barometer,
    Gyrometer,
    GpsLocation,
}

/// Physical range and resolution of one scalar field.
#[derive(Debug, Clone, Copy)]
struct Scale {
    factor: f64,
    min: f32,
    max: f32,
}

const ANALOG: Scale = Scale {
    factor: 100.0,
    min: -327.68,
    max: 327.67,
};
const ILLUMINANCE: Scale = Scale {
    factor: 1.0,
    min: 0.0,
    max: 65535.0,
};
const TEMPERATURE: Scale = Scale {
    factor: 10.0,
    min: -3276.8,
    max: 3276.7,
};
const HUMIDITY: Scale = Scale {
    factor: 2.0,
    min: 0.0,
    max: 100.0,
};
const ACCELEROMETER: Scale = Scale {
    factor: 1000.0,
    min: -32.768,
    max: 32.767,
};
const BAROMETER: Scale = Scale {
    factor: 10.0,
    min: 0.0,
    max: 6553.5,
};
const GYROMETER: Scale = Scale {
    factor: 100.0,
    min: -327.68,
    max: 327.67,
};
const LATITUDE: Scale = Scale {
    factor: 10_000.0,
    min: -90.0,
    max: 90.0,
};
const LONGITUDE: Scale = Scale {
    factor: 10_000.0,
    min: -180.0,
    max: 180.0,
};
const ALTITUDE: Scale = Scale {
    factor: 100.0,
    min: -83_886.08,
    max: 83_886.07,
};

const I24_MIN: i64 = -(1 << 23);
const I24_MAX: i64 = (1 << 23) - 1;

impl Scale {
    fn to_fixed(self, value: f32) -> Option<i64> {
        if !value.is_finite() || value < self.min || value > self.max {
            return None;
        }
        Some((f64::from(value) * self.factor).round() as i64)
    }

    fn from_fixed(self, raw: i64) -> f32 {
        (raw as f64 / self.factor) as f32
    }

    fn to_i16(self, value: f32) -> Option<i16> {
        self.to_fixed(value).and_then(|raw| i16::try_from(raw).ok())
    }

    fn to_u16(self, value: f32) -> Option<u16> {
        self.to_fixed(value).and_then(|raw| u16::try_from(raw).ok())
    }

    fn to_u8(self, value: f32) -> Option<u8> {
        self.to_fixed(value).and_then(|raw| u8::try_from(raw).ok())
    }

    fn to_i24(self, value: f32) -> Option<i64> {
        self.to_fixed(value)
            .filter(|raw| (I24_MIN..=I24_MAX).contains(raw))
    }
}

/// A fully validated payload, ready to be appended after the record header.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Payload {
    bytes: [u8; MAX_PAYLOAD_SIZE],
    len: usize,
}

impl Payload {
    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Why a value could not be packed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PackError {
    Mismatch,
    OutOfRange(f32),
}

impl Encoding {
    /// Payload width in bytes.
    pub const fn payload_size(self) -> usize {
        match self {
            Encoding::Digital | Encoding::Humidity => 1,
            Encoding::Analog
            | Encoding::Illuminance
            | Encoding::Temperature
            | Encoding::Barometer => 2,
            Encoding::Accelerometer | Encoding::Gyrometer => 6,
            Encoding::GpsLocation => 9,
        }
    }

    /// Validate `value` against this layout and pack it.
    ///
    /// Nothing is written to the stream here; the caller appends the payload
    /// only once every field has passed its range check.
    pub(crate) fn pack(self, value: &Value) -> Result<Payload, PackError> {
        let mut payload = Payload {
            bytes: [0; MAX_PAYLOAD_SIZE],
            len: self.payload_size(),
        };
        let mut dst = &mut payload.bytes[..];

        match (self, *value) {
            (Encoding::Digital, Value::Digital(raw)) => dst.put_u8(raw),
            (Encoding::Analog, Value::Analog(v)) => dst.put_i16(field(ANALOG.to_i16(v), v)?),
            (Encoding::Illuminance, Value::Illuminance { lux }) => {
                dst.put_u16(field(ILLUMINANCE.to_u16(lux), lux)?)
            }
            (Encoding::Temperature, Value::Temperature { celsius }) => {
                dst.put_i16(field(TEMPERATURE.to_i16(celsius), celsius)?)
            }
            (Encoding::Humidity, Value::Humidity { rh }) => {
                dst.put_u8(field(HUMIDITY.to_u8(rh), rh)?)
            }
            (Encoding::Accelerometer, Value::Accelerometer { x, y, z }) => {
                for axis in [x, y, z] {
                    dst.put_i16(field(ACCELEROMETER.to_i16(axis), axis)?);
                }
            }
            (Encoding::Barometer, Value::Barometer { hpa }) => {
                dst.put_u16(field(BAROMETER.to_u16(hpa), hpa)?)
            }
            (Encoding::Gyrometer, Value::Gyrometer { x, y, z }) => {
                for axis in [x, y, z] {
                    dst.put_i16(field(GYROMETER.to_i16(axis), axis)?);
                }
            }
            (
                Encoding::GpsLocation,
                Value::GpsLocation {
                    latitude,
                    longitude,
                    altitude,
                },
            ) => {
                let lat = field(LATITUDE.to_i24(latitude), latitude)?;
                let lon = field(LONGITUDE.to_i24(longitude), longitude)?;
                let alt = field(ALTITUDE.to_i24(altitude), altitude)?;
                dst.put_int(lat, 3);
                dst.put_int(lon, 3);
                dst.put_int(alt, 3);
            }
            _ => return Err(PackError::Mismatch),
        }

        Ok(payload)
    }

    /// Unpack a payload. `src` must hold at least `payload_size()` bytes.
    pub(crate) fn unpack(self, src: &mut impl Buf) -> Value {
        match self {
            Encoding::Digital => Value::Digital(src.get_u8()),
            Encoding::Analog => Value::Analog(ANALOG.from_fixed(src.get_i16().into())),
            Encoding::Illuminance => Value::Illuminance {
                lux: ILLUMINANCE.from_fixed(src.get_u16().into()),
            },
            Encoding::Temperature => Value::Temperature {
                celsius: TEMPERATURE.from_fixed(src.get_i16().into()),
            },
            Encoding::Humidity => Value::Humidity {
                rh: HUMIDITY.from_fixed(src.get_u8().into()),
            },
            Encoding::Accelerometer => Value::Accelerometer {
                x: ACCELEROMETER.from_fixed(src.get_i16().into()),
                y: ACCELEROMETER.from_fixed(src.get_i16().into()),
                z: ACCELEROMETER.from_fixed(src.get_i16().into()),
            },
            Encoding::Barometer => Value::Barometer {
                hpa: BAROMETER.from_fixed(src.get_u16().into()),
            },
            Encoding::Gyrometer => Value::Gyrometer {
                x: GYROMETER.from_fixed(src.get_i16().into()),
                y: GYROMETER.from_fixed(src.get_i16().into()),
                z: GYROMETER.from_fixed(src.get_i16().into()),
            },
            Encoding::GpsLocation => Value::GpsLocation {
                latitude: LATITUDE.from_fixed(get_i24(src)),
                longitude: LONGITUDE.from_fixed(get_i24(src)),
                altitude: ALTITUDE.from_fixed(get_i24(src)),
            },
        }
    }

    /// Types sharing this layout, in catalog order.
    pub fn types(self) -> impl Iterator<Item = LppType> {
        crate::types::CATALOG
            .iter()
            .copied()
            .filter(move |ty| ty.encoding() == Some(self))
    }
}

fn field<T>(fixed: Option<T>, value: f32) -> Result<T, PackError> {
    fixed.ok_or(PackError::OutOfRange(value))
}

fn get_i24(src: &mut impl Buf) -> i64 {
    // Sign-extend from bit 23.
    let raw = src.get_uint(3) as i64;
    (raw << 40) >> 40
}

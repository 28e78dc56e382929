use std::fmt;

use crate::encoding::Encoding;
use crate::types::LppType;

/// A physical reading in the unit of its LPP type.
///
/// Digital values are shared by digital input and output, analog values by
/// analog input and output. Every other shape belongs to exactly one type.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Value {
    /// Raw byte, copied verbatim.
    Digital(u8),
    /// 0.01 resolution, signed.
    Analog(f32),
    /// Lux, 1 lux resolution.
    Illuminance { lux: f32 },
    /// Degrees Celsius, 0.1 resolution.
    Temperature { celsius: f32 },
    /// Relative humidity in percent, 0.5 resolution.
    Humidity { rh: f32 },
    /// G per axis, 0.001 resolution.
    Accelerometer { x: f32, y: f32, z: f32 },
    /// Hectopascal, 0.1 resolution.
    Barometer { hpa: f32 },
    /// Degrees per second per axis, 0.01 resolution.
    Gyrometer { x: f32, y: f32, z: f32 },
    /// Degrees (0.0001) and metres (0.01).
    GpsLocation {
        latitude: f32,
        longitude: f32,
        altitude: f32,
    },
}

impl Value {
    /// The layout this value is packed with.
    pub const fn encoding(&self) -> Encoding {
        match self {
            Value::Digital(_) => Encoding::Digital,
            Value::Analog(_) => Encoding::Analog,
            Value::Illuminance { .. } => Encoding::Illuminance,
            Value::Temperature { .. } => Encoding::Temperature,
            Value::Humidity { .. } => Encoding::Humidity,
            Value::Accelerometer { .. } => Encoding::Accelerometer,
            Value::Barometer { .. } => Encoding::Barometer,
            Value::Gyrometer { .. } => Encoding::Gyrometer,
            Value::GpsLocation { .. } => Encoding::GpsLocation,
        }
    }

    /// The type a value of this shape is written as by default.
    ///
    /// Digital and analog values default to the input variant.
    pub const fn default_type(&self) -> LppType {
        match self {
            Value::Digital(_) => LppType::DigitalInput,
            Value::Analog(_) => LppType::AnalogInput,
            Value::Illuminance { .. } => LppType::IlluminanceSensor,
            Value::Temperature { .. } => LppType::TemperatureSensor,
            Value::Humidity { .. } => LppType::HumiditySensor,
            Value::Accelerometer { .. } => LppType::Accelerometer,
            Value::Barometer { .. } => LppType::Barometer,
            Value::Gyrometer { .. } => LppType::Gyrometer,
            Value::GpsLocation { .. } => LppType::GpsLocation,
        }
    }

    /// Short shape name for diagnostics.
    pub const fn shape_name(&self) -> &'static str {
        match self {
            Value::Digital(_) => "digital",
            Value::Analog(_) => "analog",
            Value::Illuminance { .. } => "illuminance",
            Value::Temperature { .. } => "temperature",
            Value::Humidity { .. } => "humidity",
            Value::Accelerometer { .. } => "accelerometer",
            Value::Barometer { .. } => "barometer",
            Value::Gyrometer { .. } => "gyrometer",
            Value::GpsLocation { .. } => "gps_location",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Digital(raw) => write!(f, "{raw}"),
            Value::Analog(v) => write!(f, "{v:.2}"),
            Value::Illuminance { lux } => write!(f, "{lux:.0} lx"),
            Value::Temperature { celsius } => write!(f, "{celsius:.1} °C"),
            Value::Humidity { rh } => write!(f, "{rh:.1} %RH"),
            Value::Accelerometer { x, y, z } => write!(f, "x={x:.3} y={y:.3} z={z:.3} G"),
            Value::Barometer { hpa } => write!(f, "{hpa:.1} hPa"),
            Value::Gyrometer { x, y, z } => write!(f, "x={x:.2} y={y:.2} z={z:.2} °/s"),
            Value::GpsLocation {
                latitude,
                longitude,
                altitude,
            } => write!(f, "lat={latitude:.4} lon={longitude:.4} alt={altitude:.2} m"),
        }
    }
}

/// One decoded (channel, type, value) triple.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    pub channel: u8,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub ty: LppType,
    pub value: Value,
}

impl Record {
    /// Create a record.
    pub fn new(channel: u8, ty: LppType, value: Value) -> Self {
        Self { channel, ty, value }
    }

    /// Record for `value` under its default type.
    pub fn with_default_type(channel: u8, value: Value) -> Self {
        Self::new(channel, value.default_type(), value)
    }

    /// The total wire size of this record, if its type is implemented.
    pub fn wire_size(&self) -> Option<usize> {
        self.ty.record_size()
    }
}

use cayenne_lpp_codec::{Encoding, LppStream, Value};

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CayenneLppResult {
    Success = 0,
    UnknownType = 1,
    NotImplemented = 2,
    Overflow = 3,
    EndOfStream = 4,
    OutOfRange = 5,
    InvalidArgument = 6,
    Truncated = 7,
    Internal = 99,
}

/// Opaque stream handle owned by C callers.
pub struct CayenneLppStream {
    pub(crate) inner: LppStream,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct CayenneLppIlluminance {
    pub lux: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct CayenneLppTemperature {
    pub celsius: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct CayenneLppHumidity {
    pub rh: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct CayenneLppBarometer {
    pub hpa: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct CayenneLppXyz {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct CayenneLppGps {
    pub latitude: f32,
    pub longitude: f32,
    pub altitude: f32,
}

/// Value union; the active field is selected by the type code passed with it.
#[repr(C)]
#[derive(Clone, Copy)]
pub union CayenneLppValue {
    pub digital_input: u8,
    pub digital_output: u8,
    pub analog_input: f32,
    pub analog_output: f32,
    pub illuminance_sensor: CayenneLppIlluminance,
    pub temperature_sensor: CayenneLppTemperature,
    pub humidity_sensor: CayenneLppHumidity,
    pub accelerometer: CayenneLppXyz,
    pub barometer: CayenneLppBarometer,
    pub gyrometer: CayenneLppXyz,
    pub gps_location: CayenneLppGps,
}

impl Default for CayenneLppValue {
    fn default() -> Self {
        Self {
            gps_location: CayenneLppGps::default(),
        }
    }
}

impl CayenneLppValue {
    /// Read the field selected by `encoding`.
    ///
    /// # Safety
    /// The caller must have initialised the field that `encoding` selects.
    pub(crate) unsafe fn to_value(self, encoding: Encoding) -> Value {
        // SAFETY: Field validity is guaranteed by the caller.
        unsafe {
            match encoding {
                Encoding::Digital => Value::Digital(self.digital_input),
                Encoding::Analog => Value::Analog(self.analog_input),
                Encoding::Illuminance => Value::Illuminance {
                    lux: self.illuminance_sensor.lux,
                },
                Encoding::Temperature => Value::Temperature {
                    celsius: self.temperature_sensor.celsius,
                },
                Encoding::Humidity => Value::Humidity {
                    rh: self.humidity_sensor.rh,
                },
                Encoding::Accelerometer => {
                    let CayenneLppXyz { x, y, z } = self.accelerometer;
                    Value::Accelerometer { x, y, z }
                }
                Encoding::Barometer => Value::Barometer {
                    hpa: self.barometer.hpa,
                },
                Encoding::Gyrometer => {
                    let CayenneLppXyz { x, y, z } = self.gyrometer;
                    Value::Gyrometer { x, y, z }
                }
                Encoding::GpsLocation => {
                    let CayenneLppGps {
                        latitude,
                        longitude,
                        altitude,
                    } = self.gps_location;
                    Value::GpsLocation {
                        latitude,
                        longitude,
                        altitude,
                    }
                }
            }
        }
    }
}

impl From<Value> for CayenneLppValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Digital(raw) => Self { digital_input: raw },
            Value::Analog(v) => Self { analog_input: v },
            Value::Illuminance { lux } => Self {
                illuminance_sensor: CayenneLppIlluminance { lux },
            },
            Value::Temperature { celsius } => Self {
                temperature_sensor: CayenneLppTemperature { celsius },
            },
            Value::Humidity { rh } => Self {
                humidity_sensor: CayenneLppHumidity { rh },
            },
            Value::Accelerometer { x, y, z } => Self {
                accelerometer: CayenneLppXyz { x, y, z },
            },
            Value::Barometer { hpa } => Self {
                barometer: CayenneLppBarometer { hpa },
            },
            Value::Gyrometer { x, y, z } => Self {
                gyrometer: CayenneLppXyz { x, y, z },
            },
            Value::GpsLocation {
                latitude,
                longitude,
                altitude,
            } => Self {
                gps_location: CayenneLppGps {
                    latitude,
                    longitude,
                    altitude,
                },
            },
        }
    }
}

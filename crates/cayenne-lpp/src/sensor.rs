//! Mapping from sensor channels to LPP records.
//!
//! A node reports samples per sensor channel (kind plus instance index). Each
//! kind maps to one LPP type; the channel number on the wire is the instance
//! index, except for die temperature which is moved to `index + 0x80` so it
//! never collides with an ambient temperature sensor.

use cayenne_lpp_codec::{Encoding, LppType, Record, Value};

/// Offset added to the instance index of die temperature channels.
pub const DIE_TEMP_CHANNEL_OFFSET: u8 = 0x80;

/// Errors raised while turning a sample into a record.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("{kind} expects a {expected} sample")]
    ShapeMismatch {
        kind: &'static str,
        expected: &'static str,
    },

    #[error("die temperature index {0} does not fit an LPP channel")]
    ChannelOverflow(u8),

    #[error("digital value {0} is not a byte")]
    NotAByte(f32),
}

/// Sensor channel kinds reported by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SensorKind {
    AmbientTemp,
    DieTemp,
    Light,
    Humidity,
    /// Hectopascal.
    Pressure,
    GasResistance,
    AccelXyz,
    GyroXyz,
}

impl SensorKind {
    /// LPP type the kind is reported as, `None` for kinds with no LPP mapping.
    pub const fn lpp_type(self) -> Option<LppType> {
        match self {
            SensorKind::AmbientTemp | SensorKind::DieTemp => Some(LppType::TemperatureSensor),
            SensorKind::Light => Some(LppType::IlluminanceSensor),
            SensorKind::Humidity => Some(LppType::HumiditySensor),
            SensorKind::Pressure => Some(LppType::Barometer),
            SensorKind::GasResistance => None,
            SensorKind::AccelXyz => Some(LppType::Accelerometer),
            SensorKind::GyroXyz => Some(LppType::Gyrometer),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            SensorKind::AmbientTemp => "Ambient Temperature",
            SensorKind::DieTemp => "Die Temperature",
            SensorKind::Light => "Illuminance",
            SensorKind::Humidity => "Humidity",
            SensorKind::Pressure => "Pressure",
            SensorKind::GasResistance => "Gas Resistance",
            SensorKind::AccelXyz => "Acceleration",
            SensorKind::GyroXyz => "Angular Velocity",
        }
    }

    /// LPP channel for instance `index` of this kind.
    pub fn channel(self, index: u8) -> Result<u8, SensorError> {
        match self {
            SensorKind::DieTemp => index
                .checked_add(DIE_TEMP_CHANNEL_OFFSET)
                .ok_or(SensorError::ChannelOverflow(index)),
            _ => Ok(index),
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw sample payload: one reading or one per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum SampleValue {
    Scalar(f32),
    Vector([f32; 3]),
}

impl SampleValue {
    fn shape(&self) -> &'static str {
        match self {
            SampleValue::Scalar(_) => "scalar",
            SampleValue::Vector(_) => "vector",
        }
    }

    /// Build the codec value for `encoding` from this sample.
    ///
    /// GPS samples are `[latitude, longitude, altitude]`.
    pub fn to_value(self, encoding: Encoding) -> Result<Value, SensorError> {
        let value = match (encoding, self) {
            (Encoding::Digital, SampleValue::Scalar(v)) => {
                if v.fract() != 0.0 || !(0.0..=255.0).contains(&v) {
                    return Err(SensorError::NotAByte(v));
                }
                Value::Digital(v as u8)
            }
            (Encoding::Analog, SampleValue::Scalar(v)) => Value::Analog(v),
            (Encoding::Illuminance, SampleValue::Scalar(lux)) => Value::Illuminance { lux },
            (Encoding::Temperature, SampleValue::Scalar(celsius)) => {
                Value::Temperature { celsius }
            }
            (Encoding::Humidity, SampleValue::Scalar(rh)) => Value::Humidity { rh },
            (Encoding::Barometer, SampleValue::Scalar(hpa)) => Value::Barometer { hpa },
            (Encoding::Accelerometer, SampleValue::Vector([x, y, z])) => {
                Value::Accelerometer { x, y, z }
            }
            (Encoding::Gyrometer, SampleValue::Vector([x, y, z])) => Value::Gyrometer { x, y, z },
            (Encoding::GpsLocation, SampleValue::Vector([latitude, longitude, altitude])) => {
                Value::GpsLocation {
                    latitude,
                    longitude,
                    altitude,
                }
            }
            (encoding, sample) => {
                return Err(SensorError::ShapeMismatch {
                    kind: encoding_label(encoding),
                    expected: opposite(sample.shape()),
                })
            }
        };
        Ok(value)
    }
}

fn encoding_label(encoding: Encoding) -> &'static str {
    match encoding {
        Encoding::Digital => "digital",
        Encoding::Analog => "analog",
        Encoding::Illuminance => "illuminance",
        Encoding::Temperature => "temperature",
        Encoding::Humidity => "humidity",
        Encoding::Accelerometer => "accelerometer",
        Encoding::Barometer => "barometer",
        Encoding::Gyrometer => "gyrometer",
        Encoding::GpsLocation => "gps_location",
    }
}

fn opposite(shape: &'static str) -> &'static str {
    if shape == "scalar" {
        "vector"
    } else {
        "scalar"
    }
}

/// One sample from one sensor channel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorSample {
    #[cfg_attr(feature = "serde", serde(rename = "sensor"))]
    pub kind: SensorKind,
    /// Instance index of the sensor channel.
    #[cfg_attr(feature = "serde", serde(default))]
    pub index: u8,
    pub value: SampleValue,
}

impl SensorSample {
    pub fn new(kind: SensorKind, index: u8, value: SampleValue) -> Self {
        Self { kind, index, value }
    }

    /// LPP record for this sample, `None` when the kind is not reported.
    pub fn to_record(&self) -> Result<Option<Record>, SensorError> {
        let Some(ty) = self.kind.lpp_type() else {
            return Ok(None);
        };
        let Some(encoding) = ty.encoding() else {
            return Ok(None);
        };
        let value = self
            .value
            .to_value(encoding)
            .map_err(|err| match err {
                SensorError::ShapeMismatch { expected, .. } => SensorError::ShapeMismatch {
                    kind: self.kind.label(),
                    expected,
                },
                other => other,
            })?;
        let channel = self.kind.channel(self.index)?;
        Ok(Some(Record::new(channel, ty, value)))
    }
}

/// Map samples to records, dropping kinds with no LPP mapping.
pub fn to_records(samples: &[SensorSample]) -> Result<Vec<Record>, SensorError> {
    let mut records = Vec::with_capacity(samples.len());
    for sample in samples {
        if let Some(record) = sample.to_record()? {
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use cayenne_lpp_codec::LppStream;

    use super::*;

    #[test]
    fn ambient_and_die_temperature_use_distinct_channels() {
        let ambient = SensorSample::new(SensorKind::AmbientTemp, 0, SampleValue::Scalar(21.5));
        let die = SensorSample::new(SensorKind::DieTemp, 0, SampleValue::Scalar(40.0));

        let ambient = ambient.to_record().unwrap().unwrap();
        let die = die.to_record().unwrap().unwrap();
        assert_eq!(ambient.channel, 0);
        assert_eq!(die.channel, 0x80);
        assert_eq!(die.ty, LppType::TemperatureSensor);
    }

    #[test]
    fn die_temperature_index_overflow_is_rejected() {
        let sample = SensorSample::new(SensorKind::DieTemp, 0x80, SampleValue::Scalar(40.0));
        assert!(matches!(
            sample.to_record(),
            Err(SensorError::ChannelOverflow(0x80))
        ));
    }

    #[test]
    fn gas_resistance_is_not_reported() {
        let sample = SensorSample::new(SensorKind::GasResistance, 0, SampleValue::Scalar(1200.0));
        assert_eq!(sample.to_record().unwrap(), None);
    }

    #[test]
    fn vector_kinds_need_vector_samples() {
        let sample = SensorSample::new(SensorKind::AccelXyz, 1, SampleValue::Scalar(1.0));
        let err = sample.to_record().unwrap_err();
        assert_eq!(err.to_string(), "Acceleration expects a vector sample");

        let sample = SensorSample::new(SensorKind::GyroXyz, 1, SampleValue::Vector([1.0, 2.0, 3.0]));
        let record = sample.to_record().unwrap().unwrap();
        assert_eq!(
            record.value,
            Value::Gyrometer {
                x: 1.0,
                y: 2.0,
                z: 3.0
            }
        );
    }

    #[test]
    fn digital_samples_must_be_whole_bytes() {
        assert_eq!(
            SampleValue::Scalar(53.0).to_value(Encoding::Digital).unwrap(),
            Value::Digital(53)
        );
        assert!(matches!(
            SampleValue::Scalar(1.5).to_value(Encoding::Digital),
            Err(SensorError::NotAByte(_))
        ));
        assert!(matches!(
            SampleValue::Scalar(256.0).to_value(Encoding::Digital),
            Err(SensorError::NotAByte(_))
        ));
    }

    #[test]
    fn samples_encode_like_the_node_reports_them() {
        let samples = [
            SensorSample::new(SensorKind::AmbientTemp, 3, SampleValue::Scalar(27.2)),
            SensorSample::new(SensorKind::GasResistance, 0, SampleValue::Scalar(9.0)),
            SensorSample::new(SensorKind::Humidity, 5, SampleValue::Scalar(41.5)),
        ];
        let records = to_records(&samples).unwrap();
        assert_eq!(records.len(), 2);

        let mut stream = LppStream::new(16).unwrap();
        for record in &records {
            stream.write_record(record).unwrap();
        }
        assert_eq!(stream.as_bytes(), [0x03, 0x67, 0x01, 0x10, 0x05, 0x68, 0x53]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_scalar_and_vector_samples() {
        let samples: Vec<SensorSample> = serde_json::from_str(
            r#"[
                {"sensor": "pressure", "index": 1, "value": 1013.2},
                {"sensor": "accel_xyz", "value": [0.0, 0.0, 1.0]}
            ]"#,
        )
        .unwrap();
        assert_eq!(samples[0].kind, SensorKind::Pressure);
        assert_eq!(samples[0].value, SampleValue::Scalar(1013.2));
        assert_eq!(samples[1].index, 0);
        assert_eq!(samples[1].value, SampleValue::Vector([0.0, 0.0, 1.0]));
    }
}

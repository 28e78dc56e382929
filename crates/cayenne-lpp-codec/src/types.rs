//! The IPSO object catalog and its Cayenne LPP type codes.
//!
//! A Cayenne LPP type code is the IPSO object ID minus [`IPSO_OBJECT_ID_BASE`].
//! Every catalog entry is recognised; only some of them have an
//! [`Encoding`](crate::encoding::Encoding) attached.

use std::fmt;

use crate::encoding::Encoding;
use crate::error::{LppError, Result};

/// Offset between IPSO object IDs and LPP type codes.
pub const IPSO_OBJECT_ID_BASE: u16 = 3200;

/// Record overhead: one channel byte plus one type byte.
pub const RECORD_HEADER_SIZE: usize = 2;

/// An LPP data type, one per IPSO object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[repr(u8)]
pub enum LppType {
    // Starter pack.
    DigitalInput = 0,
    DigitalOutput = 1,
    AnalogInput = 2,
    AnalogOutput = 3,
    GenericSensor = 100,
    IlluminanceSensor = 101,
    PresenceSensor = 102,
    TemperatureSensor = 103,
    HumiditySensor = 104,
    PowerMeasurement = 105,
    Actuation = 106,
    SetPoint = 108,
    LoadControl = 110,
    LightControl = 111,
    PowerControl = 112,
    Accelerometer = 113,
    Magnetometer = 114,
    Barometer = 115,
    // Expansion pack.
    Voltage = 116,
    Current = 117,
    Frequency = 118,
    Depth = 119,
    Percentage = 120,
    Altitude = 121,
    Load = 122,
    Pressure = 123,
    Loudness = 124,
    Concentration = 125,
    Acidity = 126,
    Conductivity = 127,
    Power = 128,
    PowerFactor = 129,
    Distance = 130,
    Energy = 131,
    Direction = 132,
    Time = 133,
    Gyrometer = 134,
    Color = 135,
    GpsLocation = 136,
    Positioner = 137,
    Buzzer = 138,
    AudioClip = 139,
    Timer = 140,
    AddrTextDisplay = 141,
    OnOffSwitch = 142,
    LevelControl = 143,
    UpDownControl = 144,
    MultiAxisJoystick = 145,
    Rate = 146,
    PushButton = 147,
    MultistateSelector = 148,
}

/// Every catalog entry, ordered by type code.
pub const CATALOG: &[LppType] = &[
    LppType::DigitalInput,
    LppType::DigitalOutput,
    LppType::AnalogInput,
    LppType::AnalogOutput,
    LppType::GenericSensor,
    LppType::IlluminanceSensor,
    LppType::PresenceSensor,
    LppType::TemperatureSensor,
    LppType::HumiditySensor,
    LppType::PowerMeasurement,
    LppType::Actuation,
    LppType::SetPoint,
    LppType::LoadControl,
    LppType::LightControl,
    LppType::PowerControl,
    LppType::Accelerometer,
    LppType::Magnetometer,
    LppType::Barometer,
    LppType::Voltage,
    LppType::Current,
    LppType::Frequency,
    LppType::Depth,
    LppType::Percentage,
    LppType::Altitude,
    LppType::Load,
    LppType::Pressure,
    LppType::Loudness,
    LppType::Concentration,
    LppType::Acidity,
    LppType::Conductivity,
    LppType::Power,
    LppType::PowerFactor,
    LppType::Distance,
    LppType::Energy,
    LppType::Direction,
    LppType::Time,
    LppType::Gyrometer,
    LppType::Color,
    LppType::GpsLocation,
    LppType::Positioner,
    LppType::Buzzer,
    LppType::AudioClip,
    LppType::Timer,
    LppType::AddrTextDisplay,
    LppType::OnOffSwitch,
    LppType::LevelControl,
    LppType::UpDownControl,
    LppType::MultiAxisJoystick,
    LppType::Rate,
    LppType::PushButton,
    LppType::MultistateSelector,
];

impl LppType {
    /// The one-byte type code written on the wire.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// The IPSO object ID this type is derived from.
    pub const fn ipso_object_id(self) -> u16 {
        IPSO_OBJECT_ID_BASE + self as u16
    }

    /// Look up a type by its IPSO object ID.
    pub fn from_ipso_object_id(id: u16) -> Option<Self> {
        id.checked_sub(IPSO_OBJECT_ID_BASE)
            .and_then(|code| u8::try_from(code).ok())
            .and_then(|code| Self::try_from(code).ok())
    }

    /// The wire encoding of this type, if one exists.
    pub const fn encoding(self) -> Option<Encoding> {
        use LppType::*;
        match self {
            DigitalInput | DigitalOutput => Some(Encoding::Digital),
            AnalogInput | AnalogOutput => Some(Encoding::Analog),
            IlluminanceSensor => Some(Encoding::Illuminance),
            TemperatureSensor => Some(Encoding::Temperature),
            HumiditySensor => Some(Encoding::Humidity),
            Accelerometer => Some(Encoding::Accelerometer),
            Barometer => Some(Encoding::Barometer),
            Gyrometer => Some(Encoding::Gyrometer),
            GpsLocation => Some(Encoding::GpsLocation),
            GenericSensor | PresenceSensor | PowerMeasurement | Actuation | SetPoint
            | LoadControl | LightControl | PowerControl | Magnetometer | Voltage | Current
            | Frequency | Depth | Percentage | Altitude | Load | Pressure | Loudness
            | Concentration | Acidity | Conductivity | Power | PowerFactor | Distance | Energy
            | Direction | Time | Color | Positioner | Buzzer | AudioClip | Timer
            | AddrTextDisplay | OnOffSwitch | LevelControl | UpDownControl | MultiAxisJoystick
            | Rate | PushButton | MultistateSelector => None,
        }
    }

    /// Whether records of this type can be encoded and decoded.
    pub const fn is_implemented(self) -> bool {
        self.encoding().is_some()
    }

    /// Payload width in bytes, excluding the record header.
    pub fn payload_size(self) -> Option<usize> {
        self.encoding().map(Encoding::payload_size)
    }

    /// Full record width in bytes, including channel and type bytes.
    pub fn record_size(self) -> Option<usize> {
        self.payload_size().map(|size| size + RECORD_HEADER_SIZE)
    }

    /// Snake-case name used in logs, JSON and tables.
    pub const fn name(self) -> &'static str {
        use LppType::*;
        match self {
            DigitalInput => "digital_input",
            DigitalOutput => "digital_output",
            AnalogInput => "analog_input",
            AnalogOutput => "analog_output",
            GenericSensor => "generic_sensor",
            IlluminanceSensor => "illuminance_sensor",
            PresenceSensor => "presence_sensor",
            TemperatureSensor => "temperature_sensor",
            HumiditySensor => "humidity_sensor",
            PowerMeasurement => "power_measurement",
            Actuation => "actuation",
            SetPoint => "set_point",
            LoadControl => "load_control",
            LightControl => "light_control",
            PowerControl => "power_control",
            Accelerometer => "accelerometer",
            Magnetometer => "magnetometer",
            Barometer => "barometer",
            Voltage => "voltage",
            Current => "current",
            Frequency => "frequency",
            Depth => "depth",
            Percentage => "percentage",
            Altitude => "altitude",
            Load => "load",
            Pressure => "pressure",
            Loudness => "loudness",
            Concentration => "concentration",
            Acidity => "acidity",
            Conductivity => "conductivity",
            Power => "power",
            PowerFactor => "power_factor",
            Distance => "distance",
            Energy => "energy",
            Direction => "direction",
            Time => "time",
            Gyrometer => "gyrometer",
            Color => "color",
            GpsLocation => "gps_location",
            Positioner => "positioner",
            Buzzer => "buzzer",
            AudioClip => "audio_clip",
            Timer => "timer",
            AddrTextDisplay => "addr_text_display",
            OnOffSwitch => "on_off_switch",
            LevelControl => "level_control",
            UpDownControl => "up_down_control",
            MultiAxisJoystick => "multi_axis_joystick",
            Rate => "rate",
            PushButton => "push_button",
            MultistateSelector => "multistate_selector",
        }
    }

    /// Look up a type by its snake-case name.
    pub fn from_name(name: &str) -> Option<Self> {
        CATALOG.iter().copied().find(|ty| ty.name() == name)
    }
}

impl TryFrom<u8> for LppType {
    type Error = LppError;

    fn try_from(code: u8) -> Result<Self> {
        CATALOG
            .binary_search_by_key(&code, |ty| ty.code())
            .map(|index| CATALOG[index])
            .map_err(|_| LppError::UnknownType(code))
    }
}

impl From<LppType> for u8 {
    fn from(ty: LppType) -> Self {
        ty.code()
    }
}

impl fmt::Display for LppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes_match_ipso_offsets() {
        assert_eq!(LppType::DigitalInput.code(), 0x00);
        assert_eq!(LppType::DigitalOutput.code(), 0x01);
        assert_eq!(LppType::AnalogInput.code(), 0x02);
        assert_eq!(LppType::AnalogOutput.code(), 0x03);
        assert_eq!(LppType::IlluminanceSensor.code(), 0x65);
        assert_eq!(LppType::TemperatureSensor.code(), 0x67);
        assert_eq!(LppType::HumiditySensor.code(), 0x68);
        assert_eq!(LppType::Accelerometer.code(), 0x71);
        assert_eq!(LppType::Barometer.code(), 0x73);
        assert_eq!(LppType::Gyrometer.code(), 0x86);
        assert_eq!(LppType::GpsLocation.code(), 0x88);
        assert_eq!(LppType::TemperatureSensor.ipso_object_id(), 3303);
    }

    #[test]
    fn catalog_is_sorted_and_complete() {
        assert_eq!(CATALOG.len(), 51);
        assert!(CATALOG.windows(2).all(|w| w[0].code() < w[1].code()));
        for ty in CATALOG {
            assert_eq!(LppType::try_from(ty.code()).unwrap(), *ty);
            assert_eq!(LppType::from_name(ty.name()), Some(*ty));
        }
    }

    #[test]
    fn codes_outside_catalog_are_unknown() {
        for code in [4u8, 99, 107, 109, 149, 0xff] {
            assert!(matches!(
                LppType::try_from(code),
                Err(LppError::UnknownType(c)) if c == code
            ));
        }
    }

    #[test]
    fn ipso_lookup() {
        assert_eq!(
            LppType::from_ipso_object_id(3315),
            Some(LppType::Barometer)
        );
        assert_eq!(LppType::from_ipso_object_id(42), None);
        assert_eq!(LppType::from_ipso_object_id(3600), None);
    }

    #[test]
    fn payload_sizes() {
        assert_eq!(LppType::DigitalInput.payload_size(), Some(1));
        assert_eq!(LppType::AnalogOutput.payload_size(), Some(2));
        assert_eq!(LppType::HumiditySensor.payload_size(), Some(1));
        assert_eq!(LppType::Accelerometer.payload_size(), Some(6));
        assert_eq!(LppType::GpsLocation.record_size(), Some(11));
        assert_eq!(LppType::Voltage.payload_size(), None);
        assert!(!LppType::PresenceSensor.is_implemented());
    }
}

//! Module-type catalogs.
//!
//! Each supported module type is described by a [`ModuleProfile`]: channel
//! count, device class, the value kinds its channels accept, and its
//! device-type name table. The profiles are compile-time constants consumed
//! by the generic [`IoModule`](crate::device::IoModule) facade -- there is
//! one facade type for all module families, parameterized by data.
//!
//! Configuration parameters are described by [`ParamSpec`]s (16-bit
//! address + wire width). The addresses are defined per module family by
//! the firmware; they are opaque to the dispatcher.
//!
//! | Module | Class    | Channels | Reads                  | Writes       |
//! |--------|----------|----------|------------------------|--------------|
//! | DI4    | `0x0000` | 4        | digital, counter       | --            |
//! | DO4    | `0x1000` | 4        | digital                | digital      |
//! | RT4    | `0x0A00` | 4        | resistance, temperature| --            |
//! | AO4    | `0x1100` | 4        | analog                 | analog       |

use quadio_core::error::{Error, Result};
use quadio_core::value::ValueKind;

/// Static description of one module family.
#[derive(Debug, Clone)]
pub struct ModuleProfile {
    /// Short family name (e.g. "DI4").
    pub name: &'static str,
    /// Device-class code reported by the identify operation.
    pub device_class: u16,
    /// Number of I/O channels.
    pub nr_of_channels: u8,
    /// Value kinds accepted when reading a channel.
    pub input_kinds: &'static [ValueKind],
    /// Value kinds accepted when writing a channel. Empty for pure input
    /// modules.
    pub output_kinds: &'static [ValueKind],
    /// Device-type codes and their human-readable names.
    pub device_types: &'static [(u16, &'static str)],
}

impl ModuleProfile {
    /// Look up the name of a device-type code.
    pub fn device_type_name(&self, device_type: u16) -> Option<&'static str> {
        self.device_types
            .iter()
            .find(|(code, _)| *code == device_type)
            .map(|(_, name)| *name)
    }

    /// Whether reads of this kind are accepted.
    pub fn accepts_input(&self, kind: ValueKind) -> bool {
        self.input_kinds.contains(&kind)
    }

    /// Whether writes of this kind are accepted.
    pub fn accepts_output(&self, kind: ValueKind) -> bool {
        self.output_kinds.contains(&kind)
    }
}

/// Wire width of a configuration parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamWidth {
    /// One unsigned byte.
    U8,
    /// Unsigned 16 bit, little-endian.
    U16,
    /// Signed 16 bit, little-endian.
    I16,
    /// Unsigned 32 bit, little-endian.
    U32,
}

impl ParamWidth {
    /// Number of payload bytes a parameter of this width occupies.
    pub fn wire_len(self) -> usize {
        match self {
            ParamWidth::U8 => 1,
            ParamWidth::U16 | ParamWidth::I16 => 2,
            ParamWidth::U32 => 4,
        }
    }
}

/// A typed configuration-parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamValue {
    U8(u8),
    U16(u16),
    I16(i16),
    U32(u32),
}

impl ParamValue {
    /// The wire width of this value.
    pub fn width(&self) -> ParamWidth {
        match self {
            ParamValue::U8(_) => ParamWidth::U8,
            ParamValue::U16(_) => ParamWidth::U16,
            ParamValue::I16(_) => ParamWidth::I16,
            ParamValue::U32(_) => ParamWidth::U32,
        }
    }

    /// Decode a parameter of the given width from its raw bytes.
    pub fn decode(width: ParamWidth, bytes: &[u8]) -> Result<ParamValue> {
        if bytes.len() != width.wire_len() {
            return Err(Error::Decode(format!(
                "parameter needs {} bytes, got {}",
                width.wire_len(),
                bytes.len()
            )));
        }
        let value = match width {
            ParamWidth::U8 => ParamValue::U8(bytes[0]),
            ParamWidth::U16 => ParamValue::U16(u16::from_le_bytes([bytes[0], bytes[1]])),
            ParamWidth::I16 => ParamValue::I16(i16::from_le_bytes([bytes[0], bytes[1]])),
            ParamWidth::U32 => ParamValue::U32(u32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])),
        };
        Ok(value)
    }

    /// The little-endian wire bytes of this value.
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            ParamValue::U8(v) => vec![v],
            ParamValue::U16(v) => v.to_le_bytes().to_vec(),
            ParamValue::I16(v) => v.to_le_bytes().to_vec(),
            ParamValue::U32(v) => v.to_le_bytes().to_vec(),
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match *self {
            ParamValue::U8(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match *self {
            ParamValue::U16(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match *self {
            ParamValue::I16(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            ParamValue::U32(v) => Some(v),
            _ => None,
        }
    }
}

/// Static description of one configuration parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name, for diagnostics.
    pub name: &'static str,
    /// 16-bit parameter address.
    pub address: u16,
    /// Wire width of the parameter value.
    pub width: ParamWidth,
}

/// 4-channel digital input module.
pub mod di4 {
    use super::ModuleProfile;
    use quadio_core::value::ValueKind;

    pub const PROFILE: ModuleProfile = ModuleProfile {
        name: "DI4",
        device_class: 0x0000,
        nr_of_channels: 4,
        input_kinds: &[ValueKind::Digital, ValueKind::Counter],
        output_kinds: &[],
        device_types: &[
            (0x0000, "not identified"),
            (0x1000, "5 V"),
            (0x1001, "10 V"),
            (0x1002, "12 V"),
            (0x1003, "15 V"),
            (0x1004, "20 V"),
            (0x1005, "24 V"),
        ],
    };

    /// Configuration parameters.
    pub mod param {
        use crate::modules::{ParamSpec, ParamWidth};

        /// Current channel value (prefer the get-io operation).
        pub const VALUE: ParamSpec = ParamSpec {
            name: "value",
            address: 0x1000,
            width: ParamWidth::U8,
        };
        /// Operating mode, one of the [`mode`](super::mode) constants.
        pub const MODE: ParamSpec = ParamSpec {
            name: "mode",
            address: 0x1100,
            width: ParamWidth::U8,
        };
        /// Flag bits, see [`flag`](super::flag).
        pub const FLAGS: ParamSpec = ParamSpec {
            name: "flags",
            address: 0x1101,
            width: ParamWidth::U8,
        };
        /// Input sampling period in microseconds.
        pub const SCAN_TIME: ParamSpec = ParamSpec {
            name: "scan time",
            address: 0x1111,
            width: ParamWidth::U32,
        };
        /// Counting window in microseconds (count mode).
        pub const COUNT_TIME: ParamSpec = ParamSpec {
            name: "count time",
            address: 0x1112,
            width: ParamWidth::U32,
        };
    }

    /// Operating modes.
    pub mod mode {
        /// Channel disabled.
        pub const INACTIVE: u8 = 0x00;
        /// Channel reflects the input level.
        pub const LEVEL: u8 = 0x01;
        /// Latch on rising edges.
        pub const EDGE_RISING: u8 = 0x10;
        /// Latch on falling edges.
        pub const EDGE_FALLING: u8 = 0x11;
        /// Count edges within the counting window.
        pub const COUNT: u8 = 0x20;
    }

    /// Bits of the flags parameter.
    pub mod flag {
        /// Accumulate counts instead of restarting each window.
        pub const ADD_COUNTER: u8 = 0x01;
        /// Reset the counter whenever it is read.
        pub const RESET_ON_READ: u8 = 0x02;
        /// Invert the input level.
        pub const INVERTED: u8 = 0x04;
    }
}

/// 4-channel digital output module.
pub mod do4 {
    use super::ModuleProfile;
    use quadio_core::value::ValueKind;

    pub const PROFILE: ModuleProfile = ModuleProfile {
        name: "DO4",
        device_class: 0x1000,
        nr_of_channels: 4,
        input_kinds: &[ValueKind::Digital],
        output_kinds: &[ValueKind::Digital],
        device_types: &[
            (0x0000, "not identified"),
            (0x1000, "solid state, 24 V"),
            (0x1100, "SPDT relay"),
            (0x1200, "open collector"),
        ],
    };

    /// Configuration parameters.
    pub mod param {
        use crate::modules::{ParamSpec, ParamWidth};

        /// Current channel value (prefer the get-io operation).
        pub const VALUE: ParamSpec = ParamSpec {
            name: "value",
            address: 0x1000,
            width: ParamWidth::U8,
        };
        /// Operating mode, one of the [`mode`](super::mode) constants.
        pub const MODE: ParamSpec = ParamSpec {
            name: "mode",
            address: 0x1100,
            width: ParamWidth::U8,
        };
        /// Flag bits, see [`flag`](super::flag).
        pub const FLAGS: ParamSpec = ParamSpec {
            name: "flags",
            address: 0x1101,
            width: ParamWidth::U8,
        };
        /// Cycle period in microseconds (cycle mode).
        pub const CYCLE_TIME: ParamSpec = ParamSpec {
            name: "cycle time",
            address: 0x1110,
            width: ParamWidth::U32,
        };
        /// On-fraction of the cycle in tenths of a percent.
        pub const DUTY_CYCLE: ParamSpec = ParamSpec {
            name: "duty cycle",
            address: 0x1111,
            width: ParamWidth::U16,
        };
        /// Switch-on delay in microseconds (timed mode).
        pub const ON_DELAY: ParamSpec = ParamSpec {
            name: "on delay",
            address: 0x1112,
            width: ParamWidth::U32,
        };
        /// Hold time in microseconds (timed mode).
        pub const ON_HOLD: ParamSpec = ParamSpec {
            name: "on hold",
            address: 0x1113,
            width: ParamWidth::U32,
        };
    }

    /// Operating modes.
    pub mod mode {
        /// Channel disabled.
        pub const INACTIVE: u8 = 0x00;
        /// Output follows the written value directly.
        pub const LEVEL: u8 = 0x01;
        /// One-shot on/off with delay and hold times.
        pub const TIMED: u8 = 0x08;
        /// Periodic cycling with the configured duty cycle.
        pub const CYCLE: u8 = 0x0A;
    }

    /// Bits of the flags parameter.
    pub mod flag {
        /// A new trigger restarts a running timed pulse.
        pub const RETRIGGER: u8 = 0x01;
        /// Writing off cancels a running timed pulse.
        pub const CANCEL: u8 = 0x02;
        /// Invert the output level.
        pub const INVERTED: u8 = 0x04;
    }
}

/// 4-channel RTD input module.
pub mod rt4 {
    use super::ModuleProfile;
    use quadio_core::value::ValueKind;

    pub const PROFILE: ModuleProfile = ModuleProfile {
        name: "RT4",
        device_class: 0x0A00,
        nr_of_channels: 4,
        input_kinds: &[
            ValueKind::Resistance2,
            ValueKind::Temperature2,
            ValueKind::Temperature4,
        ],
        output_kinds: &[],
        device_types: &[
            (0x1000, "PT 1000"),
            (0x1001, "PT 1000, 0-360 C"),
            (0x1010, "PT 100"),
        ],
    };

    /// Configuration parameters.
    pub mod param {
        use crate::modules::{ParamSpec, ParamWidth};

        /// Current channel value (prefer the get-io operation).
        pub const VALUE: ParamSpec = ParamSpec {
            name: "value",
            address: 0x1000,
            width: ParamWidth::U16,
        };
        /// Operating mode, one of the [`mode`](super::mode) constants.
        pub const MODE: ParamSpec = ParamSpec {
            name: "mode",
            address: 0x1100,
            width: ParamWidth::U8,
        };
        /// Flag bits.
        pub const FLAGS: ParamSpec = ParamSpec {
            name: "flags",
            address: 0x1101,
            width: ParamWidth::U8,
        };
        /// Measurement period in milliseconds.
        pub const SCAN_INTERVAL: ParamSpec = ParamSpec {
            name: "scan interval",
            address: 0x1111,
            width: ParamWidth::U16,
        };
        /// Sensor settling time before a measurement, in milliseconds.
        pub const SETUP_TIME: ParamSpec = ParamSpec {
            name: "setup time",
            address: 0x1112,
            width: ParamWidth::U16,
        };
        /// Additive measurement offset.
        pub const OFFSET: ParamSpec = ParamSpec {
            name: "offset",
            address: 0x1120,
            width: ParamWidth::I16,
        };
        /// Calibration: measured reference voltage.
        pub const CAL_UM: ParamSpec = ParamSpec {
            name: "cal um",
            address: 0x1130,
            width: ParamWidth::U16,
        };
        /// Calibration: reference series resistance voltage.
        pub const CAL_URS: ParamSpec = ParamSpec {
            name: "cal urs",
            address: 0x1131,
            width: ParamWidth::I16,
        };
    }

    /// Operating modes.
    pub mod mode {
        /// Channel disabled.
        pub const INACTIVE: u8 = 0x00;
        /// Continuous measurement.
        pub const STANDARD: u8 = 0x01;
    }

    /// Calibration options for the calibrate operation.
    pub mod cal {
        /// Short-circuit calibration.
        pub const SHORT: u8 = 0x00;
        /// Open-circuit calibration.
        pub const OPEN: u8 = 0x10;
    }
}

/// 4-channel analog output module.
pub mod ao4 {
    use super::ModuleProfile;
    use quadio_core::value::ValueKind;

    pub const PROFILE: ModuleProfile = ModuleProfile {
        name: "AO4",
        device_class: 0x1100,
        nr_of_channels: 4,
        input_kinds: &[
            ValueKind::AnalogU2,
            ValueKind::AnalogS2,
            ValueKind::AnalogS4,
        ],
        output_kinds: &[
            ValueKind::AnalogU2,
            ValueKind::AnalogS2,
            ValueKind::AnalogS4,
        ],
        device_types: &[
            (0x0000, "not identified"),
            (0x1000, "0 ... 5 V"),
            (0x1001, "0 ... 10 V"),
            (0x1002, "-5 ... 5 V"),
            (0x1003, "-10 ... 10 V"),
        ],
    };

    /// Configuration parameters.
    pub mod param {
        use crate::modules::{ParamSpec, ParamWidth};

        /// Current channel value (prefer the get-io operation).
        pub const VALUE: ParamSpec = ParamSpec {
            name: "value",
            address: 0x1000,
            width: ParamWidth::U16,
        };
        /// Operating mode, one of the [`mode`](super::mode) constants.
        pub const MODE: ParamSpec = ParamSpec {
            name: "mode",
            address: 0x1100,
            width: ParamWidth::U8,
        };
        /// Flag bits.
        pub const FLAGS: ParamSpec = ParamSpec {
            name: "flags",
            address: 0x1101,
            width: ParamWidth::U8,
        };
        /// Additive output offset.
        pub const OFFSET: ParamSpec = ParamSpec {
            name: "offset",
            address: 0x1120,
            width: ParamWidth::I16,
        };
    }

    /// Operating modes.
    pub mod mode {
        /// Channel disabled.
        pub const INACTIVE: u8 = 0x00;
        /// Output follows the written value directly.
        pub const LEVEL: u8 = 0x01;
    }
}

/// All module profiles this library ships.
pub fn all_profiles() -> [&'static ModuleProfile; 4] {
    [&di4::PROFILE, &do4::PROFILE, &rt4::PROFILE, &ao4::PROFILE]
}

/// Look a profile up by its device-class code (e.g. from an identify
/// reply).
pub fn profile_for_class(device_class: u16) -> Option<&'static ModuleProfile> {
    all_profiles()
        .into_iter()
        .find(|profile| profile.device_class == device_class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_have_four_channels() {
        for profile in all_profiles() {
            assert_eq!(profile.nr_of_channels, 4, "{}", profile.name);
        }
    }

    #[test]
    fn input_modules_accept_no_writes() {
        assert!(di4::PROFILE.output_kinds.is_empty());
        assert!(rt4::PROFILE.output_kinds.is_empty());
        assert!(!do4::PROFILE.output_kinds.is_empty());
        assert!(!ao4::PROFILE.output_kinds.is_empty());
    }

    #[test]
    fn profile_lookup_by_class() {
        assert_eq!(profile_for_class(0x0000).unwrap().name, "DI4");
        assert_eq!(profile_for_class(0x1000).unwrap().name, "DO4");
        assert_eq!(profile_for_class(0x0A00).unwrap().name, "RT4");
        assert_eq!(profile_for_class(0x1100).unwrap().name, "AO4");
        assert!(profile_for_class(0x5555).is_none());
    }

    #[test]
    fn device_type_names() {
        assert_eq!(di4::PROFILE.device_type_name(0x1005), Some("24 V"));
        assert_eq!(rt4::PROFILE.device_type_name(0x1010), Some("PT 100"));
        assert_eq!(do4::PROFILE.device_type_name(0xBEEF), None);
    }

    #[test]
    fn accepted_kinds() {
        use quadio_core::value::ValueKind;
        assert!(di4::PROFILE.accepts_input(ValueKind::Counter));
        assert!(!di4::PROFILE.accepts_input(ValueKind::AnalogS2));
        assert!(ao4::PROFILE.accepts_output(ValueKind::AnalogS4));
        assert!(!do4::PROFILE.accepts_output(ValueKind::Counter));
    }

    #[test]
    fn param_value_round_trip() {
        let cases = [
            (ParamWidth::U8, ParamValue::U8(0x7F)),
            (ParamWidth::U16, ParamValue::U16(0x1234)),
            (ParamWidth::I16, ParamValue::I16(-2)),
            (ParamWidth::U32, ParamValue::U32(0xDEAD_BEEF)),
        ];
        for (width, value) in cases {
            let bytes = value.encode();
            assert_eq!(bytes.len(), width.wire_len());
            assert_eq!(ParamValue::decode(width, &bytes).unwrap(), value);
        }
    }

    #[test]
    fn param_value_encodes_little_endian() {
        assert_eq!(ParamValue::U16(0x1234).encode(), vec![0x34, 0x12]);
        assert_eq!(ParamValue::I16(-2).encode(), vec![0xFE, 0xFF]);
        assert_eq!(
            ParamValue::U32(0x0102_0304).encode(),
            vec![0x04, 0x03, 0x02, 0x01]
        );
    }

    #[test]
    fn param_value_decode_width_mismatch() {
        assert!(ParamValue::decode(ParamWidth::U16, &[0x01]).is_err());
        assert!(ParamValue::decode(ParamWidth::U8, &[0x01, 0x02]).is_err());
    }

    #[test]
    fn param_value_accessors() {
        assert_eq!(ParamValue::U8(3).as_u8(), Some(3));
        assert_eq!(ParamValue::U8(3).as_u16(), None);
        assert_eq!(ParamValue::I16(-7).as_i16(), Some(-7));
        assert_eq!(ParamValue::U32(9).as_u32(), Some(9));
    }
}

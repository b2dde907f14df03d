//! Typed wire values and their codec.
//!
//! Every channel exchange carries a *value-type token* telling the module
//! which encoding to use. [`ValueKind`] enumerates the tokens this library
//! speaks; [`Value`] pairs a kind with its decoded payload.
//!
//! Values are stored as the integer wire quantity (millivolts, tenths of
//! a degree, ...), so encode/decode round-trips are exact. Floating-point
//! engineering units are derived views; converting volts to a wire value
//! rounds to the nearest representable step.
//!
//! # Wire encodings
//!
//! | Kind           | Token  | Width | Encoding | Engineering unit        |
//! |----------------|--------|-------|----------|-------------------------|
//! | `Digital`      | `0x20` | 1     | 0 / 1    | logic state             |
//! | `Counter`      | `0x28` | 2     | u16 LE   | event count             |
//! | `AnalogU2`     | `0x10` | 2     | u16 LE   | volts = raw / 1000      |
//! | `AnalogS2`     | `0x16` | 2     | i16 LE   | volts = raw / 1000      |
//! | `AnalogS4`     | `0x17` | 4     | i32 LE   | volts = raw / 1 000 000 |
//! | `Resistance2`  | `0x1A` | 2     | u16 LE   | ohms = raw / 10         |
//! | `Temperature2` | `0x1C` | 2     | i16 LE   | °C = raw / 10           |
//! | `Temperature4` | `0x1D` | 4     | i32 LE   | °C = raw / 100          |
//!
//! Group operations concatenate the selected channels' values in ascending
//! channel order with no padding; see [`decode_group`].

use std::fmt;

use bytes::{BufMut, BytesMut};

use crate::error::{Error, Result};

/// A value-type token: selects one wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Logic state of a digital channel, one byte.
    Digital,
    /// Monotonic event counter, unsigned 16 bit.
    Counter,
    /// Unsigned analog voltage, 1 mV per step.
    AnalogU2,
    /// Signed analog voltage, 1 mV per step.
    AnalogS2,
    /// Signed analog voltage, 1 µV per step.
    AnalogS4,
    /// RTD resistance, 0.1 Ω per step.
    Resistance2,
    /// Temperature, 0.1 °C per step.
    Temperature2,
    /// Temperature, 0.01 °C per step.
    Temperature4,
}

impl ValueKind {
    /// The wire token identifying this kind in request/response frames.
    pub fn token(self) -> u8 {
        match self {
            ValueKind::Digital => 0x20,
            ValueKind::Counter => 0x28,
            ValueKind::AnalogU2 => 0x10,
            ValueKind::AnalogS2 => 0x16,
            ValueKind::AnalogS4 => 0x17,
            ValueKind::Resistance2 => 0x1A,
            ValueKind::Temperature2 => 0x1C,
            ValueKind::Temperature4 => 0x1D,
        }
    }

    /// Look a kind up by its wire token.
    pub fn from_token(token: u8) -> Option<ValueKind> {
        match token {
            0x20 => Some(ValueKind::Digital),
            0x28 => Some(ValueKind::Counter),
            0x10 => Some(ValueKind::AnalogU2),
            0x16 => Some(ValueKind::AnalogS2),
            0x17 => Some(ValueKind::AnalogS4),
            0x1A => Some(ValueKind::Resistance2),
            0x1C => Some(ValueKind::Temperature2),
            0x1D => Some(ValueKind::Temperature4),
            _ => None,
        }
    }

    /// Number of payload bytes one value of this kind occupies.
    pub fn wire_len(self) -> usize {
        match self {
            ValueKind::Digital => 1,
            ValueKind::Counter
            | ValueKind::AnalogU2
            | ValueKind::AnalogS2
            | ValueKind::Resistance2
            | ValueKind::Temperature2 => 2,
            ValueKind::AnalogS4 | ValueKind::Temperature4 => 4,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Digital => "digital",
            ValueKind::Counter => "counter",
            ValueKind::AnalogU2 => "analog-u2",
            ValueKind::AnalogS2 => "analog-s2",
            ValueKind::AnalogS4 => "analog-s4",
            ValueKind::Resistance2 => "resistance-2",
            ValueKind::Temperature2 => "temperature-2",
            ValueKind::Temperature4 => "temperature-4",
        };
        write!(f, "{s}")
    }
}

/// A decoded channel value, tagged with its wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    /// Logic state.
    Digital(bool),
    /// Event count.
    Counter(u16),
    /// Voltage in millivolts, unsigned.
    AnalogU2(u16),
    /// Voltage in millivolts, signed.
    AnalogS2(i16),
    /// Voltage in microvolts, signed.
    AnalogS4(i32),
    /// Resistance in tenths of an ohm.
    Resistance2(u16),
    /// Temperature in tenths of a degree Celsius.
    Temperature2(i16),
    /// Temperature in hundredths of a degree Celsius.
    Temperature4(i32),
}

impl Value {
    /// The kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Digital(_) => ValueKind::Digital,
            Value::Counter(_) => ValueKind::Counter,
            Value::AnalogU2(_) => ValueKind::AnalogU2,
            Value::AnalogS2(_) => ValueKind::AnalogS2,
            Value::AnalogS4(_) => ValueKind::AnalogS4,
            Value::Resistance2(_) => ValueKind::Resistance2,
            Value::Temperature2(_) => ValueKind::Temperature2,
            Value::Temperature4(_) => ValueKind::Temperature4,
        }
    }

    /// The wire token of this value's kind.
    pub fn token(&self) -> u8 {
        self.kind().token()
    }

    /// Number of bytes this value occupies on the wire.
    pub fn wire_len(&self) -> usize {
        self.kind().wire_len()
    }

    /// Decode one value of the given kind from exactly `bytes`.
    ///
    /// The buffer must be exactly [`ValueKind::wire_len`] bytes long;
    /// anything else is a decode error. Multi-byte quantities are
    /// little-endian.
    pub fn decode(kind: ValueKind, bytes: &[u8]) -> Result<Value> {
        let want = kind.wire_len();
        if bytes.len() != want {
            return Err(Error::Decode(format!(
                "{kind} value needs {want} bytes, got {}",
                bytes.len()
            )));
        }
        let value = match kind {
            ValueKind::Digital => Value::Digital(bytes[0] != 0),
            ValueKind::Counter => Value::Counter(u16::from_le_bytes([bytes[0], bytes[1]])),
            ValueKind::AnalogU2 => Value::AnalogU2(u16::from_le_bytes([bytes[0], bytes[1]])),
            ValueKind::AnalogS2 => Value::AnalogS2(i16::from_le_bytes([bytes[0], bytes[1]])),
            ValueKind::AnalogS4 => Value::AnalogS4(i32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])),
            ValueKind::Resistance2 => {
                Value::Resistance2(u16::from_le_bytes([bytes[0], bytes[1]]))
            }
            ValueKind::Temperature2 => {
                Value::Temperature2(i16::from_le_bytes([bytes[0], bytes[1]]))
            }
            ValueKind::Temperature4 => Value::Temperature4(i32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])),
        };
        Ok(value)
    }

    /// Append this value's wire bytes to `buf`.
    pub fn encode_into(&self, buf: &mut BytesMut) {
        match *self {
            Value::Digital(state) => buf.put_u8(state as u8),
            Value::Counter(count) => buf.put_u16_le(count),
            Value::AnalogU2(mv) => buf.put_u16_le(mv),
            Value::AnalogS2(mv) => buf.put_i16_le(mv),
            Value::AnalogS4(uv) => buf.put_i32_le(uv),
            Value::Resistance2(deci_ohm) => buf.put_u16_le(deci_ohm),
            Value::Temperature2(deci_deg) => buf.put_i16_le(deci_deg),
            Value::Temperature4(centi_deg) => buf.put_i32_le(centi_deg),
        }
    }

    /// This value's wire bytes as a fresh vector.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(self.wire_len());
        self.encode_into(&mut buf);
        buf.to_vec()
    }

    /// Build an analog value from volts, rounding to the kind's step size.
    ///
    /// Fails with a range error if the rounded wire quantity does not fit
    /// the kind's integer type.
    pub fn volts(kind: ValueKind, volts: f64) -> Result<Value> {
        match kind {
            ValueKind::AnalogU2 => {
                let raw = (volts * 1000.0).round();
                if !(0.0..=u16::MAX as f64).contains(&raw) {
                    return Err(Error::ValueOutOfRange(format!(
                        "{volts} V does not fit {kind}"
                    )));
                }
                Ok(Value::AnalogU2(raw as u16))
            }
            ValueKind::AnalogS2 => {
                let raw = (volts * 1000.0).round();
                if !(i16::MIN as f64..=i16::MAX as f64).contains(&raw) {
                    return Err(Error::ValueOutOfRange(format!(
                        "{volts} V does not fit {kind}"
                    )));
                }
                Ok(Value::AnalogS2(raw as i16))
            }
            ValueKind::AnalogS4 => {
                let raw = (volts * 1_000_000.0).round();
                if !(i32::MIN as f64..=i32::MAX as f64).contains(&raw) {
                    return Err(Error::ValueOutOfRange(format!(
                        "{volts} V does not fit {kind}"
                    )));
                }
                Ok(Value::AnalogS4(raw as i32))
            }
            other => Err(Error::KindMismatch(format!("{other} is not an analog kind"))),
        }
    }

    /// Build a temperature value from degrees Celsius.
    pub fn celsius(kind: ValueKind, degrees: f64) -> Result<Value> {
        match kind {
            ValueKind::Temperature2 => {
                let raw = (degrees * 10.0).round();
                if !(i16::MIN as f64..=i16::MAX as f64).contains(&raw) {
                    return Err(Error::ValueOutOfRange(format!(
                        "{degrees} °C does not fit {kind}"
                    )));
                }
                Ok(Value::Temperature2(raw as i16))
            }
            ValueKind::Temperature4 => {
                let raw = (degrees * 100.0).round();
                if !(i32::MIN as f64..=i32::MAX as f64).contains(&raw) {
                    return Err(Error::ValueOutOfRange(format!(
                        "{degrees} °C does not fit {kind}"
                    )));
                }
                Ok(Value::Temperature4(raw as i32))
            }
            other => Err(Error::KindMismatch(format!(
                "{other} is not a temperature kind"
            ))),
        }
    }

    /// Build a resistance value from ohms (0.1 Ω resolution).
    pub fn ohms(ohms: f64) -> Result<Value> {
        let raw = (ohms * 10.0).round();
        if !(0.0..=u16::MAX as f64).contains(&raw) {
            return Err(Error::ValueOutOfRange(format!(
                "{ohms} Ω does not fit resistance-2"
            )));
        }
        Ok(Value::Resistance2(raw as u16))
    }

    /// Engineering voltage of an analog value.
    pub fn as_volts(&self) -> Option<f64> {
        match *self {
            Value::AnalogU2(mv) => Some(mv as f64 / 1000.0),
            Value::AnalogS2(mv) => Some(mv as f64 / 1000.0),
            Value::AnalogS4(uv) => Some(uv as f64 / 1_000_000.0),
            _ => None,
        }
    }

    /// Engineering temperature of a temperature value.
    pub fn as_celsius(&self) -> Option<f64> {
        match *self {
            Value::Temperature2(deci) => Some(deci as f64 / 10.0),
            Value::Temperature4(centi) => Some(centi as f64 / 100.0),
            _ => None,
        }
    }

    /// Engineering resistance of a resistance value.
    pub fn as_ohms(&self) -> Option<f64> {
        match *self {
            Value::Resistance2(deci) => Some(deci as f64 / 10.0),
            _ => None,
        }
    }

    /// The logic state of a digital value.
    pub fn as_digital(&self) -> Option<bool> {
        match *self {
            Value::Digital(state) => Some(state),
            _ => None,
        }
    }

    /// The count of a counter value.
    pub fn as_counter(&self) -> Option<u16> {
        match *self {
            Value::Counter(count) => Some(count),
            _ => None,
        }
    }
}

/// Iterate the channel indices selected by a group mask, ascending.
pub fn selected_channels(mask: u8) -> impl Iterator<Item = u8> {
    (0..8).filter(move |i| mask & (1 << i) != 0)
}

/// Decode a group-operation payload into one value per selected channel.
///
/// The payload is the concatenation of the selected channels' values in
/// ascending channel-index order, so its length must be exactly
/// `mask.count_ones() * kind.wire_len()`. An all-zero mask decodes an
/// empty payload into an empty list.
pub fn decode_group(mask: u8, kind: ValueKind, payload: &[u8]) -> Result<Vec<Value>> {
    let count = mask.count_ones() as usize;
    let width = kind.wire_len();
    if payload.len() != count * width {
        return Err(Error::Decode(format!(
            "group payload for mask 0x{mask:02X} ({kind}) needs {} bytes, got {}",
            count * width,
            payload.len()
        )));
    }
    payload
        .chunks(width)
        .map(|chunk| Value::decode(kind, chunk))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // Tokens and widths
    // ---------------------------------------------------------------

    #[test]
    fn token_round_trip_all_kinds() {
        let kinds = [
            ValueKind::Digital,
            ValueKind::Counter,
            ValueKind::AnalogU2,
            ValueKind::AnalogS2,
            ValueKind::AnalogS4,
            ValueKind::Resistance2,
            ValueKind::Temperature2,
            ValueKind::Temperature4,
        ];
        for kind in kinds {
            assert_eq!(ValueKind::from_token(kind.token()), Some(kind));
        }
    }

    #[test]
    fn unknown_token_is_none() {
        assert_eq!(ValueKind::from_token(0xFF), None);
        assert_eq!(ValueKind::from_token(0x00), None);
    }

    #[test]
    fn wire_lens() {
        assert_eq!(ValueKind::Digital.wire_len(), 1);
        assert_eq!(ValueKind::Counter.wire_len(), 2);
        assert_eq!(ValueKind::AnalogS4.wire_len(), 4);
        assert_eq!(ValueKind::Temperature4.wire_len(), 4);
    }

    // ---------------------------------------------------------------
    // Encode/decode round trips (integer wire form)
    // ---------------------------------------------------------------

    #[test]
    fn round_trip_digital() {
        for state in [false, true] {
            let value = Value::Digital(state);
            let bytes = value.encode();
            assert_eq!(bytes.len(), 1);
            assert_eq!(Value::decode(ValueKind::Digital, &bytes).unwrap(), value);
        }
    }

    #[test]
    fn digital_decodes_any_nonzero_as_on() {
        assert_eq!(
            Value::decode(ValueKind::Digital, &[0x5A]).unwrap(),
            Value::Digital(true)
        );
    }

    #[test]
    fn round_trip_counter() {
        for count in [0u16, 1, 0x1234, u16::MAX] {
            let value = Value::Counter(count);
            assert_eq!(
                Value::decode(ValueKind::Counter, &value.encode()).unwrap(),
                value
            );
        }
    }

    #[test]
    fn round_trip_analog_signed() {
        for mv in [i16::MIN, -1, 0, 1, 2500, i16::MAX] {
            let value = Value::AnalogS2(mv);
            assert_eq!(
                Value::decode(ValueKind::AnalogS2, &value.encode()).unwrap(),
                value
            );
        }
        for uv in [i32::MIN, -1, 0, 5_000_000, i32::MAX] {
            let value = Value::AnalogS4(uv);
            assert_eq!(
                Value::decode(ValueKind::AnalogS4, &value.encode()).unwrap(),
                value
            );
        }
    }

    #[test]
    fn round_trip_temperature_and_resistance() {
        let cases = [
            Value::Temperature2(-405),
            Value::Temperature2(1234),
            Value::Temperature4(-12345),
            Value::Resistance2(10_820),
        ];
        for value in cases {
            assert_eq!(Value::decode(value.kind(), &value.encode()).unwrap(), value);
        }
    }

    #[test]
    fn wire_bytes_are_little_endian() {
        assert_eq!(Value::Counter(0x1234).encode(), vec![0x34, 0x12]);
        assert_eq!(Value::AnalogS4(0x0102_0304).encode(), vec![0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn decode_wrong_width_fails() {
        assert!(matches!(
            Value::decode(ValueKind::Counter, &[0x01]),
            Err(Error::Decode(_))
        ));
        assert!(matches!(
            Value::decode(ValueKind::Digital, &[0x01, 0x00]),
            Err(Error::Decode(_))
        ));
        assert!(matches!(
            Value::decode(ValueKind::AnalogS4, &[0x01, 0x02, 0x03]),
            Err(Error::Decode(_))
        ));
    }

    // ---------------------------------------------------------------
    // Engineering conversions
    // ---------------------------------------------------------------

    #[test]
    fn volts_round_to_wire_steps() {
        assert_eq!(
            Value::volts(ValueKind::AnalogS2, 2.5).unwrap(),
            Value::AnalogS2(2500)
        );
        assert_eq!(
            Value::volts(ValueKind::AnalogS4, 2.5).unwrap(),
            Value::AnalogS4(2_500_000)
        );
        assert_eq!(
            Value::volts(ValueKind::AnalogU2, 0.0015).unwrap(),
            Value::AnalogU2(2)
        );
    }

    #[test]
    fn volts_out_of_range() {
        assert!(matches!(
            Value::volts(ValueKind::AnalogU2, -0.5),
            Err(Error::ValueOutOfRange(_))
        ));
        assert!(matches!(
            Value::volts(ValueKind::AnalogS2, 40.0),
            Err(Error::ValueOutOfRange(_))
        ));
    }

    #[test]
    fn volts_rejects_non_analog_kind() {
        assert!(matches!(
            Value::volts(ValueKind::Digital, 1.0),
            Err(Error::KindMismatch(_))
        ));
    }

    #[test]
    fn celsius_and_ohms_conversions() {
        let t = Value::celsius(ValueKind::Temperature2, -40.5).unwrap();
        assert_eq!(t, Value::Temperature2(-405));
        assert_eq!(t.as_celsius(), Some(-40.5));

        let r = Value::ohms(1082.0).unwrap();
        assert_eq!(r, Value::Resistance2(10_820));
        assert_eq!(r.as_ohms(), Some(1082.0));
    }

    #[test]
    fn accessors_are_kind_checked() {
        assert_eq!(Value::Digital(true).as_volts(), None);
        assert_eq!(Value::AnalogS2(100).as_digital(), None);
        assert_eq!(Value::Counter(3).as_counter(), Some(3));
    }

    // ---------------------------------------------------------------
    // Group payloads
    // ---------------------------------------------------------------

    #[test]
    fn selected_channels_ascending() {
        let selected: Vec<u8> = selected_channels(0b0000_0101).collect();
        assert_eq!(selected, vec![0, 2]);
        // Bit order in the byte does not matter; output is ascending.
        let selected: Vec<u8> = selected_channels(0b1000_0010).collect();
        assert_eq!(selected, vec![1, 7]);
    }

    #[test]
    fn decode_group_two_of_four() {
        // Channels 0 and 2 selected, counter values 5 and 7.
        let payload = [0x05, 0x00, 0x07, 0x00];
        let values = decode_group(0b0101, ValueKind::Counter, &payload).unwrap();
        assert_eq!(values, vec![Value::Counter(5), Value::Counter(7)]);
    }

    #[test]
    fn decode_group_empty_mask() {
        let values = decode_group(0x00, ValueKind::Digital, &[]).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn decode_group_length_mismatch() {
        assert!(matches!(
            decode_group(0b0011, ValueKind::Counter, &[0x01, 0x00]),
            Err(Error::Decode(_))
        ));
        assert!(matches!(
            decode_group(0x00, ValueKind::Digital, &[0x01]),
            Err(Error::Decode(_))
        ));
    }
}

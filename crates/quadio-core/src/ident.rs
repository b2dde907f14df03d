//! Device identity metadata.
//!
//! The identify operation returns an 11-byte payload describing the
//! attached module: firmware and hardware revisions, the device class
//! (module family), the device type (sub-variant, e.g. input voltage
//! range), and the serial number. All multi-byte fields are
//! little-endian.

use crate::error::{Error, Result};

/// Number of payload bytes in an identify response.
pub const IDENT_PAYLOAD_LEN: usize = 11;

/// Identity of an attached module, as reported by the identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceId {
    /// Firmware revision.
    pub revision_fw: u16,
    /// Hardware revision.
    pub revision_hw: u8,
    /// Device class -- selects the module family (see [`DeviceClass`]).
    pub device_class: u16,
    /// Device type -- selects the sub-variant within the family.
    pub device_type: u16,
    /// Factory serial number.
    pub serial: u32,
}

impl DeviceId {
    /// Decode an identify payload.
    ///
    /// Layout: `revision_fw:u16 | revision_hw:u8 | device_class:u16 |
    /// device_type:u16 | serial:u32`, little-endian. Any other payload
    /// length is a decode error -- the caller must not fall back to a
    /// default identity.
    pub fn decode(payload: &[u8]) -> Result<DeviceId> {
        if payload.len() != IDENT_PAYLOAD_LEN {
            return Err(Error::Decode(format!(
                "identify payload has {} bytes, expected {IDENT_PAYLOAD_LEN}",
                payload.len()
            )));
        }
        Ok(DeviceId {
            revision_fw: u16::from_le_bytes([payload[0], payload[1]]),
            revision_hw: payload[2],
            device_class: u16::from_le_bytes([payload[3], payload[4]]),
            device_type: u16::from_le_bytes([payload[5], payload[6]]),
            serial: u32::from_le_bytes([payload[7], payload[8], payload[9], payload[10]]),
        })
    }

    /// The module family this identity belongs to, if recognized.
    pub fn class(&self) -> Option<DeviceClass> {
        DeviceClass::from_code(self.device_class)
    }
}

/// Known module families, keyed by the device-class field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// 4-channel digital input module.
    DigitalInput4,
    /// 4-channel analog input module.
    AnalogInput4,
    /// 4-channel RTD input module.
    RtdInput4,
    /// 4-channel digital output module.
    DigitalOutput4,
    /// 4-channel analog output module.
    AnalogOutput4,
}

impl DeviceClass {
    /// Look a family up by its device-class code.
    pub fn from_code(code: u16) -> Option<DeviceClass> {
        match code {
            0x0000 => Some(DeviceClass::DigitalInput4),
            0x0100 => Some(DeviceClass::AnalogInput4),
            0x0A00 => Some(DeviceClass::RtdInput4),
            0x1000 => Some(DeviceClass::DigitalOutput4),
            0x1100 => Some(DeviceClass::AnalogOutput4),
            _ => None,
        }
    }

    /// The device-class code for this family.
    pub fn code(self) -> u16 {
        match self {
            DeviceClass::DigitalInput4 => 0x0000,
            DeviceClass::AnalogInput4 => 0x0100,
            DeviceClass::RtdInput4 => 0x0A00,
            DeviceClass::DigitalOutput4 => 0x1000,
            DeviceClass::AnalogOutput4 => 0x1100,
        }
    }

    /// Human-readable family name.
    pub fn name(self) -> &'static str {
        match self {
            DeviceClass::DigitalInput4 => "digital input, 4 channels",
            DeviceClass::AnalogInput4 => "analog input, 4 channels",
            DeviceClass::RtdInput4 => "RTD input, 4 channels",
            DeviceClass::DigitalOutput4 => "digital output, 4 channels",
            DeviceClass::AnalogOutput4 => "analog output, 4 channels",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_identify_payload() {
        let payload = [
            0x01, 0x00, // revision_fw = 1
            0x02, // revision_hw = 2
            0x00, 0x01, // device_class = 0x0100
            0x10, 0x00, // device_type = 0x0010
            0x78, 0x56, 0x34, 0x12, // serial = 0x12345678
        ];
        let id = DeviceId::decode(&payload).unwrap();
        assert_eq!(id.revision_fw, 1);
        assert_eq!(id.revision_hw, 2);
        assert_eq!(id.device_class, 0x0100);
        assert_eq!(id.device_type, 0x0010);
        assert_eq!(id.serial, 0x1234_5678);
        assert_eq!(id.class(), Some(DeviceClass::AnalogInput4));
    }

    #[test]
    fn decode_rejects_wrong_length() {
        assert!(matches!(DeviceId::decode(&[]), Err(Error::Decode(_))));
        assert!(matches!(
            DeviceId::decode(&[0x01; 10]),
            Err(Error::Decode(_))
        ));
        assert!(matches!(
            DeviceId::decode(&[0x01; 12]),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn device_class_codes_round_trip() {
        for class in [
            DeviceClass::DigitalInput4,
            DeviceClass::AnalogInput4,
            DeviceClass::RtdInput4,
            DeviceClass::DigitalOutput4,
            DeviceClass::AnalogOutput4,
        ] {
            assert_eq!(DeviceClass::from_code(class.code()), Some(class));
        }
        assert_eq!(DeviceClass::from_code(0xBEEF), None);
    }

    #[test]
    fn unknown_class_on_id() {
        let id = DeviceId {
            revision_fw: 1,
            revision_hw: 1,
            device_class: 0x4242,
            device_type: 0,
            serial: 0,
        };
        assert_eq!(id.class(), None);
    }
}

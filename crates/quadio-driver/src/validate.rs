//! Argument validation shared by all module facades.
//!
//! Every check here runs before any bytes are sent: a failed validation
//! costs no I/O and leaves the module untouched. The checks are
//! parameterized by [`ModuleProfile`] metadata, so one set of functions
//! serves every module family.

use quadio_core::error::{Error, Result};
use quadio_core::value::{Value, ValueKind};

use crate::modules::{ModuleProfile, ParamSpec, ParamValue};

/// Channel index must be below the module's channel count.
pub fn channel(profile: &ModuleProfile, channel: u8) -> Result<()> {
    if channel >= profile.nr_of_channels {
        return Err(Error::ChannelOutOfRange {
            channel,
            count: profile.nr_of_channels,
        });
    }
    Ok(())
}

/// A group channel selector must cover every channel exactly once.
///
/// Returns the wire mask built by OR-ing `1 << index` for each selected
/// channel.
pub fn group_mask(profile: &ModuleProfile, channels: &[bool]) -> Result<u8> {
    if channels.len() != profile.nr_of_channels as usize {
        return Err(Error::InvalidArgument(format!(
            "group selector has {} entries, module has {} channels",
            channels.len(),
            profile.nr_of_channels
        )));
    }
    let mut mask = 0u8;
    for (index, selected) in channels.iter().enumerate() {
        if *selected {
            mask |= 1 << index;
        }
    }
    Ok(mask)
}

/// The kind must be readable on this module type.
pub fn input_kind(profile: &ModuleProfile, kind: ValueKind) -> Result<()> {
    if profile.input_kinds.is_empty() {
        return Err(Error::Unsupported(format!(
            "{} modules have no readable channels",
            profile.name
        )));
    }
    if !profile.accepts_input(kind) {
        return Err(Error::KindMismatch(format!(
            "{} channels cannot be read as {kind}",
            profile.name
        )));
    }
    Ok(())
}

/// The kind must be writable on this module type.
pub fn output_kind(profile: &ModuleProfile, kind: ValueKind) -> Result<()> {
    if profile.output_kinds.is_empty() {
        return Err(Error::Unsupported(format!(
            "{} modules have no writable channels",
            profile.name
        )));
    }
    if !profile.accepts_output(kind) {
        return Err(Error::KindMismatch(format!(
            "{} channels cannot be written as {kind}",
            profile.name
        )));
    }
    Ok(())
}

/// A group value collection must have one entry per channel, and the
/// selected entries must share a single writable kind.
///
/// Returns the common kind of the selected values, or `None` when the
/// selector picks no channel at all.
pub fn group_values(
    profile: &ModuleProfile,
    channels: &[bool],
    values: &[Value],
) -> Result<Option<ValueKind>> {
    if values.len() != profile.nr_of_channels as usize {
        return Err(Error::InvalidArgument(format!(
            "group values have {} entries, module has {} channels",
            values.len(),
            profile.nr_of_channels
        )));
    }
    let mut kind = None;
    for (index, selected) in channels.iter().enumerate() {
        if !*selected {
            continue;
        }
        let this = values[index].kind();
        match kind {
            None => {
                output_kind(profile, this)?;
                kind = Some(this);
            }
            Some(first) if first != this => {
                return Err(Error::KindMismatch(format!(
                    "group mixes {first} and {this} values"
                )));
            }
            Some(_) => {}
        }
    }
    Ok(kind)
}

/// A typed parameter value must match its spec's wire width.
pub fn param_value(spec: &ParamSpec, value: &ParamValue) -> Result<()> {
    if value.width() != spec.width {
        return Err(Error::InvalidArgument(format!(
            "parameter '{}' takes a {:?} value, got {:?}",
            spec.name,
            spec.width,
            value.width()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{ao4, di4, do4, ParamWidth};

    #[test]
    fn channel_bounds() {
        assert!(channel(&di4::PROFILE, 0).is_ok());
        assert!(channel(&di4::PROFILE, 3).is_ok());
        assert!(matches!(
            channel(&di4::PROFILE, 4),
            Err(Error::ChannelOutOfRange { channel: 4, count: 4 })
        ));
    }

    #[test]
    fn group_mask_builds_from_indices() {
        let mask = group_mask(&di4::PROFILE, &[true, false, true, false]).unwrap();
        assert_eq!(mask, 0b0000_0101);
        let mask = group_mask(&di4::PROFILE, &[false; 4]).unwrap();
        assert_eq!(mask, 0);
    }

    #[test]
    fn group_mask_requires_exact_length() {
        assert!(matches!(
            group_mask(&di4::PROFILE, &[true, false]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            group_mask(&di4::PROFILE, &[false; 5]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn input_kind_checked_against_profile() {
        assert!(input_kind(&di4::PROFILE, ValueKind::Counter).is_ok());
        assert!(matches!(
            input_kind(&di4::PROFILE, ValueKind::AnalogS2),
            Err(Error::KindMismatch(_))
        ));
    }

    #[test]
    fn output_on_input_module_is_unsupported() {
        assert!(matches!(
            output_kind(&di4::PROFILE, ValueKind::Digital),
            Err(Error::Unsupported(_))
        ));
        assert!(output_kind(&do4::PROFILE, ValueKind::Digital).is_ok());
    }

    #[test]
    fn group_values_share_one_kind() {
        let values = [
            Value::AnalogS2(100),
            Value::AnalogS2(0),
            Value::AnalogS4(1),
            Value::AnalogS2(0),
        ];
        // Channels 0 and 1 selected: both AnalogS2, fine.
        let kind = group_values(&ao4::PROFILE, &[true, true, false, false], &values).unwrap();
        assert_eq!(kind, Some(ValueKind::AnalogS2));

        // Including channel 2 mixes kinds.
        assert!(matches!(
            group_values(&ao4::PROFILE, &[true, true, true, false], &values),
            Err(Error::KindMismatch(_))
        ));
    }

    #[test]
    fn group_values_empty_selection() {
        let values = [Value::Digital(false); 4];
        let kind = group_values(&do4::PROFILE, &[false; 4], &values).unwrap();
        assert_eq!(kind, None);
    }

    #[test]
    fn group_values_length_checked() {
        assert!(matches!(
            group_values(&do4::PROFILE, &[false; 4], &[Value::Digital(true)]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn param_width_must_match_spec() {
        assert!(param_value(&di4::param::MODE, &ParamValue::U8(1)).is_ok());
        let err = param_value(&di4::param::SCAN_TIME, &ParamValue::U16(10));
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
        assert_eq!(di4::param::SCAN_TIME.width, ParamWidth::U32);
    }
}

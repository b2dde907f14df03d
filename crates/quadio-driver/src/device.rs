//! The module facade.
//!
//! [`IoModule`] ties the command dispatcher to a [`Transport`] and a
//! [`ModuleProfile`] to produce a validated, typed API for one attached
//! module. There is a single facade type for every module family -- the
//! per-family differences (channel count, accepted value kinds, parameter
//! tables) live in the profile data.
//!
//! All argument validation happens before any bytes are sent; a facade
//! call that fails validation performs no I/O. Device-reported failures
//! come back as [`Status`]/[`Reply::Failed`] values.
//!
//! The facade owns its transport exclusively. The protocol matches
//! responses to requests by ordering alone, so concurrent callers must
//! serialize access themselves (e.g. behind a mutex); nothing here locks.

use tracing::debug;

use quadio_core::error::{Error, Result};
use quadio_core::ident::{DeviceClass, DeviceId};
use quadio_core::status::{Reply, Status};
use quadio_core::transport::Transport;
use quadio_core::value::{Value, ValueKind};

use crate::command;
use crate::modules::{ao4, di4, do4, rt4, ModuleProfile, ParamSpec, ParamValue, ParamWidth};
use crate::validate;

/// A USB I/O module attached through a [`Transport`].
///
/// Construct with [`IoModule::new`] or one of the per-family shorthands
/// ([`di4`](IoModule::di4), [`do4`](IoModule::do4), [`rt4`](IoModule::rt4),
/// [`ao4`](IoModule::ao4)), then [`open`](IoModule::open) the transport
/// and [`identify`](IoModule::identify) the module.
pub struct IoModule {
    profile: &'static ModuleProfile,
    transport: Box<dyn Transport>,
    ident: Option<DeviceId>,
}

impl IoModule {
    /// Create a facade for the given module family over a transport.
    pub fn new(profile: &'static ModuleProfile, transport: Box<dyn Transport>) -> IoModule {
        IoModule {
            profile,
            transport,
            ident: None,
        }
    }

    /// Facade for a 4-channel digital input module.
    pub fn di4(transport: Box<dyn Transport>) -> IoModule {
        IoModule::new(&di4::PROFILE, transport)
    }

    /// Facade for a 4-channel digital output module.
    pub fn do4(transport: Box<dyn Transport>) -> IoModule {
        IoModule::new(&do4::PROFILE, transport)
    }

    /// Facade for a 4-channel RTD input module.
    pub fn rt4(transport: Box<dyn Transport>) -> IoModule {
        IoModule::new(&rt4::PROFILE, transport)
    }

    /// Facade for a 4-channel analog output module.
    pub fn ao4(transport: Box<dyn Transport>) -> IoModule {
        IoModule::new(&ao4::PROFILE, transport)
    }

    /// The profile this facade was built with.
    pub fn profile(&self) -> &'static ModuleProfile {
        self.profile
    }

    /// Open the underlying transport.
    pub async fn open(&mut self) -> Result<()> {
        self.transport.open().await
    }

    /// Close the underlying transport, releasing the port handle.
    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await
    }

    /// Whether the underlying transport is open.
    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    // -----------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------

    /// Read the module identity.
    ///
    /// Any previously cached identity is discarded first: after a failed
    /// identify, [`device_id`](IoModule::device_id) is `None` again rather
    /// than silently stale.
    pub async fn identify(&mut self, options: u8) -> Result<Status> {
        self.ident = None;
        match command::identify(&mut *self.transport, options).await? {
            Reply::Value(id) => {
                debug!(
                    module = self.profile.name,
                    class = format_args!("0x{:04X}", id.device_class),
                    serial = id.serial,
                    "module identified"
                );
                self.ident = Some(id);
                Ok(Status::Ok)
            }
            Reply::Failed(status) => Ok(status),
        }
    }

    /// The identity from the last successful identify, if any.
    pub fn device_id(&self) -> Option<&DeviceId> {
        self.ident.as_ref()
    }

    /// Human-readable device-class name from the cached identity.
    pub fn device_class_name(&self) -> Option<&'static str> {
        self.ident
            .as_ref()
            .and_then(|id| DeviceClass::from_code(id.device_class))
            .map(DeviceClass::name)
    }

    /// Human-readable device-type name from the cached identity, resolved
    /// against this facade's profile table.
    pub fn device_type_name(&self) -> Option<&'static str> {
        self.ident
            .as_ref()
            .and_then(|id| self.profile.device_type_name(id.device_type))
    }

    // -----------------------------------------------------------------
    // Channel I/O
    // -----------------------------------------------------------------

    /// Read one channel as the given value kind.
    pub async fn get_io(&mut self, channel: u8, kind: ValueKind) -> Result<Reply<Value>> {
        validate::channel(self.profile, channel)?;
        validate::input_kind(self.profile, kind)?;
        command::get_io(&mut *self.transport, channel, kind).await
    }

    /// Write one channel value.
    pub async fn set_io(&mut self, channel: u8, value: Value) -> Result<Status> {
        validate::channel(self.profile, channel)?;
        validate::output_kind(self.profile, value.kind())?;
        command::set_io(&mut *self.transport, channel, &value).await
    }

    /// Read a group of channels in one exchange.
    ///
    /// `channels` must have exactly one entry per module channel; a
    /// channel is read iff its entry is `true`. On success the returned
    /// list holds the selected channels' values in ascending channel
    /// order (pair it with the selector to demultiplex). An all-false
    /// selector succeeds with an empty list.
    pub async fn get_io_group(
        &mut self,
        channels: &[bool],
        kind: ValueKind,
    ) -> Result<Reply<Vec<Value>>> {
        validate::input_kind(self.profile, kind)?;
        let mask = validate::group_mask(self.profile, channels)?;
        command::get_io_group(&mut *self.transport, mask, kind).await
    }

    /// Write a group of channels in one exchange.
    ///
    /// Both slices must have exactly one entry per module channel; a
    /// channel is written iff its selector entry is `true`, and all
    /// selected values must share one writable kind.
    pub async fn set_io_group(
        &mut self,
        channels: &[bool],
        values: &[Value],
    ) -> Result<Status> {
        let mask = validate::group_mask(self.profile, channels)?;
        let kind = validate::group_values(self.profile, channels, values)?;
        // An all-false selector still performs the exchange (empty
        // payload); the value-type token then falls back to the first
        // entry's kind, matching the single-kind rule trivially.
        let kind = kind.unwrap_or_else(|| values[0].kind());
        let selected: Vec<Value> = channels
            .iter()
            .zip(values.iter())
            .filter(|(on, _)| **on)
            .map(|(_, value)| *value)
            .collect();
        command::set_io_group(&mut *self.transport, mask, kind, &selected).await
    }

    /// Run a calibration cycle on one channel.
    ///
    /// `options` is module specific (e.g. short/open for RTD inputs);
    /// `persistent` asks the module to store the result across power
    /// cycles.
    pub async fn calibrate_io(
        &mut self,
        channel: u8,
        options: u8,
        persistent: bool,
    ) -> Result<Status> {
        validate::channel(self.profile, channel)?;
        command::calibrate_io(&mut *self.transport, channel, options, persistent).await
    }

    // -----------------------------------------------------------------
    // Configuration parameters
    // -----------------------------------------------------------------

    /// Read a parameter's raw bytes by address.
    pub async fn get_param_raw(
        &mut self,
        address: u16,
        channel: u8,
    ) -> Result<Reply<Vec<u8>>> {
        validate::channel(self.profile, channel)?;
        command::get_param(&mut *self.transport, address, channel).await
    }

    /// Write a parameter's raw bytes by address.
    pub async fn set_param_raw(
        &mut self,
        address: u16,
        channel: u8,
        persistent: bool,
        data: &[u8],
    ) -> Result<Status> {
        validate::channel(self.profile, channel)?;
        command::set_param(&mut *self.transport, address, channel, persistent, data).await
    }

    /// Reset a parameter to its factory default by address.
    pub async fn set_param_default_raw(
        &mut self,
        address: u16,
        channel: u8,
        persistent: bool,
    ) -> Result<Status> {
        validate::channel(self.profile, channel)?;
        command::set_param_default(&mut *self.transport, address, channel, persistent).await
    }

    /// Read a typed parameter.
    ///
    /// The reply payload must match the parameter's declared wire width
    /// exactly; anything else is a decode error.
    pub async fn get_param(
        &mut self,
        spec: &ParamSpec,
        channel: u8,
    ) -> Result<Reply<ParamValue>> {
        validate::channel(self.profile, channel)?;
        let reply = command::get_param(&mut *self.transport, spec.address, channel).await?;
        match reply {
            Reply::Failed(status) => Ok(Reply::Failed(status)),
            Reply::Value(bytes) => Ok(Reply::Value(ParamValue::decode(spec.width, &bytes)?)),
        }
    }

    /// Write a typed parameter.
    pub async fn set_param(
        &mut self,
        spec: &ParamSpec,
        channel: u8,
        persistent: bool,
        value: ParamValue,
    ) -> Result<Status> {
        validate::channel(self.profile, channel)?;
        validate::param_value(spec, &value)?;
        command::set_param(
            &mut *self.transport,
            spec.address,
            channel,
            persistent,
            &value.encode(),
        )
        .await
    }

    /// Reset a typed parameter to its factory default.
    pub async fn set_param_default(
        &mut self,
        spec: &ParamSpec,
        channel: u8,
        persistent: bool,
    ) -> Result<Status> {
        validate::channel(self.profile, channel)?;
        command::set_param_default(&mut *self.transport, spec.address, channel, persistent)
            .await
    }

    // -----------------------------------------------------------------
    // Flag bits
    // -----------------------------------------------------------------

    /// Read one flag bit from a one-byte flags parameter.
    pub async fn get_param_flag(
        &mut self,
        spec: &ParamSpec,
        channel: u8,
        mask: u8,
    ) -> Result<Reply<bool>> {
        let reply = self.flags_byte(spec, channel).await?;
        Ok(reply.map(|byte| byte & mask != 0))
    }

    /// Set or clear one flag bit in a one-byte flags parameter.
    ///
    /// The module has no single-bit write, so this reads the current
    /// flags byte, updates the one bit, and writes the byte back -- all
    /// other bits are preserved. The two exchanges are not atomic: a
    /// concurrent writer between them can lose its update. Callers that
    /// share a module across tasks must serialize flag updates.
    pub async fn set_param_flag(
        &mut self,
        spec: &ParamSpec,
        channel: u8,
        persistent: bool,
        mask: u8,
        enable: bool,
    ) -> Result<Status> {
        match self.flags_byte(spec, channel).await? {
            Reply::Failed(status) => Ok(status),
            Reply::Value(mut byte) => {
                byte &= !mask;
                if enable {
                    byte |= mask;
                }
                command::set_param(
                    &mut *self.transport,
                    spec.address,
                    channel,
                    persistent,
                    &[byte],
                )
                .await
            }
        }
    }

    /// Fetch a one-byte flags parameter.
    async fn flags_byte(&mut self, spec: &ParamSpec, channel: u8) -> Result<Reply<u8>> {
        validate::channel(self.profile, channel)?;
        if spec.width != ParamWidth::U8 {
            return Err(Error::InvalidArgument(format!(
                "parameter '{}' is not a flags byte",
                spec.name
            )));
        }
        let reply = command::get_param(&mut *self.transport, spec.address, channel).await?;
        match reply {
            Reply::Failed(status) => Ok(Reply::Failed(status)),
            Reply::Value(bytes) => {
                let value = ParamValue::decode(ParamWidth::U8, &bytes)?;
                // Width checked above, so as_u8 cannot miss.
                Ok(Reply::Value(value.as_u8().unwrap_or_default()))
            }
        }
    }
}

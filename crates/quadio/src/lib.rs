//! # quadio -- USB I/O Module Control
//!
//! `quadio` is an asynchronous Rust library for controlling a family of
//! USB-attached 4-channel I/O modules: digital inputs, digital outputs,
//! RTD temperature inputs, and analog outputs. The modules enumerate as
//! USB CDC serial ports and speak a small binary command/response
//! protocol.
//!
//! ## Quick Start
//!
//! Add `quadio` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! quadio = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Connect to a digital input module and read channel 0:
//!
//! ```no_run
//! use quadio::{IoModule, SerialTransport, ValueKind};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let transport = SerialTransport::new("/dev/ttyACM0");
//!     let mut module = IoModule::di4(Box::new(transport));
//!     module.open().await?;
//!
//!     let status = module.identify(0).await?;
//!     anyhow::ensure!(status.is_ok(), "identify failed: {status}");
//!     println!("module: {:?}", module.device_class_name());
//!
//!     let reply = module.get_io(0, ValueKind::Digital).await?;
//!     println!("channel 0: {:?}", reply.value());
//!
//!     module.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                  | Purpose                                      |
//! |------------------------|----------------------------------------------|
//! | `quadio-core`          | [`Transport`] trait, [`Value`] codec, [`Status`]/[`Reply`], errors |
//! | `quadio-transport`     | Serial (USB CDC) transport implementation    |
//! | `quadio-driver`        | Frame codec, command set, module catalogs, [`IoModule`] facade |
//! | `quadio-test-harness`  | Mock transport for protocol tests            |
//! | **`quadio`**           | This facade crate -- re-exports everything   |
//!
//! ## Protocol model
//!
//! Every operation is one strictly sequential request/response exchange:
//! the driver writes a 4-byte header plus payload, then reads a 2-byte
//! status header plus the declared payload. Responses are matched to
//! requests by ordering alone -- one exchange in flight per transport,
//! and no internal locking. Device-reported failures are returned as
//! [`Status`] values, not errors; callers branch on the status of every
//! call.

pub use quadio_core::*;

pub use quadio_driver::{
    command, device, frame, modules, validate, IoModule, ModuleProfile, ParamSpec,
    ParamValue, ParamWidth,
};

pub use quadio_transport::{SerialConfig, SerialTransport};

/// All module profiles this library ships.
///
/// The primary entry point for applications that enumerate supported
/// module types (e.g. a connection dialog): resolve an identify reply's
/// device class against [`ModuleProfile::device_class`].
pub fn supported_modules() -> Vec<&'static ModuleProfile> {
    modules::all_profiles().to_vec()
}

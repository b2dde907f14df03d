//! quadio-driver: the binary command/response protocol driver.
//!
//! This crate implements the module protocol on top of any
//! [`Transport`](quadio_core::Transport):
//!
//! - [`frame`] -- request/response frame codec
//! - [`command`] -- the protocol's operation set (one exchange per call)
//! - [`modules`] -- per-family catalogs (channel counts, parameters,
//!   modes, flags, device types)
//! - [`validate`] -- shared argument validation
//! - [`device`] -- the [`IoModule`] facade tying it all together
//!
//! # Example
//!
//! ```no_run
//! use quadio_driver::IoModule;
//! use quadio_core::ValueKind;
//! use quadio_transport::SerialTransport;
//!
//! # async fn example() -> quadio_core::Result<()> {
//! let transport = SerialTransport::new("/dev/ttyACM0");
//! let mut module = IoModule::di4(Box::new(transport));
//! module.open().await?;
//!
//! let status = module.identify(0).await?;
//! if status.is_ok() {
//!     println!("connected to {:?}", module.device_type_name());
//! }
//!
//! let reply = module.get_io(0, ValueKind::Digital).await?;
//! println!("channel 0: {:?}", reply);
//! module.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod device;
pub mod frame;
pub mod modules;
pub mod validate;

pub use device::IoModule;
pub use modules::{ModuleProfile, ParamSpec, ParamValue, ParamWidth};

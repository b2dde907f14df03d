//! quadio-core: Core traits, types, and error definitions for quadio.
//!
//! This crate defines the module-family-agnostic abstractions the rest of
//! the workspace builds on. Applications normally depend on the `quadio`
//! facade crate instead.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel to a module
//! - [`Value`] / [`ValueKind`] -- typed wire values and their codec
//! - [`Status`] / [`Reply`] -- device-reported operation outcomes
//! - [`DeviceId`] -- module identity metadata
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod ident;
pub mod status;
pub mod transport;
pub mod value;

// Re-export key types at crate root for ergonomic `use quadio_core::*`.
pub use error::{Error, Result};
pub use ident::{DeviceClass, DeviceId, IDENT_PAYLOAD_LEN};
pub use status::{Reply, Status};
pub use transport::Transport;
pub use value::{decode_group, selected_channels, Value, ValueKind};

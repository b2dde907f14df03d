//! quadio-transport: Transport implementations for quadio.
//!
//! Provides [`SerialTransport`] for the USB CDC serial ports the modules
//! enumerate as. The protocol layer consumes the
//! [`Transport`](quadio_core::Transport) trait, so applications can swap
//! in other byte streams (or the mock from `quadio-test-harness`).

pub mod serial;

pub use serial::{DataBits, FlowControl, Parity, SerialConfig, SerialTransport, StopBits};

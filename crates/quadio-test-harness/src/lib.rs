//! quadio-test-harness: Mock transports for quadio.
//!
//! This crate provides [`MockTransport`] for deterministic unit testing of
//! the protocol layer without requiring module hardware.

pub mod mock_transport;

pub use mock_transport::MockTransport;

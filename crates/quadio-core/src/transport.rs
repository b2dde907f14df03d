//! Transport trait for module communication.
//!
//! The [`Transport`] trait abstracts over the physical link to an I/O
//! module -- in practice a USB CDC virtual serial port, or a mock transport
//! for testing (`MockTransport` in the `quadio-test-harness` crate).
//!
//! The protocol layer depends only on this trait, never on a concrete
//! port, so every exchange can be unit-tested without hardware.

use async_trait::async_trait;

use crate::error::Result;

/// Asynchronous byte-level transport to an I/O module.
///
/// The protocol is strictly request/response with length-prefixed
/// payloads, so the read side is exact-length: the caller always knows
/// how many bytes come next. A transport that cannot deliver exactly the
/// requested count must fail, never return a partial fill.
///
/// `open`/`close` are explicit. The module driver owns its transport
/// exclusively and does not reconnect on failure.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the underlying connection.
    async fn open(&mut self) -> Result<()>;

    /// Close the underlying connection, releasing the OS handle.
    async fn close(&mut self) -> Result<()>;

    /// Write the entire buffer to the module.
    async fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Fill `buf` completely with the next bytes from the module.
    ///
    /// Fails with [`Error::Transport`](crate::error::Error::Transport)
    /// (or [`Error::Timeout`](crate::error::Error::Timeout)) if fewer
    /// than `buf.len()` bytes arrive; `buf` contents are then
    /// unspecified.
    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Whether the transport is currently open.
    fn is_open(&self) -> bool;
}

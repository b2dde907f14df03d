//! Mock transport for deterministic testing of the protocol layer.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs. This lets you test request framing, response
//! parsing, and value decoding without real hardware.
//!
//! # Example
//!
//! ```
//! use quadio_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // Pre-load: when the driver sends this request, return this response.
//! mock.expect(&[0x46, 0x00, 0x20, 0x00], &[0x00, 0x01, 0x01]);
//! ```

use std::collections::VecDeque;

use async_trait::async_trait;

use quadio_core::error::{Error, Result};
use quadio_core::transport::Transport;

/// A pre-loaded request/response pair for the mock transport.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be written.
    request: Vec<u8>,
    /// The bytes to serve to subsequent reads once the request matched.
    response: Vec<u8>,
}

/// A mock [`Transport`] for testing the protocol layer without hardware.
///
/// Expectations are consumed in order. When `write_all()` is called, the
/// written frame is recorded and matched against the next expectation; the
/// corresponding response bytes are then served by `read_exact()` calls
/// until exhausted.
///
/// A response that is shorter than what the driver tries to read produces
/// a transport error on the read side -- this is how short reads (device
/// unplugged mid-response) are simulated.
#[derive(Debug)]
pub struct MockTransport {
    /// Ordered queue of expected request/response pairs.
    expectations: VecDeque<Expectation>,
    /// Bytes staged for reading, in arrival order.
    pending: Vec<u8>,
    /// Read position within `pending`.
    cursor: usize,
    /// Whether the transport is "open".
    open: bool,
    /// Log of all frames written through this transport.
    written_log: Vec<Vec<u8>>,
}

impl MockTransport {
    /// Create a new mock transport in the open state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            pending: Vec::new(),
            cursor: 0,
            open: true,
            written_log: Vec::new(),
        }
    }

    /// Add an expected request/response pair.
    ///
    /// When `write_all()` is called with bytes matching `request`, the
    /// subsequent `read_exact()` calls will be served from `response`.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// All frames written through this transport, one entry per
    /// `write_all()` call.
    pub fn written_frames(&self) -> &[Vec<u8>] {
        &self.written_log
    }

    /// Number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Staged response bytes that have not been read yet.
    pub fn unread_bytes(&self) -> usize {
        self.pending.len() - self.cursor
    }

    /// Force the open/closed state of the mock.
    ///
    /// When closed, `write_all()` and `read_exact()` fail with
    /// [`Error::NotConnected`].
    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        self.pending.clear();
        self.cursor = 0;
        Ok(())
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        if !self.open {
            return Err(Error::NotConnected);
        }

        self.written_log.push(data.to_vec());

        match self.expectations.pop_front() {
            Some(expectation) => {
                if data != expectation.request.as_slice() {
                    return Err(Error::Transport(format!(
                        "unexpected frame: expected {:02X?}, got {:02X?}",
                        expectation.request, data
                    )));
                }
                self.pending.extend_from_slice(&expectation.response);
                Ok(())
            }
            None => Err(Error::Transport(
                "no more expectations in mock transport".into(),
            )),
        }
    }

    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if !self.open {
            return Err(Error::NotConnected);
        }

        let available = self.pending.len() - self.cursor;
        if available < buf.len() {
            // Short read: hand over what there is and fail, like a serial
            // port whose device stopped answering mid-frame.
            let wanted = buf.len();
            self.cursor = self.pending.len();
            return Err(Error::Transport(format!(
                "short read: wanted {wanted} bytes, {available} available"
            )));
        }

        buf.copy_from_slice(&self.pending[self.cursor..self.cursor + buf.len()]);
        self.cursor += buf.len();
        if self.cursor == self.pending.len() {
            self.pending.clear();
            self.cursor = 0;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn basic_write_read() {
        let mut mock = MockTransport::new();
        let request = [0x46, 0x00, 0x20, 0x00];
        let response = [0x00, 0x01, 0x01];
        mock.expect(&request, &response);

        mock.write_all(&request).await.unwrap();

        let mut header = [0u8; 2];
        mock.read_exact(&mut header).await.unwrap();
        assert_eq!(header, [0x00, 0x01]);

        let mut payload = [0u8; 1];
        mock.read_exact(&mut payload).await.unwrap();
        assert_eq!(payload, [0x01]);
        assert_eq!(mock.unread_bytes(), 0);
    }

    #[tokio::test]
    async fn tracks_written_frames() {
        let mut mock = MockTransport::new();
        mock.expect(&[0x01], &[0x00, 0x00]);
        mock.expect(&[0x02], &[0x00, 0x00]);

        mock.write_all(&[0x01]).await.unwrap();
        mock.write_all(&[0x02]).await.unwrap();

        assert_eq!(mock.written_frames().len(), 2);
        assert_eq!(mock.written_frames()[0], vec![0x01]);
        assert_eq!(mock.written_frames()[1], vec![0x02]);
        assert_eq!(mock.remaining_expectations(), 0);
    }

    #[tokio::test]
    async fn wrong_frame_errors() {
        let mut mock = MockTransport::new();
        mock.expect(&[0x01], &[0x00, 0x00]);

        let result = mock.write_all(&[0x99]).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn exhausted_expectations_error() {
        let mut mock = MockTransport::new();
        let result = mock.write_all(&[0x01]).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn short_read_errors() {
        let mut mock = MockTransport::new();
        mock.expect(&[0x01], &[0x00, 0x02]);
        mock.write_all(&[0x01]).await.unwrap();

        let mut header = [0u8; 2];
        mock.read_exact(&mut header).await.unwrap();

        // Header declared 2 payload bytes, but none were staged.
        let mut payload = [0u8; 2];
        let result = mock.read_exact(&mut payload).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn closed_transport_rejects_io() {
        let mut mock = MockTransport::new();
        mock.set_open(false);
        assert!(!mock.is_open());

        assert!(matches!(
            mock.write_all(&[0x01]).await,
            Err(Error::NotConnected)
        ));
        let mut buf = [0u8; 1];
        assert!(matches!(
            mock.read_exact(&mut buf).await,
            Err(Error::NotConnected)
        ));

        mock.open().await.unwrap();
        assert!(mock.is_open());
    }

    #[tokio::test]
    async fn close_discards_pending_bytes() {
        let mut mock = MockTransport::new();
        mock.expect(&[0x01], &[0x00, 0x01, 0xAA]);
        mock.write_all(&[0x01]).await.unwrap();
        assert_eq!(mock.unread_bytes(), 3);

        mock.close().await.unwrap();
        assert!(!mock.is_open());
        assert_eq!(mock.unread_bytes(), 0);
    }
}

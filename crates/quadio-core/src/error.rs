//! Error types for quadio.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Argument validation, transport-layer,
//! and wire-decode failures are all captured here.
//!
//! A nonzero device status byte is deliberately *not* an [`Error`]: the
//! device answered, and the status is part of the answer. Those are
//! surfaced as [`Status`](crate::status::Status) values (see
//! [`Reply`](crate::status::Reply)).

/// The error type for all quadio operations.
///
/// Variants fall into three groups: argument errors raised before any
/// bytes are sent, transport failures, and malformed wire data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level failure (write error, short read, port busy).
    #[error("transport error: {0}")]
    Transport(String),

    /// Timed out waiting for the module to answer.
    ///
    /// Usually means the module was unplugged mid-exchange or the port
    /// points at a device that does not speak this protocol.
    #[error("timeout waiting for response")]
    Timeout,

    /// No connection to the module has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the module was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// Received bytes that do not decode as the expected wire format
    /// (wrong identify payload length, truncated value, bad group size).
    #[error("decode error: {0}")]
    Decode(String),

    /// A channel index at or beyond the module's channel count.
    #[error("channel {channel} out of range (module has {count} channels)")]
    ChannelOutOfRange { channel: u8, count: u8 },

    /// A numeric value that does not fit its wire representation.
    #[error("value out of range: {0}")]
    ValueOutOfRange(String),

    /// A value kind the target operation or module type does not accept.
    #[error("value kind mismatch: {0}")]
    KindMismatch(String),

    /// A malformed argument (wrong group collection length, oversized
    /// payload, parameter width mismatch).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested operation is not available on this module type.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_transport() {
        let e = Error::Transport("port busy".into());
        assert_eq!(e.to_string(), "transport error: port busy");
    }

    #[test]
    fn error_display_timeout() {
        assert_eq!(Error::Timeout.to_string(), "timeout waiting for response");
    }

    #[test]
    fn error_display_not_connected() {
        assert_eq!(Error::NotConnected.to_string(), "not connected");
    }

    #[test]
    fn error_display_channel_out_of_range() {
        let e = Error::ChannelOutOfRange {
            channel: 4,
            count: 4,
        };
        assert_eq!(
            e.to_string(),
            "channel 4 out of range (module has 4 channels)"
        );
    }

    #[test]
    fn error_display_decode() {
        let e = Error::Decode("identify payload has 3 bytes, expected 11".into());
        assert!(e.to_string().starts_with("decode error"));
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<Error>();
    }
}

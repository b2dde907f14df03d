//! Request/response frame codec.
//!
//! Every exchange with a module is one request frame followed by one
//! response frame:
//!
//! ```text
//! request:  | opcode | p1 | p2 | len | payload (len bytes) |
//! response: | status | len | payload (len bytes, only if status == OK) |
//! ```
//!
//! All fields are single bytes except the payload; multi-byte quantities
//! inside payloads are little-endian. The length byte is authoritative --
//! response parsing never infers the payload size from the stream.

use bytes::{BufMut, BytesMut};

use quadio_core::error::{Error, Result};
use quadio_core::status::Status;

/// Operation codes of the module protocol.
pub mod opcode {
    /// Write one channel value.
    pub const SET_IO: u8 = 0x40;
    /// Write a group of channel values.
    pub const SET_IO_GROUP: u8 = 0x42;
    /// Read one channel value.
    pub const GET_IO: u8 = 0x46;
    /// Read a group of channel values.
    pub const GET_IO_GROUP: u8 = 0x48;
    /// Run a channel calibration cycle.
    pub const CALIBRATE_IO: u8 = 0x52;
    /// Write a configuration parameter.
    pub const SET_PARAM: u8 = 0xA0;
    /// Read a configuration parameter.
    pub const GET_PARAM: u8 = 0xA2;
    /// Read the module identity.
    pub const IDENTIFY: u8 = 0xC0;
}

/// Maximum payload size a frame can carry (the length field is one byte).
pub const MAX_PAYLOAD: usize = 255;

/// An outgoing request frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Operation code.
    pub opcode: u8,
    /// First parameter byte -- typically the channel index or mask.
    pub p1: u8,
    /// Second parameter byte -- typically a value-type token or flags.
    pub p2: u8,
    payload: Vec<u8>,
}

impl Request {
    /// Build a request without payload.
    pub fn new(opcode: u8, p1: u8, p2: u8) -> Request {
        Request {
            opcode,
            p1,
            p2,
            payload: Vec::new(),
        }
    }

    /// Build a request carrying a payload.
    ///
    /// Fails if the payload exceeds [`MAX_PAYLOAD`] bytes.
    pub fn with_payload(opcode: u8, p1: u8, p2: u8, payload: Vec<u8>) -> Result<Request> {
        if payload.len() > MAX_PAYLOAD {
            return Err(Error::InvalidArgument(format!(
                "payload of {} bytes exceeds the {MAX_PAYLOAD}-byte frame limit",
                payload.len()
            )));
        }
        Ok(Request {
            opcode,
            p1,
            p2,
            payload,
        })
    }

    /// The request payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Encode the full frame for transmission.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(4 + self.payload.len());
        buf.put_u8(self.opcode);
        buf.put_u8(self.p1);
        buf.put_u8(self.p2);
        buf.put_u8(self.payload.len() as u8);
        buf.put_slice(&self.payload);
        buf.to_vec()
    }
}

/// The two-byte header of a response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    /// Device-reported status.
    pub status: Status,
    /// Payload length the device declared.
    pub declared_len: u8,
}

impl ResponseHeader {
    /// Parse the two header bytes.
    pub fn parse(bytes: [u8; 2]) -> ResponseHeader {
        ResponseHeader {
            status: Status::from_byte(bytes[0]),
            declared_len: bytes[1],
        }
    }

    /// Whether payload bytes follow this header.
    ///
    /// A payload is only present (and only read) when the status signals
    /// success and the declared length is nonzero.
    pub fn has_payload(&self) -> bool {
        self.status.is_ok() && self.declared_len > 0
    }
}

/// A fully received response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Device-reported status.
    pub status: Status,
    /// Payload bytes (empty unless the status is OK and the device sent
    /// data).
    pub payload: Vec<u8>,
}

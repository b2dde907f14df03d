//! The protocol's operation set.
//!
//! One free async function per module operation, each performing a single
//! blocking request/response exchange on a [`Transport`]. Responses are
//! matched to requests purely by ordering -- callers must never overlap
//! exchanges on one transport.
//!
//! Device-reported failures come back as [`Status`]/[`Reply::Failed`]
//! values; only transport faults and malformed wire data are `Err`.

use bytes::BytesMut;
use tracing::{debug, trace};

use quadio_core::error::Result;
use quadio_core::ident::DeviceId;
use quadio_core::status::{Reply, Status};
use quadio_core::transport::Transport;
use quadio_core::value::{decode_group, Value, ValueKind};

use crate::frame::{opcode, Request, Response, ResponseHeader};

/// p2 bit requesting that a parameter write survive power cycling.
pub const PERSISTENT_BIT: u8 = 0x80;

/// p2 bit requesting a reset of the parameter to its factory default.
pub const DEFAULT_BIT: u8 = 0x01;

/// Send one request and receive its response frame.
///
/// Reads exactly two header bytes, then -- only when the status is OK and
/// the declared length is nonzero -- exactly that many payload bytes. A
/// transport that cannot deliver the declared bytes fails the exchange
/// with a transport error; no partially read response ever surfaces as a
/// success.
pub async fn transact(transport: &mut dyn Transport, request: &Request) -> Result<Response> {
    let frame = request.encode();
    trace!(
        opcode = format_args!("0x{:02X}", request.opcode),
        p1 = request.p1,
        p2 = request.p2,
        len = request.payload().len(),
        "sending request"
    );
    transport.write_all(&frame).await?;

    let mut header = [0u8; 2];
    transport.read_exact(&mut header).await?;
    let header = ResponseHeader::parse(header);

    let payload = if header.has_payload() {
        let mut buf = vec![0u8; header.declared_len as usize];
        transport.read_exact(&mut buf).await?;
        buf
    } else {
        Vec::new()
    };

    debug!(
        opcode = format_args!("0x{:02X}", request.opcode),
        status = %header.status,
        payload_len = payload.len(),
        "exchange complete"
    );
    Ok(Response {
        status: header.status,
        payload,
    })
}

/// Read one channel value of the given kind.
pub async fn get_io(
    transport: &mut dyn Transport,
    channel: u8,
    kind: ValueKind,
) -> Result<Reply<Value>> {
    let request = Request::new(opcode::GET_IO, channel, kind.token());
    let response = transact(transport, &request).await?;
    if !response.status.is_ok() {
        return Ok(Reply::Failed(response.status));
    }
    Ok(Reply::Value(Value::decode(kind, &response.payload)?))
}

/// Read the channels selected by `mask`, all of one kind.
///
/// The response payload carries the selected channels' values packed in
/// ascending channel-index order; the returned list follows that order.
/// An all-zero mask is transmitted as-is and decodes to an empty list on
/// success.
pub async fn get_io_group(
    transport: &mut dyn Transport,
    mask: u8,
    kind: ValueKind,
) -> Result<Reply<Vec<Value>>> {
    let request = Request::new(opcode::GET_IO_GROUP, mask, kind.token());
    let response = transact(transport, &request).await?;
    if !response.status.is_ok() {
        return Ok(Reply::Failed(response.status));
    }
    Ok(Reply::Value(decode_group(mask, kind, &response.payload)?))
}

/// Write one channel value.
pub async fn set_io(
    transport: &mut dyn Transport,
    channel: u8,
    value: &Value,
) -> Result<Status> {
    let mut payload = BytesMut::with_capacity(value.wire_len());
    value.encode_into(&mut payload);
    let request =
        Request::with_payload(opcode::SET_IO, channel, value.token(), payload.to_vec())?;
    Ok(transact(transport, &request).await?.status)
}

/// Write the channels selected by `mask`.
///
/// `values` must hold exactly one value per selected channel, in ascending
/// channel-index order, all of kind `kind` (the facade validates this).
pub async fn set_io_group(
    transport: &mut dyn Transport,
    mask: u8,
    kind: ValueKind,
    values: &[Value],
) -> Result<Status> {
    let mut payload = BytesMut::with_capacity(values.len() * kind.wire_len());
    for value in values {
        value.encode_into(&mut payload);
    }
    let request =
        Request::with_payload(opcode::SET_IO_GROUP, mask, kind.token(), payload.to_vec())?;
    Ok(transact(transport, &request).await?.status)
}

/// Read a configuration parameter's raw bytes.
pub async fn get_param(
    transport: &mut dyn Transport,
    address: u16,
    channel: u8,
) -> Result<Reply<Vec<u8>>> {
    let request = Request::with_payload(
        opcode::GET_PARAM,
        channel,
        0,
        address.to_le_bytes().to_vec(),
    )?;
    let response = transact(transport, &request).await?;
    if !response.status.is_ok() {
        return Ok(Reply::Failed(response.status));
    }
    Ok(Reply::Value(response.payload))
}

/// Write a configuration parameter.
pub async fn set_param(
    transport: &mut dyn Transport,
    address: u16,
    channel: u8,
    persistent: bool,
    data: &[u8],
) -> Result<Status> {
    let mut p2 = 0;
    if persistent {
        p2 |= PERSISTENT_BIT;
    }
    let mut payload = Vec::with_capacity(2 + data.len());
    payload.extend_from_slice(&address.to_le_bytes());
    payload.extend_from_slice(data);
    let request = Request::with_payload(opcode::SET_PARAM, channel, p2, payload)?;
    Ok(transact(transport, &request).await?.status)
}

/// Reset a configuration parameter to its factory default.
pub async fn set_param_default(
    transport: &mut dyn Transport,
    address: u16,
    channel: u8,
    persistent: bool,
) -> Result<Status> {
    let mut p2 = DEFAULT_BIT;
    if persistent {
        p2 |= PERSISTENT_BIT;
    }
    let request = Request::with_payload(
        opcode::SET_PARAM,
        channel,
        p2,
        address.to_le_bytes().to_vec(),
    )?;
    Ok(transact(transport, &request).await?.status)
}

/// Read the module identity.
pub async fn identify(transport: &mut dyn Transport, options: u8) -> Result<Reply<DeviceId>> {
    let request = Request::new(opcode::IDENTIFY, 0, options);
    let response = transact(transport, &request).await?;
    if !response.status.is_ok() {
        return Ok(Reply::Failed(response.status));
    }
    Ok(Reply::Value(DeviceId::decode(&response.payload)?))
}

/// Run a calibration cycle on one channel.
///
/// `options` selects the calibration mode (module specific); bit `0x80`
/// is reserved for the persistence request and ORed in here.
pub async fn calibrate_io(
    transport: &mut dyn Transport,
    channel: u8,
    options: u8,
    persistent: bool,
) -> Result<Status> {
    let mut p2 = options;
    if persistent {
        p2 |= PERSISTENT_BIT;
    }
    let request = Request::new(opcode::CALIBRATE_IO, channel, p2);
    Ok(transact(transport, &request).await?.status)
}

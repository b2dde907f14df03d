//! Serial port transport for module communication.
//!
//! The modules enumerate as USB CDC virtual COM ports, so
//! [`SerialTransport`] is the transport used against real hardware. The
//! baud rate is nominal -- USB CDC ignores it -- but it is configurable for
//! setups routing the protocol over a physical RS-232 converter.
//!
//! # Example
//!
//! ```no_run
//! use quadio_transport::SerialTransport;
//! use quadio_core::transport::Transport;
//!
//! # async fn example() -> quadio_core::Result<()> {
//! let mut transport = SerialTransport::new("/dev/ttyACM0");
//! transport.open().await?;
//!
//! // Identify request: opcode 0xC0, channel 0, options 0, no payload.
//! transport.write_all(&[0xC0, 0x00, 0x00, 0x00]).await?;
//!
//! let mut header = [0u8; 2];
//! transport.read_exact(&mut header).await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::SerialPortBuilderExt;

use quadio_core::error::{Error, Result};
use quadio_core::transport::Transport;

/// Serial port configuration.
///
/// Defaults are appropriate for the USB CDC modules: 9600 baud (nominal),
/// 8 data bits, 1 stop bit, no parity, no flow control, and a 500 ms
/// bound on each exact read.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Baud rate. Nominal for USB CDC ports.
    pub baud_rate: u32,
    /// Number of data bits (typically 8).
    pub data_bits: DataBits,
    /// Number of stop bits (typically 1).
    pub stop_bits: StopBits,
    /// Parity checking (typically None).
    pub parity: Parity,
    /// Flow control (typically None).
    pub flow_control: FlowControl,
    /// Upper bound for one `read_exact` call. The protocol layer has no
    /// timeout of its own; this is the only thing bounding a blocking
    /// read against an unresponsive module.
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
            read_timeout: Duration::from_millis(500),
        }
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl From<DataBits> for tokio_serial::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => tokio_serial::DataBits::Five,
            DataBits::Six => tokio_serial::DataBits::Six,
            DataBits::Seven => tokio_serial::DataBits::Seven,
            DataBits::Eight => tokio_serial::DataBits::Eight,
        }
    }
}

/// Number of stop bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

impl From<StopBits> for tokio_serial::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => tokio_serial::StopBits::One,
            StopBits::Two => tokio_serial::StopBits::Two,
        }
    }
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl From<Parity> for tokio_serial::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => tokio_serial::Parity::None,
            Parity::Odd => tokio_serial::Parity::Odd,
            Parity::Even => tokio_serial::Parity::Even,
        }
    }
}

/// Flow control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    None,
    Software,
    Hardware,
}

impl From<FlowControl> for tokio_serial::FlowControl {
    fn from(flow: FlowControl) -> Self {
        match flow {
            FlowControl::None => tokio_serial::FlowControl::None,
            FlowControl::Software => tokio_serial::FlowControl::Software,
            FlowControl::Hardware => tokio_serial::FlowControl::Hardware,
        }
    }
}

/// Serial port transport for USB I/O modules.
///
/// The port handle is acquired by [`Transport::open`] and released by
/// [`Transport::close`] -- construction alone touches no hardware, and a
/// facade that is never closed leaks the OS handle until drop.
pub struct SerialTransport {
    port: Option<tokio_serial::SerialStream>,
    port_name: String,
    config: SerialConfig,
}

impl SerialTransport {
    /// Describe a serial transport with default settings.
    ///
    /// `port` is the serial port path (e.g. `/dev/ttyACM0` on Linux,
    /// `COM16` on Windows). Nothing is opened until
    /// [`Transport::open`] is called.
    pub fn new(port: &str) -> Self {
        Self::with_config(port, SerialConfig::default())
    }

    /// Describe a serial transport with full configuration control.
    pub fn with_config(port: &str, config: SerialConfig) -> Self {
        Self {
            port: None,
            port_name: port.to_string(),
            config,
        }
    }

    /// The configured serial port path.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    fn map_io_error(e: std::io::Error) -> Error {
        if e.kind() == std::io::ErrorKind::BrokenPipe
            || e.kind() == std::io::ErrorKind::NotConnected
        {
            Error::ConnectionLost
        } else {
            Error::Io(e)
        }
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn open(&mut self) -> Result<()> {
        if self.port.is_some() {
            return Ok(());
        }

        tracing::debug!(
            port = %self.port_name,
            baud_rate = self.config.baud_rate,
            "opening serial port"
        );

        let stream = tokio_serial::new(&self.port_name, self.config.baud_rate)
            .data_bits(self.config.data_bits.into())
            .stop_bits(self.config.stop_bits.into())
            .parity(self.config.parity.into())
            .flow_control(self.config.flow_control.into())
            .open_native_async()
            .map_err(|e| {
                tracing::error!(port = %self.port_name, error = %e, "failed to open serial port");
                Error::Transport(format!(
                    "failed to open serial port {}: {e}",
                    self.port_name
                ))
            })?;

        tracing::info!(port = %self.port_name, "serial port opened");
        self.port = Some(stream);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut port) = self.port.take() {
            if let Err(e) = port.flush().await {
                tracing::warn!(port = %self.port_name, error = %e, "flush before close failed");
            }
            // Dropping the stream closes the OS handle.
            tracing::info!(port = %self.port_name, "serial port closed");
        }
        Ok(())
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        tracing::trace!(port = %self.port_name, bytes = data.len(), data = ?data, "writing frame");

        port.write_all(data).await.map_err(|e| {
            tracing::error!(port = %self.port_name, error = %e, "write failed");
            Self::map_io_error(e)
        })?;

        // Flush so the request leaves the OS buffer before we block on
        // the response.
        port.flush().await.map_err(|e| {
            tracing::error!(port = %self.port_name, error = %e, "flush failed");
            Self::map_io_error(e)
        })
    }

    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let timeout = self.config.read_timeout;
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        tracing::trace!(
            port = %self.port_name,
            bytes = buf.len(),
            timeout_ms = timeout.as_millis(),
            "waiting for exact read"
        );

        match tokio::time::timeout(timeout, port.read_exact(buf)).await {
            Ok(Ok(_)) => {
                tracing::trace!(port = %self.port_name, data = ?buf, "read complete");
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::error!(port = %self.port_name, error = %e, "read failed");
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    Err(Error::Transport(format!(
                        "short read: port {} closed mid-frame",
                        self.port_name
                    )))
                } else {
                    Err(Self::map_io_error(e))
                }
            }
            Err(_) => {
                tracing::debug!(
                    port = %self.port_name,
                    timeout_ms = timeout.as_millis(),
                    "read timed out"
                );
                Err(Error::Timeout)
            }
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.port.is_some() {
            tracing::debug!(port = %self.port_name, "SerialTransport dropped while open");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_are_8n1() {
        let config = SerialConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.stop_bits, StopBits::One);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.flow_control, FlowControl::None);
        assert_eq!(config.read_timeout, Duration::from_millis(500));
    }

    #[test]
    fn new_transport_is_closed() {
        let transport = SerialTransport::new("/dev/ttyACM0");
        assert!(!transport.is_open());
        assert_eq!(transport.port_name(), "/dev/ttyACM0");
    }

    #[tokio::test]
    async fn io_on_closed_transport_is_not_connected() {
        let mut transport = SerialTransport::new("/dev/ttyACM0");
        assert!(matches!(
            transport.write_all(&[0x00]).await,
            Err(Error::NotConnected)
        ));
        let mut buf = [0u8; 2];
        assert!(matches!(
            transport.read_exact(&mut buf).await,
            Err(Error::NotConnected)
        ));
    }

    #[tokio::test]
    async fn close_without_open_is_a_no_op() {
        let mut transport = SerialTransport::new("/dev/ttyACM0");
        transport.close().await.unwrap();
        assert!(!transport.is_open());
    }

    #[test]
    fn setting_conversions() {
        let _: tokio_serial::DataBits = DataBits::Eight.into();
        let _: tokio_serial::StopBits = StopBits::Two.into();
        let _: tokio_serial::Parity = Parity::Even.into();
        let _: tokio_serial::FlowControl = FlowControl::Software.into();
    }
}

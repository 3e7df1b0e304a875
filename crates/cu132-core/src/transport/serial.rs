//! serialport-backed transport implementation.

use std::io::{Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{info, trace};

use super::traits::{SerialTransport, TransportError};
use crate::protocol::constants::BAUD_RATE;

/// Transport over a real serial port.
///
/// The CU speaks fixed parameters: 19200 baud, 8 data bits, no parity,
/// 1 stop bit, no flow control. Only the port name and the per-byte timeout
/// vary per session.
pub struct SerialPortTransport {
    port: Box<dyn SerialPort>,
    timeout: Duration,
}

impl SerialPortTransport {
    /// Open and configure the named port.
    pub fn open(port_name: &str, timeout: Duration) -> Result<Self, TransportError> {
        let port = serialport::new(port_name, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()
            .map_err(|e| TransportError::OpenFailed {
                port: port_name.to_string(),
                message: e.to_string(),
            })?;

        info!(port = %port_name, baud = BAUD_RATE, "Port opened");
        Ok(Self { port, timeout })
    }
}

impl SerialTransport for SerialPortTransport {
    fn write_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        self.port
            .write_all(&[byte])
            .map_err(|e| TransportError::WriteFailed(e.to_string()))?;
        self.port
            .flush()
            .map_err(|e| TransportError::WriteFailed(e.to_string()))?;
        trace!(byte = %format!("{byte:02X}"), "TX");
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        let mut buf = [0u8; 1];
        match self.port.read_exact(&mut buf) {
            Ok(()) => {
                trace!(byte = %format!("{:02X}", buf[0]), "RX");
                Ok(buf[0])
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Err(TransportError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }),
            Err(e) => Err(TransportError::ReadFailed(e.to_string())),
        }
    }
}

//! Serial transport layer abstraction.
//!
//! Defines the `SerialTransport` trait for byte-level CU communication,
//! allowing different implementations (serialport, mock, etc.).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to open port {port}: {message}")]
    OpenFailed { port: String, message: String },

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Port disconnected")]
    Disconnected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Abstract byte-oriented serial transport.
///
/// The CU protocol is strictly sequential: single bytes out, single bytes
/// back, every read bounded by the port timeout. This trait enables:
/// - Production implementation using serialport
/// - Mock implementation for unit testing
pub trait SerialTransport: Send {
    /// Write one byte to the port.
    fn write_byte(&mut self, byte: u8) -> Result<(), TransportError>;

    /// Read one byte, blocking up to the configured timeout.
    fn read_byte(&mut self) -> Result<u8, TransportError>;
}

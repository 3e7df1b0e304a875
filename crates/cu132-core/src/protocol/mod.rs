//! Protocol module - CU wire protocol definitions.

pub mod checksum;
pub mod constants;
pub mod decode;
pub mod frame;

use thiserror::Error;

use crate::transport::TransportError;

pub use frame::RawFrame;

/// Errors surfaced by one request/response cycle.
///
/// The engine is single-attempt and fail-fast: no variant is retried
/// internally, every failure propagates to the caller.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Command 0x{sent:02X} not confirmed: device answered 0x{received:02X}")]
    UnconfirmedCommand { sent: u8, received: u8 },

    #[error("Malformed frame: empty payload or missing terminator ({len} bytes read)")]
    MalformedFrame { len: usize },

    #[error("Frame too short to decode: expected {expected} payload bytes, got {actual}")]
    FrameTooShort { expected: usize, actual: usize },

    #[error("Checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("Device reported invalid version {text:?}")]
    InvalidVersion { text: String },
}

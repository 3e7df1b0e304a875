//! Wire protocol constants for the Control Unit serial protocol.
//!
//! The CU keeps its framing inside the printable ASCII range: commands,
//! markers and checksums all arrive as readable characters.

// ============================================================================
// Command Framing
// ============================================================================

/// Init marker preceding every command byte (`"`).
pub const CMD_INIT: u8 = 0x22;

/// Poll for the next status or sensor frame (`?`).
pub const CMD_POLL: u8 = 0x3F;

/// Query the firmware version (`0`).
pub const CMD_VERSION: u8 = 0x30;

/// End-of-response terminator (`$`).
pub const CMD_TERMINATOR: u8 = 0x24;

// ============================================================================
// Frame Layout
// ============================================================================

/// Maximum response size in bytes, terminator included.
pub const MAX_FRAME_LEN: usize = 18;

/// Leading byte of a status frame (`:`). Any other leading byte denotes a
/// sensor frame.
pub const STATUS_MARKER: u8 = 0x3A;

/// Checksum bytes are offset into the ASCII digit range.
pub const CHECKSUM_BASE: u8 = 0x30;

/// Fuel stations reported per status frame.
pub const FUEL_STATIONS: usize = 6;

/// Minimum payload length (bytes before the terminator) of a decodable
/// status frame.
pub const STATUS_PAYLOAD_LEN: usize = 13;

/// Minimum payload length of a decodable sensor frame.
pub const SENSOR_PAYLOAD_LEN: usize = 10;

// ============================================================================
// Serial Parameters
// ============================================================================

/// Fixed CU baud rate (8 data bits, no parity, 1 stop bit, no flow control).
pub const BAUD_RATE: u32 = 19200;

/// Default per-byte read timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

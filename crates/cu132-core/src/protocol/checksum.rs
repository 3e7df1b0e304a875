//! Rolling nibble checksum over response frames.
//!
//! The CU folds every payload byte into a four-bit sum and offsets the
//! result into the ASCII digit range, so checksums stay printable on the
//! wire. The byte immediately before the terminator carries the checksum of
//! all bytes preceding it.

use super::constants::{CHECKSUM_BASE, CMD_TERMINATOR, MAX_FRAME_LEN};
use super::frame::RawFrame;

/// Checksum of a payload as the device computes it: the byte sum folded to
/// four bits, offset into the ASCII range.
pub fn compute(payload: &[u8]) -> u8 {
    let sum = payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    (sum & 0x0F) | CHECKSUM_BASE
}

/// Whether a frame is self-consistent.
///
/// Scans from index 0 with a rolling sum that lags one byte behind, so that
/// when the scan hits the terminator the sum covers every byte before the
/// checksum byte, and `last` holds the checksum byte itself. A frame passes
/// only when its terminator sits strictly inside the buffer and the two
/// values agree.
///
/// Pure predicate; callers decide whether a failure rejects the frame.
pub fn verify(frame: &RawFrame) -> bool {
    let mut calculated: u8 = 0;
    let mut last: u8 = 0;
    let mut length = MAX_FRAME_LEN;
    for (i, &byte) in frame.as_bytes().iter().enumerate() {
        if byte == CMD_TERMINATOR {
            length = i;
            break;
        }
        calculated = (calculated.wrapping_add(last) & 0x0F) | CHECKSUM_BASE;
        last = byte;
    }
    if length == 0 || length == MAX_FRAME_LEN {
        return false;
    }
    calculated == last
}

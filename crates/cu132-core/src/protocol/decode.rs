//! Decoding of response frames into structured events.
//!
//! All fields are packed into low nibbles of fixed payload offsets. A frame
//! shorter than the layout it claims to carry is rejected instead of reading
//! stale buffer bytes.

use super::ProtocolError;
use super::constants::{FUEL_STATIONS, SENSOR_PAYLOAD_LEN, STATUS_PAYLOAD_LEN};
use super::frame::RawFrame;
use crate::events::{SensorEvent, StatusEvent};

/// Unpack a status frame (leading byte `0x3A`).
pub fn decode_status(frame: &RawFrame) -> Result<StatusEvent, ProtocolError> {
    let payload = frame.payload();
    if payload.len() < STATUS_PAYLOAD_LEN {
        return Err(ProtocolError::FrameTooShort {
            expected: STATUS_PAYLOAD_LEN,
            actual: payload.len(),
        });
    }

    let mut fuel_levels = [0u8; FUEL_STATIONS];
    for (i, level) in fuel_levels.iter_mut().enumerate() {
        *level = payload[1 + i] & 0x0F;
    }

    Ok(StatusEvent {
        fuel_levels,
        start_light: payload[9] & 0x0F,
        fuel_mode: payload[10] & 0x03,
        pitlane: payload[10] & 0x04 != 0,
        lapcounter: payload[10] & 0x08 != 0,
        cars_in_pit: (payload[11] & 0x0F) | ((payload[12] & 0x0F) << 4),
    })
}

/// Unpack a sensor frame (any leading byte other than the status marker).
///
/// The 32-bit timestamp arrives as eight nibbles out of natural order; the
/// shifts below mirror the device layout and are not a plain endian swap.
pub fn decode_sensor(frame: &RawFrame) -> Result<SensorEvent, ProtocolError> {
    let payload = frame.payload();
    if payload.len() < SENSOR_PAYLOAD_LEN {
        return Err(ProtocolError::FrameTooShort {
            expected: SENSOR_PAYLOAD_LEN,
            actual: payload.len(),
        });
    }

    let mut timestamp: u32 = 0;
    timestamp |= ((payload[7] & 0x0F) as u32) << 0;
    timestamp |= ((payload[8] & 0x0F) as u32) << 4;
    timestamp |= ((payload[5] & 0x0F) as u32) << 8;
    timestamp |= ((payload[6] & 0x0F) as u32) << 12;
    timestamp |= ((payload[3] & 0x0F) as u32) << 16;
    timestamp |= ((payload[4] & 0x0F) as u32) << 20;
    timestamp |= ((payload[1] & 0x0F) as u32) << 24;
    timestamp |= ((payload[2] & 0x0F) as u32) << 28;

    Ok(SensorEvent {
        id: payload[0] & 0x0F,
        timestamp,
        sensor: payload[9] & 0x0F,
    })
}

//! Command framing and response collection.
//!
//! A request is two bytes on the wire: the init marker, then the command
//! byte. The CU echoes the command byte when it accepts it; any other answer
//! is a rejection. A confirmed command is followed by one terminator-
//! delimited response frame.

use tracing::{debug, trace};

use crate::protocol::ProtocolError;
use crate::protocol::constants::{CMD_INIT, CMD_TERMINATOR};
use crate::protocol::frame::RawFrame;
use crate::transport::SerialTransport;

/// Issue a command and collect the response frame.
///
/// Exactly two bytes are written and at least one byte is read per call;
/// there is no retry in this layer.
pub fn request<T: SerialTransport>(
    transport: &mut T,
    command: u8,
) -> Result<RawFrame, ProtocolError> {
    transport.write_byte(CMD_INIT)?;
    transport.write_byte(command)?;

    let echo = transport.read_byte()?;
    if echo != command {
        debug!(
            sent = %format!("{command:02X}"),
            received = %format!("{echo:02X}"),
            "Command not confirmed"
        );
        return Err(ProtocolError::UnconfirmedCommand {
            sent: command,
            received: echo,
        });
    }

    let frame = read_frame(transport)?;
    trace!(?frame, "Response frame");
    Ok(frame)
}

/// Read bytes until the terminator or frame capacity is reached.
///
/// The terminator is included in the returned frame. A frame that never
/// terminates within capacity, or terminates on its very first byte, is
/// malformed. A transport failure mid-frame discards the partial data.
pub fn read_frame<T: SerialTransport>(transport: &mut T) -> Result<RawFrame, ProtocolError> {
    let mut frame = RawFrame::new();
    while !frame.is_full() {
        let byte = transport.read_byte()?;
        frame.push(byte);
        if byte == CMD_TERMINATOR {
            break;
        }
    }
    match frame.terminator_pos() {
        Some(0) | None => Err(ProtocolError::MalformedFrame { len: frame.len() }),
        Some(_) => Ok(frame),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::{CMD_POLL, MAX_FRAME_LEN};
    use crate::transport::{MockTransport, TransportError};

    #[test]
    fn test_request_writes_init_then_command() {
        let mut mock = MockTransport::new();
        mock.queue_response(CMD_POLL, b"5321");

        let frame = request(&mut mock, CMD_POLL).unwrap();
        assert_eq!(mock.writes(), &[CMD_INIT, CMD_POLL]);
        assert_eq!(frame.payload(), &[0x35, 0x33, 0x32, 0x31, 0x3B]);
    }

    #[test]
    fn test_echo_mismatch_is_unconfirmed() {
        let mut mock = MockTransport::new();
        // Device answers '#' for unknown commands
        mock.queue_bytes(&[0x23]);

        let err = request(&mut mock, CMD_POLL).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::UnconfirmedCommand {
                sent: CMD_POLL,
                received: 0x23
            }
        ));
    }

    #[test]
    fn test_unterminated_frame_is_malformed() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(&[CMD_POLL]);
        mock.queue_bytes(&[0x31; MAX_FRAME_LEN]);

        let err = request(&mut mock, CMD_POLL).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MalformedFrame { len: MAX_FRAME_LEN }
        ));
    }

    #[test]
    fn test_leading_terminator_is_malformed() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(&[CMD_POLL, CMD_TERMINATOR]);

        let err = request(&mut mock, CMD_POLL).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedFrame { len: 1 }));
    }

    #[test]
    fn test_midframe_failure_discards_partial_read() {
        let mut mock = MockTransport::new();
        // Echo plus three payload bytes, then the queue runs dry
        mock.queue_bytes(&[CMD_POLL, 0x3A, 0x01, 0x02]);

        let err = request(&mut mock, CMD_POLL).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Transport(TransportError::Timeout { .. })
        ));
    }

    #[test]
    fn test_read_stops_at_terminator() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(&[CMD_POLL, 0x31, 0x32, CMD_TERMINATOR, 0x99]);

        let frame = request(&mut mock, CMD_POLL).unwrap();
        assert_eq!(frame.as_bytes(), &[0x31, 0x32, CMD_TERMINATOR]);
        // The byte after the terminator stays queued
        assert_eq!(mock.read_byte().unwrap(), 0x99);
    }
}

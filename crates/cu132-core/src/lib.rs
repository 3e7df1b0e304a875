//! cu132-core: Control Unit slot-car telemetry protocol in Rust.
//!
//! This crate decodes telemetry from a CU-class race controller reachable
//! over a serial link: aggregate track status and per-car sensor crossings,
//! pulled by a caller-driven polling loop.
//!
//! # Architecture
//!
//! The crate is organized into layers:
//!
//! - **Protocol**: Constants, frame buffer, checksum, field decoding
//! - **Transport**: Serial communication abstraction (serialport, mock)
//! - **Events**: Decoded telemetry handed to the caller
//! - **Framer**: Command framing and response collection
//! - **Session**: High-level polling orchestrator
//!
//! # Example
//!
//! ```no_run
//! use cu132_core::session::{CuSession, SessionConfig};
//!
//! let config = SessionConfig {
//!     port: "/dev/ttyUSB0".to_string(),
//!     ..Default::default()
//! };
//!
//! let mut session = CuSession::open(config).expect("open failed");
//! let version = session.version().expect("version query failed");
//! println!("CU firmware {version}");
//! loop {
//!     if let Some(event) = session.poll().expect("poll failed") {
//!         println!("{event}");
//!     }
//! }
//! ```

pub mod events;
pub mod framer;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use events::{Event, SensorEvent, StatusEvent};
pub use protocol::{ProtocolError, RawFrame};
pub use session::{CuSession, SessionConfig};
pub use transport::{MockTransport, SerialPortTransport, SerialTransport, TransportError};

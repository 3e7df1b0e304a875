//! Telemetry events decoded from CU response frames.
//!
//! Events are plain values: the session hands them to the caller and keeps
//! no reference. Callers wanting push-style delivery can layer their own
//! dispatch on top of the polling loop.

use std::fmt;

use crate::protocol::constants::FUEL_STATIONS;

/// Aggregate track status reported by the CU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEvent {
    /// Fuel level per station.
    pub fuel_levels: [u8; FUEL_STATIONS],
    /// Start light phase.
    pub start_light: u8,
    /// Fuel mode (two bits).
    pub fuel_mode: u8,
    /// Pit lane open.
    pub pitlane: bool,
    /// External lap counter attached.
    pub lapcounter: bool,
    /// Cars currently in the pit.
    pub cars_in_pit: u8,
}

/// A single car crossing a track sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorEvent {
    /// Car / lane id.
    pub id: u8,
    /// CU timer at the crossing.
    pub timestamp: u32,
    /// Sensor channel that fired.
    pub sensor: u8,
}

/// One decoded response from a poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Status(StatusEvent),
    Sensor(SensorEvent),
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status: fuel={:?} light={} mode={} pitlane={} lapcounter={} in_pit={}",
            self.fuel_levels,
            self.start_light,
            self.fuel_mode,
            if self.pitlane { "open" } else { "closed" },
            if self.lapcounter { "on" } else { "off" },
            self.cars_in_pit,
        )
    }
}

impl fmt::Display for SensorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "crossing: car={} sensor={} t={}",
            self.id, self.sensor, self.timestamp
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Status(status) => status.fmt(f),
            Event::Sensor(sensor) => sensor.fmt(f),
        }
    }
}

// src/types.rs
use crate::signal::PowerReading;
/// Running totals of the ingest worker, returned when it stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub accepted: u64,
    pub dropped: u64,
    pub samples: u64,
}
/// Messages from the ingest worker to whoever renders.
#[derive(Clone, Debug)]
pub enum StreamEvent {
    Log(String),
    Dropped { group: String, reason: String },
    Power { group: String, reading: PowerReading },
    Stopped(IngestStats),
}

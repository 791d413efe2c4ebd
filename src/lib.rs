//! Streaming core for EMG/IMU wearables: per-channel IIR filtering feeding
//! fixed-capacity time-series ring buffers that a render task reads at its
//! own cadence.
pub mod engine;
pub mod power;
pub mod recorder;
pub mod signal;
pub mod types;
pub use engine::spawn_ingest;
pub use power::PowerMeter;
pub use recorder::DataRecorder;
pub use types::{IngestStats, StreamEvent};

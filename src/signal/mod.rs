// src/signal/mod.rs
pub mod buffer;
pub mod config;
pub mod device;
pub mod error;
pub mod filter;
pub mod presets;
pub mod source;
pub use buffer::{BufferState, SharedTimeSeries, Snapshot, TimeSeriesRingBuffer};
pub use config::{FilterSpec, GroupConfig, StreamConfig};
pub use device::{DeviceStream, IngestedBatch, PowerReading};
pub use error::StreamError;
pub use filter::{FilterBank, FilterCoefficients, StreamFilter};
pub use source::{BatchSource, ManualSource, SampleBatch, SimulatedSource};

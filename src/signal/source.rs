use std::collections::VecDeque;
use rand::{rngs::StdRng, Rng, SeedableRng};
use crate::signal::StreamError;
/// One sensor notification: a shared timestamp column plus one value array
/// per channel of the named signal group.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleBatch {
    pub group: String,
    pub timestamps: Vec<f64>,   // milliseconds
    pub channels: Vec<Vec<f64>>, // channels x samples
}
impl SampleBatch {
    pub fn new(group: impl Into<String>, timestamps: Vec<f64>, channels: Vec<Vec<f64>>) -> Self {
        Self {
            group: group.into(),
            timestamps,
            channels,
        }
    }
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }
    pub fn num_samples(&self) -> usize {
        self.timestamps.len()
    }
    /// Checks the batch against a group of `expected_channels` channels.
    pub fn validate(&self, expected_channels: usize) -> Result<(), StreamError> {
        if self.channels.len() != expected_channels {
            return Err(StreamError::ChannelMismatch {
                expected: expected_channels,
                actual: self.channels.len(),
            });
        }
        if let Some(bad) = self.channels.iter().find(|c| c.len() != self.timestamps.len()) {
            return Err(StreamError::LengthMismatch {
                expected: self.timestamps.len(),
                actual: bad.len(),
            });
        }
        Ok(())
    }
}
/// Anything that yields sample batches on demand.
pub trait BatchSource {
    fn next_batch(&mut self) -> Result<Option<SampleBatch>, StreamError>;
}
/// In-memory playback of prepared batches or of one recorded capture.
pub struct ManualSource {
    queue: VecDeque<SampleBatch>,
}
impl ManualSource {
    pub fn new(batches: impl IntoIterator<Item = SampleBatch>) -> Self {
        Self {
            queue: batches.into_iter().collect(),
        }
    }
    /// Cuts one continuous capture of `group` into notification-sized batches
    /// of `batch_len` samples (the last one may be shorter). A ragged capture
    /// is rejected up front rather than dropped batch by batch later.
    pub fn replay(
        group: &str,
        timestamps: &[f64],
        channels: &[Vec<f64>],
        batch_len: usize,
    ) -> Result<Self, StreamError> {
        if let Some(bad) = channels.iter().find(|c| c.len() != timestamps.len()) {
            return Err(StreamError::LengthMismatch {
                expected: timestamps.len(),
                actual: bad.len(),
            });
        }
        let step = batch_len.max(1);
        let queue = (0..timestamps.len())
            .step_by(step)
            .map(|start| {
                let end = (start + step).min(timestamps.len());
                SampleBatch::new(
                    group,
                    timestamps[start..end].to_vec(),
                    channels.iter().map(|c| c[start..end].to_vec()).collect(),
                )
            })
            .collect();
        Ok(Self { queue })
    }
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}
impl BatchSource for ManualSource {
    fn next_batch(&mut self) -> Result<Option<SampleBatch>, StreamError> {
        Ok(self.queue.pop_front())
    }
}
/// Synthetic EMG-like stream: low-frequency drift plus noise, with periodic
/// high-amplitude bursts standing in for muscle activation.
pub struct SimulatedSource {
    group: String,
    channels: usize,
    samples_per_batch: usize,
    period_ms: f64,
    clock_ms: f64,
    phase: f64,
    remaining: Option<usize>,
    rng: StdRng,
}
impl SimulatedSource {
    pub fn new(group: impl Into<String>, channels: usize, sample_rate_hz: f64, samples_per_batch: usize) -> Self {
        Self {
            group: group.into(),
            channels,
            samples_per_batch: samples_per_batch.max(1),
            period_ms: 1_000.0 / sample_rate_hz.max(1.0),
            // Sensor clocks rarely start at zero; the ring buffer rebases anyway.
            clock_ms: 52_000.0,
            phase: 0.0,
            remaining: None,
            rng: StdRng::seed_from_u64(0x5eed),
        }
    }
    /// Stops after `batches` batches instead of streaming forever.
    pub fn with_limit(mut self, batches: usize) -> Self {
        self.remaining = Some(batches);
        self
    }
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}
impl BatchSource for SimulatedSource {
    fn next_batch(&mut self) -> Result<Option<SampleBatch>, StreamError> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Ok(None);
            }
            *remaining -= 1;
        }
        let mut timestamps = Vec::with_capacity(self.samples_per_batch);
        let mut channels = vec![Vec::with_capacity(self.samples_per_batch); self.channels];
        for _ in 0..self.samples_per_batch {
            timestamps.push(self.clock_ms);
            let bursting = (self.clock_ms / 1_000.0).floor() as i64 % 3 == 0;
            for (idx, channel) in channels.iter_mut().enumerate() {
                let drift = (self.phase * (idx as f64 * 0.1 + 0.2)).sin() * 20.0;
                let noise: f64 = self.rng.gen_range(-5.0..5.0);
                let burst = if bursting {
                    self.rng.gen_range(-150.0..150.0)
                } else {
                    0.0
                };
                channel.push(drift + noise + burst);
            }
            self.phase += 0.01;
            self.clock_ms += self.period_ms;
        }
        Ok(Some(SampleBatch::new(self.group.clone(), timestamps, channels)))
    }
}

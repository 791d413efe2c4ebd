use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use log::{debug, info};
use crate::signal::StreamError;
/// Copy of the valid window, oldest sample first, with presentation scaling applied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub timestamps: Vec<f64>,
    pub values: Vec<Vec<f64>>, // channels x samples
    pub total_written: u64,
}
impl Snapshot {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
    pub fn num_channels(&self) -> usize {
        self.values.len()
    }
    pub fn channel(&self, index: usize) -> Option<&[f64]> {
        self.values.get(index).map(|c| c.as_slice())
    }
    /// `[time, value]` pairs for one channel, ready for a line plot.
    pub fn points(&self, index: usize) -> Vec<[f64; 2]> {
        self.channel(index)
            .map(|values| {
                self.timestamps
                    .iter()
                    .zip(values)
                    .map(|(&t, &v)| [t, v])
                    .collect()
            })
            .unwrap_or_default()
    }
    /// Newest timestamp with every channel's value at that index.
    pub fn latest(&self) -> Option<(f64, Vec<f64>)> {
        let last = self.timestamps.len().checked_sub(1)?;
        let values = self.values.iter().map(|c| c[last]).collect();
        Some((self.timestamps[last], values))
    }
    /// Keeps every n-th sample so at most `max_points` remain. The newest
    /// sample always survives so the plot's right edge stays current.
    pub fn decimate(&self, max_points: usize) -> Snapshot {
        let len = self.len();
        if max_points == 0 || len <= max_points {
            return self.clone();
        }
        let stride = (len + max_points - 1) / max_points;
        let last = len - 1;
        // Walk backwards from the newest sample, then restore chronological order.
        let mut indices: Vec<usize> = (0..=last).rev().step_by(stride).collect();
        indices.reverse();
        Snapshot {
            timestamps: indices.iter().map(|&i| self.timestamps[i]).collect(),
            values: self
                .values
                .iter()
                .map(|c| indices.iter().map(|&i| c[i]).collect())
                .collect(),
            total_written: self.total_written,
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferState {
    Empty,
    Filling,
    Full,
}
/// Fixed-capacity multi-channel circular buffer. All channels advance in
/// lockstep and share one timestamp column.
#[derive(Debug)]
pub struct TimeSeriesRingBuffer {
    capacity: usize,
    timestamps: Vec<f64>,
    values: Vec<Vec<f64>>, // channel -> slots
    cursor: usize,
    len: usize,
    total_written: u64,
    origin: Option<f64>,
    scale: f64,
    positive: bool,
}
impl TimeSeriesRingBuffer {
    pub fn new(capacity: usize, channels: usize) -> Result<Self, StreamError> {
        if capacity == 0 || channels == 0 {
            return Err(StreamError::InvalidDimensions { capacity, channels });
        }
        debug!("ring buffer: {channels} channels x {capacity} samples");
        Ok(Self {
            capacity,
            timestamps: vec![0.0; capacity],
            values: vec![vec![0.0; capacity]; channels],
            cursor: 0,
            len: 0,
            total_written: 0,
            origin: None,
            scale: 1.0,
            positive: false,
        })
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    pub fn channels(&self) -> usize {
        self.values.len()
    }
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    pub fn total_written(&self) -> u64 {
        self.total_written
    }
    pub fn state(&self) -> BufferState {
        match self.len {
            0 => BufferState::Empty,
            n if n < self.capacity => BufferState::Filling,
            _ => BufferState::Full,
        }
    }
    pub fn scale(&self) -> f64 {
        self.scale
    }
    pub fn set_scale(&mut self, factor: f64) {
        self.scale = factor;
    }
    pub fn positive(&self) -> bool {
        self.positive
    }
    pub fn set_positive(&mut self, positive: bool) {
        self.positive = positive;
    }
    /// Appends one batch. Every channel must carry as many values as there are
    /// timestamps; otherwise nothing is written. Batches longer than the
    /// capacity keep only their newest `capacity` samples.
    pub fn add_samples(&mut self, timestamps: &[f64], values: &[Vec<f64>]) -> Result<(), StreamError> {
        if values.len() != self.channels() {
            return Err(StreamError::ChannelMismatch {
                expected: self.channels(),
                actual: values.len(),
            });
        }
        let count = timestamps.len();
        if let Some(bad) = values.iter().find(|c| c.len() != count) {
            return Err(StreamError::LengthMismatch {
                expected: count,
                actual: bad.len(),
            });
        }
        if count == 0 {
            return Ok(());
        }
        let origin = *self.origin.get_or_insert(timestamps[0]);
        let kept = count.min(self.capacity);
        let skipped = count - kept;
        // Land the kept tail where it would be had every sample been written.
        let start = (self.cursor + skipped) % self.capacity;
        for i in 0..kept {
            let slot = (start + i) % self.capacity;
            let src = skipped + i;
            self.timestamps[slot] = timestamps[src] - origin;
            for (column, channel) in self.values.iter_mut().zip(values) {
                column[slot] = channel[src];
            }
        }
        self.cursor = (self.cursor + count) % self.capacity;
        self.len = (self.len + count).min(self.capacity);
        self.total_written += count as u64;
        Ok(())
    }
    /// Single-sample append for one-channel buffers.
    pub fn add_sample(&mut self, timestamp: f64, value: f64) -> Result<(), StreamError> {
        if self.channels() != 1 {
            return Err(StreamError::ChannelMismatch {
                expected: self.channels(),
                actual: 1,
            });
        }
        self.add_samples(&[timestamp], &[vec![value]])
    }
    pub fn snapshot(&self) -> Snapshot {
        let oldest = (self.cursor + self.capacity - self.len) % self.capacity;
        let order = (0..self.len).map(|i| (oldest + i) % self.capacity);
        let timestamps = order.clone().map(|slot| self.timestamps[slot]).collect();
        let values = self
            .values
            .iter()
            .map(|column| order.clone().map(|slot| self.present(column[slot])).collect())
            .collect();
        Snapshot {
            timestamps,
            values,
            total_written: self.total_written,
        }
    }
    /// Drops all samples and forgets the time origin.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.len = 0;
        self.total_written = 0;
        self.origin = None;
        info!("ring buffer reset ({} channels)", self.channels());
    }
    fn present(&self, raw: f64) -> f64 {
        let scaled = raw * self.scale;
        if self.positive {
            scaled.max(0.0)
        } else {
            scaled
        }
    }
}
/// Cloneable handle for one writer and any number of readers. Writes and
/// snapshots each hold the lock for one bounded copy, so a reader always sees
/// whole batches.
#[derive(Clone, Debug)]
pub struct SharedTimeSeries {
    inner: Arc<RwLock<TimeSeriesRingBuffer>>,
}
impl SharedTimeSeries {
    pub fn new(buffer: TimeSeriesRingBuffer) -> Self {
        Self {
            inner: Arc::new(RwLock::new(buffer)),
        }
    }
    pub fn add_samples(&self, timestamps: &[f64], values: &[Vec<f64>]) -> Result<(), StreamError> {
        self.write().add_samples(timestamps, values)
    }
    pub fn add_sample(&self, timestamp: f64, value: f64) -> Result<(), StreamError> {
        self.write().add_sample(timestamp, value)
    }
    pub fn snapshot(&self) -> Snapshot {
        self.read().snapshot()
    }
    pub fn set_scale(&self, factor: f64) {
        self.write().set_scale(factor);
    }
    pub fn set_positive(&self, positive: bool) {
        self.write().set_positive(positive);
    }
    pub fn state(&self) -> BufferState {
        self.read().state()
    }
    pub fn len(&self) -> usize {
        self.read().len()
    }
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
    pub fn reset(&self) {
        self.write().reset();
    }
    // A panicking writer cannot leave a torn sample behind (validation runs
    // before any slot is touched), so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, TimeSeriesRingBuffer> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
    fn write(&self) -> RwLockWriteGuard<'_, TimeSeriesRingBuffer> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(
            TimeSeriesRingBuffer::new(0, 2),
            Err(StreamError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            TimeSeriesRingBuffer::new(4, 0),
            Err(StreamError::InvalidDimensions { .. })
        ));
    }
    #[test]
    fn oversized_batch_keeps_newest_and_rebases() {
        let mut buffer = TimeSeriesRingBuffer::new(4, 2).unwrap();
        let timestamps = [100.0, 101.0, 102.0, 103.0, 104.0, 105.0];
        let ch0 = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let ch1 = vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
        buffer.add_samples(&timestamps, &[ch0, ch1]).unwrap();
        let snap = buffer.snapshot();
        assert_eq!(snap.len(), 4);
        assert_eq!(snap.timestamps, vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(snap.values[0], vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(snap.values[1], vec![12.0, 13.0, 14.0, 15.0]);
        assert_eq!(snap.total_written, 6);
        assert_eq!(buffer.state(), BufferState::Full);
    }
    #[test]
    fn single_writes_evict_oldest() {
        let capacity = 5;
        let extra = 3;
        let mut buffer = TimeSeriesRingBuffer::new(capacity, 1).unwrap();
        for i in 0..capacity + extra {
            buffer.add_sample(i as f64, i as f64 * 2.0).unwrap();
        }
        let snap = buffer.snapshot();
        assert_eq!(snap.timestamps, vec![3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(snap.values[0], vec![6.0, 8.0, 10.0, 12.0, 14.0]);
    }
    #[test]
    fn rebases_on_first_timestamp() {
        let mut buffer = TimeSeriesRingBuffer::new(8, 1).unwrap();
        buffer.add_sample(1_000.0, 1.0).unwrap();
        buffer.add_sample(1_500.0, 2.0).unwrap();
        assert_eq!(buffer.snapshot().timestamps, vec![0.0, 500.0]);
        buffer.reset();
        assert_eq!(buffer.state(), BufferState::Empty);
        buffer.add_sample(7_000.0, 3.0).unwrap();
        assert_eq!(buffer.snapshot().timestamps, vec![0.0]);
    }
    #[test]
    fn mismatched_batch_is_rejected_whole() {
        let mut buffer = TimeSeriesRingBuffer::new(4, 2).unwrap();
        let err = buffer
            .add_samples(&[1.0, 2.0], &[vec![1.0, 2.0], vec![1.0]])
            .unwrap_err();
        assert!(matches!(err, StreamError::LengthMismatch { expected: 2, actual: 1 }));
        assert!(buffer.is_empty());
        // The rejected batch must not have pinned the time origin either.
        buffer.add_samples(&[50.0], &[vec![0.0], vec![0.0]]).unwrap();
        assert_eq!(buffer.snapshot().timestamps, vec![0.0]);
        assert!(matches!(
            buffer.add_sample(1.0, 1.0),
            Err(StreamError::ChannelMismatch { .. })
        ));
    }
    #[test]
    fn wrong_channel_count_writes_nothing() {
        let mut buffer = TimeSeriesRingBuffer::new(4, 2).unwrap();
        buffer.add_samples(&[10.0], &[vec![1.0], vec![2.0]]).unwrap();
        let before = buffer.snapshot();
        let err = buffer
            .add_samples(&[11.0, 12.0], &[vec![3.0, 4.0]])
            .unwrap_err();
        assert!(matches!(err, StreamError::ChannelMismatch { expected: 2, actual: 1 }));
        let three = vec![vec![0.0]; 3];
        assert!(matches!(
            buffer.add_samples(&[13.0], &three),
            Err(StreamError::ChannelMismatch { expected: 2, actual: 3 })
        ));
        assert_eq!(buffer.snapshot(), before);
        assert_eq!(buffer.total_written(), 1);
    }
    #[test]
    fn state_moves_through_filling() {
        let mut buffer = TimeSeriesRingBuffer::new(3, 1).unwrap();
        assert_eq!(buffer.state(), BufferState::Empty);
        buffer.add_sample(0.0, 0.0).unwrap();
        assert_eq!(buffer.state(), BufferState::Filling);
        buffer.add_samples(&[1.0, 2.0], &[vec![0.0, 0.0]]).unwrap();
        assert_eq!(buffer.state(), BufferState::Full);
    }
    #[test]
    fn wraps_across_batches() {
        let mut buffer = TimeSeriesRingBuffer::new(4, 1).unwrap();
        buffer.add_samples(&[0.0, 1.0, 2.0], &[vec![0.0, 1.0, 2.0]]).unwrap();
        buffer.add_samples(&[3.0, 4.0, 5.0], &[vec![3.0, 4.0, 5.0]]).unwrap();
        buffer.add_samples(&[6.0, 7.0, 8.0, 9.0, 10.0], &[vec![6.0, 7.0, 8.0, 9.0, 10.0]]).unwrap();
        assert_eq!(buffer.snapshot().values[0], vec![7.0, 8.0, 9.0, 10.0]);
    }
    #[test]
    fn scale_and_positive_apply_at_read_time() {
        let mut buffer = TimeSeriesRingBuffer::new(4, 1).unwrap();
        buffer.add_samples(&[0.0, 1.0], &[vec![-2.0, 3.0]]).unwrap();
        buffer.set_scale(10.0);
        assert_eq!(buffer.snapshot().values[0], vec![-20.0, 30.0]);
        buffer.set_positive(true);
        assert_eq!(buffer.snapshot().values[0], vec![0.0, 30.0]);
        buffer.set_scale(1.0);
        buffer.set_positive(false);
        assert_eq!(buffer.snapshot().values[0], vec![-2.0, 3.0]);
    }
    #[test]
    fn decimate_keeps_newest() {
        let mut buffer = TimeSeriesRingBuffer::new(10, 1).unwrap();
        let ts: Vec<f64> = (0..10).map(|i| i as f64).collect();
        buffer.add_samples(&ts, &[ts.clone()]).unwrap();
        let snap = buffer.snapshot();
        let small = snap.decimate(4);
        assert!(small.len() <= 4);
        assert_eq!(small.timestamps.last(), Some(&9.0));
        assert_eq!(small.values[0], small.timestamps);
        assert_eq!(snap.decimate(20), snap);
        assert_eq!(snap.latest(), Some((9.0, vec![9.0])));
        assert_eq!(snap.points(0)[2], [2.0, 2.0]);
        assert!(snap.points(3).is_empty());
    }
    #[test]
    fn concurrent_reader_never_sees_torn_samples() {
        let shared = SharedTimeSeries::new(TimeSeriesRingBuffer::new(64, 2).unwrap());
        let writer = shared.clone();
        let producer = thread::spawn(move || {
            for batch in 0..2_000u32 {
                let id = batch as f64;
                let ts: Vec<f64> = (0..7).map(|i| id * 7.0 + i as f64).collect();
                writer.add_samples(&ts, &[vec![id; 7], vec![id; 7]]).unwrap();
            }
        });
        let mut observed = 0;
        while !producer.is_finished() || observed == 0 {
            let snap = shared.snapshot();
            for i in 0..snap.len() {
                assert_eq!(snap.values[0][i], snap.values[1][i]);
                // Timestamp and values at one index come from the same batch.
                assert_eq!((snap.timestamps[i] / 7.0).floor(), snap.values[0][i]);
            }
            for pair in snap.timestamps.windows(2) {
                assert!(pair[0] < pair[1]);
            }
            observed += 1;
        }
        producer.join().unwrap();
        assert_eq!(shared.snapshot().total_written, 14_000);
    }
}

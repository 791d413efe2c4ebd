use std::collections::HashMap;
use log::{debug, info, trace};
use crate::power::PowerMeter;
use crate::signal::buffer::{SharedTimeSeries, Snapshot, TimeSeriesRingBuffer};
use crate::signal::config::{GroupConfig, StreamConfig};
use crate::signal::filter::FilterBank;
use crate::signal::source::{BatchSource, SampleBatch};
use crate::signal::StreamError;
/// Filters, buffer and power meters for one logical signal.
struct SignalGroup {
    channels: usize,
    filters: FilterBank,
    buffer: SharedTimeSeries,
    meters: Vec<PowerMeter>,
}
impl SignalGroup {
    fn from_config(config: &GroupConfig) -> Result<Self, StreamError> {
        config.validate()?;
        let filters = match &config.filter {
            Some(spec) => FilterBank::uniform(config.channels, &spec.resolve()?)?,
            None => FilterBank::passthrough(),
        };
        let mut buffer = TimeSeriesRingBuffer::new(config.capacity, config.channels)?;
        buffer.set_scale(config.scale);
        buffer.set_positive(config.positive);
        let meters = config
            .power_window
            .map(|w| (0..config.channels).map(|_| PowerMeter::new(w)).collect())
            .unwrap_or_default();
        Ok(Self {
            channels: config.channels,
            filters,
            buffer: SharedTimeSeries::new(buffer),
            meters,
        })
    }
    /// Returns the filtered block that was stored.
    fn ingest(&mut self, batch: &SampleBatch) -> Result<Vec<Vec<f64>>, StreamError> {
        // Shape is checked before filtering so a rejected batch leaves the
        // filter history untouched.
        batch.validate(self.channels)?;
        let filtered = self.filters.process(&batch.channels);
        self.buffer.add_samples(&batch.timestamps, &filtered)?;
        for (meter, values) in self.meters.iter_mut().zip(&filtered) {
            meter.extend(values);
        }
        Ok(filtered)
    }
    fn reset(&mut self) {
        self.filters.reset();
        self.buffer.reset();
        for meter in &mut self.meters {
            meter.clear();
        }
    }
}
/// Per-channel power summary for the threshold display.
#[derive(Clone, Debug, PartialEq)]
pub struct PowerReading {
    pub rms: Vec<f64>,
    pub log_power: Vec<f64>,
}
/// Outcome of one accepted batch.
#[derive(Clone, Debug, PartialEq)]
pub struct IngestedBatch {
    pub group: String,
    pub timestamps: Vec<f64>,
    pub filtered: Vec<Vec<f64>>,
}
/// Streaming state owned by one device: a filter bank and ring buffer per
/// signal group. Nothing here is shared with other devices.
pub struct DeviceStream {
    name: String,
    groups: HashMap<String, SignalGroup>,
}
impl DeviceStream {
    /// Builds every group up front; any configuration error aborts the whole
    /// device so it never enters a streaming state half-configured.
    pub fn new(config: &StreamConfig) -> Result<Self, StreamError> {
        config.validate()?;
        let mut groups = HashMap::with_capacity(config.groups.len());
        for group in &config.groups {
            groups.insert(group.name.clone(), SignalGroup::from_config(group)?);
        }
        debug!(
            "device `{}` ready with {} signal group(s)",
            config.device,
            groups.len()
        );
        Ok(Self {
            name: config.device.clone(),
            groups,
        })
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
    /// Filters and stores one batch. Errors are per-batch: the batch is
    /// dropped whole and the stream continues.
    pub fn ingest(&mut self, batch: &SampleBatch) -> Result<IngestedBatch, StreamError> {
        let group = self
            .groups
            .get_mut(&batch.group)
            .ok_or_else(|| StreamError::UnknownGroup(batch.group.clone()))?;
        let filtered = group.ingest(batch)?;
        trace!(
            "{}: stored {} sample(s) in `{}`",
            self.name,
            batch.num_samples(),
            batch.group
        );
        Ok(IngestedBatch {
            group: batch.group.clone(),
            timestamps: batch.timestamps.clone(),
            filtered,
        })
    }
    /// Pulls one batch from `source` and ingests it. `Ok(None)` means the
    /// source is exhausted.
    pub fn pump_once<S: BatchSource>(
        &mut self,
        source: &mut S,
    ) -> Result<Option<IngestedBatch>, StreamError> {
        let Some(batch) = source.next_batch()? else {
            return Ok(None);
        };
        self.ingest(&batch).map(Some)
    }
    /// Reader handle for a group's buffer; clone it into the render task.
    pub fn reader(&self, group: &str) -> Result<SharedTimeSeries, StreamError> {
        self.groups
            .get(group)
            .map(|g| g.buffer.clone())
            .ok_or_else(|| StreamError::UnknownGroup(group.to_string()))
    }
    pub fn snapshot(&self, group: &str) -> Result<Snapshot, StreamError> {
        Ok(self.reader(group)?.snapshot())
    }
    /// `None` when the group has no power meters configured.
    pub fn power(&self, group: &str) -> Result<Option<PowerReading>, StreamError> {
        let group_state = self
            .groups
            .get(group)
            .ok_or_else(|| StreamError::UnknownGroup(group.to_string()))?;
        if group_state.meters.is_empty() {
            return Ok(None);
        }
        Ok(Some(PowerReading {
            rms: group_state.meters.iter().map(|m| m.rms()).collect(),
            log_power: group_state.meters.iter().map(|m| m.log_power()).collect(),
        }))
    }
    /// Clears filter history, buffers and time origins for a fresh session.
    pub fn reset(&mut self) {
        for group in self.groups.values_mut() {
            group.reset();
        }
        info!("device `{}` reset", self.name);
    }
}
impl Drop for DeviceStream {
    fn drop(&mut self) {
        debug!("device `{}` torn down", self.name);
    }
}

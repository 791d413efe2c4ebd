use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::signal::{presets, FilterCoefficients, StreamError};
/// Where a group's filter coefficients come from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterSpec {
    Preset { preset: String },
    Coefficients(FilterCoefficients),
}
impl FilterSpec {
    pub fn resolve(&self) -> Result<FilterCoefficients, StreamError> {
        match self {
            FilterSpec::Preset { preset } => presets::preset(preset).cloned(),
            FilterSpec::Coefficients(coeffs) => Ok(coeffs.clone()),
        }
    }
}
fn default_scale() -> f64 {
    1.0
}
/// One logical signal (e.g. EMG power, gyro) streamed by a device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    pub channels: usize,
    /// Samples retained per channel.
    pub capacity: usize,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub positive: bool,
    #[serde(default)]
    pub filter: Option<FilterSpec>,
    /// Sliding window (samples) for the per-channel power meter.
    #[serde(default)]
    pub power_window: Option<usize>,
}
impl GroupConfig {
    pub fn new(name: impl Into<String>, channels: usize, capacity: usize) -> Self {
        Self {
            name: name.into(),
            channels,
            capacity,
            scale: 1.0,
            positive: false,
            filter: None,
            power_window: None,
        }
    }
    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = Some(filter);
        self
    }
    pub fn with_power_window(mut self, window: usize) -> Self {
        self.power_window = Some(window);
        self
    }
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.capacity == 0 || self.channels == 0 {
            return Err(StreamError::InvalidDimensions {
                capacity: self.capacity,
                channels: self.channels,
            });
        }
        if self.power_window == Some(0) {
            return Err(StreamError::InvalidPowerWindow {
                group: self.name.clone(),
            });
        }
        if let Some(spec) = &self.filter {
            let coeffs = spec.resolve()?;
            if coeffs.order() < 1 {
                return Err(StreamError::InvalidOrder { order: 0 });
            }
            if coeffs.a.len() != coeffs.order() {
                return Err(StreamError::CoefficientLength {
                    which: "feedback",
                    expected: coeffs.order(),
                    actual: coeffs.a.len(),
                });
            }
        }
        Ok(())
    }
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    pub device: String,
    pub groups: Vec<GroupConfig>,
    /// Optional CSV log of accepted, filtered batches.
    #[serde(default)]
    pub record_path: Option<PathBuf>,
}
impl StreamConfig {
    pub fn from_json_str(json: &str) -> Result<Self, StreamError> {
        let config: StreamConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
    pub fn validate(&self) -> Result<(), StreamError> {
        let mut seen = HashSet::new();
        for group in &self.groups {
            if !seen.insert(group.name.as_str()) {
                return Err(StreamError::DuplicateGroup(group.name.clone()));
            }
            group.validate()?;
        }
        Ok(())
    }
    pub fn group(&self, name: &str) -> Option<&GroupConfig> {
        self.groups.iter().find(|g| g.name == name)
    }
}
impl Default for StreamConfig {
    fn default() -> Self {
        // 5 s of EMG at 500 Hz, 2 s of gyro at 100 Hz.
        Self {
            device: "simulated".to_string(),
            groups: vec![
                GroupConfig::new("emg", 4, 2_500)
                    .with_filter(FilterSpec::Preset {
                        preset: presets::EMG_BANDPASS.to_string(),
                    })
                    .with_power_window(100),
                GroupConfig::new("gyro", 3, 200),
            ],
            record_path: None,
        }
    }
}

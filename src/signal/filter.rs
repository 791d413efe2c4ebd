use log::debug;
use serde::{Deserialize, Serialize};
use crate::signal::StreamError;
/// Direct-form difference-equation coefficients. `a[0]` is taken as 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterCoefficients {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}
impl FilterCoefficients {
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Self {
        Self { b, a }
    }
    pub fn order(&self) -> usize {
        self.b.len()
    }
}
/// Most recent `order - 1` values, oldest first, stored as a circular index
/// into a fixed allocation so each sample shifts in O(1).
#[derive(Clone, Debug)]
struct History {
    values: Vec<f64>,
    // Slot holding the oldest value; also the slot the next value overwrites.
    head: usize,
}
impl History {
    fn zeroed(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
            head: 0,
        }
    }
    /// `lag` 1 is the newest stored value, `lag == len` the oldest.
    fn lagged(&self, lag: usize) -> f64 {
        let len = self.values.len();
        self.values[(self.head + len - lag) % len]
    }
    fn push(&mut self, value: f64) {
        if self.values.is_empty() {
            return;
        }
        self.values[self.head] = value;
        self.head = (self.head + 1) % self.values.len();
    }
    fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
        self.head = 0;
    }
}
/// Fixed-coefficient streaming IIR filter for one channel.
#[derive(Clone, Debug)]
pub struct StreamFilter {
    b: Vec<f64>,
    a: Vec<f64>,
    inputs: History,
    outputs: History,
}
impl StreamFilter {
    /// Builds a filter of the given order. Both coefficient slices must hold
    /// exactly `order` values.
    pub fn new(order: usize, b: &[f64], a: &[f64]) -> Result<Self, StreamError> {
        if order < 1 {
            return Err(StreamError::InvalidOrder { order });
        }
        if b.len() != order {
            return Err(StreamError::CoefficientLength {
                which: "feedforward",
                expected: order,
                actual: b.len(),
            });
        }
        if a.len() != order {
            return Err(StreamError::CoefficientLength {
                which: "feedback",
                expected: order,
                actual: a.len(),
            });
        }
        debug!("configured {order}-tap stream filter");
        Ok(Self {
            b: b.to_vec(),
            a: a.to_vec(),
            inputs: History::zeroed(order - 1),
            outputs: History::zeroed(order - 1),
        })
    }
    pub fn from_coefficients(coeffs: &FilterCoefficients) -> Result<Self, StreamError> {
        Self::new(coeffs.order(), &coeffs.b, &coeffs.a)
    }
    pub fn order(&self) -> usize {
        self.b.len()
    }
    /// Filters one sample. The first `order - 1` outputs carry the warm-up
    /// transient from the zeroed history. NaN and infinities propagate.
    pub fn update(&mut self, sample: f64) -> f64 {
        let mut output = self.b[0] * sample;
        for i in 1..self.order() {
            output += self.b[i] * self.inputs.lagged(i) - self.a[i] * self.outputs.lagged(i);
        }
        self.inputs.push(sample);
        self.outputs.push(output);
        output
    }
    pub fn filter_block(&mut self, samples: &[f64]) -> Vec<f64> {
        samples.iter().map(|&s| self.update(s)).collect()
    }
    pub fn reset(&mut self) {
        self.inputs.clear();
        self.outputs.clear();
    }
}
/// One independent filter per channel of a signal group.
#[derive(Clone, Debug, Default)]
pub struct FilterBank {
    filters: Vec<StreamFilter>,
}
impl FilterBank {
    /// A bank with no filters passes values through unchanged.
    pub fn passthrough() -> Self {
        Self { filters: vec![] }
    }
    pub fn uniform(channels: usize, coeffs: &FilterCoefficients) -> Result<Self, StreamError> {
        let filters = (0..channels)
            .map(|_| StreamFilter::from_coefficients(coeffs))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { filters })
    }
    /// Filters a channels x samples block. The caller validates shape first so
    /// a rejected batch never advances filter state.
    pub fn process(&mut self, channels: &[Vec<f64>]) -> Vec<Vec<f64>> {
        if self.filters.is_empty() {
            return channels.to_vec();
        }
        self.filters
            .iter_mut()
            .zip(channels)
            .map(|(filter, samples)| filter.filter_block(samples))
            .collect()
    }
    pub fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }
}

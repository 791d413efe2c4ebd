// src/power.rs
use std::collections::VecDeque;
/// Sliding window over filtered samples of one channel, feeding the
/// activation/threshold display.
#[derive(Clone, Debug)]
pub struct PowerMeter {
    window: VecDeque<f64>,
    capacity: usize,
}
impl PowerMeter {
    pub fn new(size: usize) -> Self {
        let capacity = size.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }
    /// Pushes a sample, evicting the oldest once the window is full.
    pub fn push(&mut self, value: f64) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(value);
    }
    pub fn extend(&mut self, values: &[f64]) {
        for &v in values {
            self.push(v);
        }
    }
    pub fn is_full(&self) -> bool {
        self.window.len() == self.capacity
    }
    pub fn clear(&mut self) {
        self.window.clear();
    }
    /// Root-mean-square amplitude of the window (0 when empty).
    pub fn rms(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = self.window.iter().map(|v| v * v).sum();
        (sum_sq / self.window.len() as f64).sqrt()
    }
    /// Log of the window variance. Residual DC is removed first; the small
    /// offset keeps silence finite.
    pub fn log_power(&self) -> f64 {
        if self.window.is_empty() {
            return (1e-6f64).ln();
        }
        let n = self.window.len() as f64;
        let mean = self.window.iter().sum::<f64>() / n;
        let variance = self
            .window
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / n;
        (variance + 1e-6).ln()
    }
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.rms() > threshold
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn window_is_bounded() {
        let mut meter = PowerMeter::new(3);
        meter.extend(&[100.0, 1.0, -1.0, 1.0]);
        assert!(meter.is_full());
        assert!((meter.rms() - 1.0).abs() < 1e-12);
        assert!(!meter.exceeds(1.5));
        meter.push(10.0);
        assert!(meter.exceeds(1.5));
    }
    #[test]
    fn silence_has_floor_power() {
        let mut meter = PowerMeter::new(4);
        assert_eq!(meter.rms(), 0.0);
        meter.extend(&[2.0, 2.0, 2.0, 2.0]);
        assert!((meter.log_power() - (1e-6f64).ln()).abs() < 1e-9);
        meter.clear();
        assert!(!meter.is_full());
    }
}

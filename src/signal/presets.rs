//! Named coefficient sets a config can refer to instead of spelling out
//! `b`/`a` arrays. They come from an offline filter design tool and are kept
//! here only as defaults; any group may override them with explicit values.
use std::collections::HashMap;
use once_cell::sync::Lazy;
use crate::signal::{FilterCoefficients, StreamError};
/// 4th-order band-pass used on the spasticity monitor's EMG channels.
pub const EMG_BANDPASS: &str = "emg_bandpass";
/// Identity filter (order 1, unit gain).
pub const PASSTHROUGH: &str = "passthrough";
static PRESETS: Lazy<HashMap<&'static str, FilterCoefficients>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert(
        EMG_BANDPASS,
        FilterCoefficients::new(
            vec![0.00822449, 0.0, -0.01644898, 0.0, 0.00822449],
            vec![1.0, -3.70211638, 5.25666722, -3.39474815, 0.84242058],
        ),
    );
    table.insert(PASSTHROUGH, FilterCoefficients::new(vec![1.0], vec![1.0]));
    table
});
pub fn preset(name: &str) -> Result<&'static FilterCoefficients, StreamError> {
    PRESETS
        .get(name)
        .ok_or_else(|| StreamError::UnknownPreset(name.to_string()))
}
pub fn preset_names() -> Vec<&'static str> {
    let mut names: Vec<_> = PRESETS.keys().copied().collect();
    names.sort_unstable();
    names
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn presets_are_well_formed() {
        for name in preset_names() {
            let coeffs = preset(name).unwrap();
            assert_eq!(coeffs.b.len(), coeffs.a.len(), "{name}");
            assert_eq!(coeffs.a[0], 1.0, "{name}");
        }
        assert!(matches!(preset("nope"), Err(StreamError::UnknownPreset(_))));
    }
}

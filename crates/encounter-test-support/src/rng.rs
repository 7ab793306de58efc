//! Test RNGs.

use encounter_core::rng::DeterministicRng;

/// Always returns `min` for `next_u32_range` and `0.0` for `next_f64`.
///
/// Every `next_uuid` from this generator is the same id; use a seeded
/// generator when distinct ids matter.
#[derive(Debug, Default)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// Replays predetermined values. Panics once a sequence is exhausted.
#[derive(Debug, Default)]
pub struct SequenceRng {
    integers: Vec<u32>,
    floats: Vec<f64>,
    next_integer: usize,
    next_float: usize,
}

impl SequenceRng {
    /// Replays `values` from `next_u32_range`; `next_f64` returns `0.0`.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self {
            integers: values,
            ..Self::default()
        }
    }

    /// Replays `values` from `next_f64`, which also drives `next_i64_range`.
    #[must_use]
    pub fn with_floats(values: Vec<f64>) -> Self {
        Self {
            floats: values,
            ..Self::default()
        }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, _min: u32, _max: u32) -> u32 {
        let value = self.integers[self.next_integer];
        self.next_integer += 1;
        value
    }

    fn next_f64(&mut self) -> f64 {
        if self.floats.is_empty() {
            return 0.0;
        }
        let value = self.floats[self.next_float];
        self.next_float += 1;
        value
    }
}

//! Test RNG — deterministic `DeterministicRng` implementations for tests.

use quizhub_core::rng::DeterministicRng;

/// An RNG that always returns `min`. Every session created with it asks for
/// the lowest code first.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }
}

/// An RNG that returns values from a predetermined sequence, then repeats
/// the last one. Used to force session code collisions.
///
/// # Panics
///
/// Drawing from an empty sequence panics.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, index: 0 }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, _min: u32, _max: u32) -> u32 {
        let last = self.values.len() - 1;
        let val = self.values[self.index.min(last)];
        self.index += 1;
        val
    }
}

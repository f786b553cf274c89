// stimulus-data/src/samplers/sequential_sampler.rs

use super::traits::Sampler;

/// Samples elements sequentially, always in the same order.
///
/// This is the only order the evaluation loader uses: predictions are aligned
/// back to file paths by iteration position.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialSampler;

impl SequentialSampler {
    /// Creates a new `SequentialSampler`.
    pub fn new() -> Self {
        SequentialSampler
    }
}

impl Sampler for SequentialSampler {
    fn indices(&self, dataset_len: usize) -> Box<dyn Iterator<Item = usize> + Send> {
        Box::new(0..dataset_len)
    }
}

#[cfg(test)]
#[path = "sequential_sampler_test.rs"]
mod tests;

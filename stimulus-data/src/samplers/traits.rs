// stimulus-data/src/samplers/traits.rs

use std::fmt::Debug;

/// Index order of one pass over a dataset.
///
/// The loader splits whatever a sampler yields into consecutive batches, so
/// the sampler alone decides which items are visited and in which order.
/// Implementations must be deterministic for a given `dataset_len` when
/// batches are to be matched back to file paths by position.
pub trait Sampler: Debug + Send + Sync {
    /// The indices to visit, in emission order.
    fn indices(&self, dataset_len: usize) -> Box<dyn Iterator<Item = usize> + Send>;

    /// How many indices [`indices`](Self::indices) yields. Defaults to one
    /// per dataset item.
    fn num_samples(&self, dataset_len: usize) -> usize {
        dataset_len
    }
}

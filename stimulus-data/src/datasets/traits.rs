// stimulus-data/src/datasets/traits.rs

use stimulus_core::StimulusError;

/// Represents a dataset that can be accessed by index.
///
/// A dataset is a collection of items, where each item can be a single tensor,
/// a sample with metadata, or any other custom type that implements
/// `Send + 'static`.
///
/// Datasets must be `Send + Sync`: the [`DataLoader`](crate::DataLoader) shares
/// one instance across its prefetching workers.
pub trait Dataset: Send + Sync {
    /// The type of a single item returned by the dataset.
    type Item: Send + 'static;

    /// Returns the item at the given index.
    ///
    /// # Errors
    ///
    /// Returns `StimulusError` if the index is out of bounds or if the item
    /// cannot be produced.
    fn get(&self, index: usize) -> Result<Self::Item, StimulusError>;

    /// Returns the total number of items in the dataset.
    fn len(&self) -> usize;

    /// Checks if the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

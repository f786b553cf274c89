//! # stimulus-data
//!
//! Loading of labeled image stimuli for model evaluation.
//!
//! Every sample keeps the path it was read from, and its label is derived from
//! that path by a configurable [`InfoMapping`] rather than from the directory
//! layout alone. [`BatchLoader`] puts the pieces together: it assembles the
//! torchvision-style [`TransformPipeline`], scans a [`PathAwareDataset`] and
//! yields ordered [`Batch`]es of images, labels and paths, optionally decoding
//! ahead of the consumer on background workers.

pub mod batch_loader;
pub mod dataloader;
pub mod datasets;
pub mod info_mapping;
pub mod samplers;
pub mod transforms;

#[cfg(test)]
mod test_utils;

pub use batch_loader::{collate_samples, Batch, BatchLoader, Batches, LoaderConfig};
pub use dataloader::{BatchIter, CollateFn, DataLoader};
pub use datasets::{Dataset, DatasetIndex, PathAwareDataset, Sample};
pub use info_mapping::{
    ImageNetCInfoMapping, ImageNetInfoMapping, InfoMapping, InfoMappingKind, InfoMappingWithSessions, PathInfo,
};
pub use samplers::{Sampler, SequentialSampler};
pub use transforms::{TransformPipeline, TransformPipelineBuilder, TransformStep};

pub use stimulus_core::{StimulusError, Tensor};

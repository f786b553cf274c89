// BatchLoader: evaluation loader over a path-aware image folder
//
// Turns a handful of switches into a ready-to-iterate loader:
//
//   let config = LoaderConfig::new("stimuli/cue-conflict")
//       .resize(true)
//       .batch_size(16)
//       .num_workers(4);
//   let loader = BatchLoader::new(config, None)?;
//
//   for batch in loader.load() {
//       let batch = batch?;
//       // batch.images: [N, C, 224, 224], batch.labels[i] / batch.paths[i]
//   }
//
// Batches always come in the same fixed order (no shuffling), so predictions
// can be matched back to `batch.paths` by position.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;

use stimulus_core::{StimulusError, Tensor};

use crate::dataloader::{BatchIter, CollateFn, DataLoader, DEFAULT_PREFETCH_FACTOR};
use crate::datasets::{Dataset, PathAwareDataset, Sample};
use crate::info_mapping::{InfoMapping, InfoMappingKind};
use crate::samplers::SequentialSampler;
use crate::transforms::{TransformPipeline, TransformPipelineBuilder};

// Configuration

/// Parameters for [`BatchLoader`]. Parsing them from files or the command
/// line is left to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    /// Dataset root; its immediate subdirectories hold the images.
    pub root: PathBuf,
    /// Resize to 256 on the shorter side and centre crop 224 x 224.
    pub resize: bool,
    /// Number of samples per batch.
    pub batch_size: usize,
    /// Background decoding threads (0 = decode on the calling thread).
    pub num_workers: usize,
    /// Convert to grayscale and use single-channel normalization.
    pub single_channel: bool,
    /// Finished batches each worker may buffer ahead of the consumer.
    pub prefetch_factor: usize,
    /// Whether to drop the last incomplete batch.
    pub drop_last: bool,
}

impl LoaderConfig {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            resize: false,
            batch_size: 64,
            num_workers: 0,
            single_channel: false,
            prefetch_factor: DEFAULT_PREFETCH_FACTOR,
            drop_last: false,
        }
    }

    pub fn resize(mut self, r: bool) -> Self {
        self.resize = r;
        self
    }

    pub fn batch_size(mut self, bs: usize) -> Self {
        self.batch_size = bs;
        self
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn single_channel(mut self, s: bool) -> Self {
        self.single_channel = s;
        self
    }

    pub fn prefetch_factor(mut self, pf: usize) -> Self {
        self.prefetch_factor = pf;
        self
    }

    pub fn drop_last(mut self, d: bool) -> Self {
        self.drop_last = d;
        self
    }

    /// Checks the values that have no meaningful interpretation.
    pub fn validate(&self) -> Result<(), StimulusError> {
        if self.batch_size == 0 {
            return Err(StimulusError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.prefetch_factor == 0 {
            return Err(StimulusError::InvalidConfig(
                "prefetch_factor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The transform builder matching these switches.
    pub fn pipeline_builder(&self) -> TransformPipelineBuilder {
        TransformPipelineBuilder::new()
            .resize(self.resize)
            .single_channel(self.single_channel)
    }
}

// Batch

/// Index-aligned images, labels and paths of one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// `[N, C, H, W]`.
    pub images: Tensor,
    pub labels: Vec<String>,
    pub paths: Vec<String>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// `(label, path)` pairs in batch order.
    pub fn labeled_paths(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.paths.iter().map(String::as_str))
    }
}

/// Stacks sample images and gathers labels and paths in the same order.
///
/// # Errors
///
/// * `StimulusError::EmptyTensorList` for an empty sample list.
/// * `StimulusError::ShapeMismatch` if images differ in shape, which happens
///   when images of different sizes are loaded without resizing.
pub fn collate_samples(samples: Vec<Sample>) -> Result<Batch, StimulusError> {
    let mut images = Vec::with_capacity(samples.len());
    let mut labels = Vec::with_capacity(samples.len());
    let mut paths = Vec::with_capacity(samples.len());
    for sample in samples {
        images.push(sample.image);
        labels.push(sample.label);
        paths.push(sample.path);
    }
    Ok(Batch {
        images: Tensor::stack(&images)?,
        labels,
        paths,
    })
}

/// A lazy pass over a [`BatchLoader`].
pub type Batches = BatchIter<Batch>;

// BatchLoader

/// Preprocessing pipeline, path-aware dataset and ordered batching, built
/// once from a [`LoaderConfig`].
pub struct BatchLoader {
    config: LoaderConfig,
    pipeline: Arc<TransformPipeline>,
    loader: DataLoader<PathAwareDataset, SequentialSampler, Batch>,
}

impl BatchLoader {
    /// Builds the pipeline, scans the dataset root and prepares batching.
    ///
    /// `info_mapping` defaults to the ImageNet layout mapping.
    ///
    /// # Errors
    ///
    /// * `StimulusError::InvalidConfig` for an invalid configuration.
    /// * `StimulusError::EmptyDataset` if the root holds no images.
    /// * `StimulusError::Io` if the root cannot be read.
    pub fn new(
        config: LoaderConfig,
        info_mapping: Option<Arc<dyn InfoMapping>>,
    ) -> Result<Self, StimulusError> {
        config.validate()?;
        let pipeline = Arc::new(config.pipeline_builder().build()?);
        let dataset = PathAwareDataset::new(&config.root, Arc::clone(&pipeline), info_mapping)?;

        info!(
            "Loading {} images from {} ({} classes, mapping '{}', steps {:?}, batch_size {}, num_workers {})",
            dataset.len(),
            config.root.display(),
            dataset.class_names().len(),
            dataset.info_mapping().name(),
            pipeline.step_names(),
            config.batch_size,
            config.num_workers
        );

        let collate: CollateFn<Sample, Batch> = Arc::new(collate_samples);
        let loader = DataLoader::new(
            Arc::new(dataset),
            config.batch_size,
            SequentialSampler::new(),
            config.drop_last,
            collate,
        )?
        .with_workers(config.num_workers, config.prefetch_factor);

        Ok(Self {
            config,
            pipeline,
            loader,
        })
    }

    /// Same as [`BatchLoader::new`] with the mapping chosen by kind.
    pub fn with_mapping_kind(config: LoaderConfig, kind: InfoMappingKind) -> Result<Self, StimulusError> {
        Self::new(config, Some(kind.build()))
    }

    /// Starts a new pass over all batches in fixed order.
    ///
    /// Each call is independent; nothing is shuffled, so every pass yields the
    /// same paths in the same order.
    pub fn load(&self) -> Batches {
        self.loader.iter()
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &TransformPipeline {
        &self.pipeline
    }

    pub fn dataset(&self) -> &PathAwareDataset {
        self.loader.dataset()
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.dataset().len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset().is_empty()
    }

    pub fn num_batches(&self) -> usize {
        self.loader.num_batches()
    }
}

#[cfg(test)]
#[path = "batch_loader_test.rs"]
mod tests;

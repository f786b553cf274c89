// stimulus-data/src/datasets/path_aware.rs

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, ImageError, ImageReader};
use log::debug;

use stimulus_core::{StimulusError, Tensor};

use super::image_folder::DatasetIndex;
use super::traits::Dataset;
use crate::info_mapping::{default_info_mapping, InfoMapping};
use crate::transforms::TransformPipeline;

/// One preprocessed stimulus.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// `[C, H, W]` output of the transform pipeline.
    pub image: Tensor,
    /// Label resolved from `path` by the dataset's info mapping.
    pub label: String,
    /// The file the sample was read from.
    pub path: String,
}

/// An image folder whose samples carry their source path and a label derived
/// from that path.
///
/// The label suggested by the directory layout is kept in the index for
/// inspection only; every sample is relabelled through the configured
/// [`InfoMapping`]. The dataset owns the enumeration, the pipeline and the
/// mapping, all read-only, so it can be shared between loader workers.
pub struct PathAwareDataset {
    index: DatasetIndex,
    transform: Arc<TransformPipeline>,
    info_mapping: Arc<dyn InfoMapping>,
}

impl PathAwareDataset {
    /// Scans `root` and binds the dataset to a pipeline and a mapping.
    ///
    /// Uses [`ImageNetInfoMapping`](crate::info_mapping::ImageNetInfoMapping)
    /// when `info_mapping` is `None`.
    ///
    /// # Errors
    ///
    /// Propagates [`DatasetIndex::scan`] errors, including
    /// `StimulusError::EmptyDataset` when `root` holds no images.
    pub fn new<P: AsRef<Path>>(
        root: P,
        transform: Arc<TransformPipeline>,
        info_mapping: Option<Arc<dyn InfoMapping>>,
    ) -> Result<Self, StimulusError> {
        let index = DatasetIndex::scan(root)?;
        Ok(Self::from_index(index, transform, info_mapping))
    }

    /// Builds the dataset from an existing index.
    pub fn from_index(
        index: DatasetIndex,
        transform: Arc<TransformPipeline>,
        info_mapping: Option<Arc<dyn InfoMapping>>,
    ) -> Self {
        let info_mapping = info_mapping.unwrap_or_else(default_info_mapping);
        debug!(
            "PathAwareDataset over {} ({} samples, mapping '{}')",
            index.root().display(),
            index.len(),
            info_mapping.name()
        );
        Self {
            index,
            transform,
            info_mapping,
        }
    }

    pub fn index(&self) -> &DatasetIndex {
        &self.index
    }

    pub fn class_names(&self) -> &[String] {
        self.index.class_names()
    }

    pub fn path_of(&self, index: usize) -> Option<&Path> {
        self.index.path_of(index)
    }

    /// The label the directory layout suggests, before relabelling.
    pub fn directory_label_of(&self, index: usize) -> Option<&str> {
        self.index.directory_label_of(index)
    }

    pub fn transform(&self) -> &TransformPipeline {
        &self.transform
    }

    pub fn info_mapping(&self) -> &dyn InfoMapping {
        self.info_mapping.as_ref()
    }

    fn entry_path(&self, index: usize) -> Result<&Path, StimulusError> {
        self.index
            .path_of(index)
            .ok_or(StimulusError::IndexOutOfBounds {
                index,
                len: self.index.len(),
            })
    }

    /// Resolves the label of the i-th sample without decoding its image.
    pub fn resolve_label(&self, index: usize) -> Result<String, StimulusError> {
        let path = self.entry_path(index)?.to_string_lossy();
        Ok(self.info_mapping.resolve(&path)?.label)
    }

    /// Opens and decodes an image file as RGB.
    ///
    /// The format is sniffed from the file contents; the extension is only a
    /// fallback, so PNG data saved as `.JPEG` still decodes.
    fn load_image(path: &Path) -> Result<DynamicImage, StimulusError> {
        let io_error = |e: std::io::Error| StimulusError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        };
        let reader = ImageReader::open(path)
            .map_err(io_error)?
            .with_guessed_format()
            .map_err(io_error)?;
        let img = reader.decode().map_err(|e| match e {
            ImageError::IoError(io) => io_error(io),
            other => StimulusError::ImageDecode {
                path: path.display().to_string(),
                message: other.to_string(),
            },
        })?;
        Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
    }
}

impl Dataset for PathAwareDataset {
    type Item = Sample;

    /// Decodes, transforms and relabels the i-th file.
    ///
    /// # Errors
    ///
    /// * `StimulusError::IndexOutOfBounds` for an index past the end.
    /// * `StimulusError::Configuration` if the mapping cannot resolve the path.
    /// * `StimulusError::Io` / `StimulusError::ImageDecode` for unreadable files.
    ///
    /// Failures are never replaced by placeholder samples; the caller sees
    /// exactly which path failed.
    fn get(&self, index: usize) -> Result<Sample, StimulusError> {
        let path = self.entry_path(index)?;
        let path_str = path.to_string_lossy().into_owned();
        let label = self.info_mapping.resolve(&path_str)?.label;
        let image = Self::load_image(path)?;
        let image = self.transform.apply(image)?;
        Ok(Sample {
            image,
            label,
            path: path_str,
        })
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}

impl fmt::Debug for PathAwareDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathAwareDataset")
            .field("root", &self.index.root())
            .field("len", &self.index.len())
            .field("classes", &self.index.class_names())
            .field("transform", &self.transform.step_names())
            .field("info_mapping", &self.info_mapping.name())
            .finish()
    }
}

#[cfg(test)]
#[path = "path_aware_test.rs"]
mod tests;

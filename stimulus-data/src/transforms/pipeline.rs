// stimulus-data/src/transforms/pipeline.rs

use image::DynamicImage;
use log::debug;

use stimulus_core::{StimulusError, Tensor};

use super::step::{self, TransformStep};

/// Shorter image side after the evaluation resize.
pub const RESIZE_SHORTER_SIDE: u32 = 256;
/// Side of the square centre crop taken after resizing.
pub const CROP_SIZE: u32 = 224;

pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];
pub const GRAYSCALE_MEAN: [f32; 1] = [0.449];
pub const GRAYSCALE_STD: [f32; 1] = [0.236];

/// Value flowing between steps.
enum Stage {
    Image(DynamicImage),
    Tensor(Tensor),
}

/// An ordered, immutable sequence of preprocessing steps.
///
/// Every sample goes through the same steps in the same order. The step list
/// is checked once at construction, so [`apply`](Self::apply) only fails on
/// data-dependent problems.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformPipeline {
    steps: Vec<TransformStep>,
}

impl TransformPipeline {
    /// Creates a pipeline from an explicit step list.
    ///
    /// # Errors
    ///
    /// Returns `StimulusError::InvalidTransform` if the steps are not in
    /// image → `ToTensor` → tensor order, if `ToTensor` is missing or repeated,
    /// or if normalization statistics are inconsistent.
    pub fn new(steps: Vec<TransformStep>) -> Result<Self, StimulusError> {
        let mut seen_to_tensor = false;
        for s in &steps {
            match s {
                TransformStep::ToTensor if seen_to_tensor => {
                    return Err(StimulusError::InvalidTransform(
                        "to_tensor appears more than once".to_string(),
                    ));
                }
                TransformStep::ToTensor => seen_to_tensor = true,
                s if s.is_image_step() && seen_to_tensor => {
                    return Err(StimulusError::InvalidTransform(format!(
                        "{} must come before to_tensor",
                        s.name()
                    )));
                }
                TransformStep::Normalize { mean, std } => {
                    if !seen_to_tensor {
                        return Err(StimulusError::InvalidTransform(
                            "normalize must come after to_tensor".to_string(),
                        ));
                    }
                    if mean.is_empty() || mean.len() != std.len() {
                        return Err(StimulusError::InvalidTransform(format!(
                            "normalize needs one mean and std per channel, got {} and {}",
                            mean.len(),
                            std.len()
                        )));
                    }
                    if std.iter().any(|&v| v == 0.0) {
                        return Err(StimulusError::InvalidTransform(
                            "normalize std must be non-zero".to_string(),
                        ));
                    }
                }
                _ => {}
            }
        }
        if !seen_to_tensor {
            return Err(StimulusError::InvalidTransform(
                "pipeline must contain a to_tensor step".to_string(),
            ));
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[TransformStep] {
        &self.steps
    }

    /// Step names in application order, e.g. `["resize", "center_crop", ...]`.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(TransformStep::name).collect()
    }

    /// Channel count of the produced tensors.
    pub fn output_channels(&self) -> usize {
        let normalized = self.steps.iter().rev().find_map(|s| match s {
            TransformStep::Normalize { mean, .. } => Some(mean.len()),
            _ => None,
        });
        normalized.unwrap_or_else(|| {
            if self.steps.contains(&TransformStep::Grayscale) {
                1
            } else {
                3
            }
        })
    }

    /// Runs every step on a decoded image and returns the final tensor.
    pub fn apply(&self, image: DynamicImage) -> Result<Tensor, StimulusError> {
        let mut stage = Stage::Image(image);
        for s in &self.steps {
            stage = match (s, stage) {
                (TransformStep::Grayscale, Stage::Image(img)) => Stage::Image(step::grayscale(&img)),
                (TransformStep::Resize { shorter_side }, Stage::Image(img)) => {
                    Stage::Image(step::resize_shorter_side(&img, *shorter_side))
                }
                (TransformStep::CenterCrop { size }, Stage::Image(img)) => {
                    Stage::Image(step::center_crop(&img, *size))
                }
                (TransformStep::ToTensor, Stage::Image(img)) => Stage::Tensor(step::to_tensor(&img)?),
                (TransformStep::Normalize { mean, std }, Stage::Tensor(t)) => {
                    Stage::Tensor(step::normalize(t, mean, std)?)
                }
                (s, _) => {
                    return Err(StimulusError::InvalidTransform(format!(
                        "{} applied to the wrong input kind",
                        s.name()
                    )));
                }
            };
        }
        match stage {
            Stage::Tensor(t) => Ok(t),
            Stage::Image(_) => Err(StimulusError::InvalidTransform(
                "pipeline ended without to_tensor".to_string(),
            )),
        }
    }
}

/// Assembles the evaluation pipeline from the loader's boolean switches.
///
/// | `resize` | steps                                            |
/// |----------|--------------------------------------------------|
/// | `true`   | resize(256) → center_crop(224) → to_tensor → normalize |
/// | `false`  | to_tensor → normalize                            |
///
/// `single_channel` prepends a grayscale step and switches to single-channel
/// normalization statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformPipelineBuilder {
    resize: bool,
    single_channel: bool,
}

impl TransformPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resize(mut self, resize: bool) -> Self {
        self.resize = resize;
        self
    }

    pub fn single_channel(mut self, single_channel: bool) -> Self {
        self.single_channel = single_channel;
        self
    }

    /// The normalization step matching the channel setting.
    pub fn normalize_step(&self) -> TransformStep {
        if self.single_channel {
            TransformStep::Normalize {
                mean: GRAYSCALE_MEAN.to_vec(),
                std: GRAYSCALE_STD.to_vec(),
            }
        } else {
            TransformStep::Normalize {
                mean: IMAGENET_MEAN.to_vec(),
                std: IMAGENET_STD.to_vec(),
            }
        }
    }

    pub fn build(&self) -> Result<TransformPipeline, StimulusError> {
        let mut steps = Vec::with_capacity(5);
        if self.single_channel {
            steps.push(TransformStep::Grayscale);
        }
        if self.resize {
            steps.push(TransformStep::Resize {
                shorter_side: RESIZE_SHORTER_SIDE,
            });
            steps.push(TransformStep::CenterCrop { size: CROP_SIZE });
        }
        steps.push(TransformStep::ToTensor);
        steps.push(self.normalize_step());

        let pipeline = TransformPipeline::new(steps)?;
        debug!("Built transform pipeline: {:?}", pipeline.step_names());
        Ok(pipeline)
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;

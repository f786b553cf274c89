//! Preprocessing steps and the pipeline that chains them.

pub mod pipeline;
pub mod step;

pub use pipeline::{
    TransformPipeline, TransformPipelineBuilder, CROP_SIZE, GRAYSCALE_MEAN, GRAYSCALE_STD,
    IMAGENET_MEAN, IMAGENET_STD, RESIZE_SHORTER_SIDE,
};
pub use step::TransformStep;

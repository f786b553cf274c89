// stimulus-data/src/transforms/pipeline_test.rs

use super::*;
use approx::assert_abs_diff_eq;
use image::{Rgb, RgbImage};

fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

#[test]
fn test_builder_resize_three_channels() {
    let pipeline = TransformPipelineBuilder::new().resize(true).build().unwrap();
    assert_eq!(
        pipeline.step_names(),
        vec!["resize", "center_crop", "to_tensor", "normalize"]
    );
    assert_eq!(
        pipeline.steps()[3],
        TransformStep::Normalize {
            mean: IMAGENET_MEAN.to_vec(),
            std: IMAGENET_STD.to_vec(),
        }
    );
    assert_eq!(pipeline.output_channels(), 3);
}

#[test]
fn test_builder_no_resize() {
    let pipeline = TransformPipelineBuilder::new().build().unwrap();
    assert_eq!(pipeline.step_names(), vec!["to_tensor", "normalize"]);
}

#[test]
fn test_builder_single_channel_prepends_grayscale() {
    let pipeline = TransformPipelineBuilder::new()
        .resize(true)
        .single_channel(true)
        .build()
        .unwrap();
    assert_eq!(
        pipeline.step_names(),
        vec!["grayscale", "resize", "center_crop", "to_tensor", "normalize"]
    );
    match &pipeline.steps()[4] {
        TransformStep::Normalize { mean, std } => {
            assert_abs_diff_eq!(mean[0], 0.449);
            assert_abs_diff_eq!(std[0], 0.236);
            assert_eq!(mean.len(), 1);
        }
        other => panic!("Expected normalize step, got {:?}", other),
    }
    assert_eq!(pipeline.output_channels(), 1);
}

#[test]
fn test_apply_resize_gives_224_square() {
    let pipeline = TransformPipelineBuilder::new().resize(true).build().unwrap();
    let tensor = pipeline.apply(gradient_image(320, 240)).unwrap();
    assert_eq!(tensor.shape(), &[3, 224, 224]);

    let gray = TransformPipelineBuilder::new()
        .resize(true)
        .single_channel(true)
        .build()
        .unwrap();
    let tensor = gray.apply(gradient_image(100, 500)).unwrap();
    assert_eq!(tensor.shape(), &[1, 224, 224]);
}

#[test]
fn test_apply_without_resize_keeps_geometry() {
    let pipeline = TransformPipelineBuilder::new().build().unwrap();
    let tensor = pipeline.apply(gradient_image(17, 9)).unwrap();
    assert_eq!(tensor.shape(), &[3, 9, 17]);
    // Blue channel is constant 128 everywhere.
    let expected = (128.0 / 255.0 - IMAGENET_MEAN[2]) / IMAGENET_STD[2];
    assert_abs_diff_eq!(tensor.get(&[2, 4, 8]).unwrap(), expected, epsilon = 1e-5);
}

#[test]
fn test_apply_is_deterministic() {
    let pipeline = TransformPipelineBuilder::new().resize(true).build().unwrap();
    let a = pipeline.apply(gradient_image(300, 260)).unwrap();
    let b = pipeline.apply(gradient_image(300, 260)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_new_rejects_misordered_steps() {
    let err = TransformPipeline::new(vec![
        TransformStep::ToTensor,
        TransformStep::Resize { shorter_side: 256 },
    ])
    .unwrap_err();
    assert!(matches!(err, StimulusError::InvalidTransform(_)));

    let err = TransformPipeline::new(vec![
        TransformStep::Normalize {
            mean: vec![0.5],
            std: vec![0.5],
        },
        TransformStep::ToTensor,
    ])
    .unwrap_err();
    assert!(matches!(err, StimulusError::InvalidTransform(_)));
}

#[test]
fn test_new_rejects_missing_or_repeated_to_tensor() {
    assert!(TransformPipeline::new(vec![TransformStep::Grayscale]).is_err());
    assert!(TransformPipeline::new(vec![TransformStep::ToTensor, TransformStep::ToTensor]).is_err());
}

#[test]
fn test_new_rejects_bad_statistics() {
    let uneven = TransformPipeline::new(vec![
        TransformStep::ToTensor,
        TransformStep::Normalize {
            mean: vec![0.5, 0.5],
            std: vec![0.5],
        },
    ]);
    assert!(uneven.is_err());

    let zero_std = TransformPipeline::new(vec![
        TransformStep::ToTensor,
        TransformStep::Normalize {
            mean: vec![0.5],
            std: vec![0.0],
        },
    ]);
    assert!(zero_std.is_err());
}

#[test]
fn test_channel_mismatch_surfaces_at_apply() {
    // Three-channel input with single-channel statistics and no grayscale step.
    let pipeline = TransformPipeline::new(vec![
        TransformStep::ToTensor,
        TransformStep::Normalize {
            mean: GRAYSCALE_MEAN.to_vec(),
            std: GRAYSCALE_STD.to_vec(),
        },
    ])
    .unwrap();
    let err = pipeline.apply(gradient_image(4, 4)).unwrap_err();
    assert!(matches!(err, StimulusError::ShapeMismatch { .. }));
}

// stimulus-data/src/transforms/step_test.rs

use super::*;
use approx::assert_abs_diff_eq;
use image::{Rgb, RgbImage};

fn solid_rgb(width: u32, height: u32, pixel: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(pixel)))
}

#[test]
fn test_grayscale_uses_601_weights() {
    let image = solid_rgb(2, 2, [255, 0, 0]);
    let gray = grayscale(&image);
    assert!(!gray.color().has_color());
    // 255 * 299 / 1000 = 76.245
    assert_eq!(gray.to_luma8().get_pixel(1, 1).0, [76]);

    let white = grayscale(&solid_rgb(1, 1, [255, 255, 255]));
    assert_eq!(white.to_luma8().get_pixel(0, 0).0, [255]);
}

#[test]
fn test_grayscale_rounds_to_nearest() {
    let luma = |pixel: [u8; 3]| grayscale(&solid_rgb(1, 1, pixel)).to_luma8().get_pixel(0, 0).0[0];
    // 0.587 rounds up, truncation would give 0
    assert_eq!(luma([0, 1, 0]), 1);
    // 0.299 + 0.114 = 0.413 rounds down
    assert_eq!(luma([1, 0, 1]), 0);
    // 100 * 0.587 + 200 * 0.114 = 81.5 -> 82
    assert_eq!(luma([0, 100, 200]), 82);
    assert_eq!(luma([10, 20, 30]), 18);
}

#[test]
fn test_resize_shorter_side_portrait() {
    let image = solid_rgb(300, 400, [10, 20, 30]);
    let resized = resize_shorter_side(&image, 256);
    // 256 * 400 / 300 = 341.33 -> 341
    assert_eq!(resized.dimensions(), (256, 341));
}

#[test]
fn test_resize_shorter_side_landscape_upscale() {
    let image = solid_rgb(50, 20, [0, 0, 0]);
    let resized = resize_shorter_side(&image, 256);
    assert_eq!(resized.dimensions(), (640, 256));
}

#[test]
fn test_resize_noop_when_already_sized() {
    let image = solid_rgb(256, 300, [1, 2, 3]);
    assert_eq!(resize_shorter_side(&image, 256).dimensions(), (256, 300));
}

#[test]
fn test_center_crop_window_position() {
    // Left half black, right half white; an odd crop margin exercises rounding.
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(9, 4, |x, _| {
        if x < 5 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    }));
    let cropped = center_crop(&image, 4);
    assert_eq!(cropped.dimensions(), (4, 4));
    // (9 - 4) / 2 = 2.5 rounds to 2, so columns 2..6 are kept.
    let rgb = cropped.to_rgb8();
    assert_eq!(rgb.get_pixel(2, 0).0, [0, 0, 0]);
    assert_eq!(rgb.get_pixel(3, 0).0, [255, 255, 255]);
}

#[test]
fn test_center_crop_pads_small_images() {
    let image = solid_rgb(2, 2, [200, 200, 200]);
    let cropped = center_crop(&image, 4);
    assert_eq!(cropped.dimensions(), (4, 4));
    let rgb = cropped.to_rgb8();
    assert_eq!(rgb.get_pixel(0, 0).0, [0, 0, 0]);
    assert_eq!(rgb.get_pixel(1, 1).0, [200, 200, 200]);
    assert_eq!(rgb.get_pixel(2, 2).0, [200, 200, 200]);
    assert_eq!(rgb.get_pixel(3, 3).0, [0, 0, 0]);
}

#[test]
fn test_to_tensor_rgb_is_planar() {
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(3, 2, |x, y| {
        Rgb([(x * 10) as u8, (y * 100) as u8, 255])
    }));
    let tensor = to_tensor(&image).unwrap();
    assert_eq!(tensor.shape(), &[3, 2, 3]);
    assert_abs_diff_eq!(tensor.get(&[0, 1, 2]).unwrap(), 20.0 / 255.0, epsilon = 1e-6);
    assert_abs_diff_eq!(tensor.get(&[1, 1, 0]).unwrap(), 100.0 / 255.0, epsilon = 1e-6);
    assert_abs_diff_eq!(tensor.get(&[2, 0, 0]).unwrap(), 1.0, epsilon = 1e-6);
}

#[test]
fn test_to_tensor_luma_has_one_channel() {
    let gray = grayscale(&solid_rgb(5, 4, [0, 0, 0]));
    let tensor = to_tensor(&gray).unwrap();
    assert_eq!(tensor.shape(), &[1, 4, 5]);
}

#[test]
fn test_normalize_per_channel() {
    let tensor = Tensor::new(vec![0.5, 0.5, 1.0, 1.0], vec![2, 1, 2]).unwrap();
    let out = normalize(tensor, &[0.5, 0.0], &[0.25, 2.0]).unwrap();
    assert_abs_diff_eq!(out.data()[0], 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(out.data()[1], 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(out.data()[2], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(out.data()[3], 0.5, epsilon = 1e-6);
}

#[test]
fn test_normalize_channel_mismatch() {
    let tensor = Tensor::zeros(&[1, 2, 2]);
    match normalize(tensor, &[0.485, 0.456, 0.406], &[0.229, 0.224, 0.225]) {
        Err(StimulusError::ShapeMismatch { expected, actual, .. }) => {
            assert_eq!(expected, vec![3]);
            assert_eq!(actual, vec![1, 2, 2]);
        }
        other => panic!("Expected ShapeMismatch, got {:?}", other),
    }
}

#[test]
fn test_step_names_and_kinds() {
    assert_eq!(TransformStep::Grayscale.name(), "grayscale");
    assert!(TransformStep::CenterCrop { size: 224 }.is_image_step());
    assert!(!TransformStep::ToTensor.is_image_step());
}

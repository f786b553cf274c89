// stimulus-data/src/transforms/step.rs

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, GrayImage, Luma};

use stimulus_core::{StimulusError, Tensor};

/// One preprocessing step of a [`TransformPipeline`](super::TransformPipeline).
///
/// Image steps (`Grayscale`, `Resize`, `CenterCrop`) operate on decoded image
/// buffers, `ToTensor` converts to a `[C, H, W]` tensor scaled to `[0, 1]`,
/// and `Normalize` operates on that tensor.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformStep {
    /// Single-channel luma conversion.
    Grayscale,
    /// Resize so the shorter side equals `shorter_side`, keeping aspect ratio.
    Resize { shorter_side: u32 },
    /// Crop a `size` x `size` window from the centre, zero padding if needed.
    CenterCrop { size: u32 },
    ToTensor,
    /// Per-channel `(x - mean[c]) / std[c]`.
    Normalize { mean: Vec<f32>, std: Vec<f32> },
}

impl TransformStep {
    pub fn name(&self) -> &'static str {
        match self {
            TransformStep::Grayscale => "grayscale",
            TransformStep::Resize { .. } => "resize",
            TransformStep::CenterCrop { .. } => "center_crop",
            TransformStep::ToTensor => "to_tensor",
            TransformStep::Normalize { .. } => "normalize",
        }
    }

    /// Whether the step consumes an image buffer (as opposed to a tensor).
    pub fn is_image_step(&self) -> bool {
        matches!(
            self,
            TransformStep::Grayscale | TransformStep::Resize { .. } | TransformStep::CenterCrop { .. }
        )
    }
}

/// Converts to one luma channel with the ITU-R 601-2 weights
/// `L = R * 299/1000 + G * 587/1000 + B * 114/1000`, rounded to nearest.
///
/// Uses the 16-bit fixed-point form of the weights so results match PIL's
/// `convert("L")` bit for bit.
pub fn grayscale(image: &DynamicImage) -> DynamicImage {
    let rgb = image.to_rgb8();
    let gray = GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
        Luma([luma as u8])
    });
    DynamicImage::ImageLuma8(gray)
}

/// Resizes so the shorter side becomes `size`; the longer side is scaled by
/// the same factor and truncated. Images already at that size are returned
/// unchanged.
pub fn resize_shorter_side(image: &DynamicImage, size: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    let (short, long) = if width <= height {
        (width, height)
    } else {
        (height, width)
    };
    if short == size {
        return image.clone();
    }
    let scaled_long = (size as u64 * long as u64 / short.max(1) as u64) as u32;
    let (new_width, new_height) = if width <= height {
        (size, scaled_long)
    } else {
        (scaled_long, size)
    };
    image.resize_exact(new_width, new_height, FilterType::Triangle)
}

/// Offset of a centred window, rounding halves to even.
fn centre_offset(outer: u32, inner: u32) -> u32 {
    ((outer as f64 - inner as f64) / 2.0).round_ties_even() as u32
}

/// Crops a `size` x `size` square from the centre of the image. Images smaller
/// than the window are first zero padded symmetrically.
pub fn center_crop(image: &DynamicImage, size: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    let padded = if width < size || height < size {
        let canvas_width = width.max(size);
        let canvas_height = height.max(size);
        let mut canvas = DynamicImage::new(canvas_width, canvas_height, image.color());
        let left = (canvas_width - width) / 2;
        let top = (canvas_height - height) / 2;
        imageops::replace(&mut canvas, image, left as i64, top as i64);
        canvas
    } else {
        image.clone()
    };

    let (width, height) = padded.dimensions();
    let left = centre_offset(width, size);
    let top = centre_offset(height, size);
    padded.crop_imm(left, top, size, size)
}

/// Converts an image to a `[C, H, W]` tensor with values in `[0, 1]`.
///
/// Luma images give one channel, everything else is converted to RGB.
pub fn to_tensor(image: &DynamicImage) -> Result<Tensor, StimulusError> {
    let (width, height) = image.dimensions();
    let npix = (width as usize) * (height as usize);

    if !image.color().has_color() {
        let gray = image.to_luma8();
        let data: Vec<f32> = gray.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
        return Tensor::new(data, vec![1, height as usize, width as usize]);
    }

    let rgb = image.to_rgb8();
    let raw = rgb.as_raw();
    // Interleaved [H, W, C] to planar [C, H, W]
    let mut data = vec![0.0f32; 3 * npix];
    for i in 0..npix {
        data[i] = raw[i * 3] as f32 / 255.0;
        data[npix + i] = raw[i * 3 + 1] as f32 / 255.0;
        data[2 * npix + i] = raw[i * 3 + 2] as f32 / 255.0;
    }
    Tensor::new(data, vec![3, height as usize, width as usize])
}

/// Normalizes each channel of a `[C, H, W]` tensor.
///
/// # Errors
///
/// Returns `StimulusError::ShapeMismatch` if the tensor is not rank 3 or its
/// channel count differs from the number of statistics.
pub fn normalize(tensor: Tensor, mean: &[f32], std: &[f32]) -> Result<Tensor, StimulusError> {
    let shape = tensor.shape().to_vec();
    if shape.len() != 3 || shape[0] != mean.len() {
        return Err(StimulusError::ShapeMismatch {
            expected: vec![mean.len()],
            actual: shape,
            operation: "normalize".to_string(),
        });
    }
    let plane = shape[1] * shape[2];
    let mut data = tensor.into_vec();
    for (c, chunk) in data.chunks_mut(plane.max(1)).enumerate().take(mean.len()) {
        for v in chunk.iter_mut() {
            *v = (*v - mean[c]) / std[c];
        }
    }
    Tensor::new(data, shape)
}

#[cfg(test)]
#[path = "step_test.rs"]
mod tests;

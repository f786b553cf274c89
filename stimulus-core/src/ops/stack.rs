use log::trace;

use crate::error::StimulusError;
use crate::tensor::Tensor;

/// Stacks tensors of identical shape along a new leading dimension.
///
/// `[S1, S2, ...]` tensors of shape `[d0, d1, ..]` become one tensor of shape
/// `[n, d0, d1, ..]`, with element order preserved.
///
/// # Errors
///
/// * `StimulusError::EmptyTensorList` if `tensors` is empty.
/// * `StimulusError::ShapeMismatch` if any tensor differs in shape from the first.
pub fn stack_op(tensors: &[Tensor]) -> Result<Tensor, StimulusError> {
    let first = tensors.first().ok_or(StimulusError::EmptyTensorList)?;
    let item_shape = first.shape().to_vec();

    for tensor in tensors.iter().skip(1) {
        if tensor.shape() != item_shape.as_slice() {
            return Err(StimulusError::ShapeMismatch {
                expected: item_shape,
                actual: tensor.shape().to_vec(),
                operation: "stack".to_string(),
            });
        }
    }

    let mut data = Vec::with_capacity(first.numel() * tensors.len());
    for tensor in tensors {
        data.extend_from_slice(tensor.data());
    }

    let mut shape = Vec::with_capacity(item_shape.len() + 1);
    shape.push(tensors.len());
    shape.extend_from_slice(&item_shape);
    trace!("stack: {} tensors of shape {:?}", tensors.len(), item_shape);

    Tensor::new(data, shape)
}

#[cfg(test)]
#[path = "stack_test.rs"]
mod tests;

// src/tensor.rs

use std::fmt;
use std::sync::Arc;

use crate::error::StimulusError;

/// A dense, row-major `f32` tensor living on the CPU.
///
/// The buffer sits behind an `Arc` so clones are cheap and tensors can be
/// handed across loader worker threads without copying pixel data. Tensors
/// are never mutated in place; operations build new ones.
#[derive(Clone, PartialEq)]
pub struct Tensor {
    data: Arc<Vec<f32>>,
    shape: Vec<usize>,
}

impl Tensor {
    /// Creates a new tensor from contiguous data and a shape.
    ///
    /// # Errors
    ///
    /// Returns `StimulusError::TensorCreationError` if `data_vec.len()` does not
    /// equal the product of `shape`.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, StimulusError> {
        let numel: usize = shape.iter().product();
        if data_vec.len() != numel {
            return Err(StimulusError::TensorCreationError {
                data_len: data_vec.len(),
                shape,
            });
        }
        Ok(Tensor {
            data: Arc::new(data_vec),
            shape,
        })
    }

    /// Creates a tensor of the given shape filled with zeros.
    pub fn zeros(shape: &[usize]) -> Self {
        let numel = shape.iter().product();
        Tensor {
            data: Arc::new(vec![0.0; numel]),
            shape: shape.to_vec(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Contiguous view of the elements in row-major order.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consumes the tensor and returns its buffer, copying only if the buffer
    /// is still shared with another clone.
    pub fn into_vec(self) -> Vec<f32> {
        Arc::try_unwrap(self.data).unwrap_or_else(|shared| (*shared).clone())
    }

    /// Reads a single element by multi-dimensional index.
    ///
    /// Returns `None` if the index rank or any coordinate is out of range.
    pub fn get(&self, index: &[usize]) -> Option<f32> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0;
        for (&i, &dim) in index.iter().zip(self.shape.iter()) {
            if i >= dim {
                return None;
            }
            offset = offset * dim + i;
        }
        self.data.get(offset).copied()
    }

    /// Stacks tensors of identical shape along a new leading dimension.
    ///
    /// See [`crate::ops::stack::stack_op`].
    pub fn stack(tensors: &[Tensor]) -> Result<Tensor, StimulusError> {
        crate::ops::stack::stack_op(tensors)
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Pixel buffers are large; print the shape and a short prefix only.
        let preview: Vec<f32> = self.data.iter().take(6).copied().collect();
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("data", &preview)
            .field("numel", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tensor_test.rs"]
mod tests;

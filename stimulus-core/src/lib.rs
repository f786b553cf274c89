//! Shared building blocks for the stimulus crates: the error type and a
//! small dense `f32` tensor used to carry preprocessed images.

pub mod error;
pub mod ops;
pub mod tensor;

// Re-export so callers can write `stimulus_core::Tensor`.
pub use error::StimulusError;
pub use tensor::Tensor;

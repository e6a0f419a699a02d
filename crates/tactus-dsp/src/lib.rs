//! # Tactus DSP
//!
//! Stateless numeric transfer functions used by classifier front-ends:
//! linear, sigmoid, tanh, relu, elu and softmax. All functions operate
//! in place on raw `&mut [f32]` buffers - no framework dependencies.

pub mod transfer;

pub use transfer::{elu, linear, relu, sigmoid, softmax, tanh};

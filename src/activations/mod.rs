//! # Activation Functions Module
//!
//! Activation functions introduce non-linearity into the network. Each
//! [`Activation`] resolves to an [`ActivationKernel`], a pair of plain function
//! pointers (forward and derivative) that a layer looks up once at construction
//! and then calls on every neuron without branching.
//!
//! ## Available Activations
//!
//! - **Sigmoid**: `1 / (1 + e^(-z))`, with `z` clamped to `[-88, 88]`
//! - **ReLU**: `max(0, z)`
//! - **LeakyReLU**: `z` for positive inputs, `0.01 z` otherwise
//! - **Tanh**: hyperbolic tangent
//! - **Linear**: identity
//! - **Softmax**: normalized across a whole layer, see [`softmax_in_place`]
//!
//! ## Usage Example
//!
//! ```rust
//! use dqnet::activations::Activation;
//! use ndarray::array;
//!
//! let mut data = array![1.0, -0.5, 0.0, 2.0];
//! Activation::Relu.apply(&mut data);
//! assert_eq!(data, array![1.0f32, 0.0, 0.0, 2.0]);
//! ```
//!
//! Derivatives are evaluated at the cached pre-activation value `z`, never at
//! the activation output.

pub mod functions;

pub use functions::{softmax_in_place, Activation, ActivationKernel};

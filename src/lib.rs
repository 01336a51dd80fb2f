//! # dqnet - Feed-forward Networks and Deep Q-Learning
//!
//! dqnet is a small neural network engine built from explicit neurons and
//! layers, plus a Deep Q-Network agent on top of it. It targets small-scale
//! supervised learning (classification and regression on float vectors) and
//! reinforcement learning with discrete action spaces.
//!
//! ## Key Features
//!
//! - **Networks of any depth**: an ordered list of `(size, activation)` layers
//! - **Activations**: Sigmoid, ReLU, LeakyReLU, Tanh, Linear and layer-wide Softmax
//! - **Training**: backpropagation with clipped gradient descent (MSE, or
//!   cross-entropy for softmax outputs)
//! - **Synchronization**: hard weight copies and Polyak soft updates
//! - **DQN**: epsilon-greedy exploration, FIFO experience replay, target network
//! - **Reproducibility**: every random draw goes through a caller-supplied `Rng`
//!
//! ## Quick Start
//!
//! ```rust
//! use dqnet::config::NetworkConfig;
//! use dqnet::network::Network;
//! use ndarray::array;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let config = NetworkConfig::single_hidden(2, 4, 1).with_learning_rate(0.5);
//! let mut network = Network::new(&config, &mut rng).unwrap();
//!
//! let loss = network.train(array![1.0, 0.0].view(), array![1.0].view()).unwrap();
//! let output = network.predict(array![1.0, 0.0].view()).unwrap();
//! assert!(loss >= 0.0);
//! assert_eq!(output.len(), 1);
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions and their derivatives
//! - [`agent`] - The DQN agent
//! - [`config`] - Plain, validated configuration records
//! - [`error`] - Error types and result handling
//! - [`layers`] - Neurons and fully connected layers
//! - [`network`] - Forward pass, backpropagation, weight synchronization
//! - [`replay_buffer`] - Experience replay for RL
//! - [`snapshot`] - Weight export/import in binary or JSON form

pub mod activations;
pub mod agent;
pub mod config;
pub mod error;
pub mod layers;
pub mod network;
pub mod replay_buffer;
pub mod snapshot;

pub use error::{DqnetError, Result};

#[cfg(test)]
mod tests;

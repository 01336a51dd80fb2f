//! Plain configuration records for networks and agents.
//!
//! Configurations are data: build one (or deserialize it), then hand it to
//! [`Network::new`](crate::network::Network::new) or
//! [`DqnAgent::new`](crate::agent::DqnAgent::new), which validate it and fail
//! with [`DqnetError::InvalidConfig`] on bad fields.

use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{DqnetError, Result};

/// One layer of a network: neuron count and activation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub activation: Activation,
}

impl LayerSpec {
    pub fn new(size: usize, activation: Activation) -> Self {
        LayerSpec { size, activation }
    }
}

/// Topology and hyperparameters of a [`Network`](crate::network::Network).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub input_size: usize,
    /// Hidden layers followed by the output layer.
    pub layers: Vec<LayerSpec>,
    pub learning_rate: f32,
    pub gradient_clip: f32,
    pub soft_update_tau: f32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            input_size: 0,
            layers: Vec::new(),
            learning_rate: 0.1,
            gradient_clip: 1.0,
            soft_update_tau: 0.01,
        }
    }
}

impl NetworkConfig {
    pub fn new(input_size: usize, layers: Vec<LayerSpec>) -> Self {
        NetworkConfig {
            input_size,
            layers,
            ..NetworkConfig::default()
        }
    }

    /// Sigmoid hidden layer, sigmoid output.
    pub fn single_hidden(input_size: usize, hidden: usize, output: usize) -> Self {
        NetworkConfig::new(
            input_size,
            vec![
                LayerSpec::new(hidden, Activation::Sigmoid),
                LayerSpec::new(output, Activation::Sigmoid),
            ],
        )
    }

    /// Two ReLU hidden layers, linear output.
    pub fn two_hidden(input_size: usize, hidden1: usize, hidden2: usize, output: usize) -> Self {
        NetworkConfig::new(
            input_size,
            vec![
                LayerSpec::new(hidden1, Activation::Relu),
                LayerSpec::new(hidden2, Activation::Relu),
                LayerSpec::new(output, Activation::Linear),
            ],
        )
    }

    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_gradient_clip(mut self, gradient_clip: f32) -> Self {
        self.gradient_clip = gradient_clip;
        self
    }

    pub fn with_soft_update_tau(mut self, tau: f32) -> Self {
        self.soft_update_tau = tau;
        self
    }

    pub fn output_size(&self) -> Option<usize> {
        self.layers.last().map(|l| l.size)
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(DqnetError::invalid_config("input_size", "must be positive"));
        }
        if self.layers.len() < 2 {
            return Err(DqnetError::invalid_config(
                "layers",
                "need at least one hidden layer and an output layer",
            ));
        }
        if let Some(i) = self.layers.iter().position(|l| l.size == 0) {
            return Err(DqnetError::invalid_config(
                format!("layers[{}].size", i),
                "layer must have at least one neuron".to_string(),
            ));
        }
        validate_learning_rate(self.learning_rate)?;
        validate_gradient_clip(self.gradient_clip)?;
        validate_tau("soft_update_tau", self.soft_update_tau)
    }
}

pub(crate) fn validate_learning_rate(learning_rate: f32) -> Result<()> {
    if !(learning_rate.is_finite() && learning_rate > 0.0) {
        return Err(DqnetError::invalid_config(
            "learning_rate",
            "must be finite and positive",
        ));
    }
    Ok(())
}

pub(crate) fn validate_gradient_clip(clip: f32) -> Result<()> {
    if !(clip.is_finite() && clip > 0.0) {
        return Err(DqnetError::invalid_config("gradient_clip", "must be finite and positive"));
    }
    Ok(())
}

pub(crate) fn validate_tau(name: &str, tau: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&tau) {
        return Err(DqnetError::invalid_config(name, "must lie in [0, 1]"));
    }
    Ok(())
}

/// How the target network follows the Q-network.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TargetSync {
    /// Full weight copy every `every` training steps.
    Hard { every: usize },
    /// Polyak update with mixing factor `tau` after every training step.
    Soft { tau: f32 },
}

impl Default for TargetSync {
    fn default() -> Self {
        TargetSync::Hard { every: 100 }
    }
}

/// Hyperparameters of a [`DqnAgent`](crate::agent::DqnAgent).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DqnConfig {
    pub state_size: usize,
    pub action_size: usize,
    pub hidden_layers: Vec<usize>,
    pub hidden_activation: Activation,
    pub learning_rate: f32,
    pub gradient_clip: f32,
    pub gamma: f32,
    pub epsilon_initial: f32,
    pub epsilon_min: f32,
    pub epsilon_decay: f32,
    pub buffer_capacity: usize,
    pub batch_size: usize,
    pub target_sync: TargetSync,
}

impl Default for DqnConfig {
    fn default() -> Self {
        DqnConfig {
            state_size: 0,
            action_size: 0,
            hidden_layers: vec![128, 128],
            hidden_activation: Activation::Relu,
            learning_rate: 0.001,
            gradient_clip: 1.0,
            gamma: 0.99,
            epsilon_initial: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            buffer_capacity: 10_000,
            batch_size: 64,
            target_sync: TargetSync::default(),
        }
    }
}

impl DqnConfig {
    pub fn new(state_size: usize, action_size: usize) -> Self {
        DqnConfig {
            state_size,
            action_size,
            ..DqnConfig::default()
        }
    }

    /// Q-network topology: hidden layers with `hidden_activation`, linear output
    /// of width `action_size`.
    pub fn network_config(&self) -> NetworkConfig {
        let mut layers: Vec<LayerSpec> = self
            .hidden_layers
            .iter()
            .map(|&size| LayerSpec::new(size, self.hidden_activation))
            .collect();
        layers.push(LayerSpec::new(self.action_size, Activation::Linear));

        let tau = match self.target_sync {
            TargetSync::Soft { tau } => tau,
            TargetSync::Hard { .. } => NetworkConfig::default().soft_update_tau,
        };

        NetworkConfig {
            input_size: self.state_size,
            layers,
            learning_rate: self.learning_rate,
            gradient_clip: self.gradient_clip,
            soft_update_tau: tau,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.state_size == 0 {
            return Err(DqnetError::invalid_config("state_size", "must be positive"));
        }
        if self.action_size == 0 {
            return Err(DqnetError::invalid_config("action_size", "must be positive"));
        }
        if self.hidden_layers.is_empty() {
            return Err(DqnetError::invalid_config("hidden_layers", "need at least one hidden layer"));
        }
        if self.batch_size == 0 {
            return Err(DqnetError::invalid_config("batch_size", "must be positive"));
        }
        if self.buffer_capacity == 0 {
            return Err(DqnetError::invalid_config("buffer_capacity", "must be positive"));
        }
        if self.batch_size > self.buffer_capacity {
            return Err(DqnetError::invalid_config(
                "batch_size",
                "must not exceed buffer_capacity",
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(DqnetError::invalid_config("gamma", "must lie in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.epsilon_initial) {
            return Err(DqnetError::invalid_config("epsilon_initial", "must lie in [0, 1]"));
        }
        if !(0.0..=self.epsilon_initial).contains(&self.epsilon_min) {
            return Err(DqnetError::invalid_config("epsilon_min", "must lie in [0, epsilon_initial]"));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(DqnetError::invalid_config("epsilon_decay", "must lie in (0, 1]"));
        }
        match self.target_sync {
            TargetSync::Hard { every: 0 } => {
                return Err(DqnetError::invalid_config("target_sync.every", "must be positive"));
            }
            TargetSync::Soft { tau } => validate_tau("target_sync.tau", tau)?,
            TargetSync::Hard { .. } => {}
        }
        self.network_config().validate()
    }
}

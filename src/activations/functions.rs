use ndarray::Array1;
use serde::{Serialize, Deserialize};

/// Pre-activation bound applied before the sigmoid exponent.
pub const SIGMOID_CLAMP: f32 = 88.0;

/// Negative-side slope of the leaky ReLU.
pub const LEAKY_RELU_SLOPE: f32 = 0.01;

/// An enumeration of the activation functions a layer can use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Activation {
    #[default]
    Sigmoid,
    Relu,
    LeakyRelu,
    Tanh,
    Linear,
    /// Normalized across the whole layer; neurons emit their raw sum.
    Softmax,
}

impl Activation {
    /// Resolve the forward/derivative pair for this activation.
    pub fn kernel(self) -> ActivationKernel {
        match self {
            Activation::Sigmoid => ActivationKernel {
                activation: self,
                forward: sigmoid,
                derivative: sigmoid_derivative,
            },
            Activation::Relu => ActivationKernel {
                activation: self,
                forward: relu,
                derivative: relu_derivative,
            },
            Activation::LeakyRelu => ActivationKernel {
                activation: self,
                forward: leaky_relu,
                derivative: leaky_relu_derivative,
            },
            Activation::Tanh => ActivationKernel {
                activation: self,
                forward: tanh,
                derivative: tanh_derivative,
            },
            // Softmax neurons pass z through; the layer normalizes.
            Activation::Linear | Activation::Softmax => ActivationKernel {
                activation: self,
                forward: identity,
                derivative: unit,
            },
        }
    }

    /// He scaling suits the ReLU family, Xavier the saturating activations.
    pub fn init_scale(self, input_size: usize) -> f32 {
        let fan_in = input_size.max(1) as f32;
        match self {
            Activation::Relu | Activation::LeakyRelu | Activation::Linear => (2.0 / fan_in).sqrt(),
            Activation::Sigmoid | Activation::Tanh | Activation::Softmax => (1.0 / fan_in).sqrt(),
        }
    }

    pub fn is_softmax(self) -> bool {
        matches!(self, Activation::Softmax)
    }

    /// Apply the activation element-wise to an input array in-place.
    pub fn apply(&self, input: &mut Array1<f32>) {
        if self.is_softmax() {
            softmax_in_place(input);
        } else {
            let forward = self.kernel().forward;
            input.mapv_inplace(forward);
        }
    }

    /// Compute the derivative of the activation for each pre-activation value.
    pub fn derivative(&self, input: &Array1<f32>) -> Array1<f32> {
        input.mapv(self.kernel().derivative)
    }
}

/// Forward and derivative functions resolved once per layer.
#[derive(Clone, Copy, Debug)]
pub struct ActivationKernel {
    pub activation: Activation,
    pub forward: fn(f32) -> f32,
    pub derivative: fn(f32) -> f32,
}

impl PartialEq for ActivationKernel {
    fn eq(&self, other: &Self) -> bool {
        self.activation == other.activation
    }
}

pub fn sigmoid(z: f32) -> f32 {
    let z = z.clamp(-SIGMOID_CLAMP, SIGMOID_CLAMP);
    1.0 / (1.0 + (-z).exp())
}

pub fn sigmoid_derivative(z: f32) -> f32 {
    let s = sigmoid(z);
    s * (1.0 - s)
}

pub fn relu(z: f32) -> f32 {
    z.max(0.0)
}

pub fn relu_derivative(z: f32) -> f32 {
    if z > 0.0 { 1.0 } else { 0.0 }
}

pub fn leaky_relu(z: f32) -> f32 {
    if z > 0.0 { z } else { LEAKY_RELU_SLOPE * z }
}

pub fn leaky_relu_derivative(z: f32) -> f32 {
    if z > 0.0 { 1.0 } else { LEAKY_RELU_SLOPE }
}

pub fn tanh(z: f32) -> f32 {
    z.tanh()
}

pub fn tanh_derivative(z: f32) -> f32 {
    let t = z.tanh();
    1.0 - t * t
}

fn identity(z: f32) -> f32 {
    z
}

fn unit(_z: f32) -> f32 {
    1.0
}

/// Numerically stable softmax: shift by the maximum, exponentiate, normalize.
pub fn softmax_in_place(values: &mut Array1<f32>) {
    if values.is_empty() {
        return;
    }
    let max = values.iter().fold(f32::NEG_INFINITY, |m, &v| m.max(v));
    values.mapv_inplace(|v| (v - max).exp());
    let sum = values.sum();
    if sum > 0.0 && sum.is_finite() {
        values.mapv_inplace(|v| v / sum);
    }
}

use ndarray::{Array1, ArrayView1, ArrayViewMut1};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::activations::{Activation, ActivationKernel};
use crate::error::{DqnetError, Result};

/// A single unit: weight vector, bias, and the values cached by its last forward call.
#[derive(Clone, Debug, PartialEq)]
pub struct Neuron {
    weights: Array1<f32>,
    bias: f32,
    last_preactivation: f32,
    last_output: f32,
}

impl Neuron {
    /// Create a neuron with `input_size` weights drawn for the given activation.
    pub fn new<R: Rng + ?Sized>(input_size: usize, activation: Activation, rng: &mut R) -> Self {
        let mut neuron = Neuron::from_parts(Array1::zeros(input_size), 0.0);
        neuron.initialize(activation, rng);
        neuron
    }

    /// Build a neuron from explicit weights and bias.
    pub fn from_parts(weights: Array1<f32>, bias: f32) -> Self {
        Neuron {
            weights,
            bias,
            last_preactivation: 0.0,
            last_output: 0.0,
        }
    }

    /// Redraw weights and bias uniformly from `[-scale, scale]`.
    ///
    /// He scaling (`sqrt(2/n)`) for the ReLU family, Xavier (`sqrt(1/n)`) for
    /// sigmoid, tanh and softmax.
    pub fn initialize<R: Rng + ?Sized>(&mut self, activation: Activation, rng: &mut R) {
        let scale = activation.init_scale(self.input_size());
        let dist = Uniform::new_inclusive(-scale, scale);
        let bias = dist.sample(rng);
        self.weights = Array1::random_using(self.input_size(), dist, rng);
        self.bias = bias;
    }

    pub fn input_size(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> ArrayView1<'_, f32> {
        self.weights.view()
    }

    /// Mutable view of the weights; the length cannot change through it.
    pub fn weights_mut(&mut self) -> ArrayViewMut1<'_, f32> {
        self.weights.view_mut()
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: f32) {
        self.bias = bias;
    }

    pub fn last_preactivation(&self) -> f32 {
        self.last_preactivation
    }

    pub fn last_output(&self) -> f32 {
        self.last_output
    }

    /// `z = w · x + b`, cached, then passed through the kernel.
    ///
    /// The caller guarantees `inputs.len() == self.input_size()`.
    pub(crate) fn compute_output(&mut self, inputs: ArrayView1<f32>, kernel: &ActivationKernel) -> f32 {
        let z = self.weights.dot(&inputs) + self.bias;
        self.last_preactivation = z;
        self.last_output = (kernel.forward)(z);
        self.last_output
    }

    /// Softmax layers overwrite the raw output once normalized.
    pub(crate) fn set_last_output(&mut self, value: f32) {
        self.last_output = value;
    }

    /// Gradient-descent step: every component is clipped to `[-clip, clip]`
    /// and then subtracted, scaled by `learning_rate`.
    pub fn apply_update(
        &mut self,
        weight_gradients: ArrayView1<f32>,
        bias_gradient: f32,
        learning_rate: f32,
        clip: f32,
    ) -> Result<()> {
        if weight_gradients.len() != self.input_size() {
            return Err(DqnetError::width("weight gradient", self.input_size(), weight_gradients.len()));
        }
        self.bias -= learning_rate * bias_gradient.clamp(-clip, clip);
        self.weights
            .zip_mut_with(&weight_gradients, |w, &g| *w -= learning_rate * g.clamp(-clip, clip));
        Ok(())
    }

    /// Backprop update for one neuron: bias gradient `delta`, weight gradient `delta * input[j]`.
    pub(crate) fn apply_delta(&mut self, delta: f32, inputs: ArrayView1<f32>, learning_rate: f32, clip: f32) {
        self.bias -= learning_rate * delta.clamp(-clip, clip);
        self.weights
            .zip_mut_with(&inputs, |w, &x| *w -= learning_rate * (delta * x).clamp(-clip, clip));
    }

    /// Exact copy of weights and bias.
    pub fn copy_weights_from(&mut self, other: &Neuron) -> Result<()> {
        self.check_same_size(other)?;
        self.weights.assign(&other.weights);
        self.bias = other.bias;
        Ok(())
    }

    /// Polyak averaging: `self = tau * other + (1 - tau) * self`.
    pub fn soft_update(&mut self, other: &Neuron, tau: f32) -> Result<()> {
        self.check_same_size(other)?;
        self.weights
            .zip_mut_with(&other.weights, |w, &o| *w = tau * o + (1.0 - tau) * *w);
        self.bias = tau * other.bias + (1.0 - tau) * self.bias;
        Ok(())
    }

    fn check_same_size(&self, other: &Neuron) -> Result<()> {
        if self.input_size() != other.input_size() {
            return Err(DqnetError::width("neuron", self.input_size(), other.input_size()));
        }
        Ok(())
    }
}

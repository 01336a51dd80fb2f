use ndarray::{Array1, ArrayView1};
use rand::Rng;

use crate::activations::{softmax_in_place, Activation, ActivationKernel};
use crate::error::{DqnetError, Result};
use super::neuron::Neuron;

/// A fully connected layer: neurons sharing one activation and one input width.
///
/// The activation kernel is resolved once here; the forward pass calls the
/// function pointers directly. Softmax is applied across the whole layer after
/// every neuron has produced its raw sum.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    neurons: Vec<Neuron>,
    kernel: ActivationKernel,
    input_size: usize,
    last_inputs: Array1<f32>,
    last_outputs: Array1<f32>,
}

impl Layer {
    /// Create a new layer of `neuron_count` neurons, each reading `input_size` values.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        neuron_count: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self> {
        if input_size == 0 {
            return Err(DqnetError::invalid_config("input_size", "layer input width must be positive"));
        }
        if neuron_count == 0 {
            return Err(DqnetError::invalid_config("neuron_count", "layer must have at least one neuron"));
        }
        let neurons = (0..neuron_count)
            .map(|_| Neuron::new(input_size, activation, rng))
            .collect();
        Ok(Layer::assemble(neurons, activation, input_size))
    }

    /// Build a layer from existing neurons; all must read `input_size` values.
    pub fn from_neurons(neurons: Vec<Neuron>, activation: Activation, input_size: usize) -> Result<Self> {
        if neurons.is_empty() {
            return Err(DqnetError::invalid_config("neurons", "layer must have at least one neuron"));
        }
        if let Some(bad) = neurons.iter().find(|n| n.input_size() != input_size) {
            return Err(DqnetError::width("neuron", input_size, bad.input_size()));
        }
        Ok(Layer::assemble(neurons, activation, input_size))
    }

    fn assemble(neurons: Vec<Neuron>, activation: Activation, input_size: usize) -> Self {
        let neuron_count = neurons.len();
        Layer {
            neurons,
            kernel: activation.kernel(),
            input_size,
            last_inputs: Array1::zeros(input_size),
            last_outputs: Array1::zeros(neuron_count),
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    pub fn activation(&self) -> Activation {
        self.kernel.activation
    }

    pub(crate) fn kernel(&self) -> &ActivationKernel {
        &self.kernel
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn neuron_mut(&mut self, index: usize) -> Option<&mut Neuron> {
        self.neurons.get_mut(index)
    }

    pub(crate) fn neurons_mut(&mut self) -> &mut [Neuron] {
        &mut self.neurons
    }

    /// Inputs seen by the last forward call.
    pub fn last_inputs(&self) -> ArrayView1<'_, f32> {
        self.last_inputs.view()
    }

    /// Outputs produced by the last forward call (post-softmax where applicable).
    pub fn last_outputs(&self) -> ArrayView1<'_, f32> {
        self.last_outputs.view()
    }

    pub fn last_preactivations(&self) -> Array1<f32> {
        self.neurons.iter().map(Neuron::last_preactivation).collect()
    }

    /// Forward pass for a single input vector.
    pub fn forward(&mut self, inputs: ArrayView1<f32>) -> Result<Array1<f32>> {
        if inputs.len() != self.input_size {
            return Err(DqnetError::width("layer input", self.input_size, inputs.len()));
        }
        self.last_inputs.assign(&inputs);

        let kernel = self.kernel;
        for (out, neuron) in self.last_outputs.iter_mut().zip(self.neurons.iter_mut()) {
            *out = neuron.compute_output(inputs, &kernel);
        }

        if kernel.activation.is_softmax() {
            softmax_in_place(&mut self.last_outputs);
            for (neuron, &p) in self.neurons.iter_mut().zip(self.last_outputs.iter()) {
                neuron.set_last_output(p);
            }
        }

        Ok(self.last_outputs.clone())
    }

    /// Copy every neuron's weights and bias from `other`.
    pub fn copy_weights_from(&mut self, other: &Layer) -> Result<()> {
        self.check_same_shape(other)?;
        for (mine, theirs) in self.neurons.iter_mut().zip(other.neurons.iter()) {
            mine.copy_weights_from(theirs)?;
        }
        Ok(())
    }

    /// Polyak-average every neuron toward `other`.
    pub fn soft_update(&mut self, other: &Layer, tau: f32) -> Result<()> {
        self.check_same_shape(other)?;
        for (mine, theirs) in self.neurons.iter_mut().zip(other.neurons.iter()) {
            mine.soft_update(theirs, tau)?;
        }
        Ok(())
    }

    /// Neuron count and input width must both agree, so per-neuron calls cannot fail halfway.
    pub(crate) fn check_same_shape(&self, other: &Layer) -> Result<()> {
        if self.neuron_count() != other.neuron_count() {
            return Err(DqnetError::dimension_mismatch(
                format!("layer with {} neurons", self.neuron_count()),
                format!("{} neurons", other.neuron_count()),
            ));
        }
        if self.input_size != other.input_size {
            return Err(DqnetError::width("layer input", self.input_size, other.input_size));
        }
        Ok(())
    }
}

use ndarray::{Array1, ArrayView1};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::activations::Activation;
use crate::config::{self, NetworkConfig};
use crate::error::{DqnetError, Result};
use crate::layers::Layer;

/// Floor applied to probabilities inside the cross-entropy logarithm.
const CROSS_ENTROPY_FLOOR: f32 = 1e-7;

/// A feed-forward network: an ordered chain of fully connected layers.
///
/// `predict` runs a forward pass and refreshes the per-layer caches; `train`
/// runs a forward pass, backpropagates the loss gradient and applies a clipped
/// gradient-descent step to every layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Network {
    layers: Vec<Layer>,
    learning_rate: f32,
    gradient_clip: f32,
    soft_update_tau: f32,
}

impl Network {
    /// Create a new network from a validated configuration.
    pub fn new<R: Rng + ?Sized>(config: &NetworkConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let mut layers = Vec::with_capacity(config.layers.len());
        let mut input_size = config.input_size;
        for spec in &config.layers {
            layers.push(Layer::new(input_size, spec.size, spec.activation, rng)?);
            input_size = spec.size;
        }

        Ok(Network {
            layers,
            learning_rate: config.learning_rate,
            gradient_clip: config.gradient_clip,
            soft_update_tau: config.soft_update_tau,
        })
    }

    /// Assemble a network from prebuilt layers, checking that widths chain.
    pub fn from_layers(layers: Vec<Layer>, learning_rate: f32, gradient_clip: f32, soft_update_tau: f32) -> Result<Self> {
        if layers.len() < 2 {
            return Err(DqnetError::invalid_config(
                "layers",
                "need at least one hidden layer and an output layer",
            ));
        }
        for pair in layers.windows(2) {
            if pair[0].neuron_count() != pair[1].input_size() {
                return Err(DqnetError::width("layer input", pair[0].neuron_count(), pair[1].input_size()));
            }
        }
        config::validate_learning_rate(learning_rate)?;
        config::validate_gradient_clip(gradient_clip)?;
        config::validate_tau("soft_update_tau", soft_update_tau)?;

        Ok(Network {
            layers,
            learning_rate,
            gradient_clip,
            soft_update_tau,
        })
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].input_size()
    }

    pub fn output_size(&self) -> usize {
        self.output_layer().neuron_count()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    pub fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    /// `(input_size, neuron_count, activation)` per layer, input side first.
    pub fn topology(&self) -> Vec<(usize, usize, Activation)> {
        self.layers
            .iter()
            .map(|l| (l.input_size(), l.neuron_count(), l.activation()))
            .collect()
    }

    /// Total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.neuron_count() * (l.input_size() + 1))
            .sum()
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f32) -> Result<()> {
        config::validate_learning_rate(learning_rate)?;
        self.learning_rate = learning_rate;
        Ok(())
    }

    pub fn gradient_clip(&self) -> f32 {
        self.gradient_clip
    }

    pub fn set_gradient_clip(&mut self, clip: f32) -> Result<()> {
        config::validate_gradient_clip(clip)?;
        self.gradient_clip = clip;
        Ok(())
    }

    pub fn soft_update_tau(&self) -> f32 {
        self.soft_update_tau
    }

    pub fn set_soft_update_tau(&mut self, tau: f32) -> Result<()> {
        config::validate_tau("soft_update_tau", tau)?;
        self.soft_update_tau = tau;
        Ok(())
    }

    /// Forward pass for a single input vector.
    pub fn predict(&mut self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.check_input(input)?;
        let mut current = self.layers[0].forward(input)?;
        for layer in self.layers.iter_mut().skip(1) {
            current = layer.forward(current.view())?;
        }
        Ok(current)
    }

    /// One gradient-descent step on a single sample; returns the loss before the update.
    ///
    /// Softmax outputs are trained against cross-entropy, everything else against
    /// mean squared error.
    pub fn train(&mut self, input: ArrayView1<f32>, target: ArrayView1<f32>) -> Result<f32> {
        self.check_input(input)?;
        self.check_target(target)?;

        let output = self.predict(input)?;
        let loss = self.loss(output.view(), target);
        let deltas = self.backpropagate(output.view(), target);
        self.apply_deltas(&deltas);
        Ok(loss)
    }

    /// Classification convenience: train toward the one-hot vector of `label`.
    pub fn train_class(&mut self, input: ArrayView1<f32>, label: usize) -> Result<f32> {
        let width = self.output_size();
        if label >= width {
            return Err(DqnetError::dimension_mismatch(
                format!("class label below {}", width),
                format!("label {}", label),
            ));
        }
        let mut target = Array1::zeros(width);
        target[label] = 1.0;
        self.train(input, target.view())
    }

    /// Full passes over paired samples in order; returns the mean loss of the last epoch.
    pub fn fit(&mut self, inputs: &[Array1<f32>], targets: &[Array1<f32>], epochs: usize) -> Result<f32> {
        self.check_dataset(inputs, targets)?;
        let order: Vec<usize> = (0..inputs.len()).collect();
        let mut last = 0.0;
        for _ in 0..epochs {
            last = self.run_epoch(inputs, targets, &order)?;
        }
        Ok(last)
    }

    /// Like [`fit`](Self::fit), visiting samples in a fresh random order every epoch.
    pub fn fit_shuffled<R: Rng + ?Sized>(
        &mut self,
        inputs: &[Array1<f32>],
        targets: &[Array1<f32>],
        epochs: usize,
        rng: &mut R,
    ) -> Result<f32> {
        self.check_dataset(inputs, targets)?;
        let mut order: Vec<usize> = (0..inputs.len()).collect();
        let mut last = 0.0;
        for _ in 0..epochs {
            order.shuffle(rng);
            last = self.run_epoch(inputs, targets, &order)?;
        }
        Ok(last)
    }

    fn run_epoch(&mut self, inputs: &[Array1<f32>], targets: &[Array1<f32>], order: &[usize]) -> Result<f32> {
        if order.is_empty() {
            return Ok(0.0);
        }
        let mut total = 0.0;
        for &i in order {
            total += self.train(inputs[i].view(), targets[i].view())?;
        }
        Ok(total / order.len() as f32)
    }

    /// Loss of `output` against `target` under the output layer's loss.
    pub fn loss(&self, output: ArrayView1<f32>, target: ArrayView1<f32>) -> f32 {
        if self.output_layer().activation().is_softmax() {
            -output
                .iter()
                .zip(target.iter())
                .map(|(&y, &t)| t * y.max(CROSS_ENTROPY_FLOOR).ln())
                .sum::<f32>()
        } else {
            let n = output.len().max(1) as f32;
            output
                .iter()
                .zip(target.iter())
                .map(|(&y, &t)| (y - t) * (y - t))
                .sum::<f32>()
                / n
        }
    }

    /// Per-layer deltas, computed against the weights as they were before this step.
    fn backpropagate(&self, output: ArrayView1<f32>, target: ArrayView1<f32>) -> Vec<Array1<f32>> {
        let last = self.layers.len() - 1;
        let output_layer = &self.layers[last];

        let output_delta: Array1<f32> = if output_layer.activation().is_softmax() {
            &output - &target
        } else {
            let derivative = output_layer.kernel().derivative;
            output
                .iter()
                .zip(target.iter())
                .zip(output_layer.neurons())
                .map(|((&y, &t), n)| (y - t) * derivative(n.last_preactivation()))
                .collect()
        };

        let mut deltas = vec![Array1::zeros(0); self.layers.len()];
        deltas[last] = output_delta;

        for i in (0..last).rev() {
            let layer = &self.layers[i];
            let next = &self.layers[i + 1];
            let next_delta = &deltas[i + 1];
            let derivative = layer.kernel().derivative;

            let delta: Array1<f32> = layer
                .neurons()
                .iter()
                .enumerate()
                .map(|(j, neuron)| {
                    let error: f32 = next
                        .neurons()
                        .iter()
                        .zip(next_delta.iter())
                        .map(|(k, &d)| d * k.weights()[j])
                        .sum();
                    error * derivative(neuron.last_preactivation())
                })
                .collect();
            deltas[i] = delta;
        }

        deltas
    }

    fn apply_deltas(&mut self, deltas: &[Array1<f32>]) {
        let lr = self.learning_rate;
        let clip = self.gradient_clip;
        for (layer, delta) in self.layers.iter_mut().zip(deltas) {
            let inputs = layer.last_inputs().to_owned();
            for (neuron, &d) in layer.neurons_mut().iter_mut().zip(delta.iter()) {
                neuron.apply_delta(d, inputs.view(), lr, clip);
            }
        }
    }

    /// Copy all weights and hyperparameters from a network of identical topology.
    pub fn copy_weights_from(&mut self, other: &Network) -> Result<()> {
        self.check_same_topology(other)?;
        for (mine, theirs) in self.layers.iter_mut().zip(other.layers.iter()) {
            mine.copy_weights_from(theirs)?;
        }
        self.learning_rate = other.learning_rate;
        self.gradient_clip = other.gradient_clip;
        self.soft_update_tau = other.soft_update_tau;
        Ok(())
    }

    /// Layer-wise Polyak averaging toward `other`; `tau = 1` copies, `tau = 0` is a no-op.
    pub fn soft_update(&mut self, other: &Network, tau: f32) -> Result<()> {
        config::validate_tau("tau", tau)?;
        self.check_same_topology(other)?;
        for (mine, theirs) in self.layers.iter_mut().zip(other.layers.iter()) {
            mine.soft_update(theirs, tau)?;
        }
        Ok(())
    }

    /// Polyak update using this network's own `soft_update_tau`.
    pub fn soft_update_default(&mut self, other: &Network) -> Result<()> {
        self.soft_update(other, self.soft_update_tau)
    }

    pub fn check_same_topology(&self, other: &Network) -> Result<()> {
        let mine = self.topology();
        let theirs = other.topology();
        if mine != theirs {
            return Err(DqnetError::dimension_mismatch(
                format!("topology {:?}", mine),
                format!("{:?}", theirs),
            ));
        }
        Ok(())
    }

    fn check_input(&self, input: ArrayView1<f32>) -> Result<()> {
        if input.len() != self.input_size() {
            return Err(DqnetError::width("input", self.input_size(), input.len()));
        }
        Ok(())
    }

    fn check_target(&self, target: ArrayView1<f32>) -> Result<()> {
        if target.len() != self.output_size() {
            return Err(DqnetError::width("target", self.output_size(), target.len()));
        }
        Ok(())
    }

    fn check_dataset(&self, inputs: &[Array1<f32>], targets: &[Array1<f32>]) -> Result<()> {
        if inputs.len() != targets.len() {
            return Err(DqnetError::dimension_mismatch(
                format!("{} targets", inputs.len()),
                format!("{} targets", targets.len()),
            ));
        }
        for (x, y) in inputs.iter().zip(targets) {
            self.check_input(x.view())?;
            self.check_target(y.view())?;
        }
        Ok(())
    }
}

/// Index of the largest value; the first maximum wins ties.
///
/// NaN entries are skipped. A vector holding only NaN yields index 0 and an
/// empty one yields `None`.
pub fn argmax(values: ArrayView1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    match best {
        Some((i, _)) => Some(i),
        None if values.is_empty() => None,
        None => Some(0),
    }
}

/// Largest value, or `None` for an empty vector.
pub fn max_value(values: ArrayView1<f32>) -> Option<f32> {
    values.iter().copied().reduce(f32::max)
}

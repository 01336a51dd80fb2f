pub mod neuron;
pub mod dense;

pub use neuron::Neuron;
pub use dense::Layer;

//! Export and import of network weights.
//!
//! A [`NetworkSnapshot`] carries the topology, every weight and bias (layer
//! major, neuron major, weight-index minor) and the hyperparameters. It is the
//! only thing the persistence functions in this module read or write, so a
//! restored network predicts exactly what the exported one did.

use std::fs;
use std::path::Path;

use ndarray::Array1;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::activations::Activation;
use crate::error::{DqnetError, Result};
use crate::layers::{Layer, Neuron};
use crate::network::Network;

pub const SNAPSHOT_VERSION: u32 = 1;

/// On-disk encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Binary,
    Json,
}

impl Format {
    /// `.json` selects JSON, anything else binary.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Binary,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub input_size: usize,
    pub neuron_count: usize,
    pub activation: Activation,
    /// `neuron_count * input_size` values, one neuron after another.
    pub weights: Vec<f32>,
    pub biases: Vec<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub version: u32,
    pub input_size: usize,
    pub learning_rate: f32,
    pub gradient_clip: f32,
    pub soft_update_tau: f32,
    pub layers: Vec<LayerSnapshot>,
}

impl Network {
    pub fn export(&self) -> NetworkSnapshot {
        let layers = self
            .layers()
            .iter()
            .map(|layer| LayerSnapshot {
                input_size: layer.input_size(),
                neuron_count: layer.neuron_count(),
                activation: layer.activation(),
                weights: layer
                    .neurons()
                    .iter()
                    .flat_map(|n| n.weights().to_vec())
                    .collect(),
                biases: layer.neurons().iter().map(Neuron::bias).collect(),
            })
            .collect();

        NetworkSnapshot {
            version: SNAPSHOT_VERSION,
            input_size: self.input_size(),
            learning_rate: self.learning_rate(),
            gradient_clip: self.gradient_clip(),
            soft_update_tau: self.soft_update_tau(),
            layers,
        }
    }

    pub fn from_snapshot(snapshot: &NetworkSnapshot) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(DqnetError::Serialization(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        if snapshot.layers.first().map(|l| l.input_size) != Some(snapshot.input_size) {
            return Err(DqnetError::dimension_mismatch(
                format!("first layer reading {} inputs", snapshot.input_size),
                format!("{:?}", snapshot.layers.first().map(|l| l.input_size)),
            ));
        }

        let layers = snapshot
            .layers
            .iter()
            .map(restore_layer)
            .collect::<Result<Vec<_>>>()?;

        Network::from_layers(
            layers,
            snapshot.learning_rate,
            snapshot.gradient_clip,
            snapshot.soft_update_tau,
        )
    }
}

fn restore_layer(snapshot: &LayerSnapshot) -> Result<Layer> {
    let expected = snapshot.neuron_count * snapshot.input_size;
    if snapshot.weights.len() != expected {
        return Err(DqnetError::width("weight table", expected, snapshot.weights.len()));
    }
    if snapshot.biases.len() != snapshot.neuron_count {
        return Err(DqnetError::width("bias table", snapshot.neuron_count, snapshot.biases.len()));
    }
    if snapshot.input_size == 0 {
        return Err(DqnetError::invalid_config("input_size", "layer input width must be positive"));
    }

    let neurons = snapshot
        .weights
        .chunks(snapshot.input_size)
        .zip(snapshot.biases.iter())
        .map(|(w, &b)| Neuron::from_parts(Array1::from(w.to_vec()), b))
        .collect();

    Layer::from_neurons(neurons, snapshot.activation, snapshot.input_size)
}

pub fn to_bytes(network: &Network, format: Format) -> Result<Vec<u8>> {
    let snapshot = network.export();
    match format {
        Format::Binary => Ok(bincode::serialize(&snapshot)?),
        Format::Json => Ok(serde_json::to_vec_pretty(&snapshot)?),
    }
}

pub fn from_bytes(bytes: &[u8], format: Format) -> Result<Network> {
    let snapshot: NetworkSnapshot = match format {
        Format::Binary => bincode::deserialize(bytes)?,
        Format::Json => serde_json::from_slice(bytes)?,
    };
    Network::from_snapshot(&snapshot)
}

/// Write the network to `path`, creating parent directories as needed.
pub fn save<P: AsRef<Path>>(network: &Network, path: P, format: Format) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, to_bytes(network, format)?)?;
    debug!(path = %path.display(), ?format, "saved network snapshot");
    Ok(())
}

/// Read a network, choosing the format from the file extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Network> {
    let path = path.as_ref();
    load_as(path, Format::from_path(path))
}

pub fn load_as<P: AsRef<Path>>(path: P, format: Format) -> Result<Network> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let network = from_bytes(&bytes, format)?;
    debug!(path = %path.display(), ?format, "loaded network snapshot");
    Ok(network)
}

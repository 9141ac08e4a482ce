// ============================================================
// Layer 3 — NetworkShape Domain Type
// ============================================================
// The layer-size list that describes a feed-forward classifier:
//
//   input_size ─► hidden_layers[0] ─► ... ─► hidden_layers[n-1] ─► output_size
//
// Example for 28x28 greyscale images and 10 classes:
//   NetworkShape::new(784, 10, vec![512, 256, 128])
//   layer_sizes() → [(784, 512), (512, 256), (256, 128), (128, 10)]
//
// This is exactly what a checkpoint needs to rebuild the model
// before its weights can be loaded back in.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkShape {
    /// Number of features per sample (784 for a flattened 28x28 image)
    pub input_size: usize,

    /// Number of classes the network scores
    pub output_size: usize,

    /// Width of every hidden layer, in forward order
    pub hidden_layers: Vec<usize>,
}

impl NetworkShape {
    pub fn new(input_size: usize, output_size: usize, hidden_layers: Vec<usize>) -> Self {
        Self { input_size, output_size, hidden_layers }
    }

    /// Reject shapes no linear stack can be built from.
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            bail!("input_size must be greater than zero");
        }
        if self.output_size == 0 {
            bail!("output_size must be greater than zero");
        }
        if self.hidden_layers.is_empty() {
            bail!("at least one hidden layer is required");
        }
        if let Some(i) = self.hidden_layers.iter().position(|&h| h == 0) {
            bail!("hidden layer {i} has zero units");
        }
        Ok(())
    }

    /// (in_features, out_features) for every linear layer,
    /// hidden layers first and the output layer last.
    pub fn layer_sizes(&self) -> Vec<(usize, usize)> {
        let mut widths = Vec::with_capacity(self.hidden_layers.len() + 2);
        widths.push(self.input_size);
        widths.extend_from_slice(&self.hidden_layers);
        widths.push(self.output_size);
        widths.windows(2).map(|w| (w[0], w[1])).collect()
    }

    /// Total number of learnable scalars (weights + biases)
    pub fn parameter_count(&self) -> usize {
        self.layer_sizes()
            .iter()
            .map(|(i, o)| i * o + o)
            .sum()
    }
}

impl std::fmt::Display for NetworkShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.input_size)?;
        for h in &self.hidden_layers {
            write!(f, " -> {h}")?;
        }
        write!(f, " -> {}", self.output_size)
    }
}

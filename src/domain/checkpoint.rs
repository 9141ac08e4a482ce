// ============================================================
// Layer 3 — Checkpoint Domain Type
// ============================================================
// Everything needed to bring a trained classifier back:
//
//   input_size, output_size, hidden_layers → rebuild the architecture
//   state_dict                             → fill in the learned values
//
// drop_p and epoch are extra bookkeeping. Older files without
// them still load (serde defaults).

use serde::{Deserialize, Serialize};

use crate::domain::shape::NetworkShape;
use crate::domain::state_dict::{StateDict, StateDictError};

fn default_drop_p() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub input_size:    usize,
    pub output_size:   usize,
    pub hidden_layers: Vec<usize>,
    pub state_dict:    StateDict,

    /// Dropout probability the network was built with
    #[serde(default = "default_drop_p")]
    pub drop_p: f64,

    /// Training epoch that produced these weights, if known
    #[serde(default)]
    pub epoch: Option<usize>,
}

impl Checkpoint {
    pub fn new(shape: NetworkShape, state_dict: StateDict, drop_p: f64) -> Self {
        Self {
            input_size:    shape.input_size,
            output_size:   shape.output_size,
            hidden_layers: shape.hidden_layers,
            state_dict,
            drop_p,
            epoch: None,
        }
    }

    pub fn with_epoch(mut self, epoch: usize) -> Self {
        self.epoch = Some(epoch);
        self
    }

    pub fn shape(&self) -> NetworkShape {
        NetworkShape::new(self.input_size, self.output_size, self.hidden_layers.clone())
    }

    /// Check every stored array against its declared shape.
    pub fn check_arrays(&self) -> Result<(), StateDictError> {
        for (name, array) in &self.state_dict {
            array.check(name)?;
        }
        Ok(())
    }
}

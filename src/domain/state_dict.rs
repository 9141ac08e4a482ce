// ============================================================
// Layer 3 — State Dict Domain Types
// ============================================================
// A state dict maps every learnable parameter name to its
// current values:
//
//   "hidden_layers.0.weight" → ParamArray { shape: [784, 512], values: [...] }
//   "hidden_layers.0.bias"   → ParamArray { shape: [512],      values: [...] }
//   ...
//   "output.weight"          → ParamArray { shape: [128, 10],  values: [...] }
//   "output.bias"            → ParamArray { shape: [10],       values: [...] }
//
// Values are row-major. Linear weights keep burn's layout,
// [in_features, out_features].
//
// A BTreeMap keeps the keys sorted, so a saved checkpoint
// always lists its parameters in the same order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type StateDict = BTreeMap<String, ParamArray>;

/// Everything that can go wrong when a state dict is loaded
/// into a network.
#[derive(Debug, Error, PartialEq)]
pub enum StateDictError {
    #[error("missing parameter '{0}' in state dict")]
    MissingParameter(String),

    #[error("unexpected parameter '{0}' in state dict")]
    UnexpectedParameter(String),

    #[error("size mismatch for '{name}': copying a param with shape {found:?}, \
             the shape in the current model is {expected:?}")]
    ShapeMismatch {
        name:     String,
        expected: Vec<usize>,
        found:    Vec<usize>,
    },

    #[error("parameter '{name}' has {found} values but shape {shape:?} needs {expected}")]
    ValueCount {
        name:     String,
        shape:    Vec<usize>,
        expected: usize,
        found:    usize,
    },

    #[error("cannot read parameter '{name}' from the model: {reason}")]
    Extraction { name: String, reason: String },
}

/// One parameter's shape and flat values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamArray {
    pub shape:  Vec<usize>,
    pub values: Vec<f32>,
}

impl ParamArray {
    /// Build a ParamArray, checking that `values` fills `shape` exactly.
    pub fn new(
        name:   &str,
        shape:  Vec<usize>,
        values: Vec<f32>,
    ) -> Result<Self, StateDictError> {
        let array = Self { shape, values };
        array.check(name)?;
        Ok(array)
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Re-check the value count, e.g. after deserialising from disk.
    pub fn check(&self, name: &str) -> Result<(), StateDictError> {
        let expected = self.numel();
        if self.values.len() != expected {
            return Err(StateDictError::ValueCount {
                name:     name.to_string(),
                shape:    self.shape.clone(),
                expected,
                found:    self.values.len(),
            });
        }
        Ok(())
    }
}

/// Parameter name of a linear layer's weight or bias.
///
/// `layer` is `Some(i)` for the i-th hidden layer and `None`
/// for the output layer.
pub fn param_name(layer: Option<usize>, param: &str) -> String {
    match layer {
        Some(i) => format!("hidden_layers.{i}.{param}"),
        None    => format!("output.{param}"),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_array_checks_value_count() {
        assert!(ParamArray::new("w", vec![2, 3], vec![0.0; 6]).is_ok());

        let err = ParamArray::new("w", vec![2, 3], vec![0.0; 5]).unwrap_err();
        assert_eq!(
            err,
            StateDictError::ValueCount {
                name:     "w".into(),
                shape:    vec![2, 3],
                expected: 6,
                found:    5,
            }
        );
    }

    #[test]
    fn test_param_names() {
        assert_eq!(param_name(Some(0), "weight"), "hidden_layers.0.weight");
        assert_eq!(param_name(Some(2), "bias"),   "hidden_layers.2.bias");
        assert_eq!(param_name(None, "weight"),    "output.weight");
    }

    #[test]
    fn test_shape_mismatch_message_names_both_shapes() {
        let err = StateDictError::ShapeMismatch {
            name:     "hidden_layers.0.weight".into(),
            expected: vec![784, 400],
            found:    vec![784, 512],
        };
        let msg = err.to_string();
        assert!(msg.contains("hidden_layers.0.weight"));
        assert!(msg.contains("[784, 400]"));
        assert!(msg.contains("[784, 512]"));
    }
}

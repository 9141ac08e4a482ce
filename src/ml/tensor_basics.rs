// ============================================================
// Layer 5 — Tensor Basics
// ============================================================
// The first steps of a neural network written out by hand on
// burn tensors:
//
//   one neuron:   y = σ(Σ xᵢ·wᵢ + b)
//   two layers:   h = σ(x·W₁ + B₁),   y = σ(h·W₂ + B₂)
//
// with σ(x) = 1 / (1 + e^-x), the sigmoid.
//
// The single neuron is computed twice, once with an element-wise
// product and a sum and once with a matrix multiplication. Both
// give the same number; the matmul form is what every layer
// after this one uses.
//
// Reference: Burn Book §2 (Tensor)

use anyhow::{anyhow, bail, Result};
use burn::{
    prelude::*,
    tensor::{Distribution, TensorData},
};

/// Scalar sigmoid.
pub fn activation(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid on every element of a tensor.
pub fn sigmoid_manual<B: Backend, const D: usize>(x: Tensor<B, D>) -> Tensor<B, D> {
    x.neg().exp().add_scalar(1.0).recip()
}

/// One neuron via element-wise product and sum.
///
/// features: [1, n], weights: [1, n], bias: [1, 1] → [1, 1]
pub fn single_layer_sum<B: Backend>(
    features: Tensor<B, 2>,
    weights:  Tensor<B, 2>,
    bias:     Tensor<B, 2>,
) -> Tensor<B, 2> {
    sigmoid_manual((features * weights).sum_dim(1) + bias)
}

/// One neuron via matrix multiplication.
///
/// The weights row is reshaped to a column so [1, n] × [n, 1] → [1, 1].
pub fn single_layer_matmul<B: Backend>(
    features: Tensor<B, 2>,
    weights:  Tensor<B, 2>,
    bias:     Tensor<B, 2>,
) -> Tensor<B, 2> {
    let [_, n] = weights.dims();
    sigmoid_manual(features.matmul(weights.reshape([n, 1])) + bias)
}

/// Two stacked layers with sigmoid after each.
pub fn two_layer_forward<B: Backend>(
    features: Tensor<B, 2>,
    w1:       Tensor<B, 2>,
    b1:       Tensor<B, 2>,
    w2:       Tensor<B, 2>,
    b2:       Tensor<B, 2>,
) -> Tensor<B, 2> {
    let hidden = sigmoid_manual(features.matmul(w1) + b1);
    sigmoid_manual(hidden.matmul(w2) + b2)
}

/// Random inputs for the one-neuron example.
pub struct SingleNeuronExample<B: Backend> {
    pub features: Tensor<B, 2>,
    pub weights:  Tensor<B, 2>,
    pub bias:     Tensor<B, 2>,
}

impl<B: Backend> SingleNeuronExample<B> {
    /// Standard-normal features [1, n], weights like the features, and a
    /// [1, 1] bias. Seed the backend first for repeatable numbers.
    pub fn random(n_features: usize, device: &B::Device) -> Self {
        let normal = Distribution::Normal(0.0, 1.0);
        Self {
            features: Tensor::random([1, n_features], normal, device),
            weights:  Tensor::random([1, n_features], normal, device),
            bias:     Tensor::random([1, 1], normal, device),
        }
    }

    pub fn forward_sum(&self) -> Tensor<B, 2> {
        single_layer_sum(self.features.clone(), self.weights.clone(), self.bias.clone())
    }

    pub fn forward_matmul(&self) -> Tensor<B, 2> {
        single_layer_matmul(self.features.clone(), self.weights.clone(), self.bias.clone())
    }
}

/// Random inputs for the two-layer example.
pub struct TwoLayerExample<B: Backend> {
    pub features: Tensor<B, 2>,
    pub w1: Tensor<B, 2>,
    pub b1: Tensor<B, 2>,
    pub w2: Tensor<B, 2>,
    pub b2: Tensor<B, 2>,
}

impl<B: Backend> TwoLayerExample<B> {
    pub fn random(n_input: usize, n_hidden: usize, n_output: usize, device: &B::Device) -> Self {
        let normal = Distribution::Normal(0.0, 1.0);
        Self {
            features: Tensor::random([1, n_input], normal, device),
            w1: Tensor::random([n_input, n_hidden], normal, device),
            b1: Tensor::random([1, n_hidden], normal, device),
            w2: Tensor::random([n_hidden, n_output], normal, device),
            b2: Tensor::random([1, n_output], normal, device),
        }
    }

    pub fn forward(&self) -> Tensor<B, 2> {
        two_layer_forward(
            self.features.clone(),
            self.w1.clone(),
            self.b1.clone(),
            self.w2.clone(),
            self.b2.clone(),
        )
    }
}

/// Build a 2-D tensor from host values. The data is copied; later
/// changes to `values` never reach the tensor.
pub fn tensor_from_vec<B: Backend>(
    values: Vec<f32>,
    shape:  [usize; 2],
    device: &B::Device,
) -> Result<Tensor<B, 2>> {
    let expected = shape[0] * shape[1];
    if values.len() != expected {
        bail!("{} values cannot fill shape {:?} ({} needed)", values.len(), shape, expected);
    }
    Ok(Tensor::from_data(TensorData::new(values, shape.to_vec()), device))
}

/// Copy a tensor's values back to the host, row-major.
pub fn tensor_to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("cannot read tensor values: {e:?}"))
}

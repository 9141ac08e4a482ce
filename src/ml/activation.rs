// ============================================================
// Layer 5 — Activation Functions
// ============================================================
// Each activation written out by hand next to burn's built-in:
//
//   sigmoid  1 / (1 + e^-x)
//   relu     max(0, x)
//   tanh     (e^x - e^-x) / (e^x + e^-x)
//   softmax  e^x / Σ e^x, row-wise

use burn::{prelude::*, tensor::activation};
use clap::ValueEnum;

use crate::ml::tensor_basics::sigmoid_manual;

/// Activations covered by the lessons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Activation {
    /// 1 / (1 + exp(-x))
    Sigmoid,
    /// max(0, x)
    Relu,
    /// (e^x - e^-x) / (e^x + e^-x)
    Tanh,
    /// exp(x) / Σ exp(x) along each row
    Softmax,
}

impl Activation {
    pub const ALL: [Activation; 4] = [
        Activation::Sigmoid,
        Activation::Relu,
        Activation::Tanh,
        Activation::Softmax,
    ];

    /// The formula spelled out with tensor arithmetic.
    pub fn apply_manual<B: Backend>(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        match self {
            Activation::Sigmoid => sigmoid_manual(x),
            Activation::Relu    => relu_manual(x),
            Activation::Tanh    => {
                let pos = x.clone().exp();
                let neg = x.neg().exp();
                (pos.clone() - neg.clone()) / (pos + neg)
            }
            Activation::Softmax => softmax_manual(x),
        }
    }

    /// burn's implementation of the same function.
    pub fn apply_builtin<B: Backend>(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        match self {
            Activation::Sigmoid => activation::sigmoid(x),
            Activation::Relu    => activation::relu(x),
            Activation::Tanh    => activation::tanh(x),
            Activation::Softmax => activation::softmax(x, 1),
        }
    }
}

pub fn relu_manual<B: Backend, const D: usize>(x: Tensor<B, D>) -> Tensor<B, D> {
    x.clamp_min(0.0)
}

/// Row-wise softmax: [N, C] / [N, 1] broadcasts over the classes.
pub fn softmax_manual<B: Backend>(x: Tensor<B, 2>) -> Tensor<B, 2> {
    let e = x.exp();
    e.clone() / e.sum_dim(1)
}

/// Largest absolute element-wise difference between two tensors.
pub fn max_abs_diff<B: Backend, const D: usize>(a: Tensor<B, D>, b: Tensor<B, D>) -> f64 {
    (a - b).abs().max().into_scalar().elem::<f64>()
}

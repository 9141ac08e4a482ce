// ============================================================
// Layer 5 — Autograd
// ============================================================
// Burn records every operation on an Autodiff backend tensor
// that was marked with `require_grad()`. Calling `backward()`
// on a scalar result walks that record in reverse and returns
// the gradients of every marked tensor.
//
// Worked example:
//   y = x ⊙ x          (element-wise square)
//   z = mean(y) = Σ xᵢ² / n
//   ∂z/∂xᵢ = 2xᵢ / n
//
// Gradients come back on the inner (non-autodiff) backend.
// Each backward() call produces a fresh set of gradients.
// There is no accumulated `.grad` to zero between steps.
//
// Reference: Burn Book §3 (Autodiff)

use anyhow::{anyhow, Result};
use burn::{prelude::*, tensor::backend::AutodiffBackend};

use crate::data::batcher::ImageBatch;
use crate::ml::loss::nll_loss;
use crate::ml::model::Network;

/// Result of differentiating z = mean(x ⊙ x).
pub struct SquareMeanGradient<B: AutodiffBackend> {
    pub z:    Tensor<B::InnerBackend, 1>,
    pub grad: Tensor<B::InnerBackend, 2>,
}

/// Compute z = mean(x ⊙ x) and ∂z/∂x through the autodiff engine.
pub fn square_mean_gradient<B: AutodiffBackend>(x: Tensor<B, 2>) -> Result<SquareMeanGradient<B>> {
    let x = x.require_grad();
    let y = x.clone() * x.clone();
    let z = y.mean();

    let z_value = z.clone().inner();
    let grads   = z.backward();
    let grad    = x
        .grad(&grads)
        .ok_or_else(|| anyhow!("x was not tracked by the autodiff graph"))?;

    Ok(SquareMeanGradient { z: z_value, grad })
}

/// The analytic answer, 2x / n, for comparison.
pub fn expected_square_mean_gradient<B: Backend>(x: Tensor<B, 2>) -> Tensor<B, 2> {
    let n = x.shape().num_elements() as f64;
    x.mul_scalar(2.0 / n)
}

/// Gradient of the training loss with respect to the first hidden
/// layer's weights, for one batch. Shape matches the weight, [in, out].
pub fn first_layer_weight_gradient<B: AutodiffBackend>(
    model: &Network<B>,
    batch: ImageBatch<B>,
) -> Result<Tensor<B::InnerBackend, 2>> {
    let first = model
        .hidden_layers
        .first()
        .ok_or_else(|| anyhow!("network has no hidden layers"))?;

    let loss  = nll_loss(model.forward(batch.images), batch.targets);
    let grads = loss.backward();

    first
        .weight
        .val()
        .grad(&grads)
        .ok_or_else(|| anyhow!("first layer weight has no gradient"))
}

// ============================================================
// Layer 5 — Loss Functions
// ============================================================
// The classifier ends in `log_softmax`, so its training loss is
// the negative log-likelihood of the true class:
//
//   nll(log_p, y) = -mean(log_p[i, y_i])
//
// Cross-entropy on raw logits is the same number, because it
// applies `log_softmax` itself.

use burn::{
    nn::loss::{CrossEntropyLossConfig, MseLoss, Reduction},
    prelude::*,
};

/// `-mean(log_probs[i, targets[i]])`
///
/// log_probs: [N, C] log-probabilities, targets: [N] class indices.
pub fn nll_loss<B: Backend>(log_probs: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
    let [n, _] = log_probs.dims();
    log_probs
        .gather(1, targets.reshape([n, 1]))
        .neg()
        .mean()
}

/// burn's built-in cross-entropy on raw scores.
pub fn cross_entropy<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
    CrossEntropyLossConfig::new()
        .init(&logits.device())
        .forward(logits, targets)
}

/// Mean squared error.
pub fn mse_loss<B: Backend>(predictions: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
    MseLoss::new().forward(predictions, targets, Reduction::Mean)
}

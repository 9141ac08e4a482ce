// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn tensor maths lives here. The domain layer never
// imports burn.
//
// What's in this layer:
//
//   tensor_basics.rs — sigmoid by hand, one neuron, two layers,
//                      moving data in and out of tensors
//   activation.rs    — sigmoid / ReLU / tanh / softmax by hand
//                      next to burn's versions
//   autograd.rs      — gradients through the autodiff backend
//   loss.rs          — NLL, cross-entropy, MSE
//   model.rs         — the feed-forward classifier and its
//                      state dict
//   validation.rs    — loss and accuracy on held-out data
//   trainer.rs       — the training loop
//   inferencer.rs    — predictions from a checkpoint
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

use burn::backend::{Autodiff, NdArray};

/// Backend with gradient tracking, used for training
pub type TrainBackend = Autodiff<NdArray>;

/// Plain CPU backend for validation and inference
pub type InferBackend = NdArray;

pub mod tensor_basics;

pub mod activation;

pub mod autograd;

pub mod loss;

/// Feed-forward classifier and state dict conversion
pub mod model;

pub mod validation;

/// Training loop with validation and checkpointing
pub mod trainer;

/// Loads a checkpoint and predicts class probabilities
pub mod inferencer;

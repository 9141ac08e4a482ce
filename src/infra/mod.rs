// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File-system concerns shared by the other layers:
//
//   checkpoint.rs — Saving and loading checkpoints
//                   (architecture + state dict as JSON),
//                   per-epoch files and the training config.
//
//   metrics.rs    — Training metrics logging
//                   Writes epoch-level loss and accuracy
//                   to a CSV file for later plotting.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

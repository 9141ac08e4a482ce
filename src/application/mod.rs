// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one goal per command (a lesson, training, evaluation,
// prediction or checkpoint inspection).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - No direct file parsing (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Picks the image source and normalises what it loads
pub mod source;

// The step-by-step tensor lessons
pub mod lesson_use_case;

// The training workflow
pub mod train_use_case;

// Test-set evaluation and single-image prediction from a checkpoint
pub mod evaluate_use_case;

// Checkpoint architecture and state dict listing
pub mod inspect_use_case;

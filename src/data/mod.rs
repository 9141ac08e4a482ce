// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw image files to tensor batches.
//
// The pipeline flows in this order:
//
//   IDX files / synthetic generator
//       │
//       ▼
//   ImageSource       → LabeledImage { pixels in [0, 1], label }
//       │
//       ▼
//   Normalizer        → pixels in [-1, 1]
//       │
//       ▼
//   ImageDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   ImageBatcher      → stacks items into [N, F] / [N] tensors
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads MNIST / Fashion-MNIST IDX files
pub mod loader;

/// Seeded class-clustered data for offline runs and tests
pub mod synthetic;

/// (x - mean) / std pixel normalisation
pub mod preprocessor;

/// Implements Burn's Dataset trait for image samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded shuffle and train/test split
pub mod splitter;

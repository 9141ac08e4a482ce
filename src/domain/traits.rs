// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer talks to data and models through these
// traits, never through concrete loaders or burn types.
//
//   ImageSource — IdxLoader (files on disk), SyntheticSource (generated)
//   Classifier  — Inferencer (a network restored from a checkpoint)

use anyhow::Result;

use crate::domain::image::{LabeledImage, Split};

/// Any component that can produce labelled images.
pub trait ImageSource {
    /// Load every image of the requested split.
    fn load(&self, split: Split) -> Result<Vec<LabeledImage>>;

    /// Number of features per image
    fn input_size(&self) -> usize;

    /// Number of distinct labels
    fn num_classes(&self) -> usize;
}

/// Any component that can score one image against every class.
pub trait Classifier {
    /// Class probabilities for one normalised, flattened image.
    /// The returned vector sums to 1.
    fn classify(&self, pixels: &[f32]) -> Result<Vec<f32>>;
}

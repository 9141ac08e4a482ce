// ============================================================
// Layer 4 — Pixel Normaliser
// ============================================================
// Maps raw intensities in [0, 1] to the range the network
// trains on:
//
//   x' = (x - mean) / std
//
// With the default mean = 0.5 and std = 0.5:
//   0.0 → -1.0,   0.5 → 0.0,   1.0 → 1.0
//
// The same normaliser must be applied at training, evaluation
// and prediction time, otherwise the inputs drift away from
// what the weights were fitted to.

use crate::domain::image::LabeledImage;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    pub mean: f32,
    pub std:  f32,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self { mean: 0.5, std: 0.5 }
    }
}

impl Normalizer {
    pub fn apply(&self, x: f32) -> f32 {
        (x - self.mean) / self.std
    }

    /// Normalise every image in place.
    pub fn normalize_all(&self, images: &mut [LabeledImage]) {
        for image in images {
            for p in image.pixels.iter_mut() {
                *p = self.apply(*p);
            }
        }
    }
}

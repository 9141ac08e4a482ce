// ============================================================
// Layer 4 — Synthetic Image Source
// ============================================================
// Generates a labelled, learnable dataset without any files:
//
//   1. Each class gets a random prototype vector in [0, 1]
//   2. Each sample is its class prototype plus uniform noise,
//      clamped back into [0, 1]
//   3. The whole set is split 80/20 into train/test with the
//      same seed, so both splits can be regenerated independently
//
// Lets `train`, `evaluate` and `predict` run offline, and gives
// the tests a dataset a small network can fit in a few epochs.

use anyhow::{bail, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::data::splitter::split_train_val;
use crate::domain::image::{LabeledImage, Split};
use crate::domain::traits::ImageSource;

const TRAIN_FRACTION: f64 = 0.8;
const NOISE: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    pub classes:    usize,
    pub input_size: usize,
    pub samples:    usize,
    pub seed:       u64,
}

impl SyntheticSource {
    pub fn new(classes: usize, input_size: usize, samples: usize, seed: u64) -> Self {
        Self { classes, input_size, samples, seed }
    }

    /// Every sample, before the train/test split.
    pub fn generate(&self) -> Result<Vec<LabeledImage>> {
        if self.classes == 0 || self.classes > u8::MAX as usize + 1 {
            bail!("synthetic class count must be in 1..=256, got {}", self.classes);
        }
        if self.input_size == 0 {
            bail!("synthetic input size must be greater than zero");
        }

        let mut rng = StdRng::seed_from_u64(self.seed);

        let prototypes: Vec<Vec<f32>> = (0..self.classes)
            .map(|_| (0..self.input_size).map(|_| rng.gen_range(0.0..1.0)).collect())
            .collect();

        let samples = (0..self.samples)
            .map(|i| {
                let label = i % self.classes;
                let pixels = prototypes[label]
                    .iter()
                    .map(|&p| (p + rng.gen_range(-NOISE..NOISE)).clamp(0.0, 1.0))
                    .collect();
                LabeledImage::new(pixels, label as u8)
            })
            .collect();

        Ok(samples)
    }
}

impl ImageSource for SyntheticSource {
    fn load(&self, split: Split) -> Result<Vec<LabeledImage>> {
        let (train, test) = split_train_val(self.generate()?, TRAIN_FRACTION, self.seed);
        let chosen = match split {
            Split::Train => train,
            Split::Test  => test,
        };
        tracing::info!(
            "Generated {} synthetic {:?} samples ({} classes, {} features)",
            chosen.len(), split, self.classes, self.input_size
        );
        Ok(chosen)
    }

    fn input_size(&self) -> usize {
        self.input_size
    }

    fn num_classes(&self) -> usize {
        self.classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_deterministic_and_in_range() {
        let src = SyntheticSource::new(3, 8, 30, 5);
        let a = src.generate().unwrap();
        let b = src.generate().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 30);
        assert!(a.iter().all(|s| s.pixels.len() == 8));
        assert!(a.iter().flat_map(|s| &s.pixels).all(|&p| (0.0..=1.0).contains(&p)));
        assert!(a.iter().all(|s| (s.label as usize) < 3));
    }

    #[test]
    fn test_splits_are_disjoint_and_cover_everything() {
        let src   = SyntheticSource::new(4, 6, 50, 9);
        let train = src.load(Split::Train).unwrap();
        let test  = src.load(Split::Test).unwrap();
        assert_eq!(train.len(), 40);
        assert_eq!(test.len(),  10);
        assert!(test.iter().all(|t| !train.contains(t)));
    }

    #[test]
    fn test_zero_classes_rejected() {
        assert!(SyntheticSource::new(0, 4, 10, 1).generate().is_err());
    }
}

// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::{bail, Result};
use burn::prelude::*;

use crate::domain::checkpoint::Checkpoint;
use crate::domain::shape::NetworkShape;
use crate::domain::traits::Classifier;
use crate::ml::model::Network;
use crate::ml::tensor_basics::tensor_to_vec;
use crate::ml::InferBackend;

/// Class probabilities for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub probabilities: Vec<f32>,
    pub class:         usize,
    pub confidence:    f32,
}

impl Prediction {
    pub fn from_probabilities(probabilities: Vec<f32>) -> Self {
        let (class, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((0, 0.0));
        Self { probabilities, class, confidence }
    }

    /// The `k` most likely classes, most likely first.
    pub fn top_k(&self, k: usize) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self.probabilities.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);
        ranked
    }
}

pub struct Inferencer {
    model:  Network<InferBackend>,
    shape:  NetworkShape,
    device: <InferBackend as Backend>::Device,
}

impl Inferencer {
    pub fn from_checkpoint(ckpt: &Checkpoint) -> Result<Self> {
        let device = <InferBackend as Backend>::Device::default();
        let model  = Network::<InferBackend>::from_checkpoint(ckpt, &device)?;
        let shape  = model.shape();
        tracing::info!("Model loaded from checkpoint: {}", shape);
        Ok(Self { model, shape, device })
    }

    pub fn shape(&self) -> &NetworkShape {
        &self.shape
    }

    /// `pixels` must already be normalised the way the training data was.
    pub fn predict(&self, pixels: &[f32]) -> Result<Prediction> {
        if pixels.len() != self.shape.input_size {
            bail!(
                "image has {} values, the model expects {}",
                pixels.len(), self.shape.input_size
            );
        }

        let input = Tensor::<InferBackend, 1>::from_floats(pixels, &self.device)
            .reshape([1, self.shape.input_size]);

        // Output is log-softmax, so exp gives probabilities
        let probabilities = tensor_to_vec(self.model.forward(input).exp())?;
        Ok(Prediction::from_probabilities(probabilities))
    }
}

impl Classifier for Inferencer {
    fn classify(&self, pixels: &[f32]) -> Result<Vec<f32>> {
        Ok(self.predict(pixels)?.probabilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::NetworkConfig;

    fn inferencer() -> Inferencer {
        let device = <InferBackend as Backend>::Device::default();
        let ckpt = NetworkConfig::new(5, 4, vec![6])
            .init::<InferBackend>(&device)
            .unwrap()
            .to_checkpoint()
            .unwrap();
        Inferencer::from_checkpoint(&ckpt).unwrap()
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let p = inferencer().predict(&[0.1, -0.2, 0.3, 0.0, 1.0]).unwrap();
        assert_eq!(p.probabilities.len(), 4);
        let total: f32 = p.probabilities.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
        assert_eq!(p.confidence, p.probabilities[p.class]);
    }

    #[test]
    fn test_wrong_input_length_rejected() {
        assert!(inferencer().predict(&[0.0; 3]).is_err());
    }

    #[test]
    fn test_top_k_ordering() {
        let p = Prediction::from_probabilities(vec![0.1, 0.6, 0.05, 0.25]);
        assert_eq!(p.class, 1);
        assert_eq!(p.top_k(2), vec![(1, 0.6), (3, 0.25)]);
        assert_eq!(p.top_k(10).len(), 4);
    }

    #[test]
    fn test_classifier_trait() {
        let inf = inferencer();
        let probs = inf.classify(&[0.0; 5]).unwrap();
        assert_eq!(probs.len(), 4);
    }
}

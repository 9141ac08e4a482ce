// ============================================================
// Layer 5 — Validation
// ============================================================
// Scores a model on held-out batches. Loss is averaged over
// batches; accuracy is counted per sample, so a short last batch
// does not skew it.

use burn::prelude::*;

use crate::data::batcher::ImageBatch;
use crate::ml::loss::nll_loss;
use crate::ml::model::Network;

/// Loss and accuracy over a held-out set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationResult {
    /// Mean of the per-batch NLL losses (NaN when there were no batches)
    pub loss: f64,
    /// Fraction of samples whose most likely class is the label
    pub accuracy: f64,
    pub samples: usize,
}

/// Number of rows whose arg-max matches the target.
pub fn count_correct<B: Backend>(log_probs: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    // argmax(1) returns shape [batch, 1], flatten to [batch]
    let predicted = log_probs.argmax(1).flatten::<1>(0, 1);
    let correct: i64 = predicted
        .equal(targets)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>();
    correct.max(0) as usize
}

/// Run the model over every batch without tracking gradients.
///
/// Pass a model on the inner backend (`model.valid()`) so dropout is off.
pub fn validation<B, I>(model: &Network<B>, batches: I) -> ValidationResult
where
    B: Backend,
    I: IntoIterator<Item = ImageBatch<B>>,
{
    let mut loss_sum = 0.0f64;
    let mut batches_seen = 0usize;
    let mut correct = 0usize;
    let mut samples = 0usize;

    for batch in batches {
        let log_probs = model.forward(batch.images);

        loss_sum += nll_loss(log_probs.clone(), batch.targets.clone())
            .into_scalar()
            .elem::<f64>();
        batches_seen += 1;

        samples += batch.targets.dims()[0];
        correct += count_correct(log_probs, batch.targets);
    }

    ValidationResult {
        loss:     if batches_seen > 0 { loss_sum / batches_seen as f64 } else { f64::NAN },
        accuracy: if samples > 0 { correct as f64 / samples as f64 } else { 0.0 },
        samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    use crate::ml::model::NetworkConfig;

    type TestBackend = NdArray;

    #[test]
    fn test_count_correct() {
        let device    = <TestBackend as Backend>::Device::default();
        let log_probs = Tensor::<TestBackend, 2>::from_floats(
            [[-0.1, -3.0], [-2.0, -0.2], [-0.5, -1.0]],
            &device,
        );
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([0, 1, 1], &device);
        assert_eq!(count_correct(log_probs, targets), 2);
    }

    #[test]
    fn test_validation_counts_every_sample() {
        let device = <TestBackend as Backend>::Device::default();
        let model  = NetworkConfig::new(3, 2, vec![4]).init::<TestBackend>(&device).unwrap();

        let batch = |n: usize| ImageBatch {
            images:  Tensor::<TestBackend, 2>::zeros([n, 3], &device),
            targets: Tensor::<TestBackend, 1, Int>::zeros([n], &device),
        };

        let result = validation(&model, vec![batch(4), batch(2)]);
        assert_eq!(result.samples, 6);
        assert!(result.loss.is_finite() && result.loss > 0.0);
        assert!((0.0..=1.0).contains(&result.accuracy));
    }

    #[test]
    fn test_validation_on_nothing() {
        let device = <TestBackend as Backend>::Device::default();
        let model  = NetworkConfig::new(3, 2, vec![4]).init::<TestBackend>(&device).unwrap();

        let result = validation(&model, Vec::<ImageBatch<TestBackend>>::new());
        assert!(result.loss.is_nan());
        assert_eq!(result.accuracy, 0.0);
        assert_eq!(result.samples, 0);
    }
}

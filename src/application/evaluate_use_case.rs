// ============================================================
// Layer 2 — Evaluate & Predict Use Cases
// ============================================================
// Both start from a checkpoint on disk:
//
//   EvaluateUseCase → test loss and accuracy over the whole test split
//   PredictUseCase  → class probabilities for one test image
//
// If the run's train_config.json is next to the checkpoints and
// no data directory was given, its data settings are reused. A
// synthetic run then regenerates the exact same held-out images.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use burn::{data::dataloader::DataLoaderBuilder, prelude::*};

use crate::application::source::DataSourceConfig;
use crate::data::{batcher::ImageBatcher, dataset::ImageDataset};
use crate::domain::checkpoint::Checkpoint;
use crate::domain::image::{DatasetKind, Split};
use crate::domain::shape::NetworkShape;
use crate::domain::traits::{Classifier, ImageSource};
use crate::infra::checkpoint::{load_checkpoint, CheckpointManager};
use crate::ml::inferencer::{Inferencer, Prediction};
use crate::ml::model::Network;
use crate::ml::validation::{validation, ValidationResult};
use crate::ml::InferBackend;

/// Where to find the checkpoint: an explicit file, or the latest
/// epoch in a checkpoint directory.
#[derive(Debug, Clone)]
pub struct CheckpointLocation {
    pub checkpoint_dir: String,
    pub file:           Option<String>,
}

impl CheckpointLocation {
    pub fn load(&self) -> Result<Checkpoint> {
        match &self.file {
            Some(path) => load_checkpoint(path),
            None       => CheckpointManager::new(&self.checkpoint_dir).load_latest(),
        }
    }

    /// Prefer the training run's data settings when the caller left
    /// the data directory unset.
    pub fn resolve_data(&self, requested: &DataSourceConfig) -> DataSourceConfig {
        if requested.data_dir.is_some() {
            return requested.clone();
        }
        let config_path = PathBuf::from(&self.checkpoint_dir).join("train_config.json");
        if !config_path.exists() {
            return requested.clone();
        }
        match CheckpointManager::new(&self.checkpoint_dir).load_config() {
            Ok(cfg) => {
                tracing::info!("Using data settings from '{}'", config_path.display());
                cfg.data
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable training config: {e:#}");
                requested.clone()
            }
        }
    }
}

/// The network must take the source's images and cover all of its labels.
pub fn ensure_fits(shape: &NetworkShape, source: &dyn ImageSource) -> Result<()> {
    if shape.input_size != source.input_size() || shape.output_size != source.num_classes() {
        bail!(
            "Checkpoint network {} does not fit the data: {} features, {} classes",
            shape,
            source.input_size(),
            source.num_classes()
        );
    }
    Ok(())
}

// ─── EvaluateUseCase ──────────────────────────────────────────────────────────
pub struct EvaluateUseCase {
    location:   CheckpointLocation,
    data:       DataSourceConfig,
    batch_size: usize,
}

impl EvaluateUseCase {
    pub fn new(location: CheckpointLocation, data: DataSourceConfig, batch_size: usize) -> Self {
        Self { location, data, batch_size }
    }

    pub fn execute(&self) -> Result<ValidationResult> {
        let ckpt = self.location.load()?;
        let data = self.location.resolve_data(&self.data);
        ensure_fits(&ckpt.shape(), data.open().as_ref())?;

        let device = <InferBackend as Backend>::Device::default();
        let model  = Network::<InferBackend>::from_checkpoint(&ckpt, &device)
            .context("Checkpoint does not fit its own architecture")?;

        let test_items = data.load_normalized(Split::Test)?;
        let loader = DataLoaderBuilder::new(ImageBatcher::<InferBackend>::new(device))
            .batch_size(self.batch_size.max(1))
            .build(ImageDataset::from_images(test_items));

        let result = validation(&model, loader.iter());
        tracing::info!(
            "Evaluated {} samples: loss={:.4}, accuracy={:.4}",
            result.samples, result.loss, result.accuracy
        );
        Ok(result)
    }
}

// ─── PredictUseCase ───────────────────────────────────────────────────────────
/// One classified test image.
pub struct PredictionReport {
    pub index:      usize,
    pub label:      usize,
    pub prediction: Prediction,
    pub dataset:    DatasetKind,
}

impl PredictionReport {
    pub fn is_correct(&self) -> bool {
        self.prediction.class == self.label
    }
}

pub struct PredictUseCase {
    location: CheckpointLocation,
    data:     DataSourceConfig,
}

impl PredictUseCase {
    pub fn new(location: CheckpointLocation, data: DataSourceConfig) -> Self {
        Self { location, data }
    }

    pub fn predict_index(&self, index: usize) -> Result<PredictionReport> {
        let ckpt       = self.location.load()?;
        let data       = self.location.resolve_data(&self.data);
        let inferencer = Inferencer::from_checkpoint(&ckpt)?;
        ensure_fits(inferencer.shape(), data.open().as_ref())?;
        let classifier: Box<dyn Classifier> = Box::new(inferencer);

        let test_items = data.load_normalized(Split::Test)?;
        let image = test_items.get(index).with_context(|| {
            format!("Index {index} is out of range, the test set has {} images", test_items.len())
        })?;

        let prediction = Prediction::from_probabilities(classifier.classify(&image.pixels)?);
        Ok(PredictionReport {
            index,
            label: image.label as usize,
            prediction,
            dataset: data.dataset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::{TrainConfig, TrainUseCase};

    fn trained_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            checkpoint_dir: dir.path().to_string_lossy().into_owned(),
            data: DataSourceConfig { synthetic_samples: 100, seed: 5, ..DataSourceConfig::default() },
            hidden_layers: vec![16],
            epochs: 1,
            batch_size: 25,
            print_every: 0,
            ..TrainConfig::default()
        };
        TrainUseCase::new(cfg).execute().unwrap();
        dir
    }

    fn location(dir: &tempfile::TempDir) -> CheckpointLocation {
        CheckpointLocation {
            checkpoint_dir: dir.path().to_string_lossy().into_owned(),
            file: None,
        }
    }

    #[test]
    fn test_resolve_data_prefers_training_config() {
        let dir = trained_dir();
        let resolved = location(&dir).resolve_data(&DataSourceConfig::default());
        assert_eq!(resolved.synthetic_samples, 100);
        assert_eq!(resolved.seed, 5);
    }

    #[test]
    fn test_evaluate_counts_test_split() {
        let dir = trained_dir();
        let result = EvaluateUseCase::new(location(&dir), DataSourceConfig::default(), 8)
            .execute()
            .unwrap();
        // 100 synthetic samples, 20% held out
        assert_eq!(result.samples, 20);
        assert!(result.loss.is_finite());
    }

    #[test]
    fn test_predict_index_and_out_of_range() {
        let dir = trained_dir();
        let uc  = PredictUseCase::new(location(&dir), DataSourceConfig::default());

        let report = uc.predict_index(3).unwrap();
        assert_eq!(report.index, 3);
        assert_eq!(report.prediction.probabilities.len(), 10);

        assert!(uc.predict_index(500).is_err());
    }

    fn foreign_checkpoint(dir: &tempfile::TempDir, input: usize, output: usize) -> CheckpointLocation {
        use crate::infra::checkpoint::save_checkpoint;
        use crate::ml::model::NetworkConfig;

        let device = <InferBackend as Backend>::Device::default();
        let ckpt = NetworkConfig::new(input, output, vec![4])
            .init::<InferBackend>(&device)
            .unwrap()
            .to_checkpoint()
            .unwrap();
        let path = dir.path().join("foreign.json");
        save_checkpoint(&path, &ckpt).unwrap();
        CheckpointLocation {
            checkpoint_dir: dir.path().to_string_lossy().into_owned(),
            file: Some(path.to_string_lossy().into_owned()),
        }
    }

    #[test]
    fn test_wrong_input_size_is_an_error() {
        let dir  = tempfile::tempdir().unwrap();
        let loc  = foreign_checkpoint(&dir, 8, 10);
        let data = DataSourceConfig { synthetic_samples: 50, ..DataSourceConfig::default() };

        let err = EvaluateUseCase::new(loc.clone(), data.clone(), 8).execute().unwrap_err();
        assert!(err.to_string().contains("784 features"), "{err}");
        assert!(PredictUseCase::new(loc, data).predict_index(0).is_err());
    }

    #[test]
    fn test_too_few_classes_is_an_error() {
        let dir  = tempfile::tempdir().unwrap();
        let loc  = foreign_checkpoint(&dir, 784, 3);
        let data = DataSourceConfig { synthetic_samples: 50, ..DataSourceConfig::default() };
        assert!(EvaluateUseCase::new(loc, data, 8).execute().is_err());
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let uc  = EvaluateUseCase::new(location(&dir), DataSourceConfig::default(), 8);
        assert!(uc.execute().is_err());
    }
}

// ============================================================
// Layer 2 — Data Source Selection
// ============================================================
// Every use case needs images from the same place the model
// was trained on:
//
//   data_dir given  → IdxLoader over the MNIST-style files
//   data_dir absent → SyntheticSource, seeded, 28x28 features
//
// Loaded images are normalised before anyone sees them.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::{
    loader::IdxLoader,
    preprocessor::Normalizer,
    synthetic::SyntheticSource,
};
use crate::domain::image::{DatasetKind, LabeledImage, Split};
use crate::domain::traits::ImageSource;

/// Flattened 28x28 image size shared by both data sources
pub const IMAGE_FEATURES: usize = 28 * 28;
const SYNTHETIC_CLASSES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceConfig {
    pub data_dir:          Option<String>,
    pub dataset:           DatasetKind,
    pub synthetic_samples: usize,
    pub seed:              u64,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            data_dir:          None,
            dataset:           DatasetKind::FashionMnist,
            synthetic_samples: 2_000,
            seed:              42,
        }
    }
}

impl DataSourceConfig {
    pub fn open(&self) -> Box<dyn ImageSource> {
        match &self.data_dir {
            Some(dir) => Box::new(IdxLoader::new(dir, self.dataset)),
            None => {
                tracing::info!("No data directory given, using synthetic data");
                Box::new(SyntheticSource::new(
                    SYNTHETIC_CLASSES,
                    IMAGE_FEATURES,
                    self.synthetic_samples,
                    self.seed,
                ))
            }
        }
    }

    /// Load one split and normalise it.
    pub fn load_normalized(&self, split: Split) -> Result<Vec<LabeledImage>> {
        let mut images = self.open().load(split)?;
        Normalizer::default().normalize_all(&mut images);
        Ok(images)
    }
}

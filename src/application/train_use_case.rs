// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load train/test images     (Layer 4 - data)
//   Step 2: Normalise pixels           (Layer 4 - data)
//   Step 3: Build datasets             (Layer 4 - data)
//   Step 4: Derive the network shape   (Layer 3 - domain)
//   Step 5: Save config                (Layer 6 - infra)
//   Step 6: Run training loop          (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::application::source::DataSourceConfig;
use crate::data::dataset::ImageDataset;
use crate::domain::image::Split;
use crate::domain::shape::NetworkShape;
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::trainer::{run_training, OptimizerKind, TrainingOutcome};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved next to the checkpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub checkpoint_dir: String,
    pub data:           DataSourceConfig,
    pub hidden_layers:  Vec<usize>,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub lr:             f64,
    pub optimizer:      OptimizerKind,
    pub drop_p:         f64,
    pub print_every:    usize,
    pub seed:           u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "checkpoints".to_string(),
            data:           DataSourceConfig::default(),
            hidden_layers:  vec![512, 256, 128],
            epochs:         2,
            batch_size:     64,
            lr:             0.001,
            optimizer:      OptimizerKind::Adam,
            drop_p:         0.5,
            print_every:    40,
            seed:           42,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainingOutcome> {
        let cfg = &self.config;

        if !(0.0..1.0).contains(&cfg.drop_p) {
            bail!("drop_p must be in [0, 1), got {}", cfg.drop_p);
        }

        // ── Steps 1-2: Load and normalise ────────────────────────────────────
        let source      = cfg.data.open();
        let train_items = cfg.data.load_normalized(Split::Train)?;
        let test_items  = cfg.data.load_normalized(Split::Test)?;
        tracing::info!(
            "Split: {} train, {} test",
            train_items.len(),
            test_items.len()
        );

        // ── Step 3: Burn datasets ─────────────────────────────────────────────
        let train_dataset = ImageDataset::from_images(train_items);
        let test_dataset  = ImageDataset::from_images(test_items);

        // ── Step 4: Network shape from the data ──────────────────────────────
        let shape = NetworkShape::new(
            source.input_size(),
            source.num_classes(),
            cfg.hidden_layers.clone(),
        );
        shape.validate()?;
        tracing::info!("Network: {} ({} parameters)", shape, shape.parameter_count());

        // ── Step 5: Save config for later evaluation ──────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        // ── Step 6: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, &shape, train_dataset, test_dataset, &ckpt_manager, &metrics)
    }
}

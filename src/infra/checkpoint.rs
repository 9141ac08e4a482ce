// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores checkpoints as pretty-printed JSON:
//
//   {
//     "input_size": 784,
//     "output_size": 10,
//     "hidden_layers": [512, 256, 128],
//     "state_dict": {
//       "hidden_layers.0.bias":   { "shape": [512], "values": [...] },
//       "hidden_layers.0.weight": { "shape": [784, 512], "values": [...] },
//       ...
//     },
//     "drop_p": 0.5,
//     "epoch": 2
//   }
//
// The architecture travels with the weights, so a checkpoint
// can be loaded without knowing in advance how big the model was.
//
// File naming convention inside a checkpoint directory:
//   checkpoints/
//     checkpoint_epoch_1.json   ← weights after epoch 1
//     checkpoint_epoch_2.json   ← weights after epoch 2
//     ...
//     latest_epoch.json         ← contains the number of latest epoch
//     train_config.json         ← training hyperparameters
//     metrics.csv               ← written by MetricsLogger
//
// Reference: Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::checkpoint::Checkpoint;

/// Write one checkpoint to `path`.
pub fn save_checkpoint(path: impl AsRef<Path>, ckpt: &Checkpoint) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create '{}'", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(ckpt)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

    tracing::debug!(
        "Saved checkpoint '{}' ({} parameters)",
        path.display(),
        ckpt.state_dict.len()
    );
    Ok(())
}

/// Read one checkpoint from `path` and check its arrays are whole.
pub fn load_checkpoint(path: impl AsRef<Path>) -> Result<Checkpoint> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read checkpoint '{}'", path.display()))?;

    let ckpt: Checkpoint = serde_json::from_str(&json)
        .with_context(|| format!("'{}' is not a valid checkpoint", path.display()))?;
    ckpt.check_arrays()
        .with_context(|| format!("Corrupt checkpoint '{}'", path.display()))?;
    Ok(ckpt)
}

/// Manages the checkpoints of one training run.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Nothing touches the disk until the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))
    }

    pub fn epoch_path(&self, epoch: usize) -> PathBuf {
        self.dir.join(format!("checkpoint_epoch_{epoch}.json"))
    }

    /// Save a checkpoint for `epoch` and mark it as the latest.
    pub fn save(&self, ckpt: &Checkpoint, epoch: usize) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.epoch_path(epoch);
        save_checkpoint(&path, ckpt)?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(path)
    }

    /// Load the checkpoint of the most recently saved epoch.
    pub fn load_latest(&self) -> Result<Checkpoint> {
        let epoch = self.latest_epoch()?;
        tracing::info!("Loading checkpoint from epoch {}", epoch);
        load_checkpoint(self.epoch_path(epoch))
    }

    /// Save the training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration of this run.
    ///
    /// Evaluation uses it to regenerate the same data split.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' first.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }

    /// Read latest_epoch.json and return the epoch number.
    /// Returns an error if training hasn't been run yet.
    pub fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");

        let s = fs::read_to_string(&path)
            .with_context(|| {
                "Cannot find 'latest_epoch.json'. \
                 Have you run 'train' first?"
            })?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

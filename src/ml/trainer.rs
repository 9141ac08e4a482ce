// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Mini-batch training with periodic validation.
//
// Per batch, in this order:
//   1. forward pass        log_probs = model.forward(images)
//   2. loss                nll_loss(log_probs, targets)
//   3. backward pass       grads = loss.backward()
//   4. optimiser step      model = optim.step(lr, model, grads)
//
// Burn hands back a fresh gradient set from every backward(),
// so there is no separate "zero the gradients" call.
//
// Every `print_every` steps the model is switched to evaluation
// mode with `model.valid()` (dropout off, no autodiff), scored
// on the test set, and the running training loss is reset.
// After every epoch the metrics row and a checkpoint are written.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer, SgdConfig},
    prelude::*,
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ImageBatcher, dataset::ImageDataset};
use crate::domain::shape::NetworkShape;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::loss::nll_loss;
use crate::ml::model::{Network, NetworkConfig};
use crate::ml::validation::validation;
use crate::ml::{InferBackend, TrainBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    Adam,
    Sgd,
}

/// What a finished run hands back.
pub struct TrainingOutcome {
    pub history:     Vec<EpochMetrics>,
    pub steps:       usize,
    /// Number of mid-epoch test evaluations (one per `print_every` steps)
    pub evaluations: usize,
}

pub fn run_training(
    cfg:           &TrainConfig,
    shape:         &NetworkShape,
    train_dataset: ImageDataset,
    test_dataset:  ImageDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
) -> Result<TrainingOutcome> {
    if train_dataset.sample_count() == 0 {
        bail!("training set is empty");
    }
    if cfg.batch_size == 0 {
        bail!("batch size must be greater than zero");
    }

    let device = <TrainBackend as Backend>::Device::default();
    tracing::info!("Using NdArray device: {:?}, seed {}", device, cfg.seed);

    // Dropout masks come from the backend RNG
    <TrainBackend as Backend>::seed(cfg.seed);
    let model = NetworkConfig::from_shape(shape)
        .with_drop_p(cfg.drop_p)
        .init_seeded::<TrainBackend>(&device, cfg.seed)?;
    tracing::info!(
        "Model ready: {} ({} parameters), drop_p={}",
        shape, model.num_params(), cfg.drop_p
    );

    let loop_args = LoopArgs { cfg, train_dataset, test_dataset, ckpt_manager, metrics, device };

    match cfg.optimizer {
        OptimizerKind::Adam => {
            let optim = AdamConfig::new()
                .with_epsilon(1e-8)
                .init::<TrainBackend, Network<TrainBackend>>();
            train_loop(model, optim, loop_args)
        }
        OptimizerKind::Sgd => {
            let optim = SgdConfig::new().init::<TrainBackend, Network<TrainBackend>>();
            train_loop(model, optim, loop_args)
        }
    }
}

struct LoopArgs<'a> {
    cfg:           &'a TrainConfig,
    train_dataset: ImageDataset,
    test_dataset:  ImageDataset,
    ckpt_manager:  &'a CheckpointManager,
    metrics:       &'a MetricsLogger,
    device:        <TrainBackend as Backend>::Device,
}

fn train_loop<O>(
    mut model: Network<TrainBackend>,
    mut optim: O,
    args:      LoopArgs<'_>,
) -> Result<TrainingOutcome>
where
    O: Optimizer<Network<TrainBackend>, TrainBackend>,
{
    let LoopArgs { cfg, train_dataset, test_dataset, ckpt_manager, metrics, device } = args;

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_loader = DataLoaderBuilder::new(ImageBatcher::<TrainBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Test data loader (InnerBackend — no autodiff overhead) ────────────────
    let test_loader = DataLoaderBuilder::new(ImageBatcher::<InferBackend>::new(device))
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(test_dataset);

    let mut history     = Vec::with_capacity(cfg.epochs);
    let mut steps       = 0usize;
    let mut evaluations = 0usize;
    let mut best_loss   = f64::INFINITY;

    let mut running_loss    = 0.0f64;
    let mut running_batches = 0usize;

    for epoch in 1..=cfg.epochs {
        let mut epoch_loss_sum = 0.0f64;
        let mut epoch_batches  = 0usize;

        for batch in train_loader.iter() {
            steps += 1;

            let log_probs = model.forward(batch.images);
            let loss      = nll_loss(log_probs, batch.targets);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            epoch_loss_sum  += loss_val;
            epoch_batches   += 1;
            running_loss    += loss_val;
            running_batches += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);

            if cfg.print_every > 0 && steps % cfg.print_every == 0 {
                let eval = validation(&model.valid(), test_loader.iter());
                evaluations += 1;
                tracing::info!(
                    "Epoch: {}/{}.. Training Loss: {:.3}.. Test Loss: {:.3}.. Test Accuracy: {:.3}",
                    epoch,
                    cfg.epochs,
                    running_loss / running_batches.max(1) as f64,
                    eval.loss,
                    eval.accuracy,
                );
                running_loss    = 0.0;
                running_batches = 0;
            }
        }

        let train_loss = if epoch_batches > 0 {
            epoch_loss_sum / epoch_batches as f64
        } else { f64::NAN };

        let eval = validation(&model.valid(), test_loader.iter());
        let row  = EpochMetrics::new(epoch, train_loss, eval.loss, eval.accuracy);

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | test_loss={:.4} | test_acc={:.1}%",
            epoch, cfg.epochs, row.train_loss, row.test_loss, row.test_accuracy * 100.0,
        );

        if row.is_improvement(best_loss) {
            best_loss = row.test_loss;
            tracing::info!("New best test loss {:.4} at epoch {}", best_loss, epoch);
        }

        metrics.log(&row)?;
        let ckpt = model.to_checkpoint()?.with_epoch(epoch);
        ckpt_manager.save(&ckpt, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);

        history.push(row);
    }

    tracing::info!(
        "Training complete after {} steps, metrics in '{}'",
        steps,
        metrics.csv_path().display()
    );
    Ok(TrainingOutcome { history, steps, evaluations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::SyntheticSource;
    use crate::data::preprocessor::Normalizer;
    use crate::domain::image::Split;
    use crate::domain::traits::ImageSource;

    fn datasets(src: &SyntheticSource) -> (ImageDataset, ImageDataset) {
        let norm = Normalizer::default();
        let mut train = src.load(Split::Train).unwrap();
        let mut test  = src.load(Split::Test).unwrap();
        norm.normalize_all(&mut train);
        norm.normalize_all(&mut test);
        (ImageDataset::from_images(train), ImageDataset::from_images(test))
    }

    fn config(dir: &std::path::Path, optimizer: OptimizerKind, lr: f64) -> TrainConfig {
        TrainConfig {
            checkpoint_dir: dir.to_string_lossy().into_owned(),
            hidden_layers:  vec![16],
            epochs:         8,
            batch_size:     16,
            lr,
            optimizer,
            drop_p:         0.0,
            print_every:    5,
            seed:           3,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_training_reduces_loss_and_writes_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), OptimizerKind::Adam, 0.01);

        let src = SyntheticSource::new(4, 12, 160, 11);
        let (train, test) = datasets(&src);
        let shape = NetworkShape::new(12, 4, cfg.hidden_layers.clone());

        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir);
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir).unwrap();

        let outcome = run_training(&cfg, &shape, train, test, &ckpt, &metrics).unwrap();

        assert_eq!(outcome.history.len(), 8);
        // 128 training samples / 16 per batch = 8 steps per epoch
        assert_eq!(outcome.steps, 64);
        // print_every = 5 → a test pass at steps 5, 10, ..., 60
        assert_eq!(outcome.evaluations, 12);

        let first = outcome.history.first().unwrap();
        let last  = outcome.history.last().unwrap();
        assert!(
            last.train_loss < first.train_loss,
            "loss should decrease: {} -> {}", first.train_loss, last.train_loss
        );
        assert!(last.test_accuracy > 0.5, "accuracy {}", last.test_accuracy);

        assert_eq!(ckpt.latest_epoch().unwrap(), 8);
        let saved = ckpt.load_latest().unwrap();
        assert_eq!(saved.shape(), shape);
        assert_eq!(saved.epoch, Some(8));

        let csv = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 1 + 8);
    }

    #[test]
    fn test_sgd_also_trains() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), OptimizerKind::Sgd, 0.1);

        let src = SyntheticSource::new(3, 8, 90, 4);
        let (train, test) = datasets(&src);
        let shape = NetworkShape::new(8, 3, cfg.hidden_layers.clone());

        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir);
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir).unwrap();

        let outcome = run_training(&cfg, &shape, train, test, &ckpt, &metrics).unwrap();
        let first = outcome.history.first().unwrap().train_loss;
        let last  = outcome.history.last().unwrap().train_loss;
        assert!(last < first, "loss should decrease: {first} -> {last}");
    }

    #[test]
    fn test_empty_training_set_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), OptimizerKind::Adam, 0.01);
        let shape = NetworkShape::new(4, 2, vec![3]);

        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir);
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir).unwrap();

        let result = run_training(
            &cfg, &shape,
            ImageDataset::new(Vec::new()), ImageDataset::new(Vec::new()),
            &ckpt, &metrics,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_same_seed_gives_same_weights() {
        let src = SyntheticSource::new(3, 8, 60, 2);

        let run = || {
            let dir = tempfile::tempdir().unwrap();
            let cfg = TrainConfig { epochs: 2, ..config(dir.path(), OptimizerKind::Adam, 0.01) };
            let shape = NetworkShape::new(8, 3, cfg.hidden_layers.clone());
            let (train, test) = datasets(&src);

            let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir);
            let metrics = MetricsLogger::new(&cfg.checkpoint_dir).unwrap();
            run_training(&cfg, &shape, train, test, &ckpt, &metrics).unwrap();
            ckpt.load_latest().unwrap().state_dict
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_no_periodic_evaluation_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig { epochs: 1, print_every: 0, ..config(dir.path(), OptimizerKind::Adam, 0.01) };

        let src = SyntheticSource::new(3, 8, 60, 2);
        let (train, test) = datasets(&src);
        let shape = NetworkShape::new(8, 3, cfg.hidden_layers.clone());

        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir);
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir).unwrap();

        let outcome = run_training(&cfg, &shape, train, test, &ckpt, &metrics).unwrap();
        assert_eq!(outcome.evaluations, 0);
        // 48 training samples / 16 = 3 steps
        assert_eq!(outcome.steps, 3);
    }
}

// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands: `lesson`, `train`, `evaluate`,
// `predict` and `inspect`, and all their configurable flags.
//
// Flags shared between commands live in small Args structs
// that are #[command(flatten)]ed in:
//   DataArgs       — where the images come from
//   CheckpointArgs — where the checkpoints live
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{
    evaluate_use_case::CheckpointLocation,
    lesson_use_case::Lesson,
    source::DataSourceConfig,
    train_use_case::TrainConfig,
};
use crate::domain::image::DatasetKind;
use crate::ml::trainer::OptimizerKind;

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one of the tensor / autograd / loss lessons
    Lesson(LessonArgs),

    /// Train a fully connected classifier and save checkpoints
    Train(TrainArgs),

    /// Test loss and accuracy of a saved checkpoint
    Evaluate(EvalArgs),

    /// Class probabilities for one test image
    Predict(PredictArgs),

    /// Print a checkpoint's architecture and parameters
    Inspect(InspectArgs),
}

/// Where the images come from.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Directory with the four uncompressed IDX files.
    /// Without it, seeded synthetic images are used.
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Which dataset the IDX files hold (sets the class names)
    #[arg(long, value_enum, default_value_t = DatasetKind::FashionMnist)]
    pub dataset: DatasetKind,

    /// Number of synthetic images to generate when no data dir is given
    #[arg(long, default_value_t = 2_000)]
    pub synthetic_samples: usize,

    /// Seed for the synthetic images and their train/test split
    #[arg(long, default_value_t = 42)]
    pub data_seed: u64,
}

impl From<DataArgs> for DataSourceConfig {
    fn from(a: DataArgs) -> Self {
        DataSourceConfig {
            data_dir:          a.data_dir,
            dataset:           a.dataset,
            synthetic_samples: a.synthetic_samples,
            seed:              a.data_seed,
        }
    }
}

/// Where the checkpoints live.
#[derive(Args, Debug, Clone)]
pub struct CheckpointArgs {
    /// Directory written by `train`
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// A specific checkpoint file; defaults to the latest epoch
    #[arg(long)]
    pub checkpoint: Option<String>,
}

impl From<CheckpointArgs> for CheckpointLocation {
    fn from(a: CheckpointArgs) -> Self {
        CheckpointLocation {
            checkpoint_dir: a.checkpoint_dir,
            file:           a.checkpoint,
        }
    }
}

/// Arguments for the `lesson` command
#[derive(Args, Debug)]
pub struct LessonArgs {
    /// Which lesson to run
    #[arg(value_enum)]
    pub lesson: Lesson,

    /// Seed for the random tensors
    #[arg(long, default_value_t = 7)]
    pub seed: u64,
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Directory to save checkpoints, config and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Hidden layer sizes, comma separated
    #[arg(long, value_delimiter = ',', default_value = "512,256,128")]
    pub hidden_layers: Vec<usize>,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 2)]
    pub epochs: usize,

    /// Number of images processed together in one step
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Learning rate
    #[arg(long, default_value_t = 0.001)]
    pub lr: f64,

    #[arg(long, value_enum, default_value_t = OptimizerKind::Adam)]
    pub optimizer: OptimizerKind,

    /// Dropout probability between hidden layers
    #[arg(long, default_value_t = 0.5)]
    pub drop_p: f64,

    /// Log running loss and test metrics every N steps (0 = never)
    #[arg(long, default_value_t = 40)]
    pub print_every: usize,

    /// Seed for weight init and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            checkpoint_dir: a.checkpoint_dir,
            data:           a.data.into(),
            hidden_layers:  a.hidden_layers,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
            optimizer:      a.optimizer,
            drop_p:         a.drop_p,
            print_every:    a.print_every,
            seed:           a.seed,
        }
    }
}

/// Arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvalArgs {
    #[command(flatten)]
    pub checkpoint: CheckpointArgs,

    #[command(flatten)]
    pub data: DataArgs,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,
}

/// Arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    #[command(flatten)]
    pub checkpoint: CheckpointArgs,

    #[command(flatten)]
    pub data: DataArgs,

    /// Index of the test image to classify
    #[arg(long, default_value_t = 0)]
    pub index: usize,

    /// How many of the most likely classes to show
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

/// Arguments for the `inspect` command
#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub checkpoint: CheckpointArgs,

    /// Also try loading into a network with these hidden layer sizes
    #[arg(long, value_delimiter = ',')]
    pub load_into: Option<Vec<usize>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["nn-primer", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };

        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.hidden_layers, vec![512, 256, 128]);
        assert_eq!(cfg.epochs, 2);
        assert_eq!(cfg.batch_size, 64);
        assert_eq!(cfg.optimizer, OptimizerKind::Adam);
        assert_eq!(cfg.data, DataSourceConfig::default());
    }

    #[test]
    fn test_hidden_layers_are_comma_separated() {
        let cli = Cli::try_parse_from([
            "nn-primer", "train", "--hidden-layers", "64,32", "--optimizer", "sgd",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        assert_eq!(args.hidden_layers, vec![64, 32]);
        assert_eq!(args.optimizer, OptimizerKind::Sgd);
    }

    #[test]
    fn test_inspect_load_into() {
        let cli = Cli::try_parse_from([
            "nn-primer", "inspect", "--checkpoint", "a.json", "--load-into", "400,200,100",
        ])
        .unwrap();
        let Commands::Inspect(args) = cli.command else { panic!("expected inspect") };
        assert_eq!(args.load_into, Some(vec![400, 200, 100]));
        assert_eq!(args.checkpoint.checkpoint.as_deref(), Some("a.json"));
    }

    #[test]
    fn test_lesson_name_parses() {
        let cli = Cli::try_parse_from(["nn-primer", "lesson", "autograd"]).unwrap();
        let Commands::Lesson(args) = cli.command else { panic!("expected lesson") };
        assert_eq!(args.lesson, Lesson::Autograd);
    }
}

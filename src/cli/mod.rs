// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All work is delegated to Layer 2 (application); this layer
// only routes and prints.
//
// Five commands are supported:
//   1. `lesson`   — one of the tensor / autograd / loss lessons
//   2. `train`    — trains the classifier, saving a checkpoint per epoch
//   3. `evaluate` — test loss and accuracy of a checkpoint
//   4. `predict`  — class probabilities for one test image
//   5. `inspect`  — architecture and state dict of a checkpoint
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvalArgs, InspectArgs, LessonArgs, PredictArgs, TrainArgs};

use crate::application::evaluate_use_case::PredictionReport;

/// Width of the probability bars printed by `predict`
const BAR_WIDTH: usize = 40;

/// The main CLI struct. clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "nn-primer",
    version = "0.1.0",
    about = "Tensors, autograd and a fully connected image classifier, step by step."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Lesson(args)   => run_lesson(args),
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Predict(args)  => run_predict(args),
            Commands::Inspect(args)  => run_inspect(args),
        }
    }
}

fn run_lesson(args: LessonArgs) -> Result<()> {
    use crate::application::lesson_use_case::LessonUseCase;

    println!("── Lesson: {:?} ──", args.lesson);
    for line in LessonUseCase::new(args.seed).run(args.lesson)? {
        println!("{line}");
    }
    Ok(())
}

/// Converts CLI args into a TrainConfig and hands off to Layer 2.
fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    let checkpoint_dir = args.checkpoint_dir.clone();
    let outcome = TrainUseCase::new(args.into()).execute()?;

    match outcome.history.last() {
        Some(last) => println!(
            "Training complete after {} steps. Final test loss {:.3}, accuracy {:.3}.",
            outcome.steps, last.test_loss, last.test_accuracy
        ),
        None => println!("Training complete after {} steps.", outcome.steps),
    }
    println!("Checkpoints saved in '{checkpoint_dir}'.");
    Ok(())
}

fn run_evaluate(args: EvalArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let result = EvaluateUseCase::new(args.checkpoint.into(), args.data.into(), args.batch_size)
        .execute()?;
    println!("Samples:   {}", result.samples);
    println!("Test loss: {:.4}", result.loss);
    println!("Accuracy:  {:.2}%", result.accuracy * 100.0);
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::evaluate_use_case::PredictUseCase;

    let report = PredictUseCase::new(args.checkpoint.into(), args.data.into())
        .predict_index(args.index)?;
    print!("{}", render_prediction(&report, args.top));
    Ok(())
}

/// Text rendering of the top-k class probabilities as bars.
fn render_prediction(report: &PredictionReport, top: usize) -> String {
    let names = |c: usize| report.dataset.class_name(c);
    let mut out = format!(
        "Test image #{} (true class: {})\n",
        report.index,
        names(report.label)
    );

    for (class, p) in report.prediction.top_k(top) {
        let filled = (p.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize;
        out.push_str(&format!(
            "{:>12} {:<width$} {:>6.2}%\n",
            names(class),
            "█".repeat(filled),
            p * 100.0,
            width = BAR_WIDTH
        ));
    }

    let verdict = if report.is_correct() { "correct" } else { "wrong" };
    out.push_str(&format!(
        "Predicted {} ({:.1}%), {}\n",
        names(report.prediction.class),
        report.prediction.confidence * 100.0,
        verdict
    ));
    out
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    let report = InspectUseCase::new(args.checkpoint.into()).execute(args.load_into)?;

    println!("Architecture: {}", report.shape);
    println!("Dropout:      {}", report.drop_p);
    if let Some(epoch) = report.epoch {
        println!("Epoch:        {epoch}");
    }
    println!("Parameters:   {}", report.parameter_count());
    println!();
    for (name, shape) in &report.parameters {
        println!("  {name:<24} {shape:?}");
    }

    if let Some(trial) = &report.trial_load {
        println!();
        match &trial.result {
            Ok(())  => println!("Loaded into {} without errors.", trial.shape),
            Err(e)  => println!("Loading into {} failed: {e}", trial.shape),
        }
    }
    Ok(())
}

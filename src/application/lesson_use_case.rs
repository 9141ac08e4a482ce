// ============================================================
// Layer 2 — Lesson Use Case
// ============================================================
// Runs one of the step-by-step lessons and collects what it
// found as text lines. Layer 1 prints them.
//
//   tensors     → sigmoid, one neuron two ways, two layers,
//                 host ↔ tensor copies
//   activations → hand-written activations vs burn's
//   autograd    → ∂ mean(x²)/∂x and a first-layer weight gradient
//   losses      → cross-entropy vs NLL of log_softmax, MSE
//
// The backend is seeded first, so a lesson prints the same
// numbers every time for a given seed.

use anyhow::Result;
use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::{activation::log_softmax, Distribution},
};
use clap::ValueEnum;

use crate::data::{batcher::ImageBatcher, dataset::ImageItem, synthetic::SyntheticSource};
use crate::ml::{
    activation::{max_abs_diff, Activation},
    autograd::{expected_square_mean_gradient, first_layer_weight_gradient, square_mean_gradient},
    loss::{cross_entropy, mse_loss, nll_loss},
    model::NetworkConfig,
    tensor_basics::{
        activation, tensor_from_vec, tensor_to_vec, SingleNeuronExample, TwoLayerExample,
    },
    InferBackend, TrainBackend,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Lesson {
    Tensors,
    Activations,
    Autograd,
    Losses,
}

pub struct LessonUseCase {
    seed: u64,
}

impl LessonUseCase {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn run(&self, lesson: Lesson) -> Result<Vec<String>> {
        <InferBackend as Backend>::seed(self.seed);
        <TrainBackend as Backend>::seed(self.seed);

        tracing::info!("Running lesson {:?} with seed {}", lesson, self.seed);
        match lesson {
            Lesson::Tensors     => tensors(),
            Lesson::Activations => activations(),
            Lesson::Autograd    => autograd(self.seed),
            Lesson::Losses      => losses(),
        }
    }
}

fn fmt_values(values: &[f32]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.4}")).collect();
    format!("[{}]", parts.join(", "))
}

fn tensors() -> Result<Vec<String>> {
    let device = <InferBackend as Backend>::Device::default();
    let mut out = Vec::new();

    out.push(format!("sigmoid(0) = {:.4}, sigmoid(2) = {:.4}", activation(0.0), activation(2.0)));

    // ── One neuron ───────────────────────────────────────────────────────────
    let neuron = SingleNeuronExample::<InferBackend>::random(5, &device);
    let by_sum    = tensor_to_vec(neuron.forward_sum())?;
    let by_matmul = tensor_to_vec(neuron.forward_matmul())?;
    out.push(format!("features:          {}", fmt_values(&tensor_to_vec(neuron.features.clone())?)));
    out.push(format!("neuron via sum:    {}", fmt_values(&by_sum)));
    out.push(format!("neuron via matmul: {}", fmt_values(&by_matmul)));

    // ── Two layers ───────────────────────────────────────────────────────────
    let net = TwoLayerExample::<InferBackend>::random(3, 2, 1, &device);
    out.push(format!("two-layer output:  {}", fmt_values(&tensor_to_vec(net.forward())?)));

    // ── Host ↔ tensor ────────────────────────────────────────────────────────
    let mut host = vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0];
    let tensor = tensor_from_vec::<InferBackend>(host.clone(), [2, 3], &device)?;
    let doubled = tensor.clone().mul_scalar(2.0);
    host[0] = 100.0;
    out.push(format!("host after edit:   {}", fmt_values(&host)));
    out.push(format!("tensor:            {}", fmt_values(&tensor_to_vec(tensor)?)));
    out.push(format!("tensor * 2:        {}", fmt_values(&tensor_to_vec(doubled)?)));
    out.push(
        "burn copies host data into the tensor, so editing the Vec afterwards \
         does not change it (and vice versa)."
            .to_string(),
    );
    Ok(out)
}

fn activations() -> Result<Vec<String>> {
    let device = <InferBackend as Backend>::Device::default();
    let x = Tensor::<InferBackend, 2>::random([2, 5], Distribution::Normal(0.0, 2.0), &device);

    let mut out = vec![format!("input: {}", fmt_values(&tensor_to_vec(x.clone())?))];
    for act in Activation::ALL {
        let manual  = act.apply_manual(x.clone());
        let builtin = act.apply_builtin(x.clone());
        out.push(format!(
            "{:<8} manual {}  (max diff vs burn {:.2e})",
            format!("{act:?}"),
            fmt_values(&tensor_to_vec(manual.clone())?),
            max_abs_diff(manual, builtin)
        ));
    }

    let row_sums = Activation::Softmax.apply_manual(x).sum_dim(1);
    out.push(format!("softmax row sums: {}", fmt_values(&tensor_to_vec(row_sums)?)));
    Ok(out)
}

fn autograd(seed: u64) -> Result<Vec<String>> {
    let device = <TrainBackend as Backend>::Device::default();
    let mut out = Vec::new();

    // ── z = mean(x²) ─────────────────────────────────────────────────────────
    let x = Tensor::<TrainBackend, 2>::random([2, 2], Distribution::Normal(0.0, 1.0), &device);
    let expected = expected_square_mean_gradient(x.clone().inner());
    let result   = square_mean_gradient(x.clone())?;

    out.push(format!("x:        {}", fmt_values(&tensor_to_vec(x)?)));
    out.push(format!("z:        {}", fmt_values(&tensor_to_vec(result.z)?)));
    out.push(format!("dz/dx:    {}", fmt_values(&tensor_to_vec(result.grad.clone())?)));
    out.push(format!("2x / n:   {}", fmt_values(&tensor_to_vec(expected.clone())?)));
    out.push(format!("max diff: {:.2e}", max_abs_diff(result.grad, expected)));

    // ── Gradient of a real loss ──────────────────────────────────────────────
    let model = NetworkConfig::new(16, 4, vec![8]).init::<TrainBackend>(&device)?;
    let items: Vec<ImageItem> = SyntheticSource::new(4, 16, 8, seed)
        .generate()?
        .into_iter()
        .map(ImageItem::from)
        .collect();
    let batch = ImageBatcher::<TrainBackend>::new(device).batch(items);

    let grad = first_layer_weight_gradient(&model, batch)?;
    let dims = grad.dims();
    let values = tensor_to_vec(grad)?;
    out.push(format!(
        "first layer weight gradient {:?}, first values {}",
        dims,
        fmt_values(&values[..values.len().min(4)])
    ));
    out.push("every backward() returns fresh gradients; nothing accumulates between steps.".to_string());
    Ok(out)
}

fn losses() -> Result<Vec<String>> {
    let device = <InferBackend as Backend>::Device::default();
    let (batch, classes) = (8, 10);

    let logits  = Tensor::<InferBackend, 2>::random([batch, classes], Distribution::Normal(0.0, 1.0), &device);
    let targets = Tensor::<InferBackend, 1, Int>::from_ints(
        (0..batch as i64).map(|i| i % classes as i64).collect::<Vec<_>>().as_slice(),
        &device,
    );

    let ce  = tensor_to_vec(cross_entropy(logits.clone(), targets.clone()))?;
    let nll = tensor_to_vec(nll_loss(log_softmax(logits.clone(), 1), targets.clone()))?;
    let mut out = vec![
        format!("cross_entropy(logits)           = {}", fmt_values(&ce)),
        format!("nll_loss(log_softmax(logits))   = {}", fmt_values(&nll)),
    ];

    // An untrained network guesses uniformly: loss ≈ ln(classes)
    let model = NetworkConfig::new(classes, classes, vec![16])
        .with_drop_p(0.0)
        .init::<InferBackend>(&device)?;
    let untrained = tensor_to_vec(nll_loss(model.forward(logits.clone().mul_scalar(0.01)), targets))?;
    out.push(format!(
        "untrained network loss           = {}  (ln {} = {:.4})",
        fmt_values(&untrained),
        classes,
        (classes as f64).ln()
    ));

    let mse = tensor_to_vec(mse_loss(logits, Tensor::zeros([batch, classes], &device)))?;
    out.push(format!("mse(logits, 0)                   = {}", fmt_values(&mse)));
    Ok(out)
}

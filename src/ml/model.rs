// ============================================================
// Layer 5 — Feed-Forward Classifier
// ============================================================
// input → [Linear → ReLU → Dropout] × hidden → Linear → log_softmax
//
// Parameters are exchanged with checkpoints through a state dict
// keyed like "hidden_layers.0.weight" and "output.bias". Linear
// weights are stored [in, out].

use std::collections::BTreeSet;

use anyhow::{bail, Result};
use burn::{
    module::Param,
    nn::{Dropout, DropoutConfig, Linear, LinearConfig},
    prelude::*,
    tensor::{
        activation::{log_softmax, relu},
        TensorData,
    },
};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::checkpoint::Checkpoint;
use crate::domain::shape::NetworkShape;
use crate::domain::state_dict::{param_name, ParamArray, StateDict, StateDictError};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally. Do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct NetworkConfig {
    pub input_size:    usize,
    pub output_size:   usize,
    pub hidden_layers: Vec<usize>,
    #[config(default = 0.5)]
    pub drop_p:        f64,
}

impl NetworkConfig {
    pub fn from_shape(shape: &NetworkShape) -> Self {
        Self::new(shape.input_size, shape.output_size, shape.hidden_layers.clone())
    }

    pub fn shape(&self) -> NetworkShape {
        NetworkShape::new(self.input_size, self.output_size, self.hidden_layers.clone())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<Network<B>> {
        let shape = self.shape();
        shape.validate()?;
        if !(0.0..1.0).contains(&self.drop_p) {
            bail!("drop_p must be in [0, 1), got {}", self.drop_p);
        }

        let mut sizes = shape.layer_sizes();
        // validate() guarantees at least one hidden layer plus the output
        let (out_in, out_out) = sizes.pop().unwrap_or((self.input_size, self.output_size));

        let hidden_layers = sizes
            .into_iter()
            .map(|(i, o)| LinearConfig::new(i, o).init(device))
            .collect();
        let output  = LinearConfig::new(out_in, out_out).init(device);
        let dropout = DropoutConfig::new(self.drop_p).init();

        Ok(Network { hidden_layers, output, dropout })
    }

    /// Like `init`, but every weight and bias is drawn from
    /// U(-1/√fan_in, 1/√fan_in) with an RNG seeded by `seed`, so the
    /// same seed always gives the same starting network.
    pub fn init_seeded<B: Backend>(&self, device: &B::Device, seed: u64) -> Result<Network<B>> {
        let model   = self.init::<B>(device)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sd  = StateDict::new();

        let sizes = self.shape().layer_sizes();
        let last  = sizes.len().saturating_sub(1);
        for (i, (fan_in, fan_out)) in sizes.into_iter().enumerate() {
            let layer = if i == last { None } else { Some(i) };
            let bound = 1.0 / (fan_in as f32).sqrt();
            let mut draw = |n: usize| -> Vec<f32> {
                (0..n).map(|_| rng.gen_range(-bound..=bound)).collect()
            };

            let weight = draw(fan_in * fan_out);
            let bias   = draw(fan_out);
            sd.insert(param_name(layer, "weight"), ParamArray { shape: vec![fan_in, fan_out], values: weight });
            sd.insert(param_name(layer, "bias"),   ParamArray { shape: vec![fan_out],        values: bias });
        }
        Ok(model.load_state_dict(&sd)?)
    }
}

/// Fully connected classifier with ReLU + dropout between layers and
/// a log-softmax output.
#[derive(Module, Debug)]
pub struct Network<B: Backend> {
    pub hidden_layers: Vec<Linear<B>>,
    pub output:        Linear<B>,
    pub dropout:       Dropout,
}

impl<B: Backend> Network<B> {
    /// x: [batch, input_size] → log-probabilities [batch, output_size]
    ///
    /// Dropout only fires on an autodiff backend; after `valid()` it
    /// passes values through unchanged.
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = x;
        for layer in &self.hidden_layers {
            x = self.dropout.forward(relu(layer.forward(x)));
        }
        log_softmax(self.output.forward(x), 1)
    }

    /// Layer sizes read back from the parameter dimensions.
    pub fn shape(&self) -> NetworkShape {
        let [output_in, output_size] = self.output.weight.val().dims();
        let input_size = self
            .hidden_layers
            .first()
            .map(|l| l.weight.val().dims()[0])
            .unwrap_or(output_in);
        let hidden = self
            .hidden_layers
            .iter()
            .map(|l| l.weight.val().dims()[1])
            .collect();
        NetworkShape::new(input_size, output_size, hidden)
    }

    pub fn drop_p(&self) -> f64 {
        self.dropout.prob
    }

    /// Every parameter by name.
    pub fn state_dict(&self) -> Result<StateDict, StateDictError> {
        let mut sd = StateDict::new();
        for (i, layer) in self.hidden_layers.iter().enumerate() {
            export_linear(&mut sd, Some(i), layer)?;
        }
        export_linear(&mut sd, None, &self.output)?;
        Ok(sd)
    }

    /// Replace every parameter with the values in `sd`.
    ///
    /// Fails on the first parameter that is missing or has a different
    /// shape, and on any key this network does not have.
    pub fn load_state_dict(mut self, sd: &StateDict) -> Result<Self, StateDictError> {
        let mut seen = BTreeSet::new();

        let hidden = std::mem::take(&mut self.hidden_layers);
        self.hidden_layers = hidden
            .into_iter()
            .enumerate()
            .map(|(i, layer)| import_linear(layer, Some(i), sd, &mut seen))
            .collect::<Result<Vec<_>, _>>()?;
        self.output = import_linear(self.output, None, sd, &mut seen)?;

        if let Some(extra) = sd.keys().find(|k| !seen.contains(*k)) {
            return Err(StateDictError::UnexpectedParameter(extra.clone()));
        }
        Ok(self)
    }

    pub fn to_checkpoint(&self) -> Result<Checkpoint, StateDictError> {
        Ok(Checkpoint::new(self.shape(), self.state_dict()?, self.drop_p()))
    }

    /// Rebuild the architecture a checkpoint describes, then load its weights.
    pub fn from_checkpoint(ckpt: &Checkpoint, device: &B::Device) -> Result<Self> {
        ckpt.check_arrays()?;
        let model = NetworkConfig::from_shape(&ckpt.shape())
            .with_drop_p(ckpt.drop_p)
            .init::<B>(device)?;
        Ok(model.load_state_dict(&ckpt.state_dict)?)
    }
}

fn export_linear<B: Backend>(
    sd:     &mut StateDict,
    layer:  Option<usize>,
    linear: &Linear<B>,
) -> Result<(), StateDictError> {
    let name = param_name(layer, "weight");
    let weight = to_param_array(&name, linear.weight.val())?;
    sd.insert(name, weight);

    if let Some(bias) = &linear.bias {
        let name = param_name(layer, "bias");
        let bias = to_param_array(&name, bias.val())?;
        sd.insert(name, bias);
    }
    Ok(())
}

fn import_linear<B: Backend>(
    mut linear: Linear<B>,
    layer:      Option<usize>,
    sd:         &StateDict,
    seen:       &mut BTreeSet<String>,
) -> Result<Linear<B>, StateDictError> {
    let weight = linear.weight.val();
    let device = weight.device();

    let name = param_name(layer, "weight");
    let values = lookup::<B, 2>(sd, &name, weight.dims().to_vec(), &device)?;
    linear.weight = Param::from_tensor(values);
    seen.insert(name);

    if let Some(bias) = linear.bias.take() {
        let name = param_name(layer, "bias");
        let values = lookup::<B, 1>(sd, &name, bias.val().dims().to_vec(), &device)?;
        linear.bias = Some(Param::from_tensor(values));
        seen.insert(name);
    }
    Ok(linear)
}

fn lookup<B: Backend, const D: usize>(
    sd:       &StateDict,
    name:     &str,
    expected: Vec<usize>,
    device:   &B::Device,
) -> Result<Tensor<B, D>, StateDictError> {
    let array = sd
        .get(name)
        .ok_or_else(|| StateDictError::MissingParameter(name.to_string()))?;
    array.check(name)?;

    if array.shape != expected {
        return Err(StateDictError::ShapeMismatch {
            name:     name.to_string(),
            expected,
            found:    array.shape.clone(),
        });
    }

    let data = TensorData::new(array.values.clone(), array.shape.clone());
    Ok(Tensor::from_data(data, device))
}

fn to_param_array<B: Backend, const D: usize>(
    name:   &str,
    tensor: Tensor<B, D>,
) -> Result<ParamArray, StateDictError> {
    let shape = tensor.dims().to_vec();
    let values = tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| StateDictError::Extraction {
            name:   name.to_string(),
            reason: format!("{e:?}"),
        })?;
    ParamArray::new(name, shape, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    use crate::ml::activation::max_abs_diff;

    type TestBackend = NdArray;

    fn device() -> <TestBackend as Backend>::Device {
        Default::default()
    }

    fn small_net() -> Network<TestBackend> {
        NetworkConfig::new(6, 3, vec![5, 4]).init(&device()).unwrap()
    }

    #[test]
    fn test_forward_returns_log_probabilities() {
        let net = small_net();
        let x   = Tensor::<TestBackend, 2>::ones([2, 6], &device());
        let out = net.forward(x);
        assert_eq!(out.dims(), [2, 3]);

        let row_sums: Vec<f32> = out.exp().sum_dim(1).into_data().to_vec().unwrap();
        for s in row_sums {
            assert!((s - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_shape_read_back_from_weights() {
        assert_eq!(small_net().shape(), NetworkShape::new(6, 3, vec![5, 4]));
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(NetworkConfig::new(6, 3, vec![]).init::<TestBackend>(&device()).is_err());
        assert!(NetworkConfig::new(0, 3, vec![4]).init::<TestBackend>(&device()).is_err());
    }

    #[test]
    fn test_state_dict_keys_and_shapes() {
        let sd = small_net().state_dict().unwrap();
        let keys: Vec<&str> = sd.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "hidden_layers.0.bias",
                "hidden_layers.0.weight",
                "hidden_layers.1.bias",
                "hidden_layers.1.weight",
                "output.bias",
                "output.weight",
            ]
        );
        assert_eq!(sd["hidden_layers.0.weight"].shape, vec![6, 5]);
        assert_eq!(sd["output.bias"].shape, vec![3]);
    }

    #[test]
    fn test_state_dict_round_trip_restores_outputs() {
        let source = small_net();
        let sd     = source.state_dict().unwrap();

        // A fresh network has different random weights until loaded
        let target = small_net().load_state_dict(&sd).unwrap();

        let x = Tensor::<TestBackend, 2>::random(
            [3, 6],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device(),
        );
        let diff = max_abs_diff(source.forward(x.clone()), target.forward(x));
        assert!(diff < 1e-6);
        assert_eq!(target.state_dict().unwrap(), sd);
    }

    #[test]
    fn test_load_into_wrong_architecture_fails() {
        let sd  = small_net().state_dict().unwrap();
        let err = NetworkConfig::new(6, 3, vec![7, 4])
            .init::<TestBackend>(&device())
            .unwrap()
            .load_state_dict(&sd)
            .unwrap_err();

        assert_eq!(
            err,
            StateDictError::ShapeMismatch {
                name:     "hidden_layers.0.weight".into(),
                expected: vec![6, 7],
                found:    vec![6, 5],
            }
        );
    }

    #[test]
    fn test_missing_and_unexpected_parameters() {
        let mut sd = small_net().state_dict().unwrap();
        sd.remove("output.bias");
        assert_eq!(
            small_net().load_state_dict(&sd).unwrap_err(),
            StateDictError::MissingParameter("output.bias".into())
        );

        let mut sd = small_net().state_dict().unwrap();
        sd.insert("hidden_layers.9.weight".into(), ParamArray { shape: vec![1], values: vec![0.0] });
        assert_eq!(
            small_net().load_state_dict(&sd).unwrap_err(),
            StateDictError::UnexpectedParameter("hidden_layers.9.weight".into())
        );
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let net  = NetworkConfig::new(6, 3, vec![5]).with_drop_p(0.2).init::<TestBackend>(&device()).unwrap();
        let ckpt = net.to_checkpoint().unwrap();
        assert_eq!(ckpt.input_size, 6);
        assert_eq!(ckpt.output_size, 3);
        assert_eq!(ckpt.hidden_layers, vec![5]);
        assert!((ckpt.drop_p - 0.2).abs() < 1e-12);

        let restored = Network::<TestBackend>::from_checkpoint(&ckpt, &device()).unwrap();
        assert_eq!(restored.state_dict().unwrap(), ckpt.state_dict);
    }

    #[test]
    fn test_seeded_init_repeats() {
        let cfg = NetworkConfig::new(6, 3, vec![5, 4]);
        let a = cfg.init_seeded::<TestBackend>(&device(), 9).unwrap().state_dict().unwrap();
        let b = cfg.init_seeded::<TestBackend>(&device(), 9).unwrap().state_dict().unwrap();
        let c = cfg.init_seeded::<TestBackend>(&device(), 10).unwrap().state_dict().unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);

        // U(-1/√6, 1/√6) for the first layer
        let bound = 1.0 / 6f32.sqrt();
        assert!(a["hidden_layers.0.weight"].values.iter().all(|v| v.abs() <= bound));
    }

    #[test]
    fn test_drop_p_out_of_range_rejected() {
        let cfg = NetworkConfig::new(6, 3, vec![4]).with_drop_p(2.0);
        assert!(cfg.init::<TestBackend>(&device()).is_err());

        let mut ckpt = small_net().to_checkpoint().unwrap();
        ckpt.drop_p = 2.0;
        assert!(Network::<TestBackend>::from_checkpoint(&ckpt, &device()).is_err());
    }
}

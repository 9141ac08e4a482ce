// ============================================================
// Layer 2 — Inspect Use Case
// ============================================================
// Describes a checkpoint without running it:
//   - the architecture it was saved with
//   - every state dict key and its shape
//
// Optionally tries to load it into a network with different
// hidden layers. With a size mismatch the load fails, and the
// report carries the error that names the parameter.

use anyhow::Result;
use burn::prelude::*;

use crate::domain::shape::NetworkShape;
use crate::domain::state_dict::StateDictError;
use crate::ml::model::NetworkConfig;
use crate::ml::InferBackend;
use crate::application::evaluate_use_case::CheckpointLocation;

pub struct InspectReport {
    pub shape:      NetworkShape,
    pub drop_p:     f64,
    pub epoch:      Option<usize>,
    /// (name, shape) in key order
    pub parameters: Vec<(String, Vec<usize>)>,
    /// Present when a trial load into another architecture was requested
    pub trial_load: Option<TrialLoad>,
}

pub struct TrialLoad {
    pub shape:  NetworkShape,
    pub result: Result<(), StateDictError>,
}

impl InspectReport {
    pub fn parameter_count(&self) -> usize {
        self.parameters
            .iter()
            .map(|(_, shape)| shape.iter().product::<usize>())
            .sum()
    }
}

pub struct InspectUseCase {
    location: CheckpointLocation,
}

impl InspectUseCase {
    pub fn new(location: CheckpointLocation) -> Self {
        Self { location }
    }

    /// `load_into`: hidden layer sizes of a network to try loading into.
    pub fn execute(&self, load_into: Option<Vec<usize>>) -> Result<InspectReport> {
        let ckpt  = self.location.load()?;
        let shape = ckpt.shape();

        let parameters = ckpt
            .state_dict
            .iter()
            .map(|(name, array)| (name.clone(), array.shape.clone()))
            .collect();

        let trial_load = match load_into {
            Some(hidden) => {
                let trial_shape = NetworkShape::new(shape.input_size, shape.output_size, hidden);
                let device = <InferBackend as Backend>::Device::default();
                let model  = NetworkConfig::from_shape(&trial_shape).init::<InferBackend>(&device)?;

                let result = model.load_state_dict(&ckpt.state_dict).map(|_| ());
                if let Err(e) = &result {
                    tracing::warn!("Trial load into {} failed: {}", trial_shape, e);
                }
                Some(TrialLoad { shape: trial_shape, result })
            }
            None => None,
        };

        Ok(InspectReport {
            shape,
            drop_p: ckpt.drop_p,
            epoch: ckpt.epoch,
            parameters,
            trial_load,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::checkpoint::save_checkpoint;

    fn saved(dir: &tempfile::TempDir) -> CheckpointLocation {
        let device = <InferBackend as Backend>::Device::default();
        let ckpt = NetworkConfig::new(8, 3, vec![6, 4])
            .init::<InferBackend>(&device)
            .unwrap()
            .to_checkpoint()
            .unwrap();
        let path = dir.path().join("checkpoint.json");
        save_checkpoint(&path, &ckpt).unwrap();
        CheckpointLocation {
            checkpoint_dir: dir.path().to_string_lossy().into_owned(),
            file: Some(path.to_string_lossy().into_owned()),
        }
    }

    #[test]
    fn test_report_lists_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let report = InspectUseCase::new(saved(&dir)).execute(None).unwrap();

        assert_eq!(report.shape, NetworkShape::new(8, 3, vec![6, 4]));
        assert_eq!(report.parameters.len(), 6);
        assert_eq!(report.parameter_count(), report.shape.parameter_count());
        assert!(report.trial_load.is_none());
    }

    #[test]
    fn test_trial_load_reports_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let report = InspectUseCase::new(saved(&dir)).execute(Some(vec![5, 4])).unwrap();

        let trial = report.trial_load.unwrap();
        assert!(matches!(trial.result, Err(StateDictError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_trial_load_with_same_shape_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let report = InspectUseCase::new(saved(&dir)).execute(Some(vec![6, 4])).unwrap();
        assert!(report.trial_load.unwrap().result.is_ok());
    }
}

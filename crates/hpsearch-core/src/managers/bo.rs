//! BO Manager: sequential Bayesian optimisation over a GP surrogate.

use rand::RngCore;
use tracing::{info, warn};

use hpsearch_types::{invalid_iteration, HpResult};

use crate::acquisition::{self, AcquisitionParams};
use crate::gp::GaussianProcess;
use crate::manager::{IterationState, Manager};
use crate::managers::random::sample_assignment;
use crate::spec::{Assignment, BoConfig, ParameterSpec};
use crate::space::SearchSpace;

const DEFAULT_KAPPA: f64 = 2.576;
const DEFAULT_XI: f64 = 0.0;

pub struct BoManager<'a> {
    spec: &'a ParameterSpec,
    config: BoConfig,
}

impl<'a> BoManager<'a> {
    pub fn new(spec: &'a ParameterSpec, config: BoConfig) -> Self {
        Self { spec, config }
    }

    fn bootstrap(&self, rng: &mut dyn RngCore) -> Vec<Assignment> {
        (0..self.config.n_initial_trials)
            .map(|_| sample_assignment(self.spec, rng))
            .collect()
    }
}

impl<'a> Manager for BoManager<'a> {
    fn get_suggestions(
        &self,
        state: Option<&IterationState>,
        rng: &mut dyn RngCore,
    ) -> HpResult<Vec<Assignment>> {
        let state = match state {
            None => {
                info!(n = self.config.n_initial_trials, "bo bootstrap phase");
                return Ok(self.bootstrap(rng));
            }
            Some(s) => s,
        };

        let IterationState::Bo { iteration, old, current } = state else {
            return Err(invalid_iteration!("bo manager received a non-bo iteration state"));
        };

        if *iteration == 0 {
            info!(n = self.config.n_initial_trials, "bo bootstrap phase (iteration 0)");
            return Ok(self.bootstrap(rng));
        }
        if *iteration as usize > self.config.n_iterations {
            return Err(invalid_iteration!(
                "iteration {iteration} exceeds n_iterations {}",
                self.config.n_iterations
            ));
        }

        let observations: Vec<_> = old.iter().chain(current.iter()).collect();
        if observations.is_empty() {
            return Err(hpsearch_types::HpError::NoResult(
                "bo manager invoked past bootstrap with no prior observations".to_string(),
            ));
        }

        let mut space = SearchSpace::new(self.spec, self.config.metric.optimization)?;
        let configs: Vec<Assignment> = observations.iter().map(|o| o.assignment.clone()).collect();
        let metrics: Vec<f64> = observations.iter().map(|o| o.metric).collect();
        space.add_observations(&configs, &metrics)?;

        let gp_config = &self.config.utility_function.gaussian_process;
        let mut gp = GaussianProcess::new(gp_config.length_scale);
        gp.fit(&space.x, &space.y)?;

        let f_best = space.y.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let params = AcquisitionParams {
            kind: self.config.utility_function.acquisition_function,
            kappa: self.config.utility_function.kappa.unwrap_or(DEFAULT_KAPPA),
            xi: self
                .config
                .utility_function
                .eps
                .or(self.config.utility_function.xi)
                .unwrap_or(DEFAULT_XI),
        };

        let point = acquisition::maximize(
            &params,
            &gp,
            f_best,
            &space.bounds,
            gp_config.n_restarts_optimizer,
            rng,
        );
        let assignment = space.get_suggestion(&point).map_err(|e| {
            warn!(error = %e, "bo acquisition optimisation produced an invalid point");
            e
        })?;
        Ok(vec![assignment])
    }

    fn name(&self) -> &'static str {
        "bo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{AxisDistribution, ScalarValue};
    use crate::manager::Observation;
    use crate::spec::{
        AcquisitionKind, GaussianProcessConfig, MetricConfig, Optimization, StrategyBlock,
        UtilityFunctionConfig,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn bo_spec(n_initial: usize) -> (ParameterSpec, BoConfig) {
        let matrix = BTreeMap::from([
            (
                "feature1".to_string(),
                AxisDistribution::Values(vec![
                    ScalarValue::Int(1),
                    ScalarValue::Int(2),
                    ScalarValue::Int(3),
                ]),
            ),
            (
                "feature2".to_string(),
                AxisDistribution::Linspace { start: 1.0, stop: 2.0, count: 5 },
            ),
            (
                "feature3".to_string(),
                AxisDistribution::Range { start: 1, stop: 5, step: 1 },
            ),
        ]);
        let config = BoConfig {
            n_iterations: 5,
            n_initial_trials: n_initial,
            metric: MetricConfig { name: "loss".into(), optimization: Optimization::Minimize },
            utility_function: UtilityFunctionConfig {
                acquisition_function: AcquisitionKind::Ucb,
                gaussian_process: GaussianProcessConfig {
                    kernel: "rbf".into(),
                    length_scale: 1.0,
                    n_restarts_optimizer: 2,
                },
                kappa: Some(1.2),
                eps: None,
                xi: None,
            },
        };
        let spec = ParameterSpec::new(2, matrix, StrategyBlock::Bo(config.clone())).unwrap();
        (spec, config)
    }

    #[test]
    fn bootstrap_returns_exact_cardinality() {
        let (spec, config) = bo_spec(5);
        let manager = BoManager::new(&spec, config);
        let mut rng = StdRng::seed_from_u64(1);
        let suggestions = manager.get_suggestions(None, &mut rng).unwrap();
        assert_eq!(suggestions.len(), 5);
    }

    #[test]
    fn iteration_zero_state_is_also_bootstrap() {
        let (spec, config) = bo_spec(5);
        let manager = BoManager::new(&spec, config);
        let state = IterationState::Bo { iteration: 0, old: vec![], current: vec![] };
        let mut rng = StdRng::seed_from_u64(1);
        let suggestions = manager.get_suggestions(Some(&state), &mut rng).unwrap();
        assert_eq!(suggestions.len(), 5);
    }

    #[test]
    fn non_bootstrap_with_no_observations_is_no_result() {
        let (spec, config) = bo_spec(5);
        let manager = BoManager::new(&spec, config);
        let state = IterationState::Bo { iteration: 2, old: vec![], current: vec![] };
        let mut rng = StdRng::seed_from_u64(1);
        let err = manager.get_suggestions(Some(&state), &mut rng).unwrap_err();
        assert!(matches!(err, hpsearch_types::HpError::NoResult(_)));
    }

    #[test]
    fn iteration_beyond_n_iterations_is_invalid() {
        let (spec, config) = bo_spec(5);
        let manager = BoManager::new(&spec, config);
        let state = IterationState::Bo { iteration: 99, old: vec![], current: vec![] };
        let mut rng = StdRng::seed_from_u64(1);
        assert!(manager.get_suggestions(Some(&state), &mut rng).is_err());
    }

    #[test]
    fn single_suggestion_per_iteration_with_observations() {
        let (spec, config) = bo_spec(5);
        let manager = BoManager::new(&spec, config);
        let observations = vec![
            Observation {
                experiment_id: Uuid::new_v4(),
                assignment: BTreeMap::from([
                    ("feature1".to_string(), ScalarValue::Int(1)),
                    ("feature2".to_string(), ScalarValue::Float(1.0)),
                    ("feature3".to_string(), ScalarValue::Int(1)),
                ]),
                metric: 1.0,
            },
            Observation {
                experiment_id: Uuid::new_v4(),
                assignment: BTreeMap::from([
                    ("feature1".to_string(), ScalarValue::Int(2)),
                    ("feature2".to_string(), ScalarValue::Float(1.2)),
                    ("feature3".to_string(), ScalarValue::Int(2)),
                ]),
                metric: 2.0,
            },
            Observation {
                experiment_id: Uuid::new_v4(),
                assignment: BTreeMap::from([
                    ("feature1".to_string(), ScalarValue::Int(3)),
                    ("feature2".to_string(), ScalarValue::Float(1.3)),
                    ("feature3".to_string(), ScalarValue::Int(3)),
                ]),
                metric: 3.0,
            },
        ];
        let state = IterationState::Bo { iteration: 2, old: observations, current: vec![] };
        let mut rng = StdRng::seed_from_u64(7);
        let suggestions = manager.get_suggestions(Some(&state), &mut rng).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].contains_key("feature1"));
        assert!(suggestions[0].contains_key("feature2"));
        assert!(suggestions[0].contains_key("feature3"));
    }
}

//! Parameter Spec: the validated mapping from axis name to
//! distribution, plus the single declared strategy block.

use std::collections::BTreeMap;

use hpsearch_types::{invalid_spec, HpResult};
use serde::{Deserialize, Serialize};

use crate::axis::{AxisDistribution, ScalarValue};

/// A fully-specified point in the hyperparameter space.
pub type Assignment = BTreeMap<String, ScalarValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Optimization {
    Minimize,
    Maximize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    pub name: String,
    pub optimization: Optimization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Int,
    Float,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub name: String,
    pub kind: ResourceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub n_experiments: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RandomConfig {
    pub n_experiments: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperbandConfig {
    pub max_iter: f64,
    pub eta: f64,
    pub resource: ResourceConfig,
    pub metric: Option<MetricConfig>,
    pub resume: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionKind {
    Ucb,
    Ei,
    Poi,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianProcessConfig {
    pub kernel: String,
    pub length_scale: f64,
    pub n_restarts_optimizer: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityFunctionConfig {
    pub acquisition_function: AcquisitionKind,
    pub gaussian_process: GaussianProcessConfig,
    pub kappa: Option<f64>,
    pub eps: Option<f64>,
    pub xi: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoConfig {
    pub n_iterations: usize,
    pub n_initial_trials: usize,
    pub metric: MetricConfig,
    pub utility_function: UtilityFunctionConfig,
}

/// Exactly one of grid/random/hyperband/bo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StrategyBlock {
    Grid(GridConfig),
    Random(RandomConfig),
    Hyperband(HyperbandConfig),
    Bo(BoConfig),
}

/// The validated parameter spec: axis matrix, strategy, concurrency hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub concurrency: u32,
    matrix: BTreeMap<String, AxisDistribution>,
    pub strategy: StrategyBlock,
}

impl ParameterSpec {
    /// Validates every axis's invariants and the strategy block's
    /// required fields before returning a usable spec.
    pub fn new(
        concurrency: u32,
        matrix: BTreeMap<String, AxisDistribution>,
        strategy: StrategyBlock,
    ) -> HpResult<Self> {
        for (name, axis) in &matrix {
            axis.validate(name)?;
        }
        match &strategy {
            StrategyBlock::Grid(cfg) if cfg.n_experiments == 0 => {
                return Err(invalid_spec!("grid_search.n_experiments must be > 0"));
            }
            StrategyBlock::Random(cfg) if cfg.n_experiments == 0 => {
                return Err(invalid_spec!("random_search.n_experiments must be > 0"));
            }
            StrategyBlock::Hyperband(cfg) if cfg.max_iter <= 0.0 || cfg.eta <= 1.0 => {
                return Err(invalid_spec!(
                    "hyperband requires max_iter > 0 and eta > 1"
                ));
            }
            StrategyBlock::Bo(cfg) if cfg.n_initial_trials == 0 => {
                return Err(invalid_spec!("bo.n_initial_trials must be > 0"));
            }
            _ => {}
        }
        Ok(Self {
            concurrency,
            matrix,
            strategy,
        })
    }

    /// Axes in stable alphabetical order (`BTreeMap` iteration order),
    /// observable via BO's Search Space column layout.
    pub fn axes(&self) -> impl Iterator<Item = (&String, &AxisDistribution)> {
        self.matrix.iter()
    }

    pub fn axis(&self, name: &str) -> Option<&AxisDistribution> {
        self.matrix.get(name)
    }

    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_n_experiments() {
        let matrix = BTreeMap::from([(
            "x".to_string(),
            AxisDistribution::Values(vec![ScalarValue::Int(1)]),
        )]);
        let err = ParameterSpec::new(
            1,
            matrix,
            StrategyBlock::Grid(GridConfig { n_experiments: 0 }),
        );
        assert!(err.is_err());
    }

    #[test]
    fn axes_are_alphabetical() {
        let matrix = BTreeMap::from([
            ("zeta".to_string(), AxisDistribution::Values(vec![ScalarValue::Int(1)])),
            ("alpha".to_string(), AxisDistribution::Values(vec![ScalarValue::Int(1)])),
        ]);
        let spec = ParameterSpec::new(
            1,
            matrix,
            StrategyBlock::Grid(GridConfig { n_experiments: 1 }),
        )
        .unwrap();
        let names: Vec<&str> = spec.axes().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}

//! # hpsearch-core
//!
//! Core of a hyperparameter search subsystem: a parameter-space model
//! (axis distributions + parameter spec), four search strategies (grid,
//! random, Hyperband, sequential Bayesian optimization), and the numeric
//! search space that embeds a parameter spec for GP-based optimization.

pub mod acquisition;
pub mod axis;
pub mod dispatch;
pub mod gp;
pub mod manager;
pub mod managers;
pub mod space;
pub mod spec;

pub use axis::{AxisDistribution, ScalarValue};
pub use dispatch::dispatch;
pub use manager::{IterationState, Manager, Observation};
pub use spec::{
    AcquisitionKind, Assignment, BoConfig, GaussianProcessConfig, GridConfig, HyperbandConfig,
    MetricConfig, Optimization, ParameterSpec, RandomConfig, ResourceConfig, ResourceKind,
    StrategyBlock, UtilityFunctionConfig,
};
pub use space::SearchSpace;

//! Random Manager: independent draws per axis.

use rand::RngCore;
use tracing::debug;

use hpsearch_types::HpResult;

use crate::manager::{IterationState, Manager};
use crate::spec::{Assignment, ParameterSpec, RandomConfig};

pub struct RandomManager<'a> {
    spec: &'a ParameterSpec,
    config: RandomConfig,
}

impl<'a> RandomManager<'a> {
    pub fn new(spec: &'a ParameterSpec, config: RandomConfig) -> Self {
        Self { spec, config }
    }

    pub fn sample_one(&self, rng: &mut dyn RngCore) -> Assignment {
        sample_assignment(self.spec, rng)
    }
}

/// Draws one assignment by sampling every axis independently. Shared with
/// Hyperband's bootstrap and BO's bootstrap phase.
pub fn sample_assignment(spec: &ParameterSpec, rng: &mut dyn RngCore) -> Assignment {
    spec.axes()
        .map(|(name, axis)| (name.clone(), axis.sample(rng)))
        .collect()
}

impl<'a> Manager for RandomManager<'a> {
    fn get_suggestions(
        &self,
        _state: Option<&IterationState>,
        rng: &mut dyn RngCore,
    ) -> HpResult<Vec<Assignment>> {
        let suggestions: Vec<Assignment> = (0..self.config.n_experiments)
            .map(|_| self.sample_one(rng))
            .collect();
        debug!(count = suggestions.len(), "random manager produced suggestions");
        Ok(suggestions)
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

//! Hyperband Manager: successive-halving bracket scheduler
//! (Li et al., "Hyperband").

use rand::RngCore;
use tracing::{debug, info};

use hpsearch_types::{invalid_iteration, HpResult};

use crate::axis::ScalarValue;
use crate::manager::{IterationState, Manager};
use crate::managers::random::sample_assignment;
use crate::spec::{Assignment, HyperbandConfig, ParameterSpec, ResourceKind};

pub struct HyperbandManager<'a> {
    spec: &'a ParameterSpec,
    config: HyperbandConfig,
    pub max_iter: f64,
    pub eta: f64,
    pub s_max: u32,
    pub b: f64,
}

impl<'a> HyperbandManager<'a> {
    pub fn new(spec: &'a ParameterSpec, config: HyperbandConfig) -> Self {
        let max_iter = config.max_iter;
        let eta = config.eta;
        let s_max = max_iter.log(eta).floor() as u32;
        let b = (s_max as f64 + 1.0) * max_iter;
        Self {
            spec,
            config,
            max_iter,
            eta,
            s_max,
            b,
        }
    }

    /// `s = s_max - iteration`, the bracket index for that outer iteration.
    pub fn get_bracket(&self, iteration: u32) -> i64 {
        self.s_max as i64 - iteration as i64
    }

    /// `ceil( (s_max+1)/(s+1) * eta^s )`.
    pub fn get_n_configs(&self, bracket: i64) -> u64 {
        let s = bracket as f64;
        let raw = (self.s_max as f64 + 1.0) / (s + 1.0) * self.eta.powf(s);
        raw.ceil() as u64
    }

    pub fn get_n_configs_for_iteration(&self, iteration: u32) -> u64 {
        self.get_n_configs(self.get_bracket(iteration))
    }

    /// `R * eta^-bracket`.
    pub fn get_resources(&self, bracket: i64) -> f64 {
        self.max_iter * self.eta.powf(-(bracket as f64))
    }

    pub fn get_resources_for_iteration(&self, iteration: u32) -> f64 {
        self.get_resources(self.get_bracket(iteration))
    }

    /// `n_resources * eta^bracket_iteration`.
    pub fn get_n_resources(&self, n_resources: f64, bracket_iteration: u32) -> f64 {
        n_resources * self.eta.powf(bracket_iteration as f64)
    }

    pub fn get_n_resources_for_iteration(&self, iteration: u32, bracket_iteration: u32) -> f64 {
        self.get_n_resources(self.get_resources_for_iteration(iteration), bracket_iteration)
    }

    /// `floor( n_suggestions * eta^-(bracket_iteration+1) )`.
    pub fn get_n_config_to_keep(&self, n_suggestions: u64, bracket_iteration: u32) -> u64 {
        let raw = n_suggestions as f64 * self.eta.powf(-((bracket_iteration as f64) + 1.0));
        raw.floor() as u64
    }

    pub fn get_n_config_to_keep_for_iteration(&self, iteration: u32, bracket_iteration: u32) -> u64 {
        let n_suggestions = self.get_n_configs_for_iteration(iteration);
        self.get_n_config_to_keep(n_suggestions, bracket_iteration)
    }

    /// True once the current bracket is exhausted and the next one starts.
    /// The final outer iteration is terminal (see DESIGN.md Open Question).
    pub fn should_reschedule(&self, iteration: u32, bracket_iteration: u32) -> bool {
        let bracket = self.get_bracket(iteration);
        bracket_iteration as i64 >= bracket && (iteration as i64) < self.s_max as i64
    }

    /// True while the current bracket is still halving configs.
    pub fn should_reduce_configs(&self, iteration: u32, bracket_iteration: u32) -> bool {
        let bracket = self.get_bracket(iteration);
        bracket_iteration as i64 <= bracket
            && iteration as i64 <= self.s_max as i64
            && !self.should_reschedule(iteration, bracket_iteration)
    }

    fn resourced(&self, mut assignment: Assignment, resource: f64) -> Assignment {
        let value = match self.config.resource.kind {
            ResourceKind::Int => ScalarValue::Int(resource.round().max(1.0) as i64),
            ResourceKind::Float => ScalarValue::Float(resource),
        };
        assignment.insert(self.config.resource.name.clone(), value);
        assignment
    }
}

impl<'a> Manager for HyperbandManager<'a> {
    fn get_suggestions(
        &self,
        state: Option<&IterationState>,
        rng: &mut dyn RngCore,
    ) -> HpResult<Vec<Assignment>> {
        let Some(state) = state else {
            let n = self.get_n_configs(self.s_max as i64);
            let resource = self.get_resources(self.s_max as i64);
            info!(n, resource, "hyperband bootstrap (bracket s_max)");
            return Ok((0..n)
                .map(|_| self.resourced(sample_assignment(self.spec, rng), resource))
                .collect());
        };

        let IterationState::Hyperband { iteration, bracket_iteration, survivors } = state else {
            return Err(invalid_iteration!(
                "hyperband manager received a non-hyperband iteration state"
            ));
        };
        let (iteration, bracket_iteration) = (*iteration, *bracket_iteration);

        let bracket = self.get_bracket(iteration);
        if iteration as i64 > self.s_max as i64 || bracket_iteration as i64 > bracket {
            return Err(invalid_iteration!(
                "iteration {iteration}/bracket_iteration {bracket_iteration} exceeds s_max {}",
                self.s_max
            ));
        }

        if self.should_reschedule(iteration, bracket_iteration) {
            let next_iteration = iteration + 1;
            let next_bracket = self.get_bracket(next_iteration);
            let n = self.get_n_configs(next_bracket);
            let resource = self.get_resources(next_bracket);
            info!(next_iteration, n, resource, "hyperband rescheduling to next bracket");
            return Ok((0..n)
                .map(|_| self.resourced(sample_assignment(self.spec, rng), resource))
                .collect());
        }

        if self.should_reduce_configs(iteration, bracket_iteration) {
            let n_suggestions = survivors.len() as u64;
            let keep = self.get_n_config_to_keep(n_suggestions, bracket_iteration) as usize;
            let resource = self.get_n_resources(
                self.get_resources(bracket),
                bracket_iteration + 1,
            );
            debug!(keep, resource, "hyperband reducing configs within bracket");
            return Ok(survivors
                .iter()
                .take(keep)
                .map(|a| self.resourced(a.clone(), resource))
                .collect());
        }

        Err(invalid_iteration!(
            "iteration {iteration}/bracket_iteration {bracket_iteration} is past the final bracket"
        ))
    }

    fn name(&self) -> &'static str {
        "hyperband"
    }
}

//! Manager trait and the iteration-state
//! contract iterative strategies consume.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hpsearch_types::HpResult;

use crate::spec::Assignment;

/// One completed experiment, as fed back to BO between iterations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub experiment_id: Uuid,
    pub assignment: Assignment,
    pub metric: f64,
}

/// Opaque state the caller persists between `get_suggestions` calls for
/// iterative strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IterationState {
    Hyperband {
        iteration: u32,
        bracket_iteration: u32,
        /// Assignments that survived the previous bracket_iteration's
        /// evaluation, ranked best-first by the caller. Empty on bootstrap.
        /// Supplementary to the required iteration/bracket counters — see DESIGN.md.
        survivors: Vec<Assignment>,
    },
    Bo {
        iteration: u32,
        old: Vec<Observation>,
        current: Vec<Observation>,
    },
}

/// Single operation every search strategy manager exposes.
pub trait Manager {
    fn get_suggestions(
        &self,
        state: Option<&IterationState>,
        rng: &mut dyn RngCore,
    ) -> HpResult<Vec<Assignment>>;

    fn name(&self) -> &'static str;
}

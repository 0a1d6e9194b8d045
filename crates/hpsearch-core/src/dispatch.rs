//! Strategy Dispatcher: picks the Manager matching the parameter space's
//! single declared strategy block.

use crate::manager::Manager;
use crate::managers::{BoManager, GridManager, HyperbandManager, RandomManager};
use crate::spec::{ParameterSpec, StrategyBlock};

/// Returns the Manager corresponding to `spec`'s declared strategy.
pub fn dispatch(spec: &ParameterSpec) -> Box<dyn Manager + '_> {
    match spec.strategy.clone() {
        StrategyBlock::Grid(config) => Box::new(GridManager::new(spec, config)),
        StrategyBlock::Random(config) => Box::new(RandomManager::new(spec, config)),
        StrategyBlock::Hyperband(config) => Box::new(HyperbandManager::new(spec, config)),
        StrategyBlock::Bo(config) => Box::new(BoManager::new(spec, config)),
    }
}

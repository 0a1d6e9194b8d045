//! Grid Manager: Cartesian product of materialised axes.

use rand::RngCore;
use tracing::debug;

use hpsearch_types::{invalid_spec, HpResult};

use crate::manager::{IterationState, Manager};
use crate::spec::{Assignment, GridConfig, ParameterSpec};

pub struct GridManager<'a> {
    spec: &'a ParameterSpec,
    config: GridConfig,
}

impl<'a> GridManager<'a> {
    pub fn new(spec: &'a ParameterSpec, config: GridConfig) -> Self {
        Self { spec, config }
    }

    /// The full Cartesian product, lexicographic over axes in the parameter
    /// stable order, varying the last axis fastest — before truncation.
    fn build_grid(&self) -> HpResult<Vec<Assignment>> {
        let mut combos: Vec<Assignment> = vec![Assignment::new()];
        for (name, axis) in self.spec.axes() {
            if !axis.is_materialisable() {
                return Err(invalid_spec!(
                    "axis '{name}' is not materialisable and cannot be gridded"
                ));
            }
            let values = axis.materialise()?;
            let mut next = Vec::with_capacity(combos.len() * values.len());
            for existing in &combos {
                for value in &values {
                    let mut combo = existing.clone();
                    combo.insert(name.clone(), value.clone());
                    next.push(combo);
                }
            }
            combos = next;
        }
        Ok(combos)
    }
}

impl<'a> Manager for GridManager<'a> {
    fn get_suggestions(
        &self,
        _state: Option<&IterationState>,
        _rng: &mut dyn RngCore,
    ) -> HpResult<Vec<Assignment>> {
        let mut combos = self.build_grid()?;
        combos.truncate(self.config.n_experiments);
        debug!(count = combos.len(), "grid manager produced suggestions");
        Ok(combos)
    }

    fn name(&self) -> &'static str {
        "grid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{AxisDistribution, ScalarValue};
    use crate::spec::StrategyBlock;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    #[test]
    fn single_axis_enumeration() {
        let matrix = BTreeMap::from([(
            "feature".to_string(),
            AxisDistribution::Values(vec![
                ScalarValue::Int(1),
                ScalarValue::Int(2),
                ScalarValue::Int(3),
            ]),
        )]);
        let spec = ParameterSpec::new(
            1,
            matrix,
            StrategyBlock::Grid(GridConfig { n_experiments: 10 }),
        )
        .unwrap();
        let manager = GridManager::new(&spec, GridConfig { n_experiments: 10 });
        let suggestions = manager.get_suggestions(None, &mut rng()).unwrap();
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[0]["feature"], ScalarValue::Int(1));
        assert_eq!(suggestions[2]["feature"], ScalarValue::Int(3));
    }

    #[test]
    fn product_is_capped_and_lexicographic() {
        // 3 * 5 * 4 = 60 combinations, capped to 10, last axis fastest.
        let matrix = BTreeMap::from([
            (
                "a".to_string(),
                AxisDistribution::Values(vec![
                    ScalarValue::Int(1),
                    ScalarValue::Int(2),
                    ScalarValue::Int(3),
                ]),
            ),
            (
                "b".to_string(),
                AxisDistribution::Linspace { start: 0.0, stop: 4.0, count: 5 },
            ),
            (
                "c".to_string(),
                AxisDistribution::Range { start: 0, stop: 4, step: 1 },
            ),
        ]);
        let spec = ParameterSpec::new(
            1,
            matrix,
            StrategyBlock::Grid(GridConfig { n_experiments: 10 }),
        )
        .unwrap();
        let manager = GridManager::new(&spec, GridConfig { n_experiments: 10 });
        let suggestions = manager.get_suggestions(None, &mut rng()).unwrap();
        assert_eq!(suggestions.len(), 10);
        // "a" is first alphabetically, so it should vary slowest.
        assert_eq!(suggestions[0]["a"], ScalarValue::Int(1));
        assert_eq!(suggestions[9]["a"], ScalarValue::Int(1));
        // "c" varies fastest.
        assert_eq!(suggestions[0]["c"], ScalarValue::Int(0));
        assert_eq!(suggestions[1]["c"], ScalarValue::Int(1));
    }

    #[test]
    fn non_materialisable_axis_is_rejected() {
        let matrix = BTreeMap::from([(
            "x".to_string(),
            AxisDistribution::Uniform { low: 0.0, high: 1.0 },
        )]);
        let spec = ParameterSpec::new(
            1,
            matrix,
            StrategyBlock::Grid(GridConfig { n_experiments: 10 }),
        )
        .unwrap();
        let manager = GridManager::new(&spec, GridConfig { n_experiments: 10 });
        assert!(manager.get_suggestions(None, &mut rng()).is_err());
    }
}

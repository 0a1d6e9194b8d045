//! Search Space: numeric embedding of a Parameter Spec for
//! GP-based optimization, with one-hot expansion of categorical axes.

use std::collections::BTreeMap;

use hpsearch_types::{invalid_spec, HpResult};
use ndarray::{Array1, Array2};

use crate::axis::ScalarValue;
use crate::spec::{Assignment, Optimization, ParameterSpec};

enum Column {
    Numeric { index: usize },
    Categorical { indices: Vec<usize>, categories: Vec<String> },
}

pub struct SearchSpace {
    /// Original axis names, in the Parameter Spec's stable order.
    pub features: Vec<String>,
    /// Permissible materialised values per materialisable numeric axis.
    pub discrete_features: BTreeMap<String, Vec<ScalarValue>>,
    /// Category lists and counts per categorical axis.
    pub categorical_features: BTreeMap<String, (Vec<String>, usize)>,
    /// Number of numeric columns after one-hot expansion.
    pub dim: usize,
    /// `(lo, hi)` per column, length `dim`.
    pub bounds: Vec<(f64, f64)>,
    pub x: Array2<f64>,
    pub y: Array1<f64>,

    columns: Vec<Column>,
    optimization: Optimization,
}

impl SearchSpace {
    pub fn new(spec: &ParameterSpec, optimization: Optimization) -> HpResult<Self> {
        let mut features = Vec::new();
        let mut discrete_features = BTreeMap::new();
        let mut categorical_features = BTreeMap::new();
        let mut columns = Vec::new();
        let mut bounds = Vec::new();

        for (name, axis) in spec.axes() {
            features.push(name.clone());
            if axis.is_categorical() {
                let values = axis.materialise()?;
                let categories: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                let start = bounds.len();
                let indices: Vec<usize> = (start..start + categories.len()).collect();
                for _ in &categories {
                    bounds.push((0.0, 1.0));
                }
                categorical_features.insert(name.clone(), (categories.clone(), categories.len()));
                columns.push(Column::Categorical { indices, categories });
            } else {
                let (lo, hi) = axis.bounds().ok_or_else(|| {
                    invalid_spec!("axis '{name}' has no numeric bounds for the search space")
                })?;
                let index = bounds.len();
                bounds.push((lo, hi));
                if axis.is_materialisable() {
                    discrete_features.insert(name.clone(), axis.materialise()?);
                }
                columns.push(Column::Numeric { index });
            }
        }

        let dim = bounds.len();
        Ok(Self {
            features,
            discrete_features,
            categorical_features,
            dim,
            bounds,
            x: Array2::zeros((0, dim)),
            y: Array1::zeros(0),
            columns,
            optimization,
        })
    }

    fn encode(&self, config: &Assignment) -> HpResult<Vec<f64>> {
        let mut row = vec![0.0; self.dim];
        for (name, column) in self.features.iter().zip(self.columns.iter()) {
            let value = config
                .get(name)
                .ok_or_else(|| invalid_spec!("observation is missing axis '{name}'"))?;
            match column {
                Column::Numeric { index } => {
                    row[*index] = value.as_f64().ok_or_else(|| {
                        invalid_spec!("axis '{name}' expected a numeric value, got {value}")
                    })?;
                }
                Column::Categorical { indices, categories } => {
                    let label = value.to_string();
                    let pos = categories.iter().position(|c| *c == label).ok_or_else(|| {
                        invalid_spec!("axis '{name}' value '{label}' is not a declared category")
                    })?;
                    row[indices[pos]] = 1.0;
                }
            }
        }
        Ok(row)
    }

    /// Appends observations, applying the minimize→negation convention
    /// uniformly.
    pub fn add_observations(&mut self, configs: &[Assignment], metrics: &[f64]) -> HpResult<()> {
        for (config, metric) in configs.iter().zip(metrics.iter()) {
            let row = self.encode(config)?;
            let row = Array1::from(row);
            self.x.push_row(row.view()).map_err(|e| {
                hpsearch_types::numeric_failure!("failed to append observation row: {e}")
            })?;
            let y = match self.optimization {
                Optimization::Minimize => -metric,
                Optimization::Maximize => *metric,
            };
            self.y = ndarray_append(&self.y, y);
        }
        Ok(())
    }

    /// Inverse projection: numeric point -> Assignment.
    pub fn get_suggestion(&self, point: &[f64]) -> HpResult<Assignment> {
        if point.len() != self.dim {
            return Err(invalid_spec!(
                "suggestion has {} dims, expected {}",
                point.len(),
                self.dim
            ));
        }
        let mut assignment = Assignment::new();
        for (name, column) in self.features.iter().zip(self.columns.iter()) {
            match column {
                Column::Categorical { indices, categories } => {
                    let mut best = 0usize;
                    let mut best_value = f64::NEG_INFINITY;
                    for (i, &col) in indices.iter().enumerate() {
                        if point[col] > best_value {
                            best_value = point[col];
                            best = i;
                        }
                    }
                    assignment.insert(name.clone(), ScalarValue::Str(categories[best].clone()));
                }
                Column::Numeric { index } => {
                    let raw = point[*index];
                    if let Some(discrete) = self.discrete_features.get(name) {
                        assignment.insert(name.clone(), nearest(discrete, raw));
                    } else {
                        let (lo, hi) = self.bounds[*index];
                        assignment.insert(name.clone(), ScalarValue::Float(raw.clamp(lo, hi)));
                    }
                }
            }
        }
        Ok(assignment)
    }
}

/// Nearest element of `values` to `raw`; ties broken by the lower value.
fn nearest(values: &[ScalarValue], raw: f64) -> ScalarValue {
    let mut best = &values[0];
    let mut best_dist = f64::INFINITY;
    for v in values {
        let Some(candidate) = v.as_f64() else { continue };
        let dist = (candidate - raw).abs();
        if dist < best_dist
            || (dist == best_dist && candidate < best.as_f64().unwrap_or(f64::INFINITY))
        {
            best = v;
            best_dist = dist;
        }
    }
    best.clone()
}

fn ndarray_append(y: &Array1<f64>, value: f64) -> Array1<f64> {
    let mut out = Array1::zeros(y.len() + 1);
    out.slice_mut(ndarray::s![..y.len()]).assign(y);
    out[y.len()] = value;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisDistribution;
    use crate::spec::{GridConfig, StrategyBlock};
    use std::collections::BTreeMap as Map;

    fn five_feature_spec() -> ParameterSpec {
        let matrix = Map::from([
            (
                "f1".to_string(),
                AxisDistribution::Values(vec![
                    ScalarValue::Int(1),
                    ScalarValue::Int(2),
                    ScalarValue::Int(3),
                    ScalarValue::Int(4),
                    ScalarValue::Int(5),
                ]),
            ),
            (
                "f2".to_string(),
                AxisDistribution::Linspace { start: 1.0, stop: 5.0, count: 5 },
            ),
            (
                "f3".to_string(),
                AxisDistribution::Range { start: 1, stop: 6, step: 1 },
            ),
            (
                "f4".to_string(),
                AxisDistribution::Uniform { low: 1.0, high: 5.0 },
            ),
            (
                "f5".to_string(),
                AxisDistribution::Values(vec![
                    ScalarValue::Str("a".into()),
                    ScalarValue::Str("b".into()),
                    ScalarValue::Str("c".into()),
                ]),
            ),
        ]);
        ParameterSpec::new(1, matrix, StrategyBlock::Grid(GridConfig { n_experiments: 1 })).unwrap()
    }

    #[test]
    fn encoding_matches_reference_scenario_s6() {
        let spec = five_feature_spec();
        let space = SearchSpace::new(&spec, Optimization::Minimize).unwrap();
        assert_eq!(space.dim, 7);
        assert_eq!(space.features.len(), 5);
        assert_eq!(space.discrete_features.len(), 3);
        assert_eq!(space.categorical_features.len(), 1);
        let (cats, n) = &space.categorical_features["f5"];
        assert_eq!(*n, 3);
        assert_eq!(cats, &vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        // f3 = range(1, 6, 1): bounds are the declared (start, stop), not
        // the last materialised value.
        let f3_index = space.features.iter().position(|f| f == "f3").unwrap();
        assert_eq!(space.bounds[f3_index], (1.0, 6.0));
    }

    #[test]
    fn inverse_projection_matches_reference_scenario_s7() {
        let spec = five_feature_spec();
        let space = SearchSpace::new(&spec, Optimization::Minimize).unwrap();
        let point = [1.0, 1.2, 2.0, 3.0, 0.0, 0.0, 1.0];
        let suggestion = space.get_suggestion(&point).unwrap();
        assert_eq!(suggestion["f1"], ScalarValue::Int(1));
        assert_eq!(suggestion["f2"], ScalarValue::Float(1.0));
        assert_eq!(suggestion["f3"], ScalarValue::Int(2));
        assert_eq!(suggestion["f4"], ScalarValue::Float(3.0));
        assert_eq!(suggestion["f5"], ScalarValue::Str("c".to_string()));
    }

    #[test]
    fn minimize_negates_observations() {
        let matrix = Map::from([(
            "x".to_string(),
            AxisDistribution::Uniform { low: 0.0, high: 10.0 },
        )]);
        let spec = ParameterSpec::new(1, matrix, StrategyBlock::Grid(GridConfig { n_experiments: 1 })).unwrap();
        let mut space = SearchSpace::new(&spec, Optimization::Minimize).unwrap();
        let mut config = Assignment::new();
        config.insert("x".to_string(), ScalarValue::Float(1.0));
        space.add_observations(&[config], &[2.5]).unwrap();
        assert_eq!(space.y[0], -2.5);
    }

    #[test]
    fn maximize_keeps_observations_as_is() {
        let matrix = Map::from([(
            "x".to_string(),
            AxisDistribution::Uniform { low: 0.0, high: 10.0 },
        )]);
        let spec = ParameterSpec::new(1, matrix, StrategyBlock::Grid(GridConfig { n_experiments: 1 })).unwrap();
        let mut space = SearchSpace::new(&spec, Optimization::Maximize).unwrap();
        let mut config = Assignment::new();
        config.insert("x".to_string(), ScalarValue::Float(1.0));
        space.add_observations(&[config], &[2.5]).unwrap();
        assert_eq!(space.y[0], 2.5);
    }
}

//! Axis distributions: the tagged variants that make up a parameter space's
//! `matrix`.

use hpsearch_types::{invalid_spec, HpResult};
use rand::RngCore;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

/// A single concrete value along an axis, or in an `Assignment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl ScalarValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Str(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Str(_))
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
        }
    }
}

/// One parametric axis declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum AxisDistribution {
    Values(Vec<ScalarValue>),
    PValues(Vec<(ScalarValue, f64)>),
    Range { start: i64, stop: i64, step: i64 },
    Linspace { start: f64, stop: f64, count: usize },
    Logspace { start: f64, stop: f64, count: usize },
    Geomspace { start: f64, stop: f64, count: usize },
    Uniform { low: f64, high: f64 },
    QUniform { low: f64, high: f64, q: f64 },
    LogUniform { low: f64, high: f64 },
    QLogUniform { low: f64, high: f64, q: f64 },
    Normal { mu: f64, sigma: f64 },
    QNormal { mu: f64, sigma: f64, q: f64 },
    LogNormal { mu: f64, sigma: f64 },
    QLogNormal { mu: f64, sigma: f64, q: f64 },
}

impl AxisDistribution {
    /// Validates the axis's invariants. Called at `ParameterSpec`
    /// construction time; never re-checked afterwards.
    pub fn validate(&self, name: &str) -> HpResult<()> {
        match self {
            Self::Values(values) => {
                if values.is_empty() {
                    return Err(invalid_spec!("axis '{name}': values must be non-empty"));
                }
            }
            Self::PValues(pairs) => {
                if pairs.is_empty() {
                    return Err(invalid_spec!("axis '{name}': pvalues must be non-empty"));
                }
                if pairs.iter().any(|(_, p)| *p < 0.0) {
                    return Err(invalid_spec!(
                        "axis '{name}': pvalues probabilities must be non-negative"
                    ));
                }
                let total: f64 = pairs.iter().map(|(_, p)| p).sum();
                if (total - 1.0).abs() > 1e-6 {
                    return Err(invalid_spec!(
                        "axis '{name}': pvalues probabilities must sum to 1 (got {total})"
                    ));
                }
            }
            Self::Range { start, stop, step } => {
                if *step == 0 {
                    return Err(invalid_spec!("axis '{name}': range step must be non-zero"));
                }
                let consistent = (*stop > *start && *step > 0) || (*stop < *start && *step < 0);
                if *stop != *start && !consistent {
                    return Err(invalid_spec!(
                        "axis '{name}': range step direction must match stop - start"
                    ));
                }
            }
            Self::Linspace { count, .. }
            | Self::Logspace { count, .. }
            | Self::Geomspace { count, .. } => {
                if *count < 1 {
                    return Err(invalid_spec!("axis '{name}': count must be >= 1"));
                }
                if let Self::Geomspace { start, stop, .. } = self {
                    if *start == 0.0 || *stop == 0.0 || start.signum() != stop.signum() {
                        return Err(invalid_spec!(
                            "axis '{name}': geomspace start and stop must share a sign and be non-zero"
                        ));
                    }
                }
            }
            Self::QUniform { q, .. } | Self::QNormal { q, .. } => {
                if *q <= 0.0 {
                    return Err(invalid_spec!("axis '{name}': q must be > 0"));
                }
            }
            Self::QLogUniform { low, q, .. } => {
                if *q <= 0.0 {
                    return Err(invalid_spec!("axis '{name}': q must be > 0"));
                }
                if *low <= 0.0 {
                    return Err(invalid_spec!("axis '{name}': loguniform low must be > 0"));
                }
            }
            Self::QLogNormal { q, .. } => {
                if *q <= 0.0 {
                    return Err(invalid_spec!("axis '{name}': q must be > 0"));
                }
            }
            Self::Uniform { .. } | Self::Normal { .. } | Self::LogNormal { .. } => {}
            Self::LogUniform { low, .. } => {
                if *low <= 0.0 {
                    return Err(invalid_spec!("axis '{name}': loguniform low must be > 0"));
                }
            }
        }
        Ok(())
    }

    pub fn is_materialisable(&self) -> bool {
        matches!(
            self,
            Self::Values(_)
                | Self::PValues(_)
                | Self::Range { .. }
                | Self::Linspace { .. }
                | Self::Logspace { .. }
                | Self::Geomspace { .. }
        )
    }

    /// True only for `values` carrying non-numeric payload, or `pvalues`
    /// (values carrying any non-numeric payload, or pvalues).
    pub fn is_categorical(&self) -> bool {
        match self {
            Self::Values(values) => values.iter().any(|v| !v.is_numeric()),
            Self::PValues(_) => true,
            _ => false,
        }
    }

    /// `(lo, hi)` for numeric kinds; `None` for categorical `values`/`pvalues`.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            Self::Values(values) => {
                let nums: Vec<f64> = values.iter().filter_map(|v| v.as_f64()).collect();
                if nums.len() != values.len() || nums.is_empty() {
                    None
                } else {
                    let lo = nums.iter().cloned().fold(f64::INFINITY, f64::min);
                    let hi = nums.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                    Some((lo, hi))
                }
            }
            Self::PValues(_) => None,
            Self::Range { start, stop, .. } => {
                let (a, b) = (*start as f64, *stop as f64);
                Some((a.min(b), a.max(b)))
            }
            Self::Linspace { start, stop, .. } => Some((start.min(*stop), start.max(*stop))),
            Self::Logspace { start, stop, .. } => {
                let (a, b) = (10f64.powf(*start), 10f64.powf(*stop));
                Some((a.min(b), a.max(b)))
            }
            Self::Geomspace { start, stop, .. } => Some((start.min(*stop), start.max(*stop))),
            Self::Uniform { low, high } | Self::QUniform { low, high, .. } => Some((*low, *high)),
            Self::LogUniform { low, high } | Self::QLogUniform { low, high, .. } => {
                Some((*low, *high))
            }
            Self::Normal { mu, sigma } | Self::QNormal { mu, sigma, .. } => {
                Some((mu - 4.0 * sigma, mu + 4.0 * sigma))
            }
            Self::LogNormal { mu, sigma } | Self::QLogNormal { mu, sigma, .. } => {
                Some(((mu - 4.0 * sigma).exp(), (mu + 4.0 * sigma).exp()))
            }
        }
    }

    /// Expands the axis into its finite value list. Errors for
    /// non-materialisable kinds.
    pub fn materialise(&self) -> HpResult<Vec<ScalarValue>> {
        match self {
            Self::Values(values) => Ok(values.clone()),
            Self::PValues(pairs) => Ok(pairs.iter().map(|(v, _)| v.clone()).collect()),
            Self::Range { start, stop, step } => {
                let mut out = Vec::new();
                let mut cur = *start;
                if *step > 0 {
                    while cur < *stop {
                        out.push(ScalarValue::Int(cur));
                        cur += step;
                    }
                } else {
                    while cur > *stop {
                        out.push(ScalarValue::Int(cur));
                        cur += step;
                    }
                }
                Ok(out)
            }
            Self::Linspace { start, stop, count } => Ok(linspace(*start, *stop, *count)
                .into_iter()
                .map(ScalarValue::Float)
                .collect()),
            Self::Logspace { start, stop, count } => Ok(linspace(*start, *stop, *count)
                .into_iter()
                .map(|x| ScalarValue::Float(10f64.powf(x)))
                .collect()),
            Self::Geomspace { start, stop, count } => {
                let log_start = start.abs().ln();
                let log_stop = stop.abs().ln();
                let sign = start.signum();
                Ok(linspace(log_start, log_stop, *count)
                    .into_iter()
                    .map(|x| ScalarValue::Float(sign * x.exp()))
                    .collect())
            }
            _ => Err(invalid_spec!("axis is not materialisable")),
        }
    }

    /// Draws one value using the injected random source.
    pub fn sample(&self, rng: &mut dyn RngCore) -> ScalarValue {
        use rand::Rng;
        match self {
            Self::Values(values) => values[rng.gen_range(0..values.len())].clone(),
            Self::PValues(pairs) => {
                let mut draw = rng.gen::<f64>();
                for (value, p) in pairs {
                    if draw < *p {
                        return value.clone();
                    }
                    draw -= p;
                }
                pairs.last().unwrap().0.clone()
            }
            Self::Range { .. } | Self::Linspace { .. } | Self::Logspace { .. } | Self::Geomspace { .. } => {
                let values = self.materialise().unwrap_or_default();
                if values.is_empty() {
                    ScalarValue::Float(0.0)
                } else {
                    values[rng.gen_range(0..values.len())].clone()
                }
            }
            Self::Uniform { low, high } => ScalarValue::Float(rng.gen_range(*low..=*high)),
            Self::QUniform { low, high, q } => {
                ScalarValue::Float(quantize(rng.gen_range(*low..=*high), *q))
            }
            Self::LogUniform { low, high } => {
                let (lo, hi) = (low.ln(), high.ln());
                ScalarValue::Float(rng.gen_range(lo..=hi).exp())
            }
            Self::QLogUniform { low, high, q } => {
                let (lo, hi) = (low.ln(), high.ln());
                ScalarValue::Float(quantize(rng.gen_range(lo..=hi).exp(), *q))
            }
            Self::Normal { mu, sigma } => ScalarValue::Float(mu + sigma * sample_standard_normal(rng)),
            Self::QNormal { mu, sigma, q } => {
                ScalarValue::Float(quantize(mu + sigma * sample_standard_normal(rng), *q))
            }
            Self::LogNormal { mu, sigma } => {
                ScalarValue::Float((mu + sigma * sample_standard_normal(rng)).exp())
            }
            Self::QLogNormal { mu, sigma, q } => {
                ScalarValue::Float(quantize((mu + sigma * sample_standard_normal(rng)).exp(), *q))
            }
        }
    }
}

fn quantize(raw: f64, q: f64) -> f64 {
    (raw / q).round() * q
}

/// `n` evenly spaced values over `[a, b]` inclusive. `n == 1` yields `[a]`.
fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![a];
    }
    (0..n)
        .map(|i| a + (b - a) * (i as f64) / ((n - 1) as f64))
        .collect()
}

/// Draws a standard normal deviate from the injected RNG.
fn sample_standard_normal(rng: &mut dyn RngCore) -> f64 {
    StandardNormal.sample(rng)
}

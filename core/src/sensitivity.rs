//! Sensitivity harness: one-at-a-time sweeps and Latin hypercube
//! sampling, summarised as rank-correlation (tornado) tables.
//!
//! Every sample is one full construct → run → reduce cycle on its own
//! model instance. Samples share nothing, so they run on the rayon pool;
//! results come back in input order and are identical to a sequential
//! run.

use crate::{
    config::ModelConfig,
    engine::simulate,
    error::{SimError, SimResult},
    model::AiWorldModel,
    rng::RngBank,
    stats,
    timeseries::TimeSeries,
    types::Years,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const DEFAULT_SWEEP_HORIZON: Years = 100.0;
pub const DEFAULT_SWEEP_DT: Years = 0.5;
pub const DEFAULT_LHS_SEED: u64 = 42;

/// Stability at or below this counts as societal collapse.
pub const STABILITY_COLLAPSE_LEVEL: f64 = 0.01;
/// Environment at or below this counts as ecological collapse.
pub const ENVIRONMENT_COLLAPSE_LEVEL: f64 = 0.1;
/// Resources at or below this count as depleted.
pub const RESOURCE_DEPLETION_LEVEL: f64 = 1.0;

pub const DEFAULT_OAT_RANGES: &[(&str, &[f64])] = &[
    ("automation_speed",    &[0.02, 0.03, 0.04, 0.05, 0.06, 0.08, 0.10]),
    ("churn_rate",          &[0.0, 0.005, 0.01, 0.015, 0.02, 0.03]),
    ("retrain_rate",        &[0.0, 0.01, 0.02, 0.03, 0.05, 0.08]),
    ("job_creation_rate",   &[0.005, 0.01, 0.015, 0.02, 0.03, 0.04]),
    ("stability_threshold", &[0.0, 0.3, 0.5, 0.7, 0.85, 0.95]),
    ("emission_rate",       &[0.0002, 0.0005, 0.0008, 0.0012, 0.002]),
    ("resource_use_rate",   &[0.01, 0.03, 0.05, 0.10, 0.15]),
];

pub const DEFAULT_LHS_RANGES: &[(&str, (f64, f64))] = &[
    ("automation_speed",          (0.02, 0.10)),
    ("churn_rate",                (0.0, 0.03)),
    ("retrain_rate",              (0.0, 0.08)),
    ("job_creation_rate",         (0.005, 0.04)),
    ("job_creation_saturation",   (20.0, 200.0)),
    ("mismatch_fraction",         (0.0, 0.8)),
    ("stability_threshold",       (0.0, 0.95)),
    ("emission_rate",             (0.0002, 0.002)),
    ("resource_use_rate",         (0.01, 0.15)),
    ("emission_improvement_rate", (0.0, 0.01)),
    ("resource_efficiency_rate",  (0.0, 0.01)),
];

// ── Metrics ────────────────────────────────────────────────────────

/// Scalar summary of one run.
///
/// Collapse years are the first record time at which the threshold is
/// crossed, or +∞ when it never is (serialised as `null`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RunMetrics {
    pub final_stability:         f64,
    #[serde(rename = "final_K_ai")]
    pub final_k_ai:              f64,
    pub final_output:            f64,
    pub final_environment:       f64,
    pub final_resources:         f64,
    pub final_unemployment_rate: f64,
    pub final_tax_rate:          f64,
    pub min_stability:           f64,
    pub max_unemployment_rate:   f64,
    #[serde(rename = "peak_K_ai")]
    pub peak_k_ai:               f64,
    pub min_environment:         f64,
    #[serde(with = "never_as_null")]
    pub stability_collapse_year: Years,
    #[serde(with = "never_as_null")]
    pub env_collapse_year:       Years,
    #[serde(with = "never_as_null")]
    pub resource_depletion_year: Years,
}

mod never_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(year: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if year.is_finite() {
            serializer.serialize_some(year)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// Reduce a run's time series to its summary metrics.
pub fn extract_metrics(series: &TimeSeries) -> SimResult<RunMetrics> {
    let last = series.last().ok_or(SimError::EmptyTimeSeries)?;
    let never = f64::INFINITY;

    Ok(RunMetrics {
        final_stability:         last.stability,
        final_k_ai:              last.k_ai,
        final_output:            last.output,
        final_environment:       last.environment,
        final_resources:         last.resources,
        final_unemployment_rate: last.unemployment_rate,
        final_tax_rate:          last.tax_rate,
        min_stability:           series.min_of(|r| r.stability).unwrap_or(last.stability),
        max_unemployment_rate:   series
            .max_of(|r| r.unemployment_rate)
            .unwrap_or(last.unemployment_rate),
        peak_k_ai:               series.max_of(|r| r.k_ai).unwrap_or(last.k_ai),
        min_environment:         series.min_of(|r| r.environment).unwrap_or(last.environment),
        stability_collapse_year: series
            .first_time_where(|r| r.stability <= STABILITY_COLLAPSE_LEVEL)
            .unwrap_or(never),
        env_collapse_year:       series
            .first_time_where(|r| r.environment <= ENVIRONMENT_COLLAPSE_LEVEL)
            .unwrap_or(never),
        resource_depletion_year: series
            .first_time_where(|r| r.resources <= RESOURCE_DEPLETION_LEVEL)
            .unwrap_or(never),
    })
}

/// Typed handle on one `RunMetrics` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    FinalStability,
    FinalKAi,
    FinalOutput,
    FinalEnvironment,
    FinalResources,
    FinalUnemploymentRate,
    FinalTaxRate,
    MinStability,
    MaxUnemploymentRate,
    PeakKAi,
    MinEnvironment,
    StabilityCollapseYear,
    EnvCollapseYear,
    ResourceDepletionYear,
}

impl Metric {
    pub const ALL: [Metric; 14] = [
        Metric::FinalStability,
        Metric::FinalKAi,
        Metric::FinalOutput,
        Metric::FinalEnvironment,
        Metric::FinalResources,
        Metric::FinalUnemploymentRate,
        Metric::FinalTaxRate,
        Metric::MinStability,
        Metric::MaxUnemploymentRate,
        Metric::PeakKAi,
        Metric::MinEnvironment,
        Metric::StabilityCollapseYear,
        Metric::EnvCollapseYear,
        Metric::ResourceDepletionYear,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::FinalStability        => "final_stability",
            Self::FinalKAi              => "final_K_ai",
            Self::FinalOutput           => "final_output",
            Self::FinalEnvironment      => "final_environment",
            Self::FinalResources        => "final_resources",
            Self::FinalUnemploymentRate => "final_unemployment_rate",
            Self::FinalTaxRate          => "final_tax_rate",
            Self::MinStability          => "min_stability",
            Self::MaxUnemploymentRate   => "max_unemployment_rate",
            Self::PeakKAi               => "peak_K_ai",
            Self::MinEnvironment        => "min_environment",
            Self::StabilityCollapseYear => "stability_collapse_year",
            Self::EnvCollapseYear       => "env_collapse_year",
            Self::ResourceDepletionYear => "resource_depletion_year",
        }
    }

    pub fn value(&self, m: &RunMetrics) -> f64 {
        match self {
            Self::FinalStability        => m.final_stability,
            Self::FinalKAi              => m.final_k_ai,
            Self::FinalOutput           => m.final_output,
            Self::FinalEnvironment      => m.final_environment,
            Self::FinalResources        => m.final_resources,
            Self::FinalUnemploymentRate => m.final_unemployment_rate,
            Self::FinalTaxRate          => m.final_tax_rate,
            Self::MinStability          => m.min_stability,
            Self::MaxUnemploymentRate   => m.max_unemployment_rate,
            Self::PeakKAi               => m.peak_k_ai,
            Self::MinEnvironment        => m.min_environment,
            Self::StabilityCollapseYear => m.stability_collapse_year,
            Self::EnvCollapseYear       => m.env_collapse_year,
            Self::ResourceDepletionYear => m.resource_depletion_year,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| SimError::UnknownParameter { name: s.to_string() })
    }
}

// ── Records ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OatRecord {
    pub param:   String,
    pub value:   f64,
    #[serde(flatten)]
    pub metrics: RunMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LhsRecord {
    pub sample_id: usize,
    /// Sampled values, in the order the ranges were given.
    pub params:    Vec<(String, f64)>,
    pub metrics:   RunMetrics,
}

impl LhsRecord {
    pub fn param(&self, name: &str) -> Option<f64> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrelationRecord {
    pub parameter:       String,
    pub correlation:     f64,
    pub abs_correlation: f64,
    pub p_value:         f64,
}

// ── One-at-a-time sweeps ───────────────────────────────────────────

fn run_metrics(config: ModelConfig, horizon: Years, dt: Years) -> SimResult<RunMetrics> {
    let series = simulate(AiWorldModel::new(config), horizon, dt)?;
    extract_metrics(&series)
}

/// Vary `param` over `values`, holding everything else at `base`.
/// One record per value, in the order given.
pub fn oat_sweep(
    base: &ModelConfig,
    param: &str,
    values: &[f64],
    horizon: Years,
    dt: Years,
) -> SimResult<Vec<OatRecord>> {
    // Reject a bad name before spending any runs.
    base.get(param)?;

    values
        .par_iter()
        .map(|&value| -> SimResult<OatRecord> {
            let mut config = base.clone();
            config.set(param, value)?;
            log::debug!("oat sample: {param}={value}");
            Ok(OatRecord {
                param: param.to_string(),
                value,
                metrics: run_metrics(config, horizon, dt)?,
            })
        })
        .collect()
}

/// `oat_sweep` for each `(param, values)` pair, concatenated in order.
pub fn multi_oat_sweep(
    base: &ModelConfig,
    ranges: &[(&str, &[f64])],
    horizon: Years,
    dt: Years,
) -> SimResult<Vec<OatRecord>> {
    let mut records = Vec::new();
    for (param, values) in ranges {
        records.extend(oat_sweep(base, param, values, horizon, dt)?);
    }
    Ok(records)
}

// ── Latin hypercube sampling ───────────────────────────────────────

/// `n_samples` points in the unit hypercube, indexed `[sample][dim]`.
///
/// Each dimension is cut into `n_samples` equal strata; every stratum
/// is hit exactly once, in an independent random order per dimension,
/// at a uniform position inside the stratum.
pub fn latin_hypercube(n_samples: usize, n_dims: usize, seed: u64) -> Vec<Vec<f64>> {
    let bank = RngBank::new(seed);
    let mut unit = vec![vec![0.0; n_dims]; n_samples];
    let n = n_samples as f64;

    for dim in 0..n_dims {
        let mut rng = bank.for_dimension(dim);
        let strata = rng.permutation(n_samples);
        for (row, stratum) in unit.iter_mut().zip(strata) {
            row[dim] = (stratum as f64 + rng.next_f64()) / n;
        }
    }
    unit
}

/// Latin hypercube sample of `ranges`, one full run per sample.
///
/// Parameters not named in `ranges` stay at `base`. Deterministic for a
/// given `seed`.
pub fn lhs_sample(
    base: &ModelConfig,
    ranges: &[(&str, (f64, f64))],
    n_samples: usize,
    horizon: Years,
    dt: Years,
    seed: u64,
) -> SimResult<Vec<LhsRecord>> {
    for &(name, (min, max)) in ranges {
        base.get(name)?;
        if !(min.is_finite() && max.is_finite() && min <= max) {
            return Err(SimError::InvalidRange { name: name.to_string(), min, max });
        }
    }

    let unit = latin_hypercube(n_samples, ranges.len(), seed);
    log::debug!("lhs: {n_samples} samples over {} parameters, seed={seed}", ranges.len());

    unit.par_iter()
        .enumerate()
        .map(|(sample_id, row)| -> SimResult<LhsRecord> {
            let mut config = base.clone();
            let mut params = Vec::with_capacity(ranges.len());
            for (&(name, (lo, hi)), u) in ranges.iter().zip(row) {
                let value = lo + u * (hi - lo);
                config.set(name, value)?;
                params.push((name.to_string(), value));
            }
            Ok(LhsRecord {
                sample_id,
                params,
                metrics: run_metrics(config, horizon, dt)?,
            })
        })
        .collect()
}

/// Spearman correlation of each parameter with `metric`, strongest first.
///
/// Parameters whose correlation is undefined (constant input or output)
/// sort last.
pub fn rank_correlations(
    records: &[LhsRecord],
    param_names: &[&str],
    metric: Metric,
) -> SimResult<Vec<CorrelationRecord>> {
    let metric_values: Vec<f64> = records.iter().map(|r| metric.value(&r.metrics)).collect();

    let mut rows = Vec::with_capacity(param_names.len());
    for &name in param_names {
        let param_values = records
            .iter()
            .map(|r| r.param(name).ok_or_else(|| SimError::UnknownParameter { name: name.to_string() }))
            .collect::<SimResult<Vec<f64>>>()?;
        let (correlation, p_value) = stats::spearman(&param_values, &metric_values);
        rows.push(CorrelationRecord {
            parameter: name.to_string(),
            correlation,
            abs_correlation: correlation.abs(),
            p_value,
        });
    }

    let sort_key = |r: &CorrelationRecord| {
        if r.abs_correlation.is_nan() { -1.0 } else { r.abs_correlation }
    };
    rows.sort_by(|a, b| sort_key(b).total_cmp(&sort_key(a)));
    Ok(rows)
}

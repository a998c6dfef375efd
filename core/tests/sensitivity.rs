//! Sensitivity harness: metric extraction, OAT sweeps, LHS, tornado ranking.

use aiworld_core::{
    config::ModelConfig,
    engine::simulate,
    error::SimError,
    model::AiWorldModel,
    scenarios::Scenario,
    sensitivity::{
        extract_metrics, latin_hypercube, lhs_sample, multi_oat_sweep, oat_sweep,
        rank_correlations, LhsRecord, Metric, RunMetrics, DEFAULT_LHS_RANGES,
    },
    stats,
    timeseries::TimeSeries,
};

fn metrics_for(scenario: Scenario, horizon: f64) -> RunMetrics {
    let series = simulate(AiWorldModel::new(scenario.config()), horizon, 1.0).expect("run");
    extract_metrics(&series).expect("metrics")
}

// ── Metrics ────────────────────────────────────────────────────────

#[test]
fn empty_series_has_no_metrics() {
    let err = extract_metrics(&TimeSeries::new()).unwrap_err();
    assert!(matches!(err, SimError::EmptyTimeSeries));
}

#[test]
fn metrics_summarise_the_series() {
    let series = simulate(AiWorldModel::default(), 30.0, 1.0).expect("run");
    let m = extract_metrics(&series).expect("metrics");
    let last = series.last().expect("records");

    assert_eq!(m.final_stability, last.stability);
    assert_eq!(m.final_k_ai, last.k_ai);
    assert_eq!(m.final_resources, last.resources);
    assert_eq!(m.min_stability, series.min_of(|r| r.stability).expect("records"));
    assert_eq!(m.peak_k_ai, series.max_of(|r| r.k_ai).expect("records"));
    assert!(m.min_stability <= m.final_stability);
}

#[test]
fn collapse_years_mark_first_crossing() {
    let collapsed = metrics_for(Scenario::LaissezFaire, 200.0);
    assert!(collapsed.stability_collapse_year.is_finite());
    assert!(collapsed.stability_collapse_year > 0.0);

    let sustained = metrics_for(Scenario::GreenTransition, 150.0);
    assert_eq!(sustained.stability_collapse_year, f64::INFINITY);
    assert_eq!(sustained.env_collapse_year, f64::INFINITY);
    assert_eq!(sustained.resource_depletion_year, f64::INFINITY);

    let extracted = metrics_for(Scenario::Extraction, 100.0);
    assert!(extracted.env_collapse_year.is_finite());
}

#[test]
fn metric_names_parse_back() {
    for metric in Metric::ALL {
        assert_eq!(metric.name().parse::<Metric>().expect("known metric"), metric);
    }
    assert!("final_happiness".parse::<Metric>().is_err());
}

#[test]
fn never_reached_collapse_serialises_as_null() {
    let m = metrics_for(Scenario::GreenTransition, 50.0);
    let json = serde_json::to_value(m).expect("serialise");
    assert!(json["stability_collapse_year"].is_null());
    let back: RunMetrics = serde_json::from_value(json).expect("deserialise");
    assert_eq!(back.stability_collapse_year, f64::INFINITY);
}

// ── OAT ────────────────────────────────────────────────────────────

#[test]
fn churn_lowers_final_stability() {
    let base = Scenario::GreenTransition.config();
    let values = [0.0, 0.01, 0.02, 0.03];
    let records = oat_sweep(&base, "churn_rate", &values, 50.0, 0.5).expect("sweep");

    assert_eq!(records.len(), values.len());
    for (record, value) in records.iter().zip(values) {
        assert_eq!(record.param, "churn_rate");
        assert_eq!(record.value, value);
    }
    for pair in records.windows(2) {
        assert!(
            pair[1].metrics.final_stability < pair[0].metrics.final_stability,
            "stability should fall as churn rises: {} -> {}",
            pair[0].metrics.final_stability,
            pair[1].metrics.final_stability,
        );
    }

    let stability: Vec<f64> = records.iter().map(|r| r.metrics.final_stability).collect();
    let (rho, _) = stats::spearman(&values, &stability);
    assert!(rho < 0.0, "expected negative correlation, got {rho}");
}

#[test]
fn multi_sweep_concatenates_in_order() {
    let base = ModelConfig::default();
    let ranges: &[(&str, &[f64])] = &[
        ("retrain_rate", &[0.0, 0.05]),
        ("emission_rate", &[0.0005, 0.001, 0.002]),
    ];
    let records = multi_oat_sweep(&base, ranges, 10.0, 1.0).expect("sweep");
    let labels: Vec<(&str, f64)> = records.iter().map(|r| (r.param.as_str(), r.value)).collect();
    assert_eq!(
        labels,
        vec![
            ("retrain_rate", 0.0),
            ("retrain_rate", 0.05),
            ("emission_rate", 0.0005),
            ("emission_rate", 0.001),
            ("emission_rate", 0.002),
        ]
    );
}

#[test]
fn sweep_matches_individual_runs() {
    let base = ModelConfig::default();
    let values = [0.01, 0.03, 0.05];
    let records = oat_sweep(&base, "job_creation_rate", &values, 20.0, 0.5).expect("sweep");
    for (record, value) in records.iter().zip(values) {
        let mut config = base.clone();
        config.set("job_creation_rate", value).expect("known parameter");
        let series = simulate(AiWorldModel::new(config), 20.0, 0.5).expect("run");
        assert_eq!(record.metrics, extract_metrics(&series).expect("metrics"));
    }
}

#[test]
fn oat_rejects_unknown_parameter() {
    let err = oat_sweep(&ModelConfig::default(), "warp_factor", &[1.0], 10.0, 1.0).unwrap_err();
    assert!(matches!(err, SimError::UnknownParameter { .. }));
}

// ── LHS ────────────────────────────────────────────────────────────

#[test]
fn hypercube_hits_every_stratum_once() {
    let n = 16;
    let unit = latin_hypercube(n, 3, 7);
    assert_eq!(unit.len(), n);
    for dim in 0..3 {
        let mut strata: Vec<usize> = unit.iter().map(|row| (row[dim] * n as f64) as usize).collect();
        strata.sort_unstable();
        assert_eq!(strata, (0..n).collect::<Vec<_>>(), "dimension {dim}");
    }
}

#[test]
fn lhs_samples_stay_within_ranges() {
    let records = lhs_sample(&ModelConfig::default(), DEFAULT_LHS_RANGES, 12, 10.0, 1.0, 42)
        .expect("lhs");
    assert_eq!(records.len(), 12);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.sample_id, i);
        assert_eq!(record.params.len(), DEFAULT_LHS_RANGES.len());
        for &(name, (lo, hi)) in DEFAULT_LHS_RANGES {
            let v = record.param(name).expect("sampled parameter");
            assert!(v >= lo && v <= hi, "{name}={v} outside [{lo}, {hi}]");
        }
    }
}

#[test]
fn lhs_is_deterministic_for_a_seed() {
    let base = ModelConfig::default();
    let ranges = &DEFAULT_LHS_RANGES[..3];
    let a = lhs_sample(&base, ranges, 8, 10.0, 1.0, 42).expect("lhs a");
    let b = lhs_sample(&base, ranges, 8, 10.0, 1.0, 42).expect("lhs b");
    let c = lhs_sample(&base, ranges, 8, 10.0, 1.0, 43).expect("lhs c");
    assert_eq!(a, b);
    assert_ne!(a, c, "different seeds should sample differently");
}

#[test]
fn lhs_rejects_bad_ranges() {
    let base = ModelConfig::default();
    let inverted = lhs_sample(&base, &[("churn_rate", (0.03, 0.0))], 4, 10.0, 1.0, 1).unwrap_err();
    assert!(matches!(inverted, SimError::InvalidRange { .. }));
    let unknown = lhs_sample(&base, &[("flux", (0.0, 1.0))], 4, 10.0, 1.0, 1).unwrap_err();
    assert!(matches!(unknown, SimError::UnknownParameter { .. }));
}

// ── Rank correlations ──────────────────────────────────────────────

fn synthetic_records() -> Vec<LhsRecord> {
    let template = metrics_for(Scenario::Nordic, 5.0);
    let wobble = [0.3, -0.2, 0.5, 0.0, -0.4, 0.1, 0.2, -0.1];
    (0..8)
        .map(|i| {
            let x = i as f64;
            let mut metrics = template;
            metrics.final_stability = -x;
            LhsRecord {
                sample_id: i,
                params: vec![
                    ("flat".to_string(), 1.0),
                    ("noisy".to_string(), x + 4.0 * wobble[i]),
                    ("strong".to_string(), x),
                ],
                metrics,
            }
        })
        .collect()
}

#[test]
fn correlations_come_back_in_tornado_order() {
    let records = synthetic_records();
    let rows = rank_correlations(&records, &["flat", "noisy", "strong"], Metric::FinalStability)
        .expect("correlations");

    let order: Vec<&str> = rows.iter().map(|r| r.parameter.as_str()).collect();
    assert_eq!(order, vec!["strong", "noisy", "flat"]);

    assert_eq!(rows[0].correlation, -1.0);
    assert_eq!(rows[0].abs_correlation, 1.0);
    assert_eq!(rows[0].p_value, 0.0);
    assert!(rows[1].correlation < 0.0 && rows[1].abs_correlation < 1.0);
    assert!(rows[2].correlation.is_nan(), "constant input has no rank correlation");
}

#[test]
fn correlations_reject_unsampled_parameter() {
    let records = synthetic_records();
    let err = rank_correlations(&records, &["strong", "ghost"], Metric::FinalStability).unwrap_err();
    assert!(matches!(err, SimError::UnknownParameter { ref name } if name == "ghost"));
}

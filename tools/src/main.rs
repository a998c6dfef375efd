//! sim-runner: headless runner for the AI-World model.
//!
//! Usage:
//!   sim-runner nordic --t-end 200 --dt 0.5 --output nordic.csv
//!   sim-runner custom --params params.json --churn-rate 0.02 --db runs.db
//!   sim-runner green-transition --sensitivity-oat --sensitivity-lhs 200 --seed 7
//!
//! `RUST_LOG=debug` shows run and sweep progress.

mod export;

use aiworld_core::{
    config::{ModelConfig, ParameterOverrides},
    engine::Simulator,
    model::AiWorldModel,
    scenarios::{self, Scenario},
    sensitivity::{self, Metric, RunMetrics, DEFAULT_LHS_RANGES, DEFAULT_OAT_RANGES},
    store::SimStore,
    timeseries::TimeSeries,
    types::{RunId, Years},
};
use anyhow::{bail, Result};
use std::env;

/// Resources at or below this are reported as depleted in the run summary.
const SUMMARY_DEPLETION_LEVEL: f64 = 0.01;

/// Coefficient flags accepted by the `custom` scenario, and the parameter
/// each one sets.
const CUSTOM_FLAGS: &[(&str, &str)] = &[
    ("--k-ai",                      "K_ai"),
    ("--labor-u",                   "Labor_U"),
    ("--stability",                 "Stability"),
    ("--public-pool",               "Public_Pool"),
    ("--automation-speed",          "automation_speed"),
    ("--churn-rate",                "churn_rate"),
    ("--job-creation-rate",         "job_creation_rate"),
    ("--retrain-rate",              "retrain_rate"),
    ("--depreciation",              "depreciation"),
    ("--stability-threshold",       "stability_threshold"),
    ("--base-tax",                  "base_tax"),
    ("--max-tax",                   "max_tax"),
    ("--env-initial",               "Environment"),
    ("--env-emission-rate",         "emission_rate"),
    ("--env-emission-improvement",  "emission_improvement_rate"),
    ("--env-absorption",            "absorption_capacity"),
    ("--green-investment-factor",   "green_investment_factor"),
    ("--env-output-sensitivity",    "env_output_sensitivity"),
    ("--env-stability-sensitivity", "env_stability_sensitivity"),
    ("--resource-initial",          "Resources"),
    ("--resource-use-rate",         "resource_use_rate"),
    ("--resource-efficiency-rate",  "resource_efficiency_rate"),
    ("--resource-scarcity-factor",  "resource_scarcity_factor"),
];

/// Sweeps never step finer than this.
const MIN_SENSITIVITY_DT: Years = 0.5;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(scenario) = args.get(1).filter(|a| !a.starts_with("--")).cloned() else {
        print_usage();
        bail!("missing scenario name");
    };

    let t_end = parse_arg(&args, "--t-end", 100.0f64);
    let dt = parse_arg(&args, "--dt", 0.1f64);
    let seed = parse_arg(&args, "--seed", sensitivity::DEFAULT_LHS_SEED);
    let lhs_samples = parse_arg(&args, "--sensitivity-lhs", 0usize);
    let run_oat = args.iter().any(|a| a == "--sensitivity-oat");
    let output = string_arg(&args, "--output");
    let db = string_arg(&args, "--db");
    let sensitivity_output = string_arg(&args, "--sensitivity-output");

    let config = build_config(&scenario, &args)?;

    println!("AI-World sim-runner");
    println!("  scenario:  {scenario}");
    println!("  t_end:     {t_end}");
    println!("  dt:        {dt}");
    if let Some(db) = db {
        println!("  db:        {db}");
    }

    // ── Standard simulation ──
    let mut sim = Simulator::new(AiWorldModel::new(config.clone()));
    let series = sim.run(t_end, dt)?;
    let metrics = sensitivity::extract_metrics(&series)?;
    print_summary(&series, &metrics);

    if let Some(path) = output {
        export::write_timeseries(path, &series)?;
        println!("\nResults saved to {path}");
    }

    let store = match db {
        Some(path) => {
            let store = SimStore::open(path)?;
            store.migrate()?;
            Some(store)
        }
        None => None,
    };
    let run_id: RunId = format!("run-{}", uuid::Uuid::new_v4());
    if let Some(store) = &store {
        let started_at = chrono::Utc::now().to_rfc3339();
        store.insert_run(&run_id, &scenario, t_end, dt, &config, &started_at)?;
        store.append_records(&run_id, &series)?;
        println!("Run {run_id} stored ({} records)", store.record_count(&run_id)?);
    }

    // ── Sensitivity analysis ──
    if !run_oat && lhs_samples == 0 {
        return Ok(());
    }
    let base = config.without_functions();
    let sweep_dt = dt.max(MIN_SENSITIVITY_DT);
    if sweep_dt != dt {
        log::info!("sensitivity runs use dt={sweep_dt} instead of {dt}");
    }

    if run_oat {
        println!("\n--- OAT Sensitivity Sweeps ---");
        let records = sensitivity::multi_oat_sweep(&base, DEFAULT_OAT_RANGES, t_end, sweep_dt)?;
        for (param, _) in DEFAULT_OAT_RANGES {
            let line = records
                .iter()
                .filter(|r| r.param == *param)
                .map(|r| format!("{}→{:.3}", r.value, r.metrics.final_stability))
                .collect::<Vec<_>>()
                .join("  ");
            println!("  {param:<20} {line}");
        }
        if let Some(path) = sensitivity_output {
            let path = path.replace(".csv", "_oat.csv");
            export::write_oat(&path, &records)?;
            println!("OAT results saved to {path}");
        }
        if let Some(store) = &store {
            store.append_oat(&run_id, &records)?;
        }
    }

    if lhs_samples > 0 {
        println!("\n--- LHS Sensitivity ({lhs_samples} samples) ---");
        let records = sensitivity::lhs_sample(
            &base, DEFAULT_LHS_RANGES, lhs_samples, t_end, sweep_dt, seed,
        )?;
        let names: Vec<&str> = DEFAULT_LHS_RANGES.iter().map(|(name, _)| *name).collect();
        let correlations = sensitivity::rank_correlations(&records, &names, Metric::FinalStability)?;

        println!("  {:<26} {:>12} {:>12} {:>10}", "parameter", "correlation", "|corr|", "p_value");
        for c in &correlations {
            println!(
                "  {:<26} {:>12.4} {:>12.4} {:>10.4}",
                c.parameter, c.correlation, c.abs_correlation, c.p_value
            );
        }
        if let Some(path) = sensitivity_output {
            let lhs_path = path.replace(".csv", "_lhs.csv");
            let corr_path = path.replace(".csv", "_corr.csv");
            export::write_lhs(&lhs_path, &records)?;
            export::write_correlations(&corr_path, &correlations)?;
            println!("LHS results saved to {lhs_path} and {corr_path}");
        }
        if let Some(store) = &store {
            store.append_lhs(&run_id, &records)?;
        }
    }

    Ok(())
}

/// Resolve the scenario name (or `custom` plus its flags) to a full config.
fn build_config(scenario: &str, args: &[String]) -> Result<ModelConfig> {
    if scenario != "custom" {
        let overrides = scenarios::lookup(scenario).map_err(|e| {
            let known: Vec<&str> = Scenario::ALL.iter().map(|s| s.name()).collect();
            anyhow::anyhow!("{e}; expected one of {} or custom", known.join(", "))
        })?;
        return Ok(ModelConfig::with_overrides(&overrides));
    }

    let overrides = match string_arg(args, "--params") {
        Some(path) => {
            log::info!("loading custom parameters from {path}");
            ParameterOverrides::load(path)?
        }
        None => ParameterOverrides::default(),
    };
    let mut config = ModelConfig::with_overrides(&overrides);
    // Flags win over the params file.
    for (flag, name) in CUSTOM_FLAGS {
        if let Some(raw) = string_arg(args, flag) {
            let value: f64 = raw
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid value for {flag}: {raw} ({e})"))?;
            config.set(name, value)?;
        }
    }
    Ok(config)
}

fn print_summary(series: &TimeSeries, m: &RunMetrics) {
    let Some(last) = series.last() else { return };
    let max_stability = series.max_of(|r| r.stability).unwrap_or(last.stability);

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  records:                 {}", series.len());
    println!("  final time:              {:.2}", last.time);
    println!("  final AI capital:        {:.2}", last.k_ai);
    println!("  final unemployed:        {:.4}", last.labor_u);
    println!("  final unemployment rate: {:.4}", last.unemployment_rate);
    println!("  labor force:             {:.2}", last.labor_force);
    println!("  final stability:         {:.4}", last.stability);
    println!("  final public pool:       {:.2}", last.public_pool);
    println!("  final tax rate:          {:.2}%", last.tax_rate * 100.0);
    println!("  final environment:       {:.4}", last.environment);
    println!("  final resources:         {:.1}", last.resources);
    println!("  min stability:           {:.4}", m.min_stability);
    println!("  max stability:           {:.4}", max_stability);
    println!("  max unemployment rate:   {:.4}", m.max_unemployment_rate);
    println!("  min environment:         {:.4}", m.min_environment);

    if m.stability_collapse_year.is_finite() {
        println!("  stability collapse at year:   {:.1}", m.stability_collapse_year);
    }
    if m.env_collapse_year.is_finite() {
        println!("  environment collapse at year: {:.1}", m.env_collapse_year);
    }
    if let Some(year) = summary_depletion_year(series) {
        println!("  resource depletion at year:   {year:.1}");
    }
}

/// First time resources are effectively exhausted. Stricter than the
/// sensitivity metric's depletion level.
fn summary_depletion_year(series: &TimeSeries) -> Option<Years> {
    series.first_time_where(|r| r.resources <= SUMMARY_DEPLETION_LEVEL)
}

fn print_usage() {
    eprintln!("usage: sim-runner <scenario|custom> [--t-end Y] [--dt Y] [--params FILE]");
    eprintln!("                  [--output CSV] [--db SQLITE]");
    eprintln!("                  [--sensitivity-oat] [--sensitivity-lhs N] [--seed S]");
    eprintln!("                  [--sensitivity-output CSV]");
    eprintln!("scenarios:");
    for s in Scenario::ALL {
        eprintln!("  {:<18} {}", s.name(), s.description());
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

//! CSV writers for run and sensitivity output.
//!
//! Plain comma-separated text with a header row. Floats use Rust's
//! shortest round-trip formatting; never-reached collapse years print
//! as `inf`.

use aiworld_core::{
    sensitivity::{CorrelationRecord, LhsRecord, Metric, OatRecord, RunMetrics},
    timeseries::{TimeSeries, COLUMNS},
};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};

fn create(path: &str) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Cannot create {path}"))?;
    Ok(BufWriter::new(file))
}

fn join<I: IntoIterator<Item = String>>(cells: I) -> String {
    cells.into_iter().collect::<Vec<_>>().join(",")
}

fn metric_header() -> impl Iterator<Item = String> {
    Metric::ALL.into_iter().map(|m| m.name().to_string())
}

fn metric_cells(metrics: &RunMetrics) -> impl Iterator<Item = String> + '_ {
    Metric::ALL.into_iter().map(move |m| m.value(metrics).to_string())
}

pub fn write_timeseries(path: &str, series: &TimeSeries) -> Result<()> {
    let mut out = create(path)?;
    writeln!(out, "{}", COLUMNS.join(","))?;
    for record in series {
        writeln!(out, "{}", join(record.values().iter().map(f64::to_string)))?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_oat(path: &str, records: &[OatRecord]) -> Result<()> {
    let mut out = create(path)?;
    let header = ["param".to_string(), "value".to_string()].into_iter().chain(metric_header());
    writeln!(out, "{}", join(header))?;
    for r in records {
        let row = [r.param.clone(), r.value.to_string()].into_iter().chain(metric_cells(&r.metrics));
        writeln!(out, "{}", join(row))?;
    }
    out.flush()?;
    Ok(())
}

/// One row per sample: id, each sampled parameter (in range order), metrics.
pub fn write_lhs(path: &str, records: &[LhsRecord]) -> Result<()> {
    let mut out = create(path)?;
    let Some(first) = records.first() else {
        out.flush()?;
        return Ok(());
    };
    let header = std::iter::once("sample_id".to_string())
        .chain(first.params.iter().map(|(name, _)| name.clone()))
        .chain(metric_header());
    writeln!(out, "{}", join(header))?;
    for r in records {
        let row = std::iter::once(r.sample_id.to_string())
            .chain(r.params.iter().map(|(_, v)| v.to_string()))
            .chain(metric_cells(&r.metrics));
        writeln!(out, "{}", join(row))?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_correlations(path: &str, rows: &[CorrelationRecord]) -> Result<()> {
    let mut out = create(path)?;
    writeln!(out, "parameter,correlation,abs_correlation,p_value")?;
    for r in rows {
        writeln!(out, "{},{},{},{}", r.parameter, r.correlation, r.abs_correlation, r.p_value)?;
    }
    out.flush()?;
    Ok(())
}

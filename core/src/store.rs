//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The simulator never touches storage; callers hand finished results here.

use rusqlite::{Connection, params};
use crate::{
    config::ModelConfig,
    error::{SimError, SimResult},
    sensitivity::{LhsRecord, OatRecord},
    timeseries::{TimeSeries, TimeSeriesRecord},
    types::Years,
};

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the results database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        scenario: &str,
        horizon: Years,
        dt: Years,
        config: &ModelConfig,
        started_at: &str,
    ) -> SimResult<()> {
        let config_json = serde_json::to_string(config)?;
        self.conn.execute(
            "INSERT INTO run (run_id, scenario, horizon, dt, config_json, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![run_id, scenario, horizon, dt, config_json, started_at],
        )?;
        Ok(())
    }

    /// `(scenario, horizon, dt)` of a registered run.
    pub fn run_info(&self, run_id: &str) -> SimResult<Option<(String, Years, Years)>> {
        let mut stmt = self.conn.prepare(
            "SELECT scenario, horizon, dt FROM run WHERE run_id = ?1"
        )?;
        let mut rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })?;
        Ok(rows.next().transpose()?)
    }

    // ── Time series ────────────────────────────────────────────

    /// Write every record of `series` in one transaction.
    pub fn append_records(&self, run_id: &str, series: &TimeSeries) -> SimResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO timeseries (
                    run_id, step, time, k_ai, labor_u, unemployment_rate, labor_force,
                    stability, public_pool, tax_rate, output, environment, resources,
                    resource_cost_multiplier
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
            )?;
            for (step, r) in series.iter().enumerate() {
                stmt.execute(params![
                    run_id,
                    step as i64,
                    r.time,
                    r.k_ai,
                    r.labor_u,
                    r.unemployment_rate,
                    r.labor_force,
                    r.stability,
                    r.public_pool,
                    r.tax_rate,
                    r.output,
                    r.environment,
                    r.resources,
                    r.resource_cost_multiplier,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn records_for_run(&self, run_id: &str) -> SimResult<TimeSeries> {
        let mut stmt = self.conn.prepare(
            "SELECT time, k_ai, labor_u, unemployment_rate, labor_force, stability,
                    public_pool, tax_rate, output, environment, resources,
                    resource_cost_multiplier
             FROM timeseries WHERE run_id = ?1
             ORDER BY step ASC"
        )?;
        let records = stmt.query_map(params![run_id], |row| {
            Ok(TimeSeriesRecord {
                time:                     row.get(0)?,
                k_ai:                     row.get(1)?,
                labor_u:                  row.get(2)?,
                unemployment_rate:        row.get(3)?,
                labor_force:              row.get(4)?,
                stability:                row.get(5)?,
                public_pool:              row.get(6)?,
                tax_rate:                 row.get(7)?,
                output:                   row.get(8)?,
                environment:              row.get(9)?,
                resources:                row.get(10)?,
                resource_cost_multiplier: row.get(11)?,
            })
        })?.collect::<Result<Vec<_>, _>>()?;
        Ok(TimeSeries::from(records))
    }

    pub fn record_count(&self, run_id: &str) -> SimResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM timeseries WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    // ── Sensitivity ────────────────────────────────────────────

    fn insert_sensitivity(
        &self, run_id: &str, kind: &str, label: &str, value: f64, record_json: &str,
    ) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO sensitivity (run_id, kind, label, value, record_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![run_id, kind, label, value, record_json],
        )?;
        Ok(())
    }

    pub fn append_oat(&self, run_id: &str, records: &[OatRecord]) -> SimResult<()> {
        for r in records {
            let json = serde_json::to_string(r)?;
            self.insert_sensitivity(run_id, "oat", &r.param, r.value, &json)?;
        }
        Ok(())
    }

    pub fn append_lhs(&self, run_id: &str, records: &[LhsRecord]) -> SimResult<()> {
        for r in records {
            let json = serde_json::to_string(r)?;
            let label = format!("sample_{}", r.sample_id);
            self.insert_sensitivity(run_id, "lhs", &label, r.sample_id as f64, &json)?;
        }
        Ok(())
    }

    fn sensitivity_json(&self, run_id: &str, kind: &str) -> SimResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT record_json FROM sensitivity
             WHERE run_id = ?1 AND kind = ?2
             ORDER BY id ASC"
        )?;
        let rows = stmt
            .query_map(params![run_id, kind], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn oat_records_for_run(&self, run_id: &str) -> SimResult<Vec<OatRecord>> {
        self.sensitivity_json(run_id, "oat")?
            .iter()
            .map(|json| serde_json::from_str(json).map_err(SimError::from))
            .collect()
    }

    pub fn lhs_records_for_run(&self, run_id: &str) -> SimResult<Vec<LhsRecord>> {
        self.sensitivity_json(run_id, "lhs")?
            .iter()
            .map(|json| serde_json::from_str(json).map_err(SimError::from))
            .collect()
    }
}

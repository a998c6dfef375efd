//! Labor subsystem: hybrid displacement, job creation, retraining.
//!
//! Displacement has two sources:
//!   - growth: only *new* capital displaces workers, at `automation_speed`
//!     per unit of capital growth rate; shrinking capital displaces nobody.
//!   - churn: background automation of a fixed share of the labor force.
//!
//! Job creation follows a Michaelis–Menten curve in effective output,
//! scaled by confidence (stability) and by a structural-mismatch penalty
//! taken from unemployment at the *start* of the step.
//!
//! Retraining is capped by both funding and institutional throughput.

use crate::subsystem::{FlowSubsystem, StepContext};

/// Floor on `dt` when turning a capital delta into a growth rate.
pub const MIN_GROWTH_DT: f64 = 1e-9;

pub struct LaborSubsystem;

impl FlowSubsystem for LaborSubsystem {
    fn name(&self) -> &'static str { "labor" }

    fn update(&self, ctx: &mut StepContext<'_>) {
        let p = ctx.params;
        let s = &mut *ctx.state;
        let dt = ctx.dt;
        let effective_output = ctx.flows.effective_output;

        let speed = p.automation_speed.evaluate(ctx.time, s.k_ai);

        let labor_force = p.labor_force_base + p.labor_force_k_sensitivity * s.k_ai;
        let unemployment_rate_prev = s.labor_u / labor_force.max(1.0);

        // ── Displacement ──────────────────────────────────────
        let capital_delta = s.k_ai - s.prev_k_ai;
        let growth_displacement = (capital_delta / dt.max(MIN_GROWTH_DT)).max(0.0) * speed;
        let churn_displacement = labor_force * p.churn_rate;
        let displacement = growth_displacement + churn_displacement;

        // ── Natural job creation ──────────────────────────────
        let raw_job_creation =
            effective_output * p.job_creation_rate * (0.5 + 0.5 * s.stability);
        let saturation_denominator = p.job_creation_saturation + effective_output;
        let saturation = if saturation_denominator != 0.0 {
            p.job_creation_saturation / saturation_denominator
        } else {
            0.0
        };
        let mismatch_penalty =
            (1.0 - p.mismatch_fraction * unemployment_rate_prev.min(1.0)).max(0.0);
        let natural_jobs = raw_job_creation * saturation * mismatch_penalty;

        // ── Retraining ────────────────────────────────────────
        let funding_cap = s.public_pool * p.retrain_rate;
        let throughput_cap = s.labor_u * p.retrain_throughput;
        let reinstatement = funding_cap.min(throughput_cap);

        s.labor_u += (displacement - natural_jobs - reinstatement) * dt;
        s.labor_u = s.labor_u.max(0.0);

        let unemployment_rate = s.labor_u / labor_force.max(1.0);

        let f = &mut *ctx.flows;
        f.labor_force = labor_force;
        f.growth_displacement = growth_displacement;
        f.churn_displacement = churn_displacement;
        f.displacement = displacement;
        f.natural_jobs = natural_jobs;
        f.reinstatement = reinstatement;
        f.unemployment_rate = unemployment_rate;
    }
}

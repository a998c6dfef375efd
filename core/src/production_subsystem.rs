//! Production subsystem: output, environment, resources, tax revenue.
//!
//! Order inside the stage matters: the environment is updated first,
//! and the *updated* environment sets the output penalty; resources are
//! depleted next, and the *updated* stock sets the scarcity cost.
//!
//! Learning curves: emission intensity and resource intensity both
//! fall as 1 / (1 + rate · K_ai).

use crate::subsystem::{FlowSubsystem, StepContext};

/// Output produced per unit of AI capital.
pub const OUTPUT_PER_CAPITAL: f64 = 0.3;

pub struct ProductionSubsystem;

impl FlowSubsystem for ProductionSubsystem {
    fn name(&self) -> &'static str { "production" }

    fn update(&self, ctx: &mut StepContext<'_>) {
        let p = ctx.params;
        let s = &mut *ctx.state;
        let dt = ctx.dt;

        let raw_output = s.k_ai * OUTPUT_PER_CAPITAL;

        // ── Environment ───────────────────────────────────────
        let tech_factor = 1.0 / (1.0 + p.emission_improvement_rate * s.k_ai);
        let effective_emission_rate = p.emission_rate * tech_factor;
        let emissions = effective_emission_rate * raw_output;

        // Stable societies invest in cleanup; a healthier environment
        // regenerates faster.
        let adjusted_absorption =
            p.absorption_capacity * (1.0 + p.green_investment_factor * s.stability);
        let absorption = adjusted_absorption * s.environment * (1.0 + s.environment);

        s.environment += (absorption - emissions) * dt;
        s.environment = s.environment.clamp(0.0, 1.0);

        let env_multiplier = 1.0 - p.env_output_sensitivity * (1.0 - s.environment).powi(2);
        let output = raw_output * env_multiplier;

        // ── Resources ─────────────────────────────────────────
        let resource_efficiency = 1.0 / (1.0 + p.resource_efficiency_rate * s.k_ai);
        let resource_use = p.resource_use_rate * s.k_ai * resource_efficiency;
        s.resources -= resource_use * dt;
        s.resources = s.resources.max(0.0).min(s.resource_stock_initial.max(0.0));

        // An empty initial stock counts as fully depleted.
        let fraction_remaining = if s.resource_stock_initial > 0.0 {
            s.resources / s.resource_stock_initial
        } else {
            0.0
        };
        let resource_cost_multiplier =
            1.0 + p.resource_scarcity_factor * (1.0 - fraction_remaining).powi(2);
        let effective_output = output / resource_cost_multiplier;

        // ── Tax revenue ───────────────────────────────────────
        let tax_revenue = effective_output * s.current_tax;
        s.public_pool += tax_revenue * dt;

        let f = &mut *ctx.flows;
        f.raw_output = raw_output;
        f.emissions = emissions;
        f.absorption = absorption;
        f.output = output;
        f.resource_use = resource_use;
        f.resource_cost_multiplier = resource_cost_multiplier;
        f.effective_output = effective_output;
        f.tax_revenue = tax_revenue;
    }
}

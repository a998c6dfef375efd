//! Capital subsystem: reinvestment and depreciation.
//!
//! After-tax surplus is reinvested in proportion to stability. Capital
//! is NOT clamped: extreme depreciation can drive it toward (or past)
//! zero. Downstream terms guard with `max(K_ai, 1)` where they divide.

use crate::subsystem::{FlowSubsystem, StepContext};

pub struct CapitalSubsystem;

impl FlowSubsystem for CapitalSubsystem {
    fn name(&self) -> &'static str { "capital" }

    fn update(&self, ctx: &mut StepContext<'_>) {
        let p = ctx.params;
        let s = &mut *ctx.state;

        let investment = (ctx.flows.effective_output - ctx.flows.tax_revenue) * s.stability;
        s.k_ai += (investment - s.k_ai * p.depreciation) * ctx.dt;

        // Growth displacement next step is measured against this value.
        s.prev_k_ai = s.k_ai;

        ctx.flows.investment = investment;
    }
}

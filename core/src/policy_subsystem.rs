//! Policy subsystem: the emergency tax control law.
//!
//! The target rate climbs a logistic curve centred on the stability
//! threshold; the live rate relaxes toward the target through a
//! first-order lag with a time constant of 2 years. The lag factor
//! depends only on `dt`, so it is stable for any step size.
//!
//! `stability_threshold <= 0` disables the emergency response: the
//! target is then just `base_tax` (still capped at `max_tax`).

use crate::{
    config::ParameterSet,
    subsystem::{FlowSubsystem, StepContext},
};

/// Time constant of the tax-rate lag, in years.
pub const TAX_LAG_YEARS: f64 = 2.0;

pub struct PolicySubsystem;

impl FlowSubsystem for PolicySubsystem {
    fn name(&self) -> &'static str { "policy" }

    fn update(&self, ctx: &mut StepContext<'_>) {
        let target = target_tax(ctx.params, ctx.state.stability);
        let alpha = 1.0 - (-ctx.dt / TAX_LAG_YEARS).exp();
        ctx.state.current_tax += alpha * (target - ctx.state.current_tax);

        ctx.flows.target_tax = target;
        ctx.flows.tax_rate = ctx.state.current_tax;
    }
}

/// Tax rate the policy would settle at for the given stability.
pub fn target_tax(params: &ParameterSet, stability: f64) -> f64 {
    let threshold = params.stability_threshold;
    let target = if threshold > 0.0 {
        let gap = threshold - stability;
        let emergency = 1.0 / (1.0 + (-2.0 * gap / threshold).exp());
        params.base_tax + emergency * (params.max_tax - params.base_tax)
    } else {
        params.base_tax
    };
    target.min(params.max_tax)
}

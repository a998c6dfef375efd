//! Stability subsystem: social stability drain and gain.
//!
//! Drain is a weighted sum of the unemployment rate, the tax burden
//! normalised by `max_tax`, and environmental degradation to the 1.5
//! power. Gain is public funds relative to the size of the economy.
//!
//! With `max_tax <= 0` there is no headroom to normalise against and
//! the tax term contributes nothing.

use crate::subsystem::{FlowSubsystem, StepContext};

pub struct StabilitySubsystem;

impl FlowSubsystem for StabilitySubsystem {
    fn name(&self) -> &'static str { "stability" }

    fn update(&self, ctx: &mut StepContext<'_>) {
        let p = ctx.params;
        let s = &mut *ctx.state;

        let tax_burden = if p.max_tax > 0.0 {
            s.current_tax / p.max_tax
        } else {
            0.0
        };

        let stability_drain = ctx.flows.unemployment_rate * p.unemployment_stress_weight
            + tax_burden * p.tax_stress_weight
            + p.env_stability_sensitivity * (1.0 - s.environment).powf(1.5);

        let economy_scale = s.k_ai.max(1.0);
        let stability_gain = (s.public_pool / economy_scale) * p.public_pool_stabilizer;

        s.stability += (stability_gain - stability_drain) * ctx.dt;
        s.stability = s.stability.clamp(0.0, 1.0);

        ctx.flows.stability_drain = stability_drain;
        ctx.flows.stability_gain = stability_gain;
    }
}

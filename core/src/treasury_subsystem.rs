//! Treasury subsystem: public pool spending.
//!
//! Retraining and the stability gain (UBI-style transfers) are both paid
//! out of the public pool. The pool never goes negative.

use crate::subsystem::{FlowSubsystem, StepContext};

pub struct TreasurySubsystem;

impl FlowSubsystem for TreasurySubsystem {
    fn name(&self) -> &'static str { "treasury" }

    fn update(&self, ctx: &mut StepContext<'_>) {
        let spending = ctx.flows.reinstatement + ctx.flows.stability_gain;
        ctx.state.public_pool -= spending * ctx.dt;
        ctx.state.public_pool = ctx.state.public_pool.max(0.0);

        ctx.flows.public_spending = spending;
    }
}

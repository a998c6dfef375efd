//! Flow subsystem trait and the per-step context it works on.
//!
//! RULE: Every stage of the flow model implements FlowSubsystem.
//! The model calls update() on each registered subsystem in
//! registration order, once per step.
//! Execution order is fixed and documented in model.rs.
//!
//! A subsystem may read anything earlier stages wrote into the
//! context this step; that chaining is what the fixed order is for.

use crate::{
    config::ParameterSet,
    state::SimulationState,
    types::Years,
};
use serde::{Deserialize, Serialize};

/// Intermediate flows of one step, filled in stage by stage.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct StepFlows {
    // Policy
    pub target_tax:               f64,
    pub tax_rate:                 f64,
    // Production
    pub raw_output:               f64,
    pub emissions:                f64,
    pub absorption:               f64,
    pub output:                   f64,
    pub resource_use:             f64,
    pub resource_cost_multiplier: f64,
    pub effective_output:         f64,
    pub tax_revenue:              f64,
    // Labor
    pub labor_force:              f64,
    pub growth_displacement:      f64,
    pub churn_displacement:       f64,
    pub displacement:             f64,
    pub natural_jobs:             f64,
    pub reinstatement:            f64,
    pub unemployment_rate:        f64,
    // Stability
    pub stability_drain:          f64,
    pub stability_gain:           f64,
    // Treasury
    pub public_spending:          f64,
    // Capital
    pub investment:               f64,
}

/// Everything a subsystem may touch during one step.
pub struct StepContext<'a> {
    pub params: &'a ParameterSet,
    pub state:  &'a mut SimulationState,
    pub flows:  &'a mut StepFlows,
    /// Time at the start of the step.
    pub time:   Years,
    pub dt:     Years,
}

/// The contract every flow stage must fulfill.
pub trait FlowSubsystem: Send {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Apply this stage's flows to the state for one step of `ctx.dt`.
    fn update(&self, ctx: &mut StepContext<'_>);
}

//! Live simulation state: the six stocks plus hidden lag state.

use crate::config::InitialStocks;
use serde::{Deserialize, Serialize};

/// Stocks integrated by the flow model.
///
/// Bounds are enforced by clamping after each update, never by rejecting
/// inputs: `stability` and `environment` stay in [0, 1], `resources` in
/// [0, initial], `labor_u` and `public_pool` non-negative. `k_ai` is left
/// unclamped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationState {
    #[serde(rename = "K_ai")]
    pub k_ai:        f64,
    #[serde(rename = "Labor_U")]
    pub labor_u:     f64,
    #[serde(rename = "Stability")]
    pub stability:   f64,
    #[serde(rename = "Public_Pool")]
    pub public_pool: f64,
    #[serde(rename = "Environment")]
    pub environment: f64,
    #[serde(rename = "Resources")]
    pub resources:   f64,

    /// Smoothed tax rate carried between steps.
    pub current_tax:            f64,
    /// Capital at the end of the previous step.
    pub prev_k_ai:              f64,
    /// Resource stock at reset; denominator of the scarcity curve.
    pub resource_stock_initial: f64,
}

impl SimulationState {
    pub fn from_initial(initial: &InitialStocks, base_tax: f64) -> Self {
        Self {
            k_ai:                   initial.k_ai,
            labor_u:                initial.labor_u,
            stability:              initial.stability,
            public_pool:            initial.public_pool,
            environment:            initial.environment,
            resources:              initial.resources,
            current_tax:            base_tax,
            prev_k_ai:              initial.k_ai,
            resource_stock_initial: initial.resources,
        }
    }
}

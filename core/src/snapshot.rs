//! Lightweight state snapshot: stocks plus labor ratios, no flows.
//!
//! Available before any step is taken, and after a reset it compares
//! equal to the snapshot observed right after construction.

use crate::types::Years;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StateSnapshot {
    pub time:              Years,
    #[serde(rename = "K_ai")]
    pub k_ai:              f64,
    #[serde(rename = "Labor_U")]
    pub labor_u:           f64,
    pub unemployment_rate: f64,
    pub labor_force:       f64,
    #[serde(rename = "Stability")]
    pub stability:         f64,
    #[serde(rename = "Public_Pool")]
    pub public_pool:       f64,
    #[serde(rename = "Environment")]
    pub environment:       f64,
    #[serde(rename = "Resources")]
    pub resources:         f64,
}

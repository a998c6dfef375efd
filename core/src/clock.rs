//! Simulation clock: owns elapsed continuous time.
//!
//! Time advances by whatever `dt` the caller steps with. Nothing else
//! in the model mutates it.

use crate::types::Years;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub time: Years,
}

impl SimClock {
    pub fn new() -> Self {
        Self { time: 0.0 }
    }

    /// Advance by `dt`. Returns the new time.
    pub fn advance(&mut self, dt: Years) -> Years {
        self.time += dt;
        self.time
    }

    pub fn rewind(&mut self) {
        self.time = 0.0;
    }
}

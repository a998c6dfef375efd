//! The time-stepper: drives a model from t = 0 to a horizon.
//!
//! RULES:
//!   - Every run starts with a reset, so repeated runs on the same
//!     simulator are bit-identical.
//!   - One record per step, appended in order; the table is not touched
//!     after the run returns.
//!   - The loop runs while `time < horizon`. Time accumulates by
//!     repeated addition of `dt`, so the last record may overshoot the
//!     horizon by less than one step.

use crate::{
    error::{SimError, SimResult},
    model::AiWorldModel,
    timeseries::TimeSeries,
    types::Years,
};

/// Upper bound on up-front record allocation for very long runs.
const MAX_PREALLOCATED_STEPS: usize = 1 << 20;

pub struct Simulator {
    model: AiWorldModel,
}

impl Simulator {
    pub fn new(model: AiWorldModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &AiWorldModel {
        &self.model
    }

    /// Reset the model and step it with a fixed `dt` until `horizon`.
    pub fn run(&mut self, horizon: Years, dt: Years) -> SimResult<TimeSeries> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(SimError::InvalidTimeStep { dt });
        }
        if !horizon.is_finite() {
            return Err(SimError::InvalidHorizon { horizon });
        }

        self.model.reset();
        let expected = (horizon / dt).ceil().max(0.0) as usize;
        let mut series = TimeSeries::with_capacity(expected.min(MAX_PREALLOCATED_STEPS));

        log::debug!("run start: horizon={horizon} dt={dt} (~{expected} steps)");
        while self.model.time() < horizon {
            series.push(self.model.step(dt));
        }
        log::debug!(
            "run complete: {} steps, final t={:.3}",
            series.len(),
            self.model.time()
        );

        Ok(series)
    }
}

/// Build, run, and discard a simulator in one call.
pub fn simulate(model: AiWorldModel, horizon: Years, dt: Years) -> SimResult<TimeSeries> {
    Simulator::new(model).run(horizon, dt)
}

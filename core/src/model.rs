//! The flow model: one explicit-Euler step of the coupled stock system.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Policy subsystem      (tax control law)
//!   2. Production subsystem  (output, environment, resources, tax revenue)
//!   3. Labor subsystem       (displacement, job creation, retraining)
//!   4. Stability subsystem   (drain and gain)
//!   5. Treasury subsystem    (public pool spending)
//!   6. Capital subsystem     (reinvestment, depreciation)
//!   then the clock advances by dt.
//!
//! RULES:
//!   - Each stage sees the values earlier stages produced this step.
//!   - Every stock updates as `stock += flow * dt`, then clamps.
//!   - `step` never fails; degenerate inputs are clamped or guarded.
//!   - No randomness. A run is a pure function of (config, dt, horizon).

use crate::{
    capital_subsystem::CapitalSubsystem,
    clock::SimClock,
    config::{ModelConfig, ParameterOverrides, ParameterSet},
    labor_subsystem::LaborSubsystem,
    policy_subsystem::PolicySubsystem,
    production_subsystem::ProductionSubsystem,
    snapshot::StateSnapshot,
    stability_subsystem::StabilitySubsystem,
    state::SimulationState,
    subsystem::{FlowSubsystem, StepContext, StepFlows},
    timeseries::TimeSeriesRecord,
    treasury_subsystem::TreasurySubsystem,
    types::Years,
};

pub struct AiWorldModel {
    config:     ModelConfig,
    state:      SimulationState,
    clock:      SimClock,
    flows:      StepFlows,
    subsystems: Vec<Box<dyn FlowSubsystem>>,
}

impl AiWorldModel {
    /// Build a model with all flow subsystems registered, at its
    /// initial conditions.
    pub fn new(config: ModelConfig) -> Self {
        if config.params.max_tax <= 0.0 {
            log::warn!("max_tax is {}; the tax stress term is disabled", config.params.max_tax);
        }
        if config.initial.resources <= 0.0 {
            log::warn!("initial resource stock is {}; scarcity is saturated", config.initial.resources);
        }

        let state = SimulationState::from_initial(&config.initial, config.params.base_tax);
        let mut model = Self {
            config,
            state,
            clock:      SimClock::new(),
            flows:      StepFlows::default(),
            subsystems: Vec::new(),
        };

        // EXECUTION ORDER: fixed, documented, never reordered.
        model.register(Box::new(PolicySubsystem));
        model.register(Box::new(ProductionSubsystem));
        model.register(Box::new(LaborSubsystem));
        model.register(Box::new(StabilitySubsystem));
        model.register(Box::new(TreasurySubsystem));
        model.register(Box::new(CapitalSubsystem));
        model
    }

    /// Defaults with `overrides` merged on top.
    pub fn with_overrides(overrides: &ParameterOverrides) -> Self {
        Self::new(ModelConfig::with_overrides(overrides))
    }

    fn register(&mut self, subsystem: Box<dyn FlowSubsystem>) {
        self.subsystems.push(subsystem);
    }

    pub fn config(&self) -> &ModelConfig { &self.config }
    pub fn params(&self) -> &ParameterSet { &self.config.params }
    pub fn state(&self) -> &SimulationState { &self.state }
    pub fn time(&self) -> Years { self.clock.time }

    /// Smoothed tax rate carried into the next step.
    pub fn current_tax(&self) -> f64 { self.state.current_tax }

    /// Capital the next step measures growth against.
    pub fn prev_k_ai(&self) -> f64 { self.state.prev_k_ai }

    /// Intermediate flows of the most recent step (all zero before the first).
    pub fn last_flows(&self) -> &StepFlows { &self.flows }

    /// Names of the registered subsystems, in execution order.
    pub fn subsystem_names(&self) -> Vec<&'static str> {
        self.subsystems.iter().map(|s| s.name()).collect()
    }

    /// Advance every stock by `dt` years and return the derived record.
    pub fn step(&mut self, dt: Years) -> TimeSeriesRecord {
        let mut flows = StepFlows::default();
        {
            let mut ctx = StepContext {
                params: &self.config.params,
                state:  &mut self.state,
                flows:  &mut flows,
                time:   self.clock.time,
                dt,
            };
            for subsystem in &self.subsystems {
                subsystem.update(&mut ctx);
            }
        }
        self.flows = flows;
        let time = self.clock.advance(dt);

        log::trace!(
            "t={time:.3} K_ai={:.3} U={:.3} S={:.4} pool={:.3} tax={:.4} env={:.4} res={:.2}",
            self.state.k_ai,
            self.state.labor_u,
            self.state.stability,
            self.state.public_pool,
            self.flows.tax_rate,
            self.state.environment,
            self.state.resources,
        );

        TimeSeriesRecord {
            time,
            k_ai:                     self.state.k_ai,
            labor_u:                  self.state.labor_u,
            unemployment_rate:        self.flows.unemployment_rate,
            labor_force:              self.flows.labor_force,
            stability:                self.state.stability,
            public_pool:              self.state.public_pool,
            tax_rate:                 self.flows.tax_rate,
            output:                   self.flows.effective_output,
            environment:              self.state.environment,
            resources:                self.state.resources,
            resource_cost_multiplier: self.flows.resource_cost_multiplier,
        }
    }

    /// Stocks plus labor ratios at the current instant. No flows.
    pub fn get_state(&self) -> StateSnapshot {
        let p = &self.config.params;
        let labor_force = p.labor_force_base + p.labor_force_k_sensitivity * self.state.k_ai;
        StateSnapshot {
            time:              self.clock.time,
            k_ai:              self.state.k_ai,
            labor_u:           self.state.labor_u,
            unemployment_rate: self.state.labor_u / labor_force.max(1.0),
            labor_force,
            stability:         self.state.stability,
            public_pool:       self.state.public_pool,
            environment:       self.state.environment,
            resources:         self.state.resources,
        }
    }

    /// Restore the initial conditions exactly, including the tax lag
    /// (back to `base_tax`) and the capital reference for growth.
    pub fn reset(&mut self) {
        self.state = SimulationState::from_initial(&self.config.initial, self.config.params.base_tax);
        self.clock.rewind();
        self.flows = StepFlows::default();
    }
}

impl Default for AiWorldModel {
    fn default() -> Self { Self::new(ModelConfig::default()) }
}

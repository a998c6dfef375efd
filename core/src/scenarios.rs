//! Scenario presets: named override bundles merged over the defaults.
//!
//! Each preset mixes policy levers (thresholds, retraining, labor
//! programs) with technology-path assumptions (automation pace,
//! emissions, resource intensity).
//!
//! RULE: The registry is static. Resolving a name never mutates anything.

use crate::{
    config::{AutomationSpeed, ModelConfig, ParameterOverrides},
    error::{SimError, SimResult},
    types::Years,
};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    LaissezFaire,
    Nordic,
    Singularity,
    GreenTransition,
    Extraction,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::LaissezFaire,
        Scenario::Nordic,
        Scenario::Singularity,
        Scenario::GreenTransition,
        Scenario::Extraction,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::LaissezFaire    => "laissez-faire",
            Self::Nordic          => "nordic",
            Self::Singularity     => "singularity",
            Self::GreenTransition => "green-transition",
            Self::Extraction      => "extraction",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::LaissezFaire    => "No policy intervention; market-only job creation",
            Self::Nordic          => "Strong welfare state with early intervention and active labor policy",
            Self::Singularity     => "Exponentially accelerating automation that policy cannot match",
            Self::GreenTransition => "Clean technology learning curves and a circular economy",
            Self::Extraction      => "Maximum resource exploitation with no efficiency gains",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    pub fn overrides(&self) -> ParameterOverrides {
        match self {
            Self::LaissezFaire    => laissez_faire(),
            Self::Nordic          => nordic(),
            Self::Singularity     => singularity(),
            Self::GreenTransition => green_transition(),
            Self::Extraction      => extraction(),
        }
    }

    /// Defaults with this scenario's overrides applied.
    pub fn config(&self) -> ModelConfig {
        ModelConfig::with_overrides(&self.overrides())
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        Self::from_name(s).ok_or_else(|| SimError::UnknownScenario { name: s.to_string() })
    }
}

/// Resolve a scenario name to its overrides.
pub fn lookup(name: &str) -> SimResult<ParameterOverrides> {
    name.parse::<Scenario>().map(|s| s.overrides())
}

/// Automation pace of the singularity preset: 5%/yr growing at 3%/yr.
pub fn singularity_automation_speed(time: Years, _k_ai: f64) -> f64 {
    0.05 * (0.03 * time).exp()
}

// ── Presets ────────────────────────────────────────────────────────

fn laissez_faire() -> ParameterOverrides {
    ParameterOverrides {
        // Policy: hands-off, no emergency trigger.
        stability_threshold: Some(0.0),
        retrain_rate:        Some(0.005),
        job_creation_rate:   Some(0.015),
        ..Default::default()
    }
}

fn nordic() -> ParameterOverrides {
    ParameterOverrides {
        // Policy: triggers early, heavy retraining, efficient institutions.
        stability_threshold: Some(0.85),
        retrain_rate:        Some(0.05),
        retrain_throughput:  Some(0.25),
        job_creation_rate:   Some(0.03),
        // Technology: slightly cleaner.
        emission_rate:       Some(0.0006),
        absorption_capacity: Some(0.014),
        ..Default::default()
    }
}

fn singularity() -> ParameterOverrides {
    ParameterOverrides {
        // Policy: standard trigger, overwhelmed retraining.
        stability_threshold: Some(0.70),
        retrain_rate:        Some(0.04),
        retrain_throughput:  Some(0.10),
        // Technology: exponential automation, dirtier.
        automation_speed:    Some(AutomationSpeed::TimeCapitalFunction(
            singularity_automation_speed,
        )),
        emission_rate:       Some(0.0012),
        absorption_capacity: Some(0.010),
        ..Default::default()
    }
}

fn green_transition() -> ParameterOverrides {
    ParameterOverrides {
        // Policy: moderately strong.
        stability_threshold:       Some(0.80),
        retrain_rate:              Some(0.04),
        job_creation_rate:         Some(0.025),
        // Technology: learning curves 10x default, faster turnover.
        emission_improvement_rate: Some(0.01),
        resource_efficiency_rate:  Some(0.01),
        depreciation:              Some(0.06),
        green_investment_factor:   Some(1.5),
        ..Default::default()
    }
}

fn extraction() -> ParameterOverrides {
    ParameterOverrides {
        // Policy: none.
        stability_threshold:       Some(0.0),
        retrain_rate:              Some(0.005),
        // Technology: dirty, resource-hungry, no improvement.
        resource_use_rate:         Some(0.15),
        resource_scarcity_factor:  Some(8.0),
        emission_rate:             Some(0.002),
        absorption_capacity:       Some(0.006),
        emission_improvement_rate: Some(0.0),
        resource_efficiency_rate:  Some(0.0),
        ..Default::default()
    }
}

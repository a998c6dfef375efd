//! Model configuration: initial stocks, coefficients, and overrides.
//!
//! A `ModelConfig` is fixed for the lifetime of one run. Scenarios and
//! config files never build one directly; they produce a
//! `ParameterOverrides` that is merged over the defaults.

use crate::{
    error::{SimError, SimResult},
    types::Years,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Rate at which capital growth displaces workers.
///
/// Either a fixed rate or a function of `(time, K_ai)`.
#[derive(Debug, Clone, Copy)]
pub enum AutomationSpeed {
    Constant(f64),
    TimeCapitalFunction(fn(Years, f64) -> f64),
}

impl AutomationSpeed {
    pub fn evaluate(&self, time: Years, k_ai: f64) -> f64 {
        match self {
            Self::Constant(speed) => *speed,
            Self::TimeCapitalFunction(f) => f(time, k_ai),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }
}

impl Default for AutomationSpeed {
    fn default() -> Self {
        Self::Constant(0.05)
    }
}

impl Serialize for AutomationSpeed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Constant(speed) => serializer.serialize_f64(*speed),
            Self::TimeCapitalFunction(_) => serializer.serialize_str("time_capital_function"),
        }
    }
}

// Only the constant form can come from a file.
impl<'de> Deserialize<'de> for AutomationSpeed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self::Constant)
    }
}

// ── Stocks ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InitialStocks {
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
}

impl Default for InitialStocks {
    fn default() -> Self {
        Self {
            k_ai:        100.0,
            labor_u:     5.0,
            stability:   1.0,
            public_pool: 10.0,
            environment: 0.8,
            resources:   1000.0,
        }
    }
}

// ── Coefficients ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSet {
    // Automation & labor
    pub automation_speed:          AutomationSpeed,
    pub churn_rate:                f64,
    pub job_creation_rate:         f64,
    pub job_creation_saturation:   f64,
    pub mismatch_fraction:         f64,
    pub retrain_rate:              f64,
    pub retrain_throughput:        f64,
    pub labor_force_base:          f64,
    pub labor_force_k_sensitivity: f64,
    // Capital
    pub depreciation:              f64,
    // Tax / policy
    pub stability_threshold:       f64,
    pub base_tax:                  f64,
    pub max_tax:                   f64,
    // Stability weights
    pub unemployment_stress_weight: f64,
    pub tax_stress_weight:         f64,
    pub public_pool_stabilizer:    f64,
    // Environment
    pub emission_rate:             f64,
    pub emission_improvement_rate: f64,
    pub absorption_capacity:       f64,
    pub green_investment_factor:   f64,
    pub env_output_sensitivity:    f64,
    pub env_stability_sensitivity: f64,
    // Resources
    pub resource_use_rate:         f64,
    pub resource_efficiency_rate:  f64,
    pub resource_scarcity_factor:  f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            automation_speed:           AutomationSpeed::default(),
            churn_rate:                 0.01,
            job_creation_rate:          0.02,
            job_creation_saturation:    50.0,
            mismatch_fraction:          0.5,
            retrain_rate:               0.02,
            retrain_throughput:         0.15,
            labor_force_base:           100.0,
            labor_force_k_sensitivity:  0.5,
            depreciation:               0.03,
            stability_threshold:        0.7,
            base_tax:                   0.20,
            max_tax:                    0.70,
            unemployment_stress_weight: 0.5,
            tax_stress_weight:          0.1,
            public_pool_stabilizer:     0.05,
            emission_rate:              0.0008,
            emission_improvement_rate:  0.001,
            absorption_capacity:        0.012,
            green_investment_factor:    0.5,
            env_output_sensitivity:     0.5,
            env_stability_sensitivity:  0.3,
            resource_use_rate:          0.05,
            resource_efficiency_rate:   0.001,
            resource_scarcity_factor:   5.0,
        }
    }
}

/// Every name accepted by `ModelConfig::get` / `ModelConfig::set`.
pub const PARAMETER_NAMES: &[&str] = &[
    "K_ai",
    "Labor_U",
    "Stability",
    "Public_Pool",
    "Environment",
    "Resources",
    "automation_speed",
    "churn_rate",
    "job_creation_rate",
    "job_creation_saturation",
    "mismatch_fraction",
    "retrain_rate",
    "retrain_throughput",
    "labor_force_base",
    "labor_force_k_sensitivity",
    "depreciation",
    "stability_threshold",
    "base_tax",
    "max_tax",
    "unemployment_stress_weight",
    "tax_stress_weight",
    "public_pool_stabilizer",
    "emission_rate",
    "emission_improvement_rate",
    "absorption_capacity",
    "green_investment_factor",
    "env_output_sensitivity",
    "env_stability_sensitivity",
    "resource_use_rate",
    "resource_efficiency_rate",
    "resource_scarcity_factor",
];

/// Initial stocks plus coefficients: everything a model is built from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(flatten)]
    pub initial: InitialStocks,
    #[serde(flatten)]
    pub params:  ParameterSet,
}

impl ModelConfig {
    /// Defaults with `overrides` merged on top.
    pub fn with_overrides(overrides: &ParameterOverrides) -> Self {
        let mut config = Self::default();
        overrides.apply(&mut config);
        config
    }

    /// Read a value by its canonical name.
    ///
    /// A function-valued automation speed has no scalar value and reads as NaN.
    pub fn get(&self, name: &str) -> SimResult<f64> {
        let (s, p) = (&self.initial, &self.params);
        let value = match name {
            "K_ai"                       => s.k_ai,
            "Labor_U"                    => s.labor_u,
            "Stability"                  => s.stability,
            "Public_Pool"                => s.public_pool,
            "Environment"                => s.environment,
            "Resources"                  => s.resources,
            "automation_speed"           => match p.automation_speed {
                AutomationSpeed::Constant(v) => v,
                AutomationSpeed::TimeCapitalFunction(_) => f64::NAN,
            },
            "churn_rate"                 => p.churn_rate,
            "job_creation_rate"          => p.job_creation_rate,
            "job_creation_saturation"    => p.job_creation_saturation,
            "mismatch_fraction"          => p.mismatch_fraction,
            "retrain_rate"               => p.retrain_rate,
            "retrain_throughput"         => p.retrain_throughput,
            "labor_force_base"           => p.labor_force_base,
            "labor_force_k_sensitivity"  => p.labor_force_k_sensitivity,
            "depreciation"               => p.depreciation,
            "stability_threshold"        => p.stability_threshold,
            "base_tax"                   => p.base_tax,
            "max_tax"                    => p.max_tax,
            "unemployment_stress_weight" => p.unemployment_stress_weight,
            "tax_stress_weight"          => p.tax_stress_weight,
            "public_pool_stabilizer"     => p.public_pool_stabilizer,
            "emission_rate"              => p.emission_rate,
            "emission_improvement_rate"  => p.emission_improvement_rate,
            "absorption_capacity"        => p.absorption_capacity,
            "green_investment_factor"    => p.green_investment_factor,
            "env_output_sensitivity"     => p.env_output_sensitivity,
            "env_stability_sensitivity"  => p.env_stability_sensitivity,
            "resource_use_rate"          => p.resource_use_rate,
            "resource_efficiency_rate"   => p.resource_efficiency_rate,
            "resource_scarcity_factor"   => p.resource_scarcity_factor,
            _ => return Err(SimError::UnknownParameter { name: name.to_string() }),
        };
        Ok(value)
    }

    /// Overwrite a value by its canonical name.
    pub fn set(&mut self, name: &str, value: f64) -> SimResult<()> {
        let (s, p) = (&mut self.initial, &mut self.params);
        let slot = match name {
            "automation_speed" => {
                p.automation_speed = AutomationSpeed::Constant(value);
                return Ok(());
            }
            "K_ai"                       => &mut s.k_ai,
            "Labor_U"                    => &mut s.labor_u,
            "Stability"                  => &mut s.stability,
            "Public_Pool"                => &mut s.public_pool,
            "Environment"                => &mut s.environment,
            "Resources"                  => &mut s.resources,
            "churn_rate"                 => &mut p.churn_rate,
            "job_creation_rate"          => &mut p.job_creation_rate,
            "job_creation_saturation"    => &mut p.job_creation_saturation,
            "mismatch_fraction"          => &mut p.mismatch_fraction,
            "retrain_rate"               => &mut p.retrain_rate,
            "retrain_throughput"         => &mut p.retrain_throughput,
            "labor_force_base"           => &mut p.labor_force_base,
            "labor_force_k_sensitivity"  => &mut p.labor_force_k_sensitivity,
            "depreciation"               => &mut p.depreciation,
            "stability_threshold"        => &mut p.stability_threshold,
            "base_tax"                   => &mut p.base_tax,
            "max_tax"                    => &mut p.max_tax,
            "unemployment_stress_weight" => &mut p.unemployment_stress_weight,
            "tax_stress_weight"          => &mut p.tax_stress_weight,
            "public_pool_stabilizer"     => &mut p.public_pool_stabilizer,
            "emission_rate"              => &mut p.emission_rate,
            "emission_improvement_rate"  => &mut p.emission_improvement_rate,
            "absorption_capacity"        => &mut p.absorption_capacity,
            "green_investment_factor"    => &mut p.green_investment_factor,
            "env_output_sensitivity"     => &mut p.env_output_sensitivity,
            "env_stability_sensitivity"  => &mut p.env_stability_sensitivity,
            "resource_use_rate"          => &mut p.resource_use_rate,
            "resource_efficiency_rate"   => &mut p.resource_efficiency_rate,
            "resource_scarcity_factor"   => &mut p.resource_scarcity_factor,
            _ => return Err(SimError::UnknownParameter { name: name.to_string() }),
        };
        *slot = value;
        Ok(())
    }

    /// Same config with a function-valued automation speed reset to the
    /// default constant. Sweeps need every swept value to be a scalar.
    pub fn without_functions(&self) -> Self {
        let mut out = self.clone();
        if !out.params.automation_speed.is_constant() {
            out.params.automation_speed = AutomationSpeed::default();
        }
        out
    }
}

// ── Overrides ──────────────────────────────────────────────────────

/// A partial parameter set. `None` keeps the default.
///
/// Deserialises from a flat JSON object using the canonical names;
/// unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterOverrides {
    #[serde(rename = "K_ai", skip_serializing_if = "Option::is_none")]
    pub k_ai: Option<f64>,
    #[serde(rename = "Labor_U", skip_serializing_if = "Option::is_none")]
    pub labor_u: Option<f64>,
    #[serde(rename = "Stability", skip_serializing_if = "Option::is_none")]
    pub stability: Option<f64>,
    #[serde(rename = "Public_Pool", skip_serializing_if = "Option::is_none")]
    pub public_pool: Option<f64>,
    #[serde(rename = "Environment", skip_serializing_if = "Option::is_none")]
    pub environment: Option<f64>,
    #[serde(rename = "Resources", skip_serializing_if = "Option::is_none")]
    pub resources: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation_speed: Option<AutomationSpeed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub churn_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_creation_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_creation_saturation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mismatch_fraction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrain_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrain_throughput: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labor_force_base: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labor_force_k_sensitivity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depreciation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_tax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unemployment_stress_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_stress_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_pool_stabilizer: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emission_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emission_improvement_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absorption_capacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green_investment_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_output_sensitivity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_stability_sensitivity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_use_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_efficiency_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_scarcity_factor: Option<f64>,
}

impl ParameterOverrides {
    /// Load from a JSON file, e.g. `{"churn_rate": 0.02, "K_ai": 150.0}`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let overrides = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(overrides)
    }

    /// Merge onto `config`. Fields left as `None` are untouched.
    pub fn apply(&self, config: &mut ModelConfig) {
        let (s, p) = (&mut config.initial, &mut config.params);
        if let Some(v) = self.k_ai { s.k_ai = v; }
        if let Some(v) = self.labor_u { s.labor_u = v; }
        if let Some(v) = self.stability { s.stability = v; }
        if let Some(v) = self.public_pool { s.public_pool = v; }
        if let Some(v) = self.environment { s.environment = v; }
        if let Some(v) = self.resources { s.resources = v; }

        if let Some(v) = self.automation_speed { p.automation_speed = v; }
        if let Some(v) = self.churn_rate { p.churn_rate = v; }
        if let Some(v) = self.job_creation_rate { p.job_creation_rate = v; }
        if let Some(v) = self.job_creation_saturation { p.job_creation_saturation = v; }
        if let Some(v) = self.mismatch_fraction { p.mismatch_fraction = v; }
        if let Some(v) = self.retrain_rate { p.retrain_rate = v; }
        if let Some(v) = self.retrain_throughput { p.retrain_throughput = v; }
        if let Some(v) = self.labor_force_base { p.labor_force_base = v; }
        if let Some(v) = self.labor_force_k_sensitivity { p.labor_force_k_sensitivity = v; }
        if let Some(v) = self.depreciation { p.depreciation = v; }
        if let Some(v) = self.stability_threshold { p.stability_threshold = v; }
        if let Some(v) = self.base_tax { p.base_tax = v; }
        if let Some(v) = self.max_tax { p.max_tax = v; }
        if let Some(v) = self.unemployment_stress_weight { p.unemployment_stress_weight = v; }
        if let Some(v) = self.tax_stress_weight { p.tax_stress_weight = v; }
        if let Some(v) = self.public_pool_stabilizer { p.public_pool_stabilizer = v; }
        if let Some(v) = self.emission_rate { p.emission_rate = v; }
        if let Some(v) = self.emission_improvement_rate { p.emission_improvement_rate = v; }
        if let Some(v) = self.absorption_capacity { p.absorption_capacity = v; }
        if let Some(v) = self.green_investment_factor { p.green_investment_factor = v; }
        if let Some(v) = self.env_output_sensitivity { p.env_output_sensitivity = v; }
        if let Some(v) = self.env_stability_sensitivity { p.env_stability_sensitivity = v; }
        if let Some(v) = self.resource_use_rate { p.resource_use_rate = v; }
        if let Some(v) = self.resource_efficiency_rate { p.resource_efficiency_rate = v; }
        if let Some(v) = self.resource_scarcity_factor { p.resource_scarcity_factor = v; }
    }
}

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::DispatchError;

/// Which solver path the caller asked for
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioMode {
    #[default]
    Demo,
    /// Full-rigor solve, delegated to an out-of-process worker
    Heavy,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Iso {
    #[default]
    Ercot,
    Pjm,
    Miso,
    Spp,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReliabilityMetric {
    #[serde(rename = "EUE")]
    Eue,
    #[serde(rename = "LOLE")]
    Lole,
    #[default]
    EnergyReliability,
}

/// Input scenario for one dispatch study.
///
/// Field names follow the camelCase JSON contract shared with the scenario
/// form. Battery, generator, workload-queue and contingency fields are part of
/// the contract but are not consumed by the LP; see
/// [`Scenario::unmodeled_inputs`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_horizon"))]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub mode: ScenarioMode,
    #[validate(range(exclusive_min = 0.0))]
    pub time_step_hours: f64,
    #[serde(rename = "baseLoadMW")]
    #[validate(length(min = 1), custom(function = "non_negative_series"))]
    pub base_load_mw: Vec<f64>,
    #[validate(custom(function = "finite_series"))]
    pub price: Vec<f64>,
    #[serde(default)]
    pub iso: Iso,
    #[serde(default)]
    pub applications: Applications,
    #[validate(nested)]
    pub grid: GridLimits,
    #[serde(default)]
    #[validate(nested)]
    pub bess: BessParameters,
    #[serde(default)]
    #[validate(nested)]
    pub generators: Vec<GeneratorInput>,
    #[validate(nested)]
    pub workload: WorkloadInput,
    #[validate(nested)]
    pub reliability: ReliabilitySettings,
    #[serde(default)]
    #[validate(nested)]
    pub scenarios: Vec<ContingencyScenario>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Applications {
    pub pun: bool,
    pub btm: bool,
    pub ftm: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GridLimits {
    #[serde(rename = "importMaxMW")]
    #[validate(range(min = 0.0))]
    pub import_max_mw: f64,
    #[serde(rename = "exportMaxMW")]
    #[validate(range(min = 0.0))]
    pub export_max_mw: f64,
}

/// Battery parameters. Accepted, never modeled.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BessParameters {
    #[serde(rename = "powerMaxMW")]
    #[validate(range(min = 0.0))]
    pub power_max_mw: f64,
    #[serde(rename = "energyMaxMWh")]
    #[validate(range(min = 0.0))]
    pub energy_max_mwh: f64,
    pub optimize_sizing: bool,
    #[validate(range(min = 0.0))]
    pub capex_power: f64,
    #[validate(range(min = 0.0))]
    pub capex_energy: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub efficiency_charge: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub efficiency_discharge: f64,
    #[validate(range(min = 0.0))]
    pub degradation_cost: f64,
}

impl Default for BessParameters {
    fn default() -> Self {
        Self {
            power_max_mw: 0.0,
            energy_max_mwh: 0.0,
            optimize_sizing: false,
            capex_power: 0.0,
            capex_energy: 0.0,
            efficiency_charge: 0.95,
            efficiency_discharge: 0.95,
            degradation_cost: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorInput {
    pub name: String,
    #[validate(range(min = 0.0))]
    pub p_max: f64,
    #[validate(range(min = 0.0))]
    pub marginal_cost: f64,
    #[serde(default = "default_true")]
    pub available: bool,
}

/// One breakpoint of the power to work curve
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate, PartialEq)]
pub struct PiecewisePoint {
    #[serde(rename = "powerMW")]
    #[validate(range(min = 0.0))]
    pub power_mw: f64,
    #[serde(rename = "workUnits")]
    #[validate(range(min = 0.0))]
    pub work_units: f64,
}

impl PiecewisePoint {
    pub fn new(power_mw: f64, work_units: f64) -> Self {
        Self { power_mw, work_units }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadInput {
    #[serde(default)]
    #[validate(custom(function = "non_negative_series"))]
    pub arrivals: Vec<f64>,
    #[serde(default = "default_deadline_hours")]
    #[validate(range(min = 1))]
    pub deadline_hours: u32,
    #[serde(default)]
    pub soft_sla: bool,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub penalty_deadline: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1.0))]
    pub curtailment_cap: f64,
    #[validate(length(min = 2), nested)]
    pub piecewise: Vec<PiecewisePoint>,
    #[serde(rename = "minComputeMW")]
    #[validate(range(min = 0.0))]
    pub min_compute_mw: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReliabilitySettings {
    #[serde(default)]
    pub metric: ReliabilityMetric,
    #[validate(range(min = 0.0, max = 1.0))]
    pub target: f64,
    #[serde(default)]
    #[validate(custom(function = "unit_interval_series"))]
    pub sweep: Vec<f64>,
}

/// Named contingency with probability weight. Accepted, never modeled.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContingencyScenario {
    pub name: String,
    #[validate(range(min = 0.0, max = 1.0))]
    pub probability: f64,
    #[validate(range(min = 0.0))]
    pub grid_import_cap: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub generator_derate: f64,
}

/// Input sections that were supplied with content the dispatch LP ignores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmodeledInput {
    Battery,
    Generators,
    WorkloadArrivals,
    ContingencyScenarios,
}

impl std::fmt::Display for UnmodeledInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Battery => "battery parameters",
            Self::Generators => "generators",
            Self::WorkloadArrivals => "workload arrivals and deadlines",
            Self::ContingencyScenarios => "contingency scenarios",
        };
        write!(f, "{}", s)
    }
}

impl Scenario {
    /// Read and validate a scenario file
    pub fn from_json_path(path: &Path) -> Result<Self, DispatchError> {
        let raw = fs::read_to_string(path).map_err(|err| {
            DispatchError::InvalidInput(format!(
                "failed to read scenario `{}`: {err}",
                path.display()
            ))
        })?;
        Self::from_json_str(&raw)
    }

    /// Parse and validate a scenario from JSON text
    pub fn from_json_str(raw: &str) -> Result<Self, DispatchError> {
        let scenario: Scenario = serde_json::from_str(raw)
            .map_err(|err| DispatchError::InvalidInput(format!("invalid scenario JSON: {err}")))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Number of hourly steps in the horizon
    pub fn horizon(&self) -> usize {
        self.base_load_mw.len()
    }

    /// Total energy demand over the horizon (MWh)
    pub fn total_demand_mwh(&self) -> f64 {
        self.base_load_mw
            .iter()
            .map(|load| load * self.time_step_hours)
            .sum()
    }

    /// Inputs that carry data the LP does not model.
    pub fn unmodeled_inputs(&self) -> Vec<UnmodeledInput> {
        let mut unmodeled = Vec::new();
        if self.bess.power_max_mw > 0.0 || self.bess.energy_max_mwh > 0.0 {
            unmodeled.push(UnmodeledInput::Battery);
        }
        if !self.generators.is_empty() {
            unmodeled.push(UnmodeledInput::Generators);
        }
        if self.workload.arrivals.iter().any(|a| *a > 0.0) {
            unmodeled.push(UnmodeledInput::WorkloadArrivals);
        }
        if !self.scenarios.is_empty() {
            unmodeled.push(UnmodeledInput::ContingencyScenarios);
        }
        unmodeled
    }
}

fn default_true() -> bool {
    true
}

fn default_deadline_hours() -> u32 {
    1
}

fn validation_error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::from(message));
    err
}

fn validate_horizon(scenario: &Scenario) -> Result<(), ValidationError> {
    let horizon = scenario.base_load_mw.len();
    if scenario.price.len() != horizon {
        return Err(validation_error(
            "horizon_mismatch",
            format!(
                "price has {} entries but baseLoadMW has {}",
                scenario.price.len(),
                horizon
            ),
        ));
    }
    if !scenario.workload.arrivals.is_empty() && scenario.workload.arrivals.len() != horizon {
        return Err(validation_error(
            "horizon_mismatch",
            format!(
                "workload.arrivals has {} entries but baseLoadMW has {}",
                scenario.workload.arrivals.len(),
                horizon
            ),
        ));
    }
    Ok(())
}

#[allow(clippy::ptr_arg)]
fn finite_series(values: &Vec<f64>) -> Result<(), ValidationError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(validation_error(
            "not_finite",
            format!("entry {index} is not a finite number"),
        )),
        None => Ok(()),
    }
}

#[allow(clippy::ptr_arg)]
fn non_negative_series(values: &Vec<f64>) -> Result<(), ValidationError> {
    finite_series(values)?;
    match values.iter().position(|v| *v < 0.0) {
        Some(index) => Err(validation_error(
            "negative",
            format!("entry {index} must be >= 0"),
        )),
        None => Ok(()),
    }
}

#[allow(clippy::ptr_arg)]
fn unit_interval_series(values: &Vec<f64>) -> Result<(), ValidationError> {
    match values.iter().position(|v| !(0.0..=1.0).contains(v)) {
        Some(index) => Err(validation_error(
            "out_of_range",
            format!("entry {index} must lie in [0, 1]"),
        )),
        None => Ok(()),
    }
}

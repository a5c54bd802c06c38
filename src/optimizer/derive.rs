//! Maps a solved LP back into an hourly dispatch and reliability metrics.

use super::model::{LpModel, VarKey};
use super::solver::LpSolution;
use crate::domain::{DispatchSeries, ParetoPoint, Scenario, UnmodeledSeries};

/// Unserved energy above this (MW) counts as a loss-of-load hour.
pub const LOLE_THRESHOLD_MW: f64 = 1e-3;

/// Aggregate reliability figures for one dispatch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReliabilityMetrics {
    /// Expected unserved energy (MWh)
    pub eue: f64,
    /// Hours with unserved energy above [`LOLE_THRESHOLD_MW`]
    pub lole: f64,
    pub reliability: f64,
}

impl ReliabilityMetrics {
    pub fn from_dispatch(dispatch: &DispatchSeries, dt_hours: f64) -> Self {
        let eue: f64 = dispatch.unserved.iter().map(|u| u * dt_hours).sum();
        let total_demand: f64 = dispatch.base_load.iter().map(|l| l * dt_hours).sum();
        let reliability = if total_demand > 0.0 {
            1.0 - eue / total_demand
        } else {
            1.0
        };
        let lole = dispatch
            .unserved
            .iter()
            .filter(|u| **u > LOLE_THRESHOLD_MW)
            .count() as f64;

        Self {
            eue,
            lole,
            reliability,
        }
    }
}

/// Hourly trajectory from a solution. Battery SoC and queue are unmodeled and stay zero.
pub fn dispatch_series(scenario: &Scenario, model: &LpModel, solution: &LpSolution) -> DispatchSeries {
    let horizon = model.layout().horizon();
    let value = |key| solution.value(model, key);

    DispatchSeries {
        time: (0..horizon).collect(),
        grid_import: (0..horizon).map(|t| value(VarKey::Import(t))).collect(),
        grid_export: (0..horizon).map(|t| value(VarKey::Export(t))).collect(),
        compute_power: (0..horizon).map(|t| value(VarKey::Compute(t))).collect(),
        base_load: scenario.base_load_mw.clone(),
        soc: vec![0.0; horizon],
        queue: vec![0.0; horizon],
        unserved: (0..horizon).map(|t| value(VarKey::Unserved(t))).collect(),
        unmodeled: vec![UnmodeledSeries::Soc, UnmodeledSeries::Queue],
    }
}

/// Build the frontier point for a solved model.
pub fn pareto_point(scenario: &Scenario, model: &LpModel, solution: &LpSolution) -> ParetoPoint {
    let dispatch = dispatch_series(scenario, model, solution);
    let metrics = ReliabilityMetrics::from_dispatch(&dispatch, model.dt_hours());

    ParetoPoint {
        target: model.target(),
        reliability: metrics.reliability,
        cost: solution.objective,
        eue: metrics.eue,
        lole: metrics.lole,
        objective: solution.objective,
        dispatch,
    }
}

//! Shared scenario fixtures for integration tests.
#![allow(dead_code)]

use std::path::PathBuf;

use datacenter_dispatch::domain::{
    GridLimits, PiecewisePoint, ReliabilitySettings, Scenario, WorkloadInput,
};

/// Energy-balance and metric tolerance for solved points.
pub const TOLERANCE: f64 = 1e-6;

pub fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

/// The 8-hour demo scenario shipped in `scenarios/demo.json`.
pub fn demo_scenario() -> Scenario {
    Scenario::from_json_path(&scenario_path("demo.json")).expect("demo scenario is valid")
}

/// A scenario with only the fields the dispatch LP consumes.
pub fn core_scenario(
    base_load_mw: Vec<f64>,
    price: Vec<f64>,
    import_max_mw: f64,
    export_max_mw: f64,
    piecewise: Vec<(f64, f64)>,
) -> Scenario {
    Scenario {
        name: "fixture".to_string(),
        mode: Default::default(),
        time_step_hours: 1.0,
        base_load_mw,
        price,
        iso: Default::default(),
        applications: Default::default(),
        grid: GridLimits { import_max_mw, export_max_mw },
        bess: Default::default(),
        generators: vec![],
        workload: WorkloadInput {
            arrivals: vec![],
            deadline_hours: 1,
            soft_sla: false,
            penalty_deadline: 0.0,
            curtailment_cap: 0.0,
            piecewise: piecewise
                .into_iter()
                .map(|(power, work)| PiecewisePoint::new(power, work))
                .collect(),
            min_compute_mw: 0.0,
        },
        reliability: ReliabilitySettings {
            metric: Default::default(),
            target: 1.0,
            sweep: vec![],
        },
        scenarios: vec![],
    }
}

use serde::{Deserialize, Serialize};

use super::{Scenario, ScenarioMode};

/// Series the dispatch model emits as fixed zero placeholders
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnmodeledSeries {
    /// Battery state of charge
    Soc,
    /// Workload queue length
    Queue,
}

/// Hourly dispatch trajectory of one solve
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSeries {
    pub time: Vec<usize>,
    pub grid_import: Vec<f64>,
    pub grid_export: Vec<f64>,
    pub compute_power: Vec<f64>,
    pub base_load: Vec<f64>,
    /// Always zero; see `unmodeled`
    pub soc: Vec<f64>,
    /// Always zero; see `unmodeled`
    pub queue: Vec<f64>,
    pub unserved: Vec<f64>,
    pub unmodeled: Vec<UnmodeledSeries>,
}

impl DispatchSeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Residual of the per-hour energy balance (should be ~0 for a solved point)
    pub fn balance_residual(&self, hour: usize) -> f64 {
        self.grid_import[hour] - self.grid_export[hour] - self.compute_power[hour]
            + self.unserved[hour]
            - self.base_load[hour]
    }
}

/// One point of the cost/reliability frontier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParetoPoint {
    /// Reliability target the point was solved against (`None` = uncapped)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    pub reliability: f64,
    pub cost: f64,
    pub eue: f64,
    pub lole: f64,
    /// Same value as `cost`
    pub objective: f64,
    pub dispatch: DispatchSeries,
}

/// Result envelope handed to the transport/UI layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    pub mode: ScenarioMode,
    pub points: Vec<ParetoPoint>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl SolveResponse {
    /// Wrap solved points, attaching the warnings a caller needs to read them honestly.
    pub fn new(scenario: &Scenario, points: Vec<ParetoPoint>, sweep: bool) -> Self {
        let mut warnings = Vec::new();
        if scenario.mode == ScenarioMode::Heavy {
            warnings.push(
                "Heavy mode runs on an out-of-process worker and is not executed here; \
                 these points come from the light dispatch model."
                    .to_string(),
            );
        }
        if sweep {
            warnings.push(
                "The light dispatch model uses simplified constraints. Use heavy mode for full rigor."
                    .to_string(),
            );
        }
        for input in scenario.unmodeled_inputs() {
            warnings.push(format!(
                "Input `{}` was supplied but is not modeled by the dispatch LP and does not affect these results.",
                input
            ));
        }
        Self {
            mode: scenario.mode,
            points,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> DispatchSeries {
        DispatchSeries {
            time: vec![0, 1],
            grid_import: vec![7.0, 4.0],
            grid_export: vec![0.0, 0.0],
            compute_power: vec![2.0, 2.0],
            base_load: vec![5.0, 5.0],
            soc: vec![0.0, 0.0],
            queue: vec![0.0, 0.0],
            unserved: vec![0.0, 3.0],
            unmodeled: vec![UnmodeledSeries::Soc, UnmodeledSeries::Queue],
        }
    }

    #[test]
    fn test_balance_residual() {
        let s = series();
        assert_eq!(s.balance_residual(0), 0.0);
        assert_eq!(s.balance_residual(1), 0.0);
    }

    #[test]
    fn test_dispatch_serializes_with_contract_names() {
        let json = serde_json::to_value(series()).unwrap();
        for key in [
            "time",
            "gridImport",
            "gridExport",
            "computePower",
            "baseLoad",
            "soc",
            "queue",
            "unserved",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["unmodeled"], serde_json::json!(["soc", "queue"]));
    }

    #[test]
    fn test_point_omits_absent_target() {
        let point = ParetoPoint {
            target: None,
            reliability: 1.0,
            cost: 10.0,
            eue: 0.0,
            lole: 0.0,
            objective: 10.0,
            dispatch: series(),
        };
        let json = serde_json::to_value(&point).unwrap();
        assert!(json.get("target").is_none());
        assert_eq!(json["objective"], json["cost"]);
    }
}

//! End-to-end solves of the shipped 8-hour demo scenario.

mod common;

use common::{demo_scenario, TOLERANCE};
use datacenter_dispatch::domain::{ScenarioMode, UnmodeledSeries};
use datacenter_dispatch::optimizer::DispatchOptimizer;

#[tokio::test]
async fn test_demo_target_is_met_at_expected_cost() {
    let scenario = demo_scenario();
    let point = DispatchOptimizer::default()
        .solve(&scenario, 0.98)
        .await
        .expect("demo scenario is feasible at 0.98");

    assert!(point.cost >= 0.0);
    assert!(point.reliability >= 0.98 - TOLERANCE);
    assert_eq!(point.objective, point.cost);

    // Import covers base load plus the 2 MW lowest breakpoint every hour;
    // export is priced at the import price, so it never changes the cost.
    let expected: f64 = scenario
        .base_load_mw
        .iter()
        .zip(&scenario.price)
        .map(|(load, price)| (load + 2.0) * price)
        .sum();
    assert!((point.cost - expected).abs() < 1e-4, "cost {} vs {}", point.cost, expected);

    for t in 0..scenario.horizon() {
        assert!((point.dispatch.compute_power[t] - 2.0).abs() < TOLERANCE);
        assert!(point.dispatch.unserved[t].abs() < TOLERANCE);
        assert!(point.dispatch.grid_import[t] <= scenario.grid.import_max_mw + TOLERANCE);
        assert!(point.dispatch.grid_export[t] <= scenario.grid.export_max_mw + TOLERANCE);
    }
    assert!(point.eue.abs() < TOLERANCE);
    assert_eq!(point.lole, 0.0);
}

#[tokio::test]
async fn test_demo_dispatch_shape_and_placeholders() {
    let scenario = demo_scenario();
    let point = DispatchOptimizer::default().solve(&scenario, 0.98).await.unwrap();
    let dispatch = &point.dispatch;

    assert_eq!(dispatch.len(), 8);
    assert_eq!(dispatch.time, (0..8).collect::<Vec<_>>());
    assert_eq!(dispatch.base_load, scenario.base_load_mw);
    assert!(dispatch.soc.iter().all(|v| *v == 0.0));
    assert!(dispatch.queue.iter().all(|v| *v == 0.0));
    assert_eq!(dispatch.unmodeled, vec![UnmodeledSeries::Soc, UnmodeledSeries::Queue]);
    for t in 0..dispatch.len() {
        assert!(dispatch.balance_residual(t).abs() < TOLERANCE);
    }
}

#[tokio::test]
async fn test_demo_sweep_follows_sweep_list() {
    let scenario = demo_scenario();
    let response = DispatchOptimizer::default()
        .respond(&scenario, true)
        .await
        .unwrap();

    assert_eq!(response.mode, ScenarioMode::Demo);
    let targets: Vec<_> = response.points.iter().map(|p| p.target).collect();
    assert_eq!(targets, vec![Some(0.9), Some(0.95), Some(0.98)]);
    for point in &response.points {
        assert!(point.reliability >= point.target.unwrap() - TOLERANCE);
    }
}

#[tokio::test]
async fn test_unmodeled_inputs_warn_but_do_not_change_results() {
    let scenario = demo_scenario();
    let mut stripped = scenario.clone();
    stripped.bess = Default::default();
    stripped.generators.clear();
    stripped.scenarios.clear();
    stripped.workload.arrivals.clear();

    let optimizer = DispatchOptimizer::default();
    let full = optimizer.respond(&scenario, false).await.unwrap();
    let bare = optimizer.respond(&stripped, false).await.unwrap();

    assert_eq!(full.points[0].dispatch, bare.points[0].dispatch);
    assert_eq!(full.points[0].cost, bare.points[0].cost);
    assert!(bare.warnings.is_empty());
    assert_eq!(full.warnings.len(), 4);
    assert!(full.warnings.iter().any(|w| w.contains("contingency scenarios")));
}

#[tokio::test]
async fn test_heavy_mode_is_flagged_not_executed() {
    let mut scenario = demo_scenario();
    scenario.mode = ScenarioMode::Heavy;
    let response = DispatchOptimizer::default()
        .respond(&scenario, false)
        .await
        .unwrap();
    assert_eq!(response.mode, ScenarioMode::Heavy);
    assert_eq!(response.points.len(), 1);
    assert!(response.warnings[0].contains("Heavy mode"));
}

#[tokio::test]
async fn test_response_json_contract() {
    let scenario = demo_scenario();
    let response = DispatchOptimizer::default()
        .respond(&scenario, false)
        .await
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["mode"], "demo");
    let point = &json["points"][0];
    for key in ["reliability", "cost", "eue", "lole", "objective", "dispatch"] {
        assert!(point.get(key).is_some(), "missing {key}");
    }
    assert_eq!(point["dispatch"]["gridImport"].as_array().unwrap().len(), 8);
    assert!(json["warnings"].is_array());
}

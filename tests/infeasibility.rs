//! Infeasible reliability targets surface as a distinct error category.

mod common;

use common::core_scenario;
use datacenter_dispatch::domain::Scenario;
use datacenter_dispatch::optimizer::DispatchOptimizer;
use datacenter_dispatch::DispatchError;

fn islanded() -> Scenario {
    core_scenario(
        vec![5.0, 6.0, 4.0],
        vec![30.0, 30.0, 30.0],
        0.0,
        0.0,
        vec![(0.0, 0.0), (2.0, 3.0)],
    )
}

#[tokio::test]
async fn test_zero_caps_full_reliability_is_infeasible() {
    let err = DispatchOptimizer::default()
        .solve(&islanded(), 1.0)
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::InfeasibleModel(_)));
    assert_eq!(err.category(), "infeasible");
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_zero_target_is_always_feasible() {
    let point = DispatchOptimizer::default()
        .solve(&islanded(), 0.0)
        .await
        .unwrap();
    assert!((point.eue - 15.0).abs() < 1e-6);
    assert_eq!(point.lole, 3.0);
    assert!(point.reliability.abs() < 1e-9);
}

#[tokio::test]
async fn test_infeasible_point_aborts_whole_sweep() {
    let err = DispatchOptimizer::default()
        .solve_pareto(&islanded(), &[0.0, 0.5])
        .await
        .unwrap_err();
    assert_eq!(err.category(), "infeasible");
}

#[test]
fn test_malformed_scenario_is_invalid_input_not_infeasible() {
    let err = Scenario::from_json_str(r#"{"name": "broken"}"#).unwrap_err();
    assert!(matches!(err, DispatchError::InvalidInput(_)));
    assert_eq!(err.category(), "invalid_input");
    assert_ne!(err.exit_code(), DispatchError::infeasible(Some(1.0)).exit_code());
}

//! Dispatch optimizer: LP model builder, solver invocation, dispatch
//! derivation and the reliability sweep that ties them together.

pub mod derive;
pub mod model;
pub mod solver;
pub mod sweep;

pub use derive::{pareto_point, ReliabilityMetrics, LOLE_THRESHOLD_MW};
pub use model::{Bound, ConstraintKey, LpConstraint, LpModel, LpVariable, ModelLayout, VarKey};
pub use solver::{invoke, LpSolution, LpSolver, MiniLpSolver};
pub use sweep::DispatchOptimizer;

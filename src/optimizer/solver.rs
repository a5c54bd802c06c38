//! Solver invocation
//!
//! The LP is handed to a backend behind [`LpSolver`]; the default backend is
//! `good_lp` with its pure-Rust `minilp` solver. The model is continuous (no
//! integer variables), so any LP backend can serve it.

use anyhow::{Context, Result};
use good_lp::solvers::minilp::minilp;
use good_lp::{constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable};

use super::model::{Bound, LpModel, VarKey};
use crate::error::DispatchError;

/// Raw solver output for one model
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    pub feasible: bool,
    pub objective: f64,
    /// Variable values in model layout order
    pub values: Vec<f64>,
}

impl LpSolution {
    pub fn infeasible() -> Self {
        Self {
            feasible: false,
            objective: 0.0,
            values: Vec::new(),
        }
    }

    /// Value of `key`; missing entries read as zero.
    pub fn value(&self, model: &LpModel, key: VarKey) -> f64 {
        self.values
            .get(model.layout().variable_index(key))
            .copied()
            .unwrap_or(0.0)
    }
}

/// A linear programming backend.
///
/// Implementations must treat the model as a pure input: same model, same answer.
#[cfg_attr(test, mockall::automock)]
pub trait LpSolver: Send + Sync {
    /// Solve `model`, reporting infeasibility through [`LpSolution::feasible`].
    fn solve(&self, model: &LpModel) -> Result<LpSolution>;
}

/// `good_lp` backend using the bundled `minilp` simplex solver
#[derive(Debug, Clone, Copy, Default)]
pub struct MiniLpSolver;

impl LpSolver for MiniLpSolver {
    fn solve(&self, model: &LpModel) -> Result<LpSolution> {
        let layout = model.layout();

        let mut problem_vars = ProblemVariables::new();
        let vars: Vec<Variable> = model
            .variables()
            .iter()
            .map(|_| problem_vars.add(variable().min(0.0)))
            .collect();

        let objective: Expression = model
            .variables()
            .iter()
            .zip(&vars)
            .map(|(var, x)| var.objective * *x)
            .sum();

        let mut rows: Vec<Expression> = (0..model.constraints().len())
            .map(|_| Expression::with_capacity(4))
            .collect();
        for (var, x) in model.variables().iter().zip(&vars) {
            for (key, coefficient) in &var.coefficients {
                let row = rows
                    .get_mut(layout.constraint_index(*key))
                    .with_context(|| format!("{} references missing row {}", var.key, key))?;
                *row += *coefficient * *x;
            }
        }

        let mut problem = problem_vars.minimise(objective).using(minilp);
        for (row, expr) in model.constraints().iter().zip(rows) {
            problem = match row.bound {
                Bound::Equal(value) => problem.with(constraint!(expr == value)),
                Bound::Min(value) => problem.with(constraint!(expr >= value)),
                Bound::Max(value) => problem.with(constraint!(expr <= value)),
            };
        }

        let solution = match problem.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => return Ok(LpSolution::infeasible()),
            Err(ResolutionError::Unbounded) => anyhow::bail!("dispatch LP is unbounded"),
            Err(other) => {
                return Err(anyhow::Error::new(other).context("minilp failed to solve dispatch LP"))
            }
        };

        let values: Vec<f64> = vars.iter().map(|x| solution.value(*x)).collect();
        Ok(LpSolution {
            feasible: true,
            objective: model.objective_value(&values),
            values,
        })
    }
}

/// Solve `model` and turn an infeasible outcome into [`DispatchError::InfeasibleModel`].
///
/// Not retried: the LP is deterministic.
pub fn invoke(solver: &dyn LpSolver, model: &LpModel) -> Result<LpSolution, DispatchError> {
    let solution = solver
        .solve(model)
        .with_context(|| format!("LP backend failed (reliability target {:?})", model.target()))?;

    if !solution.feasible {
        tracing::warn!(reliability_target = ?model.target(), "dispatch LP infeasible");
        return Err(DispatchError::infeasible(model.target()));
    }
    Ok(solution)
}

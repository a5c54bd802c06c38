//! Pareto sweep orchestration
//!
//! Each reliability target runs its own build -> solve -> derive pipeline on the
//! blocking pool. Pipelines share nothing but the immutable scenario, so a sweep
//! may keep several in flight; points are still returned in target order and
//! the first failure aborts the sweep.

use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use futures::{stream, StreamExt, TryStreamExt};
use tracing::{info, warn};

use super::derive::pareto_point;
use super::model::LpModel;
use super::solver::{invoke, LpSolver, MiniLpSolver};
use crate::config::OptimizerConfig;
use crate::domain::{ParetoPoint, Scenario, SolveResponse};
use crate::error::DispatchError;

/// Runs single-target solves and reliability sweeps for a scenario
#[derive(Clone)]
pub struct DispatchOptimizer {
    solver: Arc<dyn LpSolver>,
    settings: OptimizerConfig,
}

impl Default for DispatchOptimizer {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

impl DispatchOptimizer {
    pub fn new(settings: OptimizerConfig) -> Self {
        Self::with_solver(Arc::new(MiniLpSolver), settings)
    }

    pub fn with_solver(solver: Arc<dyn LpSolver>, settings: OptimizerConfig) -> Self {
        Self { solver, settings }
    }

    pub fn settings(&self) -> &OptimizerConfig {
        &self.settings
    }

    /// Build, solve and derive one point on the calling thread.
    ///
    /// `None` solves without a reliability constraint.
    pub fn solve_blocking(
        &self,
        scenario: &Scenario,
        target: Option<f64>,
    ) -> Result<ParetoPoint, DispatchError> {
        let started = Instant::now();
        let model = LpModel::build(scenario, target, self.settings.value_of_lost_load);
        let solution = invoke(self.solver.as_ref(), &model)?;
        let point = pareto_point(scenario, &model, &solution);

        info!(
            reliability_target = ?target,
            reliability = point.reliability,
            cost = point.cost,
            eue = point.eue,
            lole = point.lole,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "solved dispatch point"
        );
        Ok(point)
    }

    async fn solve_bounded(
        &self,
        scenario: Arc<Scenario>,
        target: Option<f64>,
    ) -> Result<ParetoPoint, DispatchError> {
        let this = self.clone();
        let task = tokio::task::spawn_blocking(move || this.solve_blocking(&scenario, target));

        let joined = match self.settings.solve_timeout() {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(reliability_target = ?target, seconds = limit.as_secs(), "dispatch solve timed out");
                    return Err(DispatchError::SolveTimeout {
                        target,
                        seconds: limit.as_secs(),
                    });
                }
            },
            None => task.await,
        };

        joined.map_err(|err| anyhow::Error::new(err).context("dispatch solve task failed"))?
    }

    /// Solve a single reliability target (a one-element sweep).
    pub async fn solve(&self, scenario: &Scenario, target: f64) -> Result<ParetoPoint, DispatchError> {
        self.solve_pareto(scenario, &[target])
            .await?
            .pop()
            .ok_or_else(|| anyhow!("sweep over one target returned no point").into())
    }

    /// One point per target, in target order. The first failure aborts the sweep.
    ///
    /// With `max_parallel_solves > 1`, solves already in flight when a target
    /// fails are abandoned, not cancelled: their blocking tasks run to
    /// completion and their results are discarded.
    pub async fn solve_pareto(
        &self,
        scenario: &Scenario,
        targets: &[f64],
    ) -> Result<Vec<ParetoPoint>, DispatchError> {
        let scenario = Arc::new(scenario.clone());
        let in_flight = self.settings.max_parallel_solves.max(1);

        let points: Vec<ParetoPoint> = stream::iter(targets.iter().copied())
            .map(|target| self.solve_bounded(Arc::clone(&scenario), Some(target)))
            .buffered(in_flight)
            .try_collect()
            .await?;

        info!(scenario = %scenario.name, points = points.len(), "reliability sweep complete");
        Ok(points)
    }

    /// Solve `reliability.target`, or the whole `reliability.sweep` when `pareto`
    /// is set, and wrap the points with their warnings.
    pub async fn respond(&self, scenario: &Scenario, pareto: bool) -> Result<SolveResponse, DispatchError> {
        for input in scenario.unmodeled_inputs() {
            warn!(input = %input, "input supplied but not modeled");
        }
        let points = if pareto {
            self.solve_pareto(scenario, &scenario.reliability.sweep).await?
        } else {
            vec![self.solve(scenario, scenario.reliability.target).await?]
        };
        Ok(SolveResponse::new(scenario, points, pareto))
    }
}

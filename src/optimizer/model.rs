//! LP model builder
//!
//! Turns a [`Scenario`] and an optional reliability target into a linear
//! program over hourly grid import/export, compute power, unserved energy and
//! piecewise weights. Variables and constraints are addressed through typed
//! keys resolved by [`ModelLayout`], so every hour's block is laid out at a
//! fixed offset and the model can be checked for completeness.
//!
//! Per hour `t` and breakpoint `k`:
//! - `balance_t`:      import - export - compute + unserved = base_load
//! - `import_cap_t`:   import <= import_max
//! - `export_cap_t`:   export <= export_max
//! - `compute_min_t`:  compute >= min_compute
//! - `unserved_t`:     unserved >= 0
//! - `lambda_sum_t`:   sum_k lambda = 1
//! - `compute_link_t`: compute - sum_k lambda * power_k = 0
//! - `lambda_t_k`:     lambda >= 0
//!
//! With a target, `eue_target` caps `sum_t unserved * dt` at
//! `(1 - target) * total_demand`.
//!
//! The weights form a convex combination over all breakpoints with no
//! adjacency restriction. They only enter through `compute_link_t`, so every
//! compute power between the smallest and largest breakpoint stays reachable
//! exactly as with adjacent-pair interpolation.

use std::fmt;

use crate::domain::Scenario;

/// Decision variable, addressed by hour (and breakpoint for weights)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKey {
    Import(usize),
    Export(usize),
    Compute(usize),
    Unserved(usize),
    Lambda { hour: usize, breakpoint: usize },
}

impl VarKey {
    pub fn hour(&self) -> usize {
        match *self {
            VarKey::Import(t) | VarKey::Export(t) | VarKey::Compute(t) | VarKey::Unserved(t) => t,
            VarKey::Lambda { hour, .. } => hour,
        }
    }
}

impl fmt::Display for VarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarKey::Import(t) => write!(f, "import_{t}"),
            VarKey::Export(t) => write!(f, "export_{t}"),
            VarKey::Compute(t) => write!(f, "compute_{t}"),
            VarKey::Unserved(t) => write!(f, "unserved_{t}"),
            VarKey::Lambda { hour, breakpoint } => write!(f, "lambda_{hour}_{breakpoint}"),
        }
    }
}

/// Constraint row, addressed by hour (and breakpoint for weight floors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKey {
    Balance(usize),
    ImportCap(usize),
    ExportCap(usize),
    ComputeMin(usize),
    UnservedFloor(usize),
    LambdaSum(usize),
    ComputeLink(usize),
    LambdaFloor { hour: usize, breakpoint: usize },
    EueTarget,
}

impl fmt::Display for ConstraintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKey::Balance(t) => write!(f, "balance_{t}"),
            ConstraintKey::ImportCap(t) => write!(f, "import_cap_{t}"),
            ConstraintKey::ExportCap(t) => write!(f, "export_cap_{t}"),
            ConstraintKey::ComputeMin(t) => write!(f, "compute_min_{t}"),
            ConstraintKey::UnservedFloor(t) => write!(f, "unserved_{t}"),
            ConstraintKey::LambdaSum(t) => write!(f, "lambda_sum_{t}"),
            ConstraintKey::ComputeLink(t) => write!(f, "compute_link_{t}"),
            ConstraintKey::LambdaFloor { hour, breakpoint } => {
                write!(f, "lambda_{hour}_{breakpoint}")
            }
            ConstraintKey::EueTarget => write!(f, "eue_target"),
        }
    }
}

/// Right-hand side of a constraint row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Equal(f64),
    Min(f64),
    Max(f64),
}

/// Fixed index scheme for a horizon and breakpoint count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelLayout {
    horizon: usize,
    breakpoints: usize,
}

impl ModelLayout {
    const SCALAR_VARS_PER_HOUR: usize = 4;
    const SCALAR_ROWS_PER_HOUR: usize = 7;

    pub fn new(horizon: usize, breakpoints: usize) -> Self {
        Self { horizon, breakpoints }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn breakpoints(&self) -> usize {
        self.breakpoints
    }

    fn vars_per_hour(&self) -> usize {
        Self::SCALAR_VARS_PER_HOUR + self.breakpoints
    }

    fn rows_per_hour(&self) -> usize {
        Self::SCALAR_ROWS_PER_HOUR + self.breakpoints
    }

    pub fn variable_count(&self) -> usize {
        self.horizon * self.vars_per_hour()
    }

    /// Row count; the target row sits after all hourly rows.
    pub fn constraint_count(&self, with_target: bool) -> usize {
        self.horizon * self.rows_per_hour() + usize::from(with_target)
    }

    pub fn variable_index(&self, key: VarKey) -> usize {
        let offset = match key {
            VarKey::Import(_) => 0,
            VarKey::Export(_) => 1,
            VarKey::Compute(_) => 2,
            VarKey::Unserved(_) => 3,
            VarKey::Lambda { breakpoint, .. } => Self::SCALAR_VARS_PER_HOUR + breakpoint,
        };
        key.hour() * self.vars_per_hour() + offset
    }

    pub fn constraint_index(&self, key: ConstraintKey) -> usize {
        let (hour, offset) = match key {
            ConstraintKey::Balance(t) => (t, 0),
            ConstraintKey::ImportCap(t) => (t, 1),
            ConstraintKey::ExportCap(t) => (t, 2),
            ConstraintKey::ComputeMin(t) => (t, 3),
            ConstraintKey::UnservedFloor(t) => (t, 4),
            ConstraintKey::LambdaSum(t) => (t, 5),
            ConstraintKey::ComputeLink(t) => (t, 6),
            ConstraintKey::LambdaFloor { hour, breakpoint } => {
                (hour, Self::SCALAR_ROWS_PER_HOUR + breakpoint)
            }
            ConstraintKey::EueTarget => return self.horizon * self.rows_per_hour(),
        };
        hour * self.rows_per_hour() + offset
    }
}

/// A decision variable with its objective and row coefficients
#[derive(Debug, Clone, PartialEq)]
pub struct LpVariable {
    pub key: VarKey,
    pub objective: f64,
    pub coefficients: Vec<(ConstraintKey, f64)>,
}

impl LpVariable {
    fn new(key: VarKey, objective: f64) -> Self {
        Self {
            key,
            objective,
            coefficients: Vec::new(),
        }
    }

    fn with(mut self, row: ConstraintKey, coefficient: f64) -> Self {
        self.coefficients.push((row, coefficient));
        self
    }

    pub fn coefficient(&self, row: ConstraintKey) -> f64 {
        self.coefficients
            .iter()
            .filter(|(key, _)| *key == row)
            .map(|(_, c)| c)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LpConstraint {
    pub key: ConstraintKey,
    pub bound: Bound,
}

/// Immutable minimisation LP built for one solve.
///
/// Variables are implicitly non-negative; rows are stored in layout order.
#[derive(Debug, Clone, PartialEq)]
pub struct LpModel {
    layout: ModelLayout,
    target: Option<f64>,
    dt_hours: f64,
    variables: Vec<LpVariable>,
    constraints: Vec<LpConstraint>,
}

impl LpModel {
    /// Build the dispatch LP for `scenario`, optionally capping unserved energy
    /// at the fraction of demand implied by `reliability_target`.
    pub fn build(scenario: &Scenario, reliability_target: Option<f64>, value_of_lost_load: f64) -> Self {
        let horizon = scenario.horizon();
        let points = &scenario.workload.piecewise;
        let layout = ModelLayout::new(horizon, points.len());
        let dt = scenario.time_step_hours;

        let mut variables = Vec::with_capacity(layout.variable_count());
        let mut constraints = Vec::with_capacity(layout.constraint_count(reliability_target.is_some()));

        for t in 0..horizon {
            let price = scenario.price[t];

            constraints.extend([
                LpConstraint { key: ConstraintKey::Balance(t), bound: Bound::Equal(scenario.base_load_mw[t]) },
                LpConstraint { key: ConstraintKey::ImportCap(t), bound: Bound::Max(scenario.grid.import_max_mw) },
                LpConstraint { key: ConstraintKey::ExportCap(t), bound: Bound::Max(scenario.grid.export_max_mw) },
                LpConstraint { key: ConstraintKey::ComputeMin(t), bound: Bound::Min(scenario.workload.min_compute_mw) },
                LpConstraint { key: ConstraintKey::UnservedFloor(t), bound: Bound::Min(0.0) },
                LpConstraint { key: ConstraintKey::LambdaSum(t), bound: Bound::Equal(1.0) },
                LpConstraint { key: ConstraintKey::ComputeLink(t), bound: Bound::Equal(0.0) },
            ]);
            constraints.extend((0..points.len()).map(|k| LpConstraint {
                key: ConstraintKey::LambdaFloor { hour: t, breakpoint: k },
                bound: Bound::Min(0.0),
            }));

            variables.push(
                LpVariable::new(VarKey::Import(t), price * dt)
                    .with(ConstraintKey::Balance(t), 1.0)
                    .with(ConstraintKey::ImportCap(t), 1.0),
            );
            variables.push(
                LpVariable::new(VarKey::Export(t), -price * dt)
                    .with(ConstraintKey::Balance(t), -1.0)
                    .with(ConstraintKey::ExportCap(t), 1.0),
            );
            variables.push(
                LpVariable::new(VarKey::Compute(t), 0.0)
                    .with(ConstraintKey::Balance(t), -1.0)
                    .with(ConstraintKey::ComputeMin(t), 1.0)
                    .with(ConstraintKey::ComputeLink(t), 1.0),
            );

            let mut unserved = LpVariable::new(VarKey::Unserved(t), value_of_lost_load)
                .with(ConstraintKey::Balance(t), 1.0)
                .with(ConstraintKey::UnservedFloor(t), 1.0);
            if reliability_target.is_some() {
                unserved = unserved.with(ConstraintKey::EueTarget, dt);
            }
            variables.push(unserved);

            for (k, point) in points.iter().enumerate() {
                variables.push(
                    LpVariable::new(VarKey::Lambda { hour: t, breakpoint: k }, 0.0)
                        .with(ConstraintKey::LambdaFloor { hour: t, breakpoint: k }, 1.0)
                        .with(ConstraintKey::LambdaSum(t), 1.0)
                        .with(ConstraintKey::ComputeLink(t), -point.power_mw),
                );
            }
        }

        if let Some(target) = reliability_target {
            constraints.push(LpConstraint {
                key: ConstraintKey::EueTarget,
                bound: Bound::Max((1.0 - target) * scenario.total_demand_mwh()),
            });
        }

        debug_assert_eq!(variables.len(), layout.variable_count());
        debug_assert_eq!(constraints.len(), layout.constraint_count(reliability_target.is_some()));

        tracing::debug!(
            horizon,
            breakpoints = layout.breakpoints(),
            variables = variables.len(),
            constraints = constraints.len(),
            reliability_target = ?reliability_target,
            "built dispatch LP"
        );

        Self {
            layout,
            target: reliability_target,
            dt_hours: dt,
            variables,
            constraints,
        }
    }

    pub fn layout(&self) -> ModelLayout {
        self.layout
    }

    pub fn target(&self) -> Option<f64> {
        self.target
    }

    pub fn dt_hours(&self) -> f64 {
        self.dt_hours
    }

    pub fn variables(&self) -> &[LpVariable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[LpConstraint] {
        &self.constraints
    }

    pub fn variable(&self, key: VarKey) -> Option<&LpVariable> {
        self.variables
            .get(self.layout.variable_index(key))
            .filter(|v| v.key == key)
    }

    pub fn constraint(&self, key: ConstraintKey) -> Option<&LpConstraint> {
        self.constraints
            .get(self.layout.constraint_index(key))
            .filter(|c| c.key == key)
    }

    /// Objective evaluated at a full assignment (indexed like `variables`)
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(values)
            .map(|(var, value)| var.objective * value)
            .sum()
    }
}

use thiserror::Error;

/// Failures surfaced by the dispatch pipeline.
///
/// Infeasibility is a normal, user-facing outcome and is kept distinct from
/// malformed input so callers can report the two differently.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Infeasible model: {0}")]
    InfeasibleModel(String),

    #[error("Solve timed out after {seconds}s (reliability target {target:?})")]
    SolveTimeout { target: Option<f64>, seconds: u64 },

    #[error("Unexpected failure: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl DispatchError {
    /// Infeasibility error for a given reliability target.
    pub fn infeasible(target: Option<f64>) -> Self {
        let message = match target {
            Some(target) => format!(
                "no feasible dispatch meets the requested reliability target ({target})"
            ),
            None => "no feasible dispatch exists under the grid caps".to_string(),
        };
        DispatchError::InfeasibleModel(message)
    }

    /// Stable category string for machine consumers
    pub fn category(&self) -> &'static str {
        match self {
            DispatchError::InvalidInput(_) => "invalid_input",
            DispatchError::InfeasibleModel(_) => "infeasible",
            DispatchError::SolveTimeout { .. } => "timeout",
            DispatchError::Unexpected(_) => "internal",
        }
    }

    /// Process exit code used by the command-line runner
    pub fn exit_code(&self) -> u8 {
        match self {
            DispatchError::InvalidInput(_) => 2,
            DispatchError::InfeasibleModel(_) => 3,
            DispatchError::SolveTimeout { .. } => 4,
            DispatchError::Unexpected(_) => 1,
        }
    }
}

impl From<validator::ValidationErrors> for DispatchError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DispatchError::InvalidInput(errors.to_string())
    }
}

impl From<figment::Error> for DispatchError {
    fn from(error: figment::Error) -> Self {
        DispatchError::InvalidInput(format!("configuration: {error}"))
    }
}

use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub optimizer: OptimizerConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Objective penalty per MW of unserved load per hour
    pub value_of_lost_load: f64,
    /// Per-target solve bound; 0 disables it
    pub solve_timeout_seconds: u64,
    /// Targets solved concurrently during a sweep
    pub max_parallel_solves: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            value_of_lost_load: 1000.0,
            solve_timeout_seconds: 30,
            max_parallel_solves: 1,
        }
    }
}

impl OptimizerConfig {
    pub fn solve_timeout(&self) -> Option<Duration> {
        (self.solve_timeout_seconds > 0).then(|| Duration::from_secs(self.solve_timeout_seconds))
    }

    pub fn validate(&self) -> Result<(), DispatchError> {
        if !self.value_of_lost_load.is_finite() || self.value_of_lost_load <= 0.0 {
            return Err(DispatchError::InvalidInput(format!(
                "optimizer.value_of_lost_load must be a positive finite number, got {}",
                self.value_of_lost_load
            )));
        }
        if self.max_parallel_solves == 0 {
            return Err(DispatchError::InvalidInput(
                "optimizer.max_parallel_solves must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Used when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then `config/default.toml` if present, then `DISPATCH__*` environment variables.
    pub fn load() -> Result<Self, DispatchError> {
        Self::extract(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Like [`Config::load`], but `path` was named explicitly and must exist.
    pub fn load_from(path: &Path) -> Result<Self, DispatchError> {
        if !path.is_file() {
            return Err(DispatchError::InvalidInput(format!(
                "config file `{}` does not exist",
                path.display()
            )));
        }
        Self::extract(path)
    }

    fn extract(path: &Path) -> Result<Self, DispatchError> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("DISPATCH__").split("__"));
        let config: Config = figment.extract()?;
        config.optimizer.validate()?;
        Ok(config)
    }
}

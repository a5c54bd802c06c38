//! Short-horizon energy dispatch for a data center with grid exchange,
//! under an unserved-energy reliability constraint.

pub mod config;
pub mod domain;
pub mod error;
pub mod optimizer;
pub mod telemetry;

pub use error::DispatchError;

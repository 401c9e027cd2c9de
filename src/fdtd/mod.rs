//! FDTD (Finite-Difference Time-Domain) engine for the 2D TMz problem.
//!
//! - [`Operator`]: the immutable setup (domain, grid, source, media)
//! - [`BasicEngine`] / [`ParallelEngine`]: leap-frog update implementations
//! - [`Engine`]: enum dispatch over the implementations
//! - [`EngineBatch`]: batched stepping with snapshot sinks and cancellation
//! - [`Simulator`]: lifecycle driver and read-only query surface

mod basic_engine;
pub mod batch;
mod engine_impl;
pub mod excitation;
mod new_engine;
pub mod operator;
mod parallel_engine;
mod simulation;

#[cfg(test)]
pub mod engine_testing;

pub use basic_engine::BasicEngine;
pub use batch::{
    BatchResult, CancelToken, EnergyMonitorConfig, EnergySample, EngineBatch, NullSink,
    SnapshotSink, TerminationConfig, TerminationReason,
};
pub use engine_impl::EngineImpl;
pub use excitation::{Light, LineSource, SOURCE_COLUMN};
pub use new_engine::Engine;
pub use operator::{EFieldCoefficients, HFieldCoefficients, Operator};
pub use parallel_engine::ParallelEngine;
pub use simulation::{RunStats, SimulationState, Simulator};

use serde::Deserialize;

/// Engine implementation selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineType {
    /// Single-threaded reference engine
    #[default]
    Basic,
    /// Rayon row-parallel engine
    Parallel,
}

impl std::str::FromStr for EngineType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(EngineType::Basic),
            "parallel" => Ok(EngineType::Parallel),
            other => Err(crate::Error::InvalidConfiguration(format!(
                "unknown engine type: {}. Use 'basic' or 'parallel'",
                other
            ))),
        }
    }
}

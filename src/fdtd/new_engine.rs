//! Unified FDTD Engine with enum-based dispatch.
//!
//! This module provides the main `Engine` enum that dispatches to specific
//! engine implementations (Basic, Parallel) using macro-based dispatch
//! instead of trait objects.

use crate::arrays::TmzFields;
use crate::fdtd::{
    BasicEngine, BatchResult, EngineBatch, EngineImpl, EngineType, Operator, ParallelEngine,
    SnapshotSink,
};
use crate::Result;

/// Main FDTD engine enum with compile-time dispatch.
pub enum Engine {
    /// Single-threaded reference implementation
    Basic(BasicEngine),
    /// Multi-threaded implementation
    Parallel(ParallelEngine),
}

/// Expands to a match that calls the method on the active variant.
macro_rules! dispatch_engine {
    ($self:expr, $method:ident($($args:expr),*)) => {
        match $self {
            Engine::Basic(e) => e.$method($($args),*),
            Engine::Parallel(e) => e.$method($($args),*),
        }
    };
}

impl Engine {
    /// Create a new engine from an operator.
    pub fn new(operator: &Operator, engine_type: EngineType) -> Result<Self> {
        Ok(match engine_type {
            EngineType::Basic => Engine::Basic(BasicEngine::new(operator)?),
            EngineType::Parallel => Engine::Parallel(ParallelEngine::new(operator)?),
        })
    }

    /// Advance one timestep.
    #[inline]
    pub fn step(&mut self) {
        dispatch_engine!(self, step())
    }

    /// Execute a batch of timesteps.
    pub fn run_batch<S>(&mut self, batch: &EngineBatch, sink: &mut S) -> Result<BatchResult>
    where
        S: SnapshotSink + ?Sized,
    {
        dispatch_engine!(self, run_batch(batch, sink))
    }

    /// Get the current timestep number.
    #[inline]
    pub fn current_timestep(&self) -> u64 {
        dispatch_engine!(self, current_timestep())
    }

    /// Read access to the live fields.
    #[inline]
    pub fn read_fields(&self) -> &TmzFields {
        dispatch_engine!(self, read_fields())
    }

    /// Write access to the live fields.
    #[inline]
    pub fn write_fields(&mut self) -> &mut TmzFields {
        dispatch_engine!(self, write_fields())
    }

    /// Reset the engine to its configured state.
    #[inline]
    pub fn reset(&mut self) {
        dispatch_engine!(self, reset())
    }

    /// Get the engine type.
    pub fn engine_type(&self) -> EngineType {
        match self {
            Engine::Basic(_) => EngineType::Basic,
            Engine::Parallel(_) => EngineType::Parallel,
        }
    }
}

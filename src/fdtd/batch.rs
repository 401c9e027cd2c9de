//! Batched execution of FDTD timesteps.
//!
//! A batch runs a fixed number of steps, hands every post-step Ez grid to a
//! [`SnapshotSink`], samples field energy on request and polls a
//! [`CancelToken`] between steps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use instant::Duration;

use crate::arrays::{Field2D, FieldHistory, TmzFields};
use crate::Result;

/// Receiver for the Ez grid after each step.
///
/// `timestep` is the engine's step counter after the step, so the first
/// recorded snapshot of a fresh engine carries `1`.
pub trait SnapshotSink {
    fn record(&mut self, timestep: u64, ez: &Field2D) -> Result<()>;
}

impl SnapshotSink for FieldHistory {
    fn record(&mut self, _timestep: u64, ez: &Field2D) -> Result<()> {
        self.try_push(ez)
    }
}

/// Sink that discards every snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn record(&mut self, _timestep: u64, _ez: &Field2D) -> Result<()> {
        Ok(())
    }
}

/// Cooperative cancellation flag shared between a run and its controller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the run to stop before its next step.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Configuration for a batch of timesteps.
#[derive(Debug, Clone, Default)]
pub struct EngineBatch {
    /// Number of timesteps to execute
    pub num_steps: u64,

    /// Termination conditions
    pub termination: TerminationConfig,

    /// Energy monitoring settings
    pub energy_monitoring: EnergyMonitorConfig,
}

impl EngineBatch {
    /// Plain batch of `num_steps` steps.
    pub fn steps(num_steps: u64) -> Self {
        Self {
            num_steps,
            ..Default::default()
        }
    }
}

/// Result from executing a batch of timesteps.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Number of timesteps actually executed
    pub timesteps_executed: u64,

    /// Reason for termination
    pub termination_reason: TerminationReason,

    /// Energy samples collected during execution
    pub energy_samples: Vec<EnergySample>,

    /// Peak total energy over the samples
    pub peak_energy: f64,

    /// Wall clock time elapsed
    pub elapsed_time: Duration,
}

/// Reason why a batch terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// Completed requested number of steps
    StepsCompleted,

    /// The cancel token was set
    Cancelled,
}

/// Configuration for batch termination conditions.
#[derive(Debug, Clone)]
pub struct TerminationConfig {
    /// Optional cancellation flag
    pub cancel: Option<CancelToken>,

    /// Poll the cancel flag every N steps (0 = never)
    pub check_interval: u64,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            cancel: None,
            check_interval: 1,
        }
    }
}

impl TerminationConfig {
    /// Whether the batch must stop before executing its `executed`-th step.
    pub fn should_stop(&self, executed: u64) -> bool {
        match &self.cancel {
            Some(token) if self.check_interval > 0 && executed % self.check_interval == 0 => {
                token.is_cancelled()
            }
            _ => false,
        }
    }
}

/// Configuration for energy monitoring during batch execution.
#[derive(Debug, Clone, Default)]
pub struct EnergyMonitorConfig {
    /// Sample energy every N timesteps (0 = disabled)
    pub sample_interval: u64,

    /// Track peak energy
    pub track_peak: bool,
}

/// Energy sample at a specific timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergySample {
    /// Timestep when sample was taken
    pub timestep: u64,

    /// Electric field energy
    pub e_energy: f64,

    /// Magnetic field energy
    pub h_energy: f64,

    /// Total energy (E + H)
    pub total_energy: f64,
}

impl EnergySample {
    pub fn new(timestep: u64, e_energy: f64, h_energy: f64) -> Self {
        Self {
            timestep,
            e_energy,
            h_energy,
            total_energy: e_energy + h_energy,
        }
    }

    pub fn from_fields(timestep: u64, fields: &TmzFields) -> Self {
        Self::new(timestep, fields.e_energy(), fields.h_energy())
    }
}

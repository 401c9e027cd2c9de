//! Engine implementation trait.
//!
//! This module defines the core trait that all FDTD engine implementations
//! must satisfy. It is used for compile-time dispatch via the `Engine` enum.

use instant::Instant;

use crate::arrays::TmzFields;
use crate::fdtd::batch::{
    BatchResult, EnergySample, EngineBatch, SnapshotSink, TerminationReason,
};
use crate::fdtd::Operator;
use crate::Result;

/// Core trait that all engine implementations must satisfy.
///
/// One [`step`](EngineImpl::step) is a full leap-frog cycle:
/// 1. add the line source term of the current step to Ez
/// 2. update Hx and Hy on the interior from the pre-update Ez
/// 3. update Ez on the interior from the freshly updated H
/// 4. advance the step counter
///
/// The halo cells of all three grids are never written by the update, so
/// the domain edge behaves as a reflecting wall.
pub trait EngineImpl: Sized + Send {
    /// Create an engine in the configured state: H zero, Ez zero except
    /// for the seeded source column, step counter at zero.
    fn new(operator: &Operator) -> Result<Self>;

    /// Advance the fields by one timestep.
    fn step(&mut self);

    /// Get the current timestep number.
    fn current_timestep(&self) -> u64;

    /// Read access to the live fields.
    fn read_fields(&self) -> &TmzFields;

    /// Write access to the live fields.
    fn write_fields(&mut self) -> &mut TmzFields;

    /// Return to the configured state.
    fn reset(&mut self);

    /// Execute a batch of timesteps, recording Ez after every step.
    fn run_batch<S>(&mut self, batch: &EngineBatch, sink: &mut S) -> Result<BatchResult>
    where
        S: SnapshotSink + ?Sized,
    {
        let start_time = Instant::now();
        let mut energy_samples = Vec::new();
        let mut peak_energy = 0.0f64;
        let mut steps_executed = 0u64;
        let mut termination_reason = TerminationReason::StepsCompleted;

        for _ in 0..batch.num_steps {
            if batch.termination.should_stop(steps_executed) {
                termination_reason = TerminationReason::Cancelled;
                break;
            }

            self.step();
            steps_executed += 1;

            let timestep = self.current_timestep();
            sink.record(timestep, &self.read_fields().ez)?;

            let interval = batch.energy_monitoring.sample_interval;
            if interval > 0 && timestep % interval == 0 {
                let sample = EnergySample::from_fields(timestep, self.read_fields());
                if batch.energy_monitoring.track_peak {
                    peak_energy = peak_energy.max(sample.total_energy);
                }
                energy_samples.push(sample);
            }
        }

        Ok(BatchResult {
            timesteps_executed: steps_executed,
            termination_reason,
            energy_samples,
            peak_energy,
            elapsed_time: start_time.elapsed(),
        })
    }
}

//! High-level simulation control.
//!
//! The Simulator owns the operator and the engine and exposes the step /
//! run lifecycle plus a read-only view of the state for visualisation.

use indicatif::{ProgressBar, ProgressStyle};
use instant::Instant;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    CancelToken, EnergyMonitorConfig, EnergySample, Engine, EngineBatch, EngineType, Light,
    Operator, SnapshotSink, TerminationConfig, TerminationReason,
};
use crate::arrays::{Field2D, FieldHistory};
use crate::config::SimulationConfig;
use crate::geometry::{Bound, Discretizer};
use crate::media::{PermeabilityField, PermittivityField};
use crate::{Error, Result};

/// Snapshot histories above this size are logged as a warning.
const LARGE_HISTORY_BYTES: u64 = 4 * 1024 * 1024 * 1024;

/// Simulation state, derived from the step counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    /// No step taken yet
    Configured,
    /// 0 < t < nt
    Stepping,
    /// t >= nt (stepping further is allowed)
    Complete,
}

/// Statistics from a simulation run
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Total timesteps executed
    pub timesteps: u64,
    /// Total simulation time (seconds)
    pub sim_time: f64,
    /// Wall clock time (seconds)
    pub wall_time: f64,
    /// Peak energy during simulation
    pub peak_energy: f64,
    /// Final energy
    pub final_energy: f64,
    /// Average speed (million cell updates per second)
    pub speed_mcells_per_sec: f64,
    /// Why the run ended
    pub termination_reason: TerminationReason,
}

/// Main simulation controller.
pub struct Simulator {
    /// Immutable setup
    operator: Operator,
    /// Live fields and step counter
    engine: Engine,
    /// Verbosity level
    verbose: u8,
    /// Show progress bar
    show_progress: bool,
    /// Timesteps per batch
    batch_size: u64,
    /// Setup summary already emitted
    setup_logged: bool,
}

impl Simulator {
    /// Build a simulator from `config`.
    ///
    /// Inclusions are drawn from a generator seeded with `config.seed`, or
    /// from OS entropy when no seed is set.
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, &mut rng)
    }

    /// Build a simulator drawing the random medium from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Result<Self> {
        let operator = Operator::from_config(config, rng)?;
        let mut sim = Self::from_operator(operator, config.engine)?;
        sim.set_verbose(config.verbose)
            .set_show_progress(config.show_progress);
        Ok(sim)
    }

    /// Wrap a prebuilt operator.
    ///
    /// Setup details are logged at the start of the first run, so verbosity
    /// set after construction still applies to them.
    pub fn from_operator(operator: Operator, engine_type: EngineType) -> Result<Self> {
        let engine = Engine::new(&operator, engine_type)?;
        Ok(Self {
            operator,
            engine,
            verbose: 1,
            show_progress: true,
            batch_size: 100,
            setup_logged: false,
        })
    }

    fn log_setup(&mut self) {
        if self.setup_logged {
            return;
        }
        self.setup_logged = true;
        if self.verbose == 0 {
            return;
        }
        let disc = self.operator.discretizer();
        info!(
            "FDTD simulation size: {}x{} -> {} cells, {} inclusions ({} cells at eps=1)",
            disc.nx(),
            disc.ny(),
            disc.num_cells(),
            self.operator.permittivity().inclusions().len(),
            self.operator.permittivity().inclusion_cells()
        );
        info!(
            "FDTD timestep: {:.6e} s (courant {:.3}), {} steps to {:.3e} s",
            disc.dt(),
            disc.courant_number(),
            disc.nt(),
            self.operator.bound().max_t()
        );
    }

    /// Set verbosity level (0=quiet, 1=normal, 2=verbose).
    pub fn set_verbose(&mut self, level: u8) -> &mut Self {
        self.verbose = level;
        self
    }

    /// Enable/disable progress bar.
    pub fn set_show_progress(&mut self, show: bool) -> &mut Self {
        self.show_progress = show;
        self
    }

    /// Set the number of timesteps between progress updates and
    /// cancellation-independent bookkeeping (minimum 1).
    pub fn set_batch_size(&mut self, batch_size: u64) -> &mut Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Advance one timestep. May be called past `nt`.
    pub fn step(&mut self) {
        self.engine.step();
    }

    /// Return to the configured state (same medium, fields re-seeded).
    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Run `nt` steps and return a copy of Ez after each one.
    ///
    /// The whole history is held in memory (`nx * ny * nt` values); use
    /// [`run_with`](Self::run_with) and a streaming sink for long runs.
    pub fn run(&mut self) -> Result<FieldHistory> {
        self.log_setup();
        let disc = self.operator.discretizer();
        if disc.history_bytes() > LARGE_HISTORY_BYTES {
            warn!(
                "Full Ez history needs {}; consider streaming snapshots",
                disc.memory_display()
            );
        } else if self.verbose >= 1 {
            info!("Ez history memory: {}", disc.memory_display());
        }

        let steps = usize::try_from(disc.nt()).map_err(|_| {
            Error::InvalidConfiguration(format!(
                "{} timesteps do not fit in memory on this platform",
                disc.nt()
            ))
        })?;
        let mut history = FieldHistory::try_with_capacity(disc.dimensions(), steps)?;
        self.run_with(&mut history, None)?;
        Ok(history)
    }

    /// Run `nt` steps, handing every post-step Ez grid to `sink`.
    ///
    /// A set `cancel` token stops the run before its next step.
    pub fn run_with<S>(&mut self, sink: &mut S, cancel: Option<&CancelToken>) -> Result<RunStats>
    where
        S: SnapshotSink + ?Sized,
    {
        self.log_setup();
        let max_timesteps = self.operator.discretizer().nt();
        let dt = self.operator.timestep();

        let progress = if self.show_progress {
            let pb = ProgressBar::new(max_timesteps);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({per_sec})")
            {
                pb.set_style(style.progress_chars("##-"));
            }
            Some(pb)
        } else {
            None
        };

        let start_time = Instant::now();
        let mut peak_energy = 0.0f64;
        let mut timesteps_run = 0u64;
        let mut termination_reason = TerminationReason::StepsCompleted;

        while timesteps_run < max_timesteps {
            let this_batch_size = (max_timesteps - timesteps_run).min(self.batch_size);

            let batch = EngineBatch {
                num_steps: this_batch_size,
                termination: TerminationConfig {
                    cancel: cancel.cloned(),
                    check_interval: 1,
                },
                energy_monitoring: EnergyMonitorConfig {
                    sample_interval: this_batch_size.min(100),
                    track_peak: true,
                },
            };

            let result = self.engine.run_batch(&batch, &mut *sink)?;
            timesteps_run += result.timesteps_executed;
            peak_energy = peak_energy.max(result.peak_energy);

            if self.verbose >= 2 {
                debug!(
                    "Batch of {} steps in {:?}, peak energy {:.3e}",
                    result.timesteps_executed, result.elapsed_time, result.peak_energy
                );
            }

            if let Some(ref pb) = progress {
                pb.set_position(timesteps_run);
            }

            if result.termination_reason == TerminationReason::Cancelled {
                termination_reason = TerminationReason::Cancelled;
                if self.verbose >= 1 {
                    info!("Simulation cancelled at timestep {}", self.timestep());
                }
                break;
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message("Simulation complete");
        }

        let wall_time = start_time.elapsed().as_secs_f64();
        let final_energy = self.energy().total_energy;
        let num_cells = self.operator.discretizer().num_cells();
        let speed = if wall_time > 0.0 {
            (timesteps_run as f64 * num_cells as f64) / wall_time / 1e6
        } else {
            0.0
        };

        let stats = RunStats {
            timesteps: timesteps_run,
            sim_time: timesteps_run as f64 * dt,
            wall_time,
            peak_energy: peak_energy.max(final_energy),
            final_energy,
            speed_mcells_per_sec: speed,
            termination_reason,
        };

        if self.verbose >= 1 {
            info!(
                "Completed {} timesteps in {:.2}s ({:.2} MC/s)",
                stats.timesteps, stats.wall_time, stats.speed_mcells_per_sec
            );
        }

        Ok(stats)
    }

    /// Current step index.
    pub fn timestep(&self) -> u64 {
        self.engine.current_timestep()
    }

    /// Lifecycle state relative to `nt`.
    pub fn state(&self) -> SimulationState {
        let t = self.timestep();
        if t == 0 {
            SimulationState::Configured
        } else if t < self.operator.discretizer().nt() {
            SimulationState::Stepping
        } else {
            SimulationState::Complete
        }
    }

    /// Live Ez grid.
    pub fn ez(&self) -> &Field2D {
        &self.engine.read_fields().ez
    }

    /// Live Hx grid.
    pub fn hx(&self) -> &Field2D {
        &self.engine.read_fields().hx
    }

    /// Live Hy grid.
    pub fn hy(&self) -> &Field2D {
        &self.engine.read_fields().hy
    }

    /// Relative permittivity map.
    pub fn permittivity(&self) -> &Field2D {
        self.operator.permittivity().epsilon()
    }

    pub fn permittivity_field(&self) -> &PermittivityField {
        self.operator.permittivity()
    }

    pub fn permeability(&self) -> &PermeabilityField {
        self.operator.permeability()
    }

    pub fn bound(&self) -> &Bound {
        self.operator.bound()
    }

    pub fn discretizer(&self) -> &Discretizer {
        self.operator.discretizer()
    }

    pub fn light(&self) -> &Light {
        self.operator.light()
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn engine_type(&self) -> EngineType {
        self.engine.engine_type()
    }

    /// Field energy at the current step.
    pub fn energy(&self) -> EnergySample {
        EnergySample::from_fields(self.timestep(), self.engine.read_fields())
    }
}

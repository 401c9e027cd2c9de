//! Python bindings for the TMz solver using PyO3.
//!
//! Exposes a `Simulator` carrying the configured medium with read-only
//! access to the live Ez grid, the permittivity map and the grid metrics.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::arrays::Field2D;
use crate::config::SimulationConfig;
use crate::fdtd::{EngineType, RunStats, Simulator as RustSimulator};

fn to_nested(field: &Field2D) -> Vec<Vec<f64>> {
    let dims = field.dimensions();
    (0..dims.nx).map(|i| field.row(i).to_vec()).collect()
}

fn config_err(err: crate::Error) -> PyErr {
    match err {
        crate::Error::InvalidConfiguration(_) | crate::Error::Parse(_) => {
            PyValueError::new_err(err.to_string())
        }
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

/// Run statistics returned by `Simulator.run_stats`
#[pyclass(name = "RunStats")]
pub struct PyRunStats {
    #[pyo3(get)]
    timesteps: u64,
    #[pyo3(get)]
    sim_time: f64,
    #[pyo3(get)]
    wall_time: f64,
    #[pyo3(get)]
    speed_mcells_per_sec: f64,
    #[pyo3(get)]
    peak_energy: f64,
    #[pyo3(get)]
    final_energy: f64,
}

impl From<RunStats> for PyRunStats {
    fn from(stats: RunStats) -> Self {
        Self {
            timesteps: stats.timesteps,
            sim_time: stats.sim_time,
            wall_time: stats.wall_time,
            speed_mcells_per_sec: stats.speed_mcells_per_sec,
            peak_energy: stats.peak_energy,
            final_energy: stats.final_energy,
        }
    }
}

#[pymethods]
impl PyRunStats {
    fn __repr__(&self) -> String {
        format!(
            "RunStats(timesteps={}, wall_time={:.3}s, speed={:.2} MC/s)",
            self.timesteps, self.wall_time, self.speed_mcells_per_sec
        )
    }
}

/// Python wrapper for the simulator
#[pyclass(name = "Simulator")]
pub struct PySimulator {
    inner: RustSimulator,
}

#[pymethods]
impl PySimulator {
    /// Create a simulator; every argument defaults to the standard scenario
    #[new]
    #[pyo3(signature = (
        max_x=3e-6,
        max_y=10e-6,
        max_t=1e-12,
        nx=120,
        ny=400,
        wavelength=2.04e-6,
        inclusions=None,
        max_radius=0.45e-6,
        mu_r=1.0,
        courant=1.0,
        seed=None,
        engine="basic"
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        max_x: f64,
        max_y: f64,
        max_t: f64,
        nx: usize,
        ny: usize,
        wavelength: f64,
        inclusions: Option<usize>,
        max_radius: f64,
        mu_r: f64,
        courant: f64,
        seed: Option<u64>,
        engine: &str,
    ) -> PyResult<Self> {
        let config = SimulationConfig {
            max_x,
            max_y,
            max_t,
            nx,
            ny,
            wavelength,
            inclusions,
            max_radius,
            mu_r,
            courant,
            seed,
            engine: engine.parse::<EngineType>().map_err(config_err)?,
            ..Default::default()
        };
        let inner = RustSimulator::new(&config).map_err(config_err)?;
        Ok(Self { inner })
    }

    /// Load a simulator from a TOML configuration file
    #[staticmethod]
    fn from_file(path: &str) -> PyResult<Self> {
        let config = SimulationConfig::from_file(path).map_err(config_err)?;
        let inner = RustSimulator::new(&config).map_err(config_err)?;
        Ok(Self { inner })
    }

    /// Advance the fields by one timestep
    fn step(&mut self) {
        self.inner.step();
    }

    /// Run `nt` steps and return the Ez history indexed `[x][y][t]`
    fn run(&mut self, py: Python<'_>) -> PyResult<Vec<Vec<Vec<f64>>>> {
        let history = py
            .allow_threads(|| self.inner.run())
            .map_err(config_err)?;
        let dims = history.dimensions();
        let steps = history.len();
        Ok((0..dims.nx)
            .map(|i| {
                (0..dims.ny)
                    .map(|j| (0..steps).map(|t| history.get(i, j, t)).collect())
                    .collect()
            })
            .collect())
    }

    /// Run `nt` steps without keeping snapshots
    fn run_stats(&mut self, py: Python<'_>) -> PyResult<PyRunStats> {
        let stats = py
            .allow_threads(|| self.inner.run_with(&mut crate::fdtd::NullSink, None))
            .map_err(config_err)?;
        Ok(stats.into())
    }

    /// Return to the configured state, keeping the medium
    fn reset(&mut self) {
        self.inner.reset();
    }

    /// Live Ez grid indexed `[x][y]`
    fn ez(&self) -> Vec<Vec<f64>> {
        to_nested(self.inner.ez())
    }

    /// Relative permittivity map indexed `[x][y]`
    fn permittivity(&self) -> Vec<Vec<f64>> {
        to_nested(self.inner.permittivity())
    }

    /// Inclusions as `(x, y, radius)` tuples
    fn inclusions(&self) -> Vec<(f64, f64, f64)> {
        self.inner
            .permittivity_field()
            .inclusions()
            .iter()
            .map(|inc| (inc.center.0, inc.center.1, inc.radius))
            .collect()
    }

    /// Domain extents `(max_x, max_y, max_t)`
    fn bounds(&self) -> (f64, f64, f64) {
        let b = self.inner.bound();
        (b.max_x(), b.max_y(), b.max_t())
    }

    /// Grid resolution `(nx, ny, dx, dy)`
    fn resolution(&self) -> (usize, usize, f64, f64) {
        let d = self.inner.discretizer();
        (d.nx(), d.ny(), d.dx(), d.dy())
    }

    /// Timestep length in seconds
    fn dt(&self) -> f64 {
        self.inner.discretizer().dt()
    }

    /// Total number of timesteps of a full run
    fn nt(&self) -> u64 {
        self.inner.discretizer().nt()
    }

    /// Steps taken so far
    fn timestep(&self) -> u64 {
        self.inner.timestep()
    }

    /// Lifecycle state: "configured", "stepping" or "complete"
    fn state(&self) -> String {
        format!("{:?}", self.inner.state()).to_lowercase()
    }

    /// Set verbose level (0 = silent, 1 = normal, 2 = verbose)
    fn set_verbose(&mut self, level: u8) {
        self.inner.set_verbose(level);
    }

    /// Enable/disable progress bar
    fn set_show_progress(&mut self, show: bool) {
        self.inner.set_show_progress(show);
    }

    fn __repr__(&self) -> String {
        let d = self.inner.discretizer();
        format!(
            "Simulator(nx={}, ny={}, nt={}, timestep={})",
            d.nx(),
            d.ny(),
            d.nt(),
            self.inner.timestep()
        )
    }
}

/// Python module definition
#[pymodule]
fn tmz_fdtd(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySimulator>()?;
    m.add_class::<PyRunStats>()?;

    m.add("C0", crate::constants::C0)?;
    m.add("EPS0", crate::constants::EPS0)?;
    m.add("MU0", crate::constants::MU0)?;
    m.add("Z0", crate::constants::Z0)?;
    m.add("VERSION", crate::VERSION)?;

    Ok(())
}

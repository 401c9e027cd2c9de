//! Simulation configuration bundle.
//!
//! Every option has a default, so a TOML file only needs to list what it
//! changes:
//!
//! ```toml
//! nx = 60
//! ny = 200
//! inclusions = 3
//! seed = 11
//! engine = "parallel"
//! ```

use std::ops::RangeInclusive;
use std::path::Path;

use rand::Rng;
use serde::Deserialize;

use crate::fdtd::EngineType;
use crate::geometry::Bound;
use crate::media::BACKGROUND_PERMITTIVITY;
use crate::{Error, Result};

/// Inclusion count drawn when none is configured.
pub const DEFAULT_INCLUSION_RANGE: RangeInclusive<usize> = 1..=5;

/// All recognised simulation options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Domain width (m)
    pub max_x: f64,
    /// Domain height (m)
    pub max_y: f64,
    /// Simulated duration (s)
    pub max_t: f64,
    /// Cells along x
    pub nx: usize,
    /// Cells along y
    pub ny: usize,
    /// Source wavelength (m)
    pub wavelength: f64,
    /// Number of inclusions; `None` draws from [`DEFAULT_INCLUSION_RANGE`]
    pub inclusions: Option<usize>,
    /// Maximum inclusion radius (m)
    pub max_radius: f64,
    /// Relative permeability
    pub mu_r: f64,
    /// Relative permittivity of the background medium
    pub background_permittivity: f64,
    /// Timestep as a fraction of the Courant limit
    pub courant: f64,
    /// Peak amplitude of the line source
    pub source_amplitude: f64,
    /// RNG seed for inclusion placement; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Engine implementation
    pub engine: EngineType,
    /// Log verbosity (0 = quiet, 1 = normal, 2 = per-batch detail)
    pub verbose: u8,
    /// Show a progress bar during runs
    pub show_progress: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_x: 3e-6,
            max_y: 10e-6,
            max_t: 1e-12,
            nx: 120,
            ny: 400,
            wavelength: 2.04e-6,
            inclusions: None,
            max_radius: 0.45e-6,
            mu_r: 1.0,
            background_permittivity: BACKGROUND_PERMITTIVITY,
            courant: 1.0,
            source_amplitude: 1.0,
            seed: None,
            engine: EngineType::default(),
            verbose: 1,
            show_progress: true,
        }
    }
}

fn ensure(cond: bool, msg: impl FnOnce() -> String) -> Result<()> {
    if cond {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration(msg()))
    }
}

impl SimulationConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Check every option is in its physical domain.
    pub fn validate(&self) -> Result<()> {
        self.bound()?;
        ensure(self.nx >= 2 && self.ny >= 2, || {
            format!(
                "grid needs at least 2 cells per side, got {}x{}",
                self.nx, self.ny
            )
        })?;
        ensure(self.wavelength.is_finite() && self.wavelength > 0.0, || {
            format!("wavelength must be positive, got {}", self.wavelength)
        })?;
        ensure(self.max_radius.is_finite() && self.max_radius >= 0.0, || {
            format!(
                "maximum inclusion radius must be non-negative, got {}",
                self.max_radius
            )
        })?;
        ensure(self.mu_r.is_finite() && self.mu_r > 0.0, || {
            format!("relative permeability must be positive, got {}", self.mu_r)
        })?;
        ensure(
            self.background_permittivity.is_finite() && self.background_permittivity >= 1.0,
            || {
                format!(
                    "background permittivity must be >= 1, got {}",
                    self.background_permittivity
                )
            },
        )?;
        ensure(self.courant.is_finite() && self.courant > 0.0, || {
            format!("courant factor must be positive, got {}", self.courant)
        })?;
        ensure(self.source_amplitude.is_finite(), || {
            format!("source amplitude must be finite, got {}", self.source_amplitude)
        })?;
        Ok(())
    }

    /// Domain extents.
    pub fn bound(&self) -> Result<Bound> {
        Bound::new(self.max_x, self.max_y, self.max_t)
    }

    /// The configured inclusion count, or a draw from the default range.
    pub fn resolve_inclusions<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.inclusions
            .unwrap_or_else(|| rng.gen_range(DEFAULT_INCLUSION_RANGE))
    }
}

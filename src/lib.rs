//! # tmz-fdtd
//!
//! Two-dimensional TMz Yee FDTD solver for heterogeneous, randomly generated
//! dielectric media.
//!
//! The Maxwell curl equations are integrated on a staggered grid carrying one
//! electric component (Ez) and two magnetic components (Hx, Hy). The medium
//! is a dense background (relative permittivity 9) with circular vacuum
//! inclusions placed at random, and a continuous-wave Gaussian line source
//! drives the field from the `y = 0` edge.
//!
//! ## Layout
//!
//! - [`arrays`]: 2D field storage and the Ez snapshot history
//! - [`geometry`]: domain extents and the stability-constrained discretisation
//! - [`media`]: permittivity and permeability maps with their update coefficients
//! - [`fdtd`]: operator, engines, batch runner and the [`Simulator`] driver
//! - [`config`]: the configuration bundle with its defaults and TOML loading
//!
//! Boundaries are left untouched during stepping, which makes the outer
//! one-cell halo a perfectly reflecting wall.

pub mod arrays;
pub mod config;
pub mod constants;
pub mod fdtd;
pub mod geometry;
pub mod media;

#[cfg(feature = "python")]
pub mod python;

pub use config::SimulationConfig;
pub use fdtd::{EngineType, SimulationState, Simulator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for the solver.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Out-of-domain extents, resolutions or medium parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Malformed configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// I/O failure while loading a configuration or writing snapshots.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Disagreement found when cross-checking one engine's fields against
    /// another's. Reserved for engine comparison; stepping itself never
    /// fails.
    #[error("numerical error: {0}")]
    Numerical(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

//! Stability-constrained grid and timestep derivation.

use super::Bound;
use crate::arrays::Dimensions;
use crate::constants::C0;
use crate::{Error, Result};

/// Grid resolution and timestep derived from a [`Bound`].
///
/// The timestep is the largest one allowed by the 2D Courant condition,
/// optionally scaled by a Courant factor:
///
/// ```text
/// dt = factor / (c0 * sqrt(1/dx^2 + 1/dy^2))
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discretizer {
    nx: usize,
    ny: usize,
    dx: f64,
    dy: f64,
    dt: f64,
    nt: u64,
}

impl Discretizer {
    /// Discretise `bound` into `nx × ny` cells at the Courant limit.
    ///
    /// Both `nx` and `ny` must be at least 2.
    pub fn new(bound: &Bound, nx: usize, ny: usize) -> Result<Self> {
        Self::with_courant(bound, nx, ny, 1.0)
    }

    /// Discretise with the timestep scaled by `factor` relative to the
    /// Courant limit. Factors above 1 violate stability and are accepted
    /// only so divergence can be studied.
    pub fn with_courant(bound: &Bound, nx: usize, ny: usize, factor: f64) -> Result<Self> {
        if nx < 2 || ny < 2 {
            return Err(Error::InvalidConfiguration(format!(
                "grid needs at least 2 cells per side, got {}x{}",
                nx, ny
            )));
        }
        if !(factor.is_finite() && factor > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "courant factor must be positive and finite, got {}",
                factor
            )));
        }
        if factor > 1.0 {
            log::warn!(
                "Courant factor {} exceeds the stability limit, fields will diverge",
                factor
            );
        }

        let dx = bound.max_x() / nx as f64;
        let dy = bound.max_y() / ny as f64;
        let dt = factor / (C0 * (1.0 / (dx * dx) + 1.0 / (dy * dy)).sqrt());
        let steps = (bound.max_t() / dt).round();
        // 2^64 is the first float above u64::MAX
        if !(steps.is_finite() && steps < 18_446_744_073_709_551_616.0) {
            return Err(Error::InvalidConfiguration(format!(
                "max_t {:e} needs {:e} timesteps of {:e} s, more than can be counted",
                bound.max_t(),
                steps,
                dt
            )));
        }
        let nt = steps as u64;

        Ok(Self {
            nx,
            ny,
            dx,
            dy,
            dt,
            nt,
        })
    }

    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Cell size along x (m).
    #[inline]
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Cell size along y (m).
    #[inline]
    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Timestep (s).
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of timesteps covering `max_t`.
    #[inline]
    pub fn nt(&self) -> u64 {
        self.nt
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.nx, self.ny)
    }

    pub fn num_cells(&self) -> usize {
        self.nx * self.ny
    }

    /// `c0 * dt * sqrt(1/dx^2 + 1/dy^2)`; stable iff <= 1.
    pub fn courant_number(&self) -> f64 {
        C0 * self.dt * (1.0 / (self.dx * self.dx) + 1.0 / (self.dy * self.dy)).sqrt()
    }

    /// Bytes needed to keep every Ez snapshot of a full run.
    pub fn history_bytes(&self) -> u64 {
        (self.num_cells() as u64)
            .saturating_mul(self.nt)
            .saturating_mul(std::mem::size_of::<f64>() as u64)
    }

    /// Human-readable size of a full run's snapshot history.
    pub fn memory_display(&self) -> String {
        let bytes = self.history_bytes() as f64;
        if bytes < 1024.0 * 1024.0 {
            format!("{:.1} KB", bytes / 1024.0)
        } else if bytes < 1024.0 * 1024.0 * 1024.0 {
            format!("{:.1} MB", bytes / (1024.0 * 1024.0))
        } else {
            format!("{:.2} GB", bytes / (1024.0 * 1024.0 * 1024.0))
        }
    }
}

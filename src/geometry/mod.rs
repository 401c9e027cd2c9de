//! Simulation domain and its discretisation.

mod discretizer;

pub use discretizer::Discretizer;

use crate::{Error, Result};

/// Physical extents of the simulation domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    max_x: f64,
    max_y: f64,
    max_t: f64,
}

impl Bound {
    /// Create a domain `[0, max_x] × [0, max_y]` simulated over `[0, max_t]`.
    ///
    /// All extents must be finite and strictly positive.
    pub fn new(max_x: f64, max_y: f64, max_t: f64) -> Result<Self> {
        for (name, value) in [("max_x", max_x), ("max_y", max_y), ("max_t", max_t)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfiguration(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        Ok(Self {
            max_x,
            max_y,
            max_t,
        })
    }

    /// Domain width along x (m).
    #[inline]
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Domain height along y (m).
    #[inline]
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Simulated duration (s).
    #[inline]
    pub fn max_t(&self) -> f64 {
        self.max_t
    }
}

use crate::constants::C0;
use crate::geometry::Discretizer;
use crate::{Error, Result};

/// Uniform relative permeability and its two update coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PermeabilityField {
    mu: f64,
    mu_x: f64,
    mu_y: f64,
}

impl PermeabilityField {
    /// `mu_x = c0*dt/dx / mu`, `mu_y = c0*dt/dy / mu`.
    pub fn new(mu: f64, disc: &Discretizer) -> Result<Self> {
        if !(mu.is_finite() && mu > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "relative permeability must be positive and finite, got {}",
                mu
            )));
        }
        Ok(Self {
            mu,
            mu_x: C0 * disc.dt() / disc.dx() / mu,
            mu_y: C0 * disc.dt() / disc.dy() / mu,
        })
    }

    /// Relative permeability.
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Coefficient of the Hx update.
    pub fn coeff_x(&self) -> f64 {
        self.mu_x
    }

    /// Coefficient of the Hy update.
    pub fn coeff_y(&self) -> f64 {
        self.mu_y
    }
}

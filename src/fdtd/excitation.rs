//! Monochromatic source description and the Gaussian line source.

use std::f64::consts::PI;

use crate::arrays::Field2D;
use crate::constants::C0;
use crate::geometry::{Bound, Discretizer};
use crate::{Error, Result};

/// Grid column (`y` index) driven by the line source.
pub const SOURCE_COLUMN: usize = 0;

/// Monochromatic light of a given vacuum wavelength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    wavelength: f64,
    k: f64,
}

impl Light {
    pub fn new(wavelength: f64) -> Result<Self> {
        if !(wavelength.is_finite() && wavelength > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "wavelength must be positive and finite, got {}",
                wavelength
            )));
        }
        Ok(Self {
            wavelength,
            k: 2.0 * PI / wavelength,
        })
    }

    /// Vacuum wavelength (m).
    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    /// Wavenumber `2π/λ` (rad/m).
    pub fn wavenumber(&self) -> f64 {
        self.k
    }

    /// Angular frequency `k·c0` (rad/s).
    pub fn angular_frequency(&self) -> f64 {
        self.k * C0
    }
}

/// Continuous-wave Gaussian line source along `x` at [`SOURCE_COLUMN`].
///
/// The transverse profile is `A·exp(-(dx·(i - nx/2))² / (max_x/4)²)` and
/// the carrier is `sin(k·c0·dt·t)` with `t` the step index.
///
/// The field is seeded once at construction with the carrier phase of step
/// one and then driven additively on every step. Both the seed and the
/// per-step drive are applied; the seed duplicates the first drive's shape.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSource {
    profile: Vec<f64>,
    phase_step: f64,
    amplitude: f64,
}

impl LineSource {
    pub fn new(light: &Light, bound: &Bound, disc: &Discretizer, amplitude: f64) -> Self {
        let width = bound.max_x() / 4.0;
        let center = disc.nx() as f64 / 2.0;
        let profile = (0..disc.nx())
            .map(|i| {
                let offset = disc.dx() * (i as f64 - center);
                amplitude * (-(offset * offset) / (width * width)).exp()
            })
            .collect();

        Self {
            profile,
            phase_step: light.angular_frequency() * disc.dt(),
            amplitude,
        }
    }

    /// Peak amplitude.
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Carrier phase advance per step, `k·c0·dt`.
    pub fn phase_step(&self) -> f64 {
        self.phase_step
    }

    /// Transverse profile, one entry per `x` cell.
    pub fn profile(&self) -> &[f64] {
        &self.profile
    }

    /// Source term for cell `(i, SOURCE_COLUMN)` at step `t`.
    #[inline]
    pub fn value(&self, i: usize, t: u64) -> f64 {
        self.profile[i] * (self.phase_step * t as f64).sin()
    }

    /// Write the initial condition into `ez`.
    pub fn seed(&self, ez: &mut Field2D) {
        let carrier = self.phase_step.sin();
        for (i, &g) in self.profile.iter().enumerate() {
            ez.set(i, SOURCE_COLUMN, g * carrier);
        }
    }

    /// Add the source term of step `t` to `ez`.
    #[inline]
    pub fn inject(&self, ez: &mut Field2D, t: u64) {
        for i in 0..self.profile.len() {
            ez.add(i, SOURCE_COLUMN, self.value(i, t));
        }
    }
}

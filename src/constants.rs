//! Physical constants (SI units).
//!
//! The solver works with the speed of light rounded to `3e8` m/s; every
//! timestep, wavenumber-to-frequency conversion and update coefficient is
//! derived from [`C0`].

use std::f64::consts::PI;

/// Speed of light in vacuum (m/s), rounded
pub const C0: f64 = 3.0e8;

/// Vacuum permeability (H/m)
pub const MU0: f64 = 4.0e-7 * PI;

/// Vacuum permittivity (F/m)
pub const EPS0: f64 = 1.0 / (MU0 * C0 * C0);

/// Free-space wave impedance (Ohm)
pub const Z0: f64 = MU0 * C0;

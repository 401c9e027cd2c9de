//! Material maps and their precomputed update coefficients.
//!
//! Both maps fold `c0 * dt / dx` (or `dy`) into a per-cell coefficient so
//! the engines only multiply during stepping.

mod permeability;
mod permittivity;

pub use permeability::PermeabilityField;
pub use permittivity::{
    Inclusion, InclusionLayout, PermittivityField, BACKGROUND_PERMITTIVITY, INCLUSION_PERMITTIVITY,
};

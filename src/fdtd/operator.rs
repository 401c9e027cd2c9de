//! Static configuration of an FDTD run.
//!
//! The operator owns every immutable piece of a simulation: the domain, its
//! discretisation, the source and both material maps. Engines copy the
//! coefficients they need out of it at construction.

use rand::Rng;

use crate::arrays::{Dimensions, Field2D};
use crate::config::SimulationConfig;
use crate::fdtd::excitation::{Light, LineSource};
use crate::geometry::{Bound, Discretizer};
use crate::media::{InclusionLayout, PermeabilityField, PermittivityField};
use crate::{Error, Result};

/// Ez update coefficients, one per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct EFieldCoefficients {
    /// Multiplies `Hy[i+1, j] - Hy[i, j]`
    pub x: Field2D,
    /// Multiplies `Hx[i, j+1] - Hx[i, j]`
    pub y: Field2D,
}

/// Uniform H update coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HFieldCoefficients {
    /// Hx coefficient
    pub x: f64,
    /// Hy coefficient
    pub y: f64,
}

/// Immutable simulation setup.
#[derive(Debug, Clone)]
pub struct Operator {
    bound: Bound,
    disc: Discretizer,
    light: Light,
    permittivity: PermittivityField,
    permeability: PermeabilityField,
    source: LineSource,
}

impl Operator {
    /// Build every configuration object from `config`, drawing the random
    /// medium from `rng`. Fails before anything is allocated for stepping.
    pub fn from_config<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let bound = config.bound()?;
        let disc = Discretizer::with_courant(&bound, config.nx, config.ny, config.courant)?;
        let light = Light::new(config.wavelength)?;

        let layout = InclusionLayout {
            count: config.resolve_inclusions(rng),
            max_radius: config.max_radius,
            background: config.background_permittivity,
        };
        let permittivity = PermittivityField::random(&layout, &bound, &disc, rng)?;
        let permeability = PermeabilityField::new(config.mu_r, &disc)?;

        Self::from_parts(
            bound,
            disc,
            light,
            permittivity,
            permeability,
            config.source_amplitude,
        )
    }

    /// Assemble an operator from prebuilt parts.
    pub fn from_parts(
        bound: Bound,
        disc: Discretizer,
        light: Light,
        permittivity: PermittivityField,
        permeability: PermeabilityField,
        source_amplitude: f64,
    ) -> Result<Self> {
        let dims = disc.dimensions();
        if permittivity.epsilon().dimensions() != dims {
            return Err(Error::InvalidConfiguration(format!(
                "permittivity grid {:?} does not match discretisation {:?}",
                permittivity.epsilon().dimensions(),
                dims
            )));
        }
        if !source_amplitude.is_finite() {
            return Err(Error::InvalidConfiguration(format!(
                "source amplitude must be finite, got {}",
                source_amplitude
            )));
        }

        let source = LineSource::new(&light, &bound, &disc, source_amplitude);
        Ok(Self {
            bound,
            disc,
            light,
            permittivity,
            permeability,
            source,
        })
    }

    pub fn bound(&self) -> &Bound {
        &self.bound
    }

    pub fn discretizer(&self) -> &Discretizer {
        &self.disc
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    pub fn permittivity(&self) -> &PermittivityField {
        &self.permittivity
    }

    pub fn permeability(&self) -> &PermeabilityField {
        &self.permeability
    }

    pub fn source(&self) -> &LineSource {
        &self.source
    }

    pub fn dimensions(&self) -> Dimensions {
        self.disc.dimensions()
    }

    /// Timestep in seconds.
    pub fn timestep(&self) -> f64 {
        self.disc.dt()
    }

    pub fn e_coefficients(&self) -> EFieldCoefficients {
        EFieldCoefficients {
            x: self.permittivity.coeff_x().clone(),
            y: self.permittivity.coeff_y().clone(),
        }
    }

    pub fn h_coefficients(&self) -> HFieldCoefficients {
        HFieldCoefficients {
            x: self.permeability.coeff_x(),
            y: self.permeability.coeff_y(),
        }
    }
}

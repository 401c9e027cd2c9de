//! Random dielectric medium synthesis.
//!
//! The medium is a dense background with circular low-index inclusions. A
//! cell takes the inclusion value when its position `(i*dx, j*dy)` lies
//! strictly inside any disc, so overlapping discs union their footprint.
//!
//! Generation tests every cell against every inclusion, `O(n * nx * ny)`.
//! That is fine for a handful of discs on grids of a few hundred cells per
//! side; many more inclusions would call for a spatial index over the discs.

use rand::Rng;

use crate::arrays::Field2D;
use crate::constants::C0;
use crate::geometry::{Bound, Discretizer};
use crate::{Error, Result};

/// Relative permittivity of the dense background medium.
pub const BACKGROUND_PERMITTIVITY: f64 = 9.0;

/// Relative permittivity inside an inclusion.
pub const INCLUSION_PERMITTIVITY: f64 = 1.0;

/// A circular inclusion in physical coordinates (m).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inclusion {
    /// Centre `(x, y)`
    pub center: (f64, f64),
    /// Radius
    pub radius: f64,
}

impl Inclusion {
    pub fn new(center: (f64, f64), radius: f64) -> Self {
        Self { center, radius }
    }

    /// Whether `(x, y)` lies strictly inside the disc.
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let ddx = x - self.center.0;
        let ddy = y - self.center.1;
        (ddx * ddx + ddy * ddy).sqrt() < self.radius
    }
}

/// Parameters for drawing random inclusions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InclusionLayout {
    /// Number of inclusions
    pub count: usize,
    /// Radii are drawn uniformly from `[0, max_radius]`
    pub max_radius: f64,
    /// Background relative permittivity
    pub background: f64,
}

impl InclusionLayout {
    pub fn new(count: usize, max_radius: f64) -> Self {
        Self {
            count,
            max_radius,
            background: BACKGROUND_PERMITTIVITY,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.max_radius.is_finite() && self.max_radius >= 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "maximum inclusion radius must be non-negative and finite, got {}",
                self.max_radius
            )));
        }
        validate_background(self.background)
    }

    /// Draw `count` centres uniformly over the domain, then `count` radii.
    pub fn sample<R: Rng + ?Sized>(&self, bound: &Bound, rng: &mut R) -> Result<Vec<Inclusion>> {
        self.validate()?;

        let centers: Vec<(f64, f64)> = (0..self.count)
            .map(|_| {
                (
                    rng.gen_range(0.0..=bound.max_x()),
                    rng.gen_range(0.0..=bound.max_y()),
                )
            })
            .collect();

        Ok(centers
            .into_iter()
            .map(|center| Inclusion::new(center, rng.gen_range(0.0..=self.max_radius)))
            .collect())
    }
}

fn validate_background(background: f64) -> Result<()> {
    if !(background.is_finite() && background >= 1.0) {
        return Err(Error::InvalidConfiguration(format!(
            "background permittivity must be >= 1, got {}",
            background
        )));
    }
    Ok(())
}

/// Relative permittivity map plus the Ez update coefficients.
///
/// `coeff_x = c0*dt/dx / eps` multiplies the x-difference of Hy and
/// `coeff_y = c0*dt/dy / eps` the y-difference of Hx.
#[derive(Debug, Clone, PartialEq)]
pub struct PermittivityField {
    epsilon: Field2D,
    eps_x: Field2D,
    eps_y: Field2D,
    inclusions: Vec<Inclusion>,
    background: f64,
}

impl PermittivityField {
    /// Draw a random medium from `layout` using `rng`.
    pub fn random<R: Rng + ?Sized>(
        layout: &InclusionLayout,
        bound: &Bound,
        disc: &Discretizer,
        rng: &mut R,
    ) -> Result<Self> {
        let inclusions = layout.sample(bound, rng)?;
        Self::from_inclusions(inclusions, layout.background, disc)
    }

    /// Rasterise known inclusions onto the grid.
    pub fn from_inclusions(
        inclusions: Vec<Inclusion>,
        background: f64,
        disc: &Discretizer,
    ) -> Result<Self> {
        validate_background(background)?;
        if let Some(bad) = inclusions
            .iter()
            .find(|inc| !(inc.radius.is_finite() && inc.radius >= 0.0))
        {
            return Err(Error::InvalidConfiguration(format!(
                "inclusion radius must be non-negative and finite, got {}",
                bad.radius
            )));
        }

        let (dx, dy) = (disc.dx(), disc.dy());
        let epsilon = Field2D::from_fn(disc.dimensions(), |i, j| {
            let (x, y) = (i as f64 * dx, j as f64 * dy);
            if inclusions.iter().any(|inc| inc.contains(x, y)) {
                INCLUSION_PERMITTIVITY
            } else {
                background
            }
        });

        let cx = C0 * disc.dt() / dx;
        let cy = C0 * disc.dt() / dy;
        let dims = disc.dimensions();
        let eps_x = Field2D::from_fn(dims, |i, j| cx / epsilon.get(i, j));
        let eps_y = Field2D::from_fn(dims, |i, j| cy / epsilon.get(i, j));

        Ok(Self {
            epsilon,
            eps_x,
            eps_y,
            inclusions,
            background,
        })
    }

    /// Homogeneous medium without inclusions.
    pub fn uniform(background: f64, disc: &Discretizer) -> Result<Self> {
        Self::from_inclusions(Vec::new(), background, disc)
    }

    /// Relative permittivity per cell.
    pub fn epsilon(&self) -> &Field2D {
        &self.epsilon
    }

    pub fn coeff_x(&self) -> &Field2D {
        &self.eps_x
    }

    pub fn coeff_y(&self) -> &Field2D {
        &self.eps_y
    }

    /// The inclusions that were rasterised.
    pub fn inclusions(&self) -> &[Inclusion] {
        &self.inclusions
    }

    pub fn background(&self) -> f64 {
        self.background
    }

    /// Number of cells carrying the inclusion permittivity.
    pub fn inclusion_cells(&self) -> usize {
        self.epsilon
            .as_slice()
            .iter()
            .filter(|&&eps| eps == INCLUSION_PERMITTIVITY)
            .count()
    }
}

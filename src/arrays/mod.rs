//! Grid storage for the TMz field components.
//!
//! All grids are row-major over `[x][y]`: the linear index of cell `(i, j)`
//! is `i * ny + j`, so one `x` row is a contiguous slice of length `ny`.

mod history;

pub use history::FieldHistory;

/// Grid dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Cells along x
    pub nx: usize,
    /// Cells along y
    pub ny: usize,
}

impl Dimensions {
    /// Create new dimensions.
    pub fn new(nx: usize, ny: usize) -> Self {
        Self { nx, ny }
    }

    /// Total number of cells.
    #[inline]
    pub fn total(&self) -> usize {
        self.nx * self.ny
    }

    /// Linear index of cell `(i, j)`.
    #[inline]
    pub fn to_linear(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.nx && j < self.ny);
        i * self.ny + j
    }

    /// Whether `(i, j)` lies on the outer one-cell halo.
    #[inline]
    pub fn is_halo(&self, i: usize, j: usize) -> bool {
        i == 0 || j == 0 || i + 1 == self.nx || j + 1 == self.ny
    }
}

/// Scalar field sampled on an `nx × ny` grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Field2D {
    dims: Dimensions,
    data: Vec<f64>,
}

impl Field2D {
    /// Create a zero-initialised field.
    pub fn new(dims: Dimensions) -> Self {
        Self {
            dims,
            data: vec![0.0; dims.total()],
        }
    }

    /// Create a field with every cell set to `value`.
    pub fn filled(dims: Dimensions, value: f64) -> Self {
        Self {
            dims,
            data: vec![value; dims.total()],
        }
    }

    /// Build a field by evaluating `f(i, j)` at every cell.
    pub fn from_fn(dims: Dimensions, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(dims.total());
        for i in 0..dims.nx {
            for j in 0..dims.ny {
                data.push(f(i, j));
            }
        }
        Self { dims, data }
    }

    /// Grid dimensions.
    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[self.dims.to_linear(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        let idx = self.dims.to_linear(i, j);
        self.data[idx] = value;
    }

    #[inline]
    pub fn add(&mut self, i: usize, j: usize, value: f64) {
        let idx = self.dims.to_linear(i, j);
        self.data[idx] += value;
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Zero the field.
    pub fn clear(&mut self) {
        self.fill(0.0);
    }

    /// Sum of squared values.
    pub fn energy(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum()
    }

    /// Largest absolute value (NaN propagates).
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0f64, |acc, v| {
            if v.is_nan() || acc.is_nan() {
                f64::NAN
            } else {
                acc.max(v.abs())
            }
        })
    }

    /// The contiguous `y` row at `x = i`.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.dims.ny;
        &self.data[start..start + self.dims.ny]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

/// The three live TMz components.
#[derive(Debug, Clone, PartialEq)]
pub struct TmzFields {
    /// Electric field, z component
    pub ez: Field2D,
    /// Magnetic field, x component
    pub hx: Field2D,
    /// Magnetic field, y component
    pub hy: Field2D,
}

impl TmzFields {
    /// Zero-initialised fields.
    pub fn new(dims: Dimensions) -> Self {
        Self {
            ez: Field2D::new(dims),
            hx: Field2D::new(dims),
            hy: Field2D::new(dims),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.ez.dimensions()
    }

    pub fn clear(&mut self) {
        self.ez.clear();
        self.hx.clear();
        self.hy.clear();
    }

    /// Electric energy (Σ Ez²).
    pub fn e_energy(&self) -> f64 {
        self.ez.energy()
    }

    /// Magnetic energy (Σ Hx² + Hy²).
    pub fn h_energy(&self) -> f64 {
        self.hx.energy() + self.hy.energy()
    }
}

//! In-memory Ez history of a full run.

use super::{Dimensions, Field2D};
use crate::{Error, Result};

/// Ez snapshots indexed `[x, y, t]`.
///
/// Each snapshot is an independent copy of the live grid taken right after
/// a step. Storage is `nx · ny · nt` values held contiguously per snapshot,
/// which for long runs dominates memory use; stream through a custom
/// [`SnapshotSink`](crate::fdtd::SnapshotSink) when that is too much.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldHistory {
    dims: Dimensions,
    steps: usize,
    data: Vec<f64>,
}

impl FieldHistory {
    /// Empty history with room for `steps` snapshots.
    pub fn with_capacity(dims: Dimensions, steps: usize) -> Self {
        Self {
            dims,
            steps: 0,
            data: Vec::with_capacity(dims.total().saturating_mul(steps)),
        }
    }

    /// Empty history with room for `steps` snapshots, failing instead of
    /// aborting when the allocation cannot be made.
    pub fn try_with_capacity(dims: Dimensions, steps: usize) -> Result<Self> {
        let values = dims.total().checked_mul(steps).ok_or_else(|| {
            Error::InvalidConfiguration(format!(
                "Ez history of {} steps on {}x{} cells overflows the address space",
                steps, dims.nx, dims.ny
            ))
        })?;

        let mut data = Vec::new();
        data.try_reserve_exact(values).map_err(|err| {
            Error::InvalidConfiguration(format!(
                "cannot allocate Ez history of {} values: {}",
                values, err
            ))
        })?;

        Ok(Self {
            dims,
            steps: 0,
            data,
        })
    }

    /// Append a copy of `ez`, rejecting a snapshot of the wrong shape.
    pub fn try_push(&mut self, ez: &Field2D) -> Result<()> {
        if ez.dimensions() != self.dims {
            return Err(Error::InvalidConfiguration(format!(
                "snapshot dimensions {:?} do not match history {:?}",
                ez.dimensions(),
                self.dims
            )));
        }
        self.data.extend_from_slice(ez.as_slice());
        self.steps += 1;
        Ok(())
    }

    /// Append a copy of `ez`.
    ///
    /// # Panics
    /// If `ez` does not match the history's dimensions.
    pub fn push(&mut self, ez: &Field2D) {
        assert_eq!(
            ez.dimensions(),
            self.dims,
            "snapshot dimensions must match history"
        );
        self.data.extend_from_slice(ez.as_slice());
        self.steps += 1;
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Number of recorded snapshots.
    pub fn len(&self) -> usize {
        self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }

    /// Ez at cell `(x, y)` in snapshot `t`.
    #[inline]
    pub fn get(&self, x: usize, y: usize, t: usize) -> f64 {
        debug_assert!(t < self.steps);
        self.data[t * self.dims.total() + self.dims.to_linear(x, y)]
    }

    /// Snapshot `t` as a row-major `[x][y]` slice.
    pub fn snapshot(&self, t: usize) -> Option<&[f64]> {
        if t >= self.steps {
            return None;
        }
        let len = self.dims.total();
        Some(&self.data[t * len..(t + 1) * len])
    }

    /// Snapshot `t` as an owned grid.
    pub fn snapshot_field(&self, t: usize) -> Option<Field2D> {
        let slice = self.snapshot(t)?;
        let dims = self.dims;
        Some(Field2D::from_fn(dims, |i, j| slice[dims.to_linear(i, j)]))
    }

    /// Iterate over snapshots in step order.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.dims.total().max(1)).take(self.steps)
    }

    /// Raw storage, snapshot-major.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

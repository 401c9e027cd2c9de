//! Parallel multi-threaded FDTD engine.
//!
//! This engine uses Rayon to distribute each half-step across CPU cores.
//! Work is split into independent x rows: within the H pass a row only
//! writes its own Hx/Hy and reads Ez, within the Ez pass a row only writes
//! its own Ez and reads H. Each pass joins before the next one starts, so
//! every H write is visible before any Ez read.

use rayon::prelude::*;

use crate::arrays::{Dimensions, TmzFields};
use crate::fdtd::engine_impl::EngineImpl;
use crate::fdtd::excitation::LineSource;
use crate::fdtd::operator::{EFieldCoefficients, HFieldCoefficients, Operator};
use crate::Result;

/// Parallel multi-threaded FDTD engine.
///
/// Produces results bit-identical to
/// [`BasicEngine`](crate::fdtd::BasicEngine): each cell evaluates the same
/// expression in the same order.
pub struct ParallelEngine {
    /// Ez, Hx, Hy
    fields: TmzFields,
    /// Current timestep
    timestep: u64,
    /// Grid dimensions
    dimensions: Dimensions,
    /// Ez update coefficients
    e_coeff: EFieldCoefficients,
    /// H update coefficients
    h_coeff: HFieldCoefficients,
    /// Line source driving the seed column
    source: LineSource,
}

impl ParallelEngine {
    /// Number of worker threads in the active Rayon pool.
    pub fn num_threads(&self) -> usize {
        rayon::current_num_threads()
    }

    fn update_h(&mut self) {
        let Dimensions { nx, ny } = self.dimensions;
        let HFieldCoefficients { x: mu_x, y: mu_y } = self.h_coeff;
        let TmzFields { ez, hx, hy } = &mut self.fields;
        let ez = ez.as_slice();

        hx.as_mut_slice()
            .par_chunks_mut(ny)
            .zip(hy.as_mut_slice().par_chunks_mut(ny))
            .enumerate()
            .skip(1)
            .take(nx.saturating_sub(2))
            .for_each(|(i, (hx_row, hy_row))| {
                let ez_row = &ez[i * ny..(i + 1) * ny];
                let ez_prev = &ez[(i - 1) * ny..i * ny];

                for j in 1..ny - 1 {
                    let ez_c = ez_row[j];
                    hx_row[j] += -mu_x * (ez_c - ez_row[j - 1]);
                    hy_row[j] += mu_y * (ez_c - ez_prev[j]);
                }
            });
    }

    fn update_e(&mut self) {
        let Dimensions { nx, ny } = self.dimensions;
        let eps_x = self.e_coeff.x.as_slice();
        let eps_y = self.e_coeff.y.as_slice();
        let TmzFields { ez, hx, hy } = &mut self.fields;
        let (hx, hy) = (hx.as_slice(), hy.as_slice());

        ez.as_mut_slice()
            .par_chunks_mut(ny)
            .enumerate()
            .skip(1)
            .take(nx.saturating_sub(2))
            .for_each(|(i, ez_row)| {
                let row = i * ny..(i + 1) * ny;
                let hx_row = &hx[row.clone()];
                let hy_row = &hy[row.clone()];
                let hy_next = &hy[(i + 1) * ny..(i + 2) * ny];
                let cx = &eps_x[row.clone()];
                let cy = &eps_y[row];

                for j in 1..ny - 1 {
                    let curl =
                        cx[j] * (hy_next[j] - hy_row[j]) - cy[j] * (hx_row[j + 1] - hx_row[j]);
                    ez_row[j] += curl;
                }
            });
    }
}

impl EngineImpl for ParallelEngine {
    fn new(operator: &Operator) -> Result<Self> {
        let dims = operator.dimensions();
        let mut engine = Self {
            fields: TmzFields::new(dims),
            timestep: 0,
            dimensions: dims,
            e_coeff: operator.e_coefficients(),
            h_coeff: operator.h_coefficients(),
            source: operator.source().clone(),
        };
        engine.source.seed(&mut engine.fields.ez);
        Ok(engine)
    }

    fn step(&mut self) {
        self.source.inject(&mut self.fields.ez, self.timestep);
        self.update_h();
        self.update_e();
        self.timestep += 1;
    }

    fn current_timestep(&self) -> u64 {
        self.timestep
    }

    fn read_fields(&self) -> &TmzFields {
        &self.fields
    }

    fn write_fields(&mut self) -> &mut TmzFields {
        &mut self.fields
    }

    fn reset(&mut self) {
        self.fields.clear();
        self.source.seed(&mut self.fields.ez);
        self.timestep = 0;
    }
}

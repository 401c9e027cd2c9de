//! Basic single-threaded FDTD engine implementation.
//!
//! This module provides the reference implementation of the TMz update
//! without parallelization. It serves as:
//! - A correctness reference for testing the parallel engine
//! - A clear, readable implementation for understanding the algorithm

use crate::arrays::{Dimensions, TmzFields};
use crate::fdtd::excitation::LineSource;
use crate::fdtd::operator::{EFieldCoefficients, HFieldCoefficients, Operator};
use crate::fdtd::EngineImpl;
use crate::Result;

/// Basic single-threaded FDTD engine.
///
/// Plain nested loops over the interior; every other engine must match it
/// bit for bit.
pub struct BasicEngine {
    /// Ez, Hx, Hy
    fields: TmzFields,
    /// Current timestep number
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

impl EngineImpl for BasicEngine {
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

        // H must be complete before Ez reads it
        self.update_h_basic();
        self.update_e_basic();

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

impl BasicEngine {
    /// Update Hx and Hy on the interior.
    ///
    /// - Hx += -mu_x * (Ez[i, j] - Ez[i, j-1])
    /// - Hy +=  mu_y * (Ez[i, j] - Ez[i-1, j])
    fn update_h_basic(&mut self) {
        let dims = self.dimensions;
        let HFieldCoefficients { x: mu_x, y: mu_y } = self.h_coeff;
        let TmzFields { ez, hx, hy } = &mut self.fields;

        for i in 1..dims.nx - 1 {
            for j in 1..dims.ny - 1 {
                let ez_c = ez.get(i, j);
                hx.add(i, j, -mu_x * (ez_c - ez.get(i, j - 1)));
                hy.add(i, j, mu_y * (ez_c - ez.get(i - 1, j)));
            }
        }
    }

    /// Update Ez on the interior.
    ///
    /// - Ez += eps_x * (Hy[i+1, j] - Hy[i, j]) - eps_y * (Hx[i, j+1] - Hx[i, j])
    fn update_e_basic(&mut self) {
        let dims = self.dimensions;
        let EFieldCoefficients { x: eps_x, y: eps_y } = &self.e_coeff;
        let TmzFields { ez, hx, hy } = &mut self.fields;

        for i in 1..dims.nx - 1 {
            for j in 1..dims.ny - 1 {
                let curl = eps_x.get(i, j) * (hy.get(i + 1, j) - hy.get(i, j))
                    - eps_y.get(i, j) * (hx.get(i, j + 1) - hx.get(i, j));
                ez.add(i, j, curl);
            }
        }
    }
}

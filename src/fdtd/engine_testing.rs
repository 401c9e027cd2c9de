//! Testing infrastructure for FDTD engines.
//!
//! Every scenario runs against each engine implementation, and each
//! optimised engine is compared cell by cell against [`BasicEngine`].

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::arrays::{FieldHistory, TmzFields};
use crate::config::SimulationConfig;
use crate::fdtd::{
    BatchResult, EnergyMonitorConfig, EngineBatch, EngineImpl, Operator, TerminationConfig,
    SOURCE_COLUMN,
};
use crate::Result;

/// A complete simulation test scenario with physics verification.
pub trait SimulationScenario {
    /// Scenario name for test identification.
    fn name(&self) -> &str;

    /// Build the complete simulation setup.
    fn build(&self) -> SimulationSetup;

    /// Verify physical correctness after simulation completes.
    fn verify(&self, result: &SimulationResult) -> Result<()>;
}

/// Complete simulation setup configuration.
pub struct SimulationSetup {
    /// Medium, grid and source configuration
    pub config: SimulationConfig,
    /// Number of timesteps to execute
    pub num_steps: u64,
    /// Energy monitoring configuration
    pub energy_monitoring: EnergyMonitorConfig,
}

/// Results handed to [`SimulationScenario::verify`].
pub struct SimulationResult {
    /// Operator the engine was built from
    pub operator: Operator,
    /// Batch statistics
    pub batch_result: BatchResult,
    /// Fields after the last step
    pub final_fields: TmzFields,
    /// Ez after every step
    pub history: FieldHistory,
}

/// Run a scenario with a specific engine and verify it.
pub fn test_scenario_with_engine_impl<E: EngineImpl>(
    scenario: &dyn SimulationScenario,
) -> Result<()> {
    let result = run_scenario_with_engine::<E>(scenario)?;
    scenario.verify(&result)?;
    Ok(())
}

/// Run a scenario with a specific engine and return the result.
pub fn run_scenario_with_engine<E: EngineImpl>(
    scenario: &dyn SimulationScenario,
) -> Result<SimulationResult> {
    let setup = scenario.build();
    let mut rng = StdRng::seed_from_u64(setup.config.seed.unwrap_or(0));
    let operator = Operator::from_config(&setup.config, &mut rng)?;
    let mut engine = E::new(&operator)?;

    let batch = EngineBatch {
        num_steps: setup.num_steps,
        termination: TerminationConfig::default(),
        energy_monitoring: setup.energy_monitoring,
    };
    let mut history = FieldHistory::with_capacity(operator.dimensions(), setup.num_steps as usize);
    let batch_result = engine.run_batch(&batch, &mut history)?;

    Ok(SimulationResult {
        final_fields: engine.read_fields().clone(),
        operator,
        batch_result,
        history,
    })
}

/// Tolerance configuration using numpy's `allclose()` formula:
/// ```text
/// |a - b| <= atol + rtol * max(|a|, |b|)
/// ```
#[derive(Debug, Clone)]
pub struct ComparisonConfig {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            rtol: 1e-12,
            atol: 1e-15,
        }
    }
}

impl ComparisonConfig {
    /// Bitwise equality; CPU engines evaluate identical expressions.
    pub fn exact() -> Self {
        Self {
            rtol: 0.0,
            atol: 0.0,
        }
    }

    /// Normalised error, `|a - b| / (atol + rtol * max(|a|, |b|))`.
    ///
    /// A value <= 1.0 means the values are within tolerance.
    #[inline]
    pub fn normalized_error(&self, a: f64, b: f64) -> f64 {
        if a == b || (a.is_nan() && b.is_nan()) {
            return 0.0;
        }
        let diff = (a - b).abs();
        let tolerance = self.atol + self.rtol * a.abs().max(b.abs());
        if tolerance > 0.0 {
            diff / tolerance
        } else {
            f64::INFINITY
        }
    }
}

/// Comparison statistics for a field.
#[derive(Debug, Default)]
pub struct FieldComparisonStats {
    /// Maximum absolute difference
    pub max_abs_diff: f64,
    /// Maximum normalized error
    pub max_normalized_error: f64,
    /// Number of values exceeding tolerance
    pub num_mismatches: usize,
    /// Total number of values compared
    pub total_values: usize,
}

impl FieldComparisonStats {
    pub fn compute(ref_field: &[f64], test_field: &[f64], config: &ComparisonConfig) -> Self {
        assert_eq!(ref_field.len(), test_field.len(), "Field lengths must match");

        let mut stats = FieldComparisonStats {
            total_values: ref_field.len(),
            ..Default::default()
        };

        for (i, (&a, &b)) in ref_field.iter().zip(test_field).enumerate() {
            let norm_err = config.normalized_error(a, b);
            if a.is_finite() && b.is_finite() {
                stats.max_abs_diff = stats.max_abs_diff.max((a - b).abs());
            }
            stats.max_normalized_error = stats.max_normalized_error.max(norm_err);

            if norm_err > 1.0 {
                stats.num_mismatches += 1;
                if stats.num_mismatches <= 10 {
                    eprintln!(
                        "  Mismatch at index {}: ref={:.6e}, test={:.6e}, norm_err={:.3}",
                        i, a, b, norm_err
                    );
                }
            }
        }

        stats
    }

    pub fn passed(&self) -> bool {
        self.num_mismatches == 0
    }

    pub fn summary(&self, field_name: &str) -> String {
        format!(
            "{}: max_abs={:.2e}, max_norm_err={:.3}, mismatches={}/{}",
            field_name,
            self.max_abs_diff,
            self.max_normalized_error,
            self.num_mismatches,
            self.total_values
        )
    }
}

/// Compare the final fields of two runs.
pub fn compare_simulation_results(
    reference: &SimulationResult,
    test: &SimulationResult,
    config: &ComparisonConfig,
) -> Result<()> {
    let r = &reference.final_fields;
    let t = &test.final_fields;

    let mut failed = Vec::new();
    for (name, a, b) in [
        ("Ez", r.ez.as_slice(), t.ez.as_slice()),
        ("Hx", r.hx.as_slice(), t.hx.as_slice()),
        ("Hy", r.hy.as_slice(), t.hy.as_slice()),
    ] {
        let stats = FieldComparisonStats::compute(a, b, config);
        eprintln!("  {}", stats.summary(name));
        if !stats.passed() {
            failed.push(format!("{}={}", name, stats.num_mismatches));
        }
    }

    if reference.history != test.history {
        failed.push("history".to_string());
    }

    if !failed.is_empty() {
        return Err(crate::Error::Numerical(format!(
            "field comparison failed: {}",
            failed.join(", ")
        )));
    }
    Ok(())
}

/// Check that two engine implementations agree on a scenario.
pub fn test_cross_engine_comparison<Reference: EngineImpl, Test: EngineImpl>(
    scenario: &dyn SimulationScenario,
    config: &ComparisonConfig,
) -> Result<()> {
    eprintln!("\n=== Cross-engine comparison: {} ===", scenario.name());
    let reference = run_scenario_with_engine::<Reference>(scenario)?;
    let test = run_scenario_with_engine::<Test>(scenario)?;
    compare_simulation_results(&reference, &test, config)
}

fn assert_finite(result: &SimulationResult) {
    for sample in &result.batch_result.energy_samples {
        assert!(
            sample.total_energy.is_finite(),
            "Energy became non-finite at timestep {}",
            sample.timestep
        );
    }
}

fn small_config(nx: usize, ny: usize) -> SimulationConfig {
    SimulationConfig {
        nx,
        ny,
        max_x: nx as f64 * 5e-8,
        max_y: ny as f64 * 5e-8,
        max_t: 1e-13,
        inclusions: Some(0),
        max_radius: 0.3e-6,
        seed: Some(1),
        ..Default::default()
    }
}

// =============================================================================
// TEST SCENARIOS
// =============================================================================

/// Vacuum cavity at the Courant limit stays bounded.
pub struct VacuumCavityScenario;

impl SimulationScenario for VacuumCavityScenario {
    fn name(&self) -> &str {
        "vacuum_cavity_bounded"
    }

    fn build(&self) -> SimulationSetup {
        SimulationSetup {
            config: SimulationConfig {
                background_permittivity: 1.0,
                ..small_config(16, 32)
            },
            num_steps: 120,
            energy_monitoring: EnergyMonitorConfig {
                sample_interval: 10,
                track_peak: true,
            },
        }
    }

    fn verify(&self, result: &SimulationResult) -> Result<()> {
        assert_finite(result);
        let energy = result.final_fields.e_energy() + result.final_fields.h_energy();
        assert!(energy > 0.0, "source did not excite the cavity");
        assert!(energy < 1e8, "vacuum cavity energy grew to {:.3e}", energy);
        assert!(result.final_fields.h_energy() > 0.0);
        Ok(())
    }
}

/// The stencil moves information one cell per step: after `n` steps Ez is
/// still exactly zero beyond column `n`.
pub struct CausalityScenario;

impl SimulationScenario for CausalityScenario {
    fn name(&self) -> &str {
        "stencil_causality"
    }

    fn build(&self) -> SimulationSetup {
        SimulationSetup {
            config: small_config(30, 80),
            num_steps: 40,
            energy_monitoring: EnergyMonitorConfig::default(),
        }
    }

    fn verify(&self, result: &SimulationResult) -> Result<()> {
        let ez = &result.final_fields.ez;
        let dims = ez.dimensions();
        for i in 0..dims.nx {
            for j in 41..dims.ny {
                assert_eq!(ez.get(i, j), 0.0, "Ez[{}, {}] ahead of the front", i, j);
            }
        }
        assert!(ez.get(dims.nx / 2, 1) != 0.0);

        for (t, snapshot) in result.history.iter().enumerate() {
            let front = t + 2;
            for i in 0..dims.nx {
                for j in front..dims.ny {
                    assert_eq!(snapshot[dims.to_linear(i, j)], 0.0);
                }
            }
        }
        Ok(())
    }
}

/// Seeded random medium in the dense background.
pub struct RandomMediumScenario;

impl SimulationScenario for RandomMediumScenario {
    fn name(&self) -> &str {
        "random_medium"
    }

    fn build(&self) -> SimulationSetup {
        SimulationSetup {
            config: SimulationConfig {
                inclusions: Some(4),
                seed: Some(21),
                ..small_config(40, 100)
            },
            num_steps: 200,
            energy_monitoring: EnergyMonitorConfig {
                sample_interval: 20,
                track_peak: true,
            },
        }
    }

    fn verify(&self, result: &SimulationResult) -> Result<()> {
        assert_finite(result);
        assert_eq!(result.operator.permittivity().inclusions().len(), 4);
        assert_eq!(result.history.len(), 200);
        assert!(result.batch_result.peak_energy > 0.0);
        Ok(())
    }
}

/// 3x3 grid: a single interior cell.
pub struct SmallGridScenario;

impl SimulationScenario for SmallGridScenario {
    fn name(&self) -> &str {
        "small_grid"
    }

    fn build(&self) -> SimulationSetup {
        SimulationSetup {
            config: small_config(3, 3),
            num_steps: 50,
            energy_monitoring: EnergyMonitorConfig::default(),
        }
    }

    fn verify(&self, result: &SimulationResult) -> Result<()> {
        let f = &result.final_fields;
        for i in 0..3 {
            for j in 0..3 {
                if (i, j) != (1, 1) {
                    assert_eq!(f.hx.get(i, j), 0.0);
                    assert_eq!(f.hy.get(i, j), 0.0);
                }
                if j != SOURCE_COLUMN && (i, j) != (1, 1) {
                    assert_eq!(f.ez.get(i, j), 0.0);
                }
            }
        }
        assert!(f.ez.get(1, 1).is_finite());
        Ok(())
    }
}

/// Zero source amplitude never excites anything.
pub struct ZeroExcitationScenario;

impl SimulationScenario for ZeroExcitationScenario {
    fn name(&self) -> &str {
        "zero_excitation"
    }

    fn build(&self) -> SimulationSetup {
        SimulationSetup {
            config: SimulationConfig {
                source_amplitude: 0.0,
                inclusions: Some(3),
                ..small_config(20, 40)
            },
            num_steps: 60,
            energy_monitoring: EnergyMonitorConfig::default(),
        }
    }

    fn verify(&self, result: &SimulationResult) -> Result<()> {
        assert_eq!(result.final_fields.e_energy(), 0.0);
        assert_eq!(result.final_fields.h_energy(), 0.0);
        Ok(())
    }
}

/// Long run in the dense background stays finite.
pub struct LongSimulationScenario;

impl SimulationScenario for LongSimulationScenario {
    fn name(&self) -> &str {
        "long_simulation"
    }

    fn build(&self) -> SimulationSetup {
        SimulationSetup {
            config: SimulationConfig {
                inclusions: Some(2),
                seed: Some(3),
                ..small_config(16, 40)
            },
            num_steps: 2000,
            energy_monitoring: EnergyMonitorConfig {
                sample_interval: 100,
                track_peak: true,
            },
        }
    }

    fn verify(&self, result: &SimulationResult) -> Result<()> {
        assert_finite(result);
        assert_eq!(result.batch_result.energy_samples.len(), 20);
        assert_eq!(result.batch_result.timesteps_executed, 2000);
        Ok(())
    }
}

/// Twice the Courant limit in vacuum: fields must blow up.
pub struct UnstableCourantScenario;

impl SimulationScenario for UnstableCourantScenario {
    fn name(&self) -> &str {
        "unstable_courant_diverges"
    }

    fn build(&self) -> SimulationSetup {
        SimulationSetup {
            config: SimulationConfig {
                background_permittivity: 1.0,
                courant: 2.0,
                ..small_config(16, 32)
            },
            num_steps: 120,
            energy_monitoring: EnergyMonitorConfig::default(),
        }
    }

    fn verify(&self, result: &SimulationResult) -> Result<()> {
        assert!(result.operator.discretizer().courant_number() > 1.0);
        let energy = result.final_fields.e_energy();
        assert!(
            !(energy < 1e20),
            "expected divergence above the Courant limit, energy = {:.3e}",
            energy
        );
        Ok(())
    }
}

/// Generate one test per engine for a scenario.
macro_rules! test_all_engines {
    ($scenario:expr, $test_name_base:ident) => {
        paste::paste! {
            #[test]
            fn [<$test_name_base _basic>]() {
                let scenario = $scenario;
                crate::fdtd::engine_testing::test_scenario_with_engine_impl::<
                    crate::fdtd::BasicEngine,
                >(&scenario)
                .unwrap();
            }

            #[test]
            fn [<$test_name_base _parallel>]() {
                let scenario = $scenario;
                crate::fdtd::engine_testing::test_scenario_with_engine_impl::<
                    crate::fdtd::ParallelEngine,
                >(&scenario)
                .unwrap();
            }
        }
    };
}

/// Compare the parallel engine against the reference BasicEngine.
macro_rules! test_cross_engine {
    ($scenario:expr, $test_name_base:ident) => {
        paste::paste! {
            #[test]
            fn [<$test_name_base _parallel_vs_basic>]() {
                let scenario = $scenario;
                crate::fdtd::engine_testing::test_cross_engine_comparison::<
                    crate::fdtd::BasicEngine,
                    crate::fdtd::ParallelEngine
                >(&scenario, &crate::fdtd::engine_testing::ComparisonConfig::exact()).unwrap();
            }
        }
    };
}

mod tests {
    test_all_engines!(super::VacuumCavityScenario, test_vacuum_cavity);
    test_all_engines!(super::CausalityScenario, test_causality);
    test_all_engines!(super::RandomMediumScenario, test_random_medium);
    test_all_engines!(super::SmallGridScenario, test_small_grid);
    test_all_engines!(super::ZeroExcitationScenario, test_zero_excitation);
    test_all_engines!(super::LongSimulationScenario, test_long_simulation);
    test_all_engines!(super::UnstableCourantScenario, test_unstable_courant);

    test_cross_engine!(super::VacuumCavityScenario, compare_vacuum_cavity);
    test_cross_engine!(super::CausalityScenario, compare_causality);
    test_cross_engine!(super::RandomMediumScenario, compare_random_medium);
    test_cross_engine!(super::SmallGridScenario, compare_small_grid);
    test_cross_engine!(super::LongSimulationScenario, compare_long_simulation);
    test_cross_engine!(super::UnstableCourantScenario, compare_unstable_courant);

    #[test]
    fn test_normalized_error() {
        let exact = super::ComparisonConfig::exact();
        assert_eq!(exact.normalized_error(1.0, 1.0), 0.0);
        assert!(exact.normalized_error(1.0, 1.0 + 1e-15) > 1.0);

        let loose = super::ComparisonConfig {
            rtol: 1e-3,
            atol: 0.0,
        };
        assert!(loose.normalized_error(1000.0, 1000.5) <= 1.0);
        assert!(loose.normalized_error(1000.0, 1002.0) > 1.0);
    }
}

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ElemKind, EngineError, ExecutionTarget, Feature, Logger, MatmulEngine, MatmulTestCase,
    OracleConfig, OracleElement, OracleError, PrecisionClass, Seed, SuiteConfig, SuiteReport,
    ToleranceProfile, assert_all_close, materialize,
};

/// What to do when the engine can't launch a case.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchErrorMode {
    /// Report the case as skipped.
    #[default]
    #[serde(rename = "skip")]
    Skip,
    /// Panic, failing the calling test.
    #[serde(rename = "panic")]
    Panic,
}

/// Result of running one case.
#[derive(Clone, Debug, PartialEq)]
pub enum CaseOutcome {
    Passed { target: ExecutionTarget },
    Skipped { reason: String },
    Failed(CaseFailure),
}

/// A failed case with the error that made it fail.
#[derive(Error, Clone, Debug, PartialEq)]
#[error("{name} failed: {error}")]
pub struct CaseFailure {
    pub name: String,
    pub error: OracleError,
}

/// Runs matmul test cases on an engine and checks them against the reference.
pub struct OracleRunner<'a, En: MatmulEngine> {
    engine: &'a En,
    tolerance: ToleranceProfile,
    launch_errors: LaunchErrorMode,
    report: Option<PathBuf>,
    logger: Logger,
    fallbacks: hashbrown::HashSet<ElemKind>,
}

impl<'a, En: MatmulEngine> OracleRunner<'a, En> {
    /// Creates a runner configured from the [global configuration](OracleConfig::get).
    pub fn new(engine: &'a En) -> Self {
        Self::with_config(engine, &OracleConfig::get())
    }

    pub fn with_config(engine: &'a En, config: &OracleConfig) -> Self {
        Self {
            engine,
            tolerance: config.tolerance,
            launch_errors: config.launch_errors,
            report: config.report.clone(),
            logger: Logger::new(&config.logger),
            fallbacks: hashbrown::HashSet::new(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: ToleranceProfile) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_launch_errors(mut self, launch_errors: LaunchErrorMode) -> Self {
        self.launch_errors = launch_errors;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Where cases of element type `E` run on this engine.
    ///
    /// Low-precision elements fall back to the host when the accelerated path
    /// doesn't support low-precision matmul, and so do complex elements without
    /// complex support. A fallback is logged once per element type.
    pub fn target_for<E: OracleElement>(&mut self) -> ExecutionTarget {
        let properties = self.engine.properties();

        let reason = if !properties.feature_enabled(Feature::Accelerated) {
            None
        } else if E::KIND.precision() == PrecisionClass::Low
            && !self.engine.supports_low_precision_matmul()
        {
            Some("no low-precision matmul support")
        } else if E::KIND.is_complex() && !properties.feature_enabled(Feature::ComplexMatmul) {
            Some("no complex matmul support")
        } else {
            return ExecutionTarget::Accelerator;
        };

        if let Some(reason) = reason {
            if self.fallbacks.insert(E::KIND) {
                self.logger.log_basic(&format!(
                    "{}: {} cases fall back to the host, {reason}",
                    self.engine.name(),
                    E::KIND
                ));
            }
        }

        ExecutionTarget::Host
    }

    /// Runs one case and compares its output to the reference.
    ///
    /// # Panics
    /// Panics on a launch error when the launch error mode is [LaunchErrorMode::Panic].
    pub fn run_case<E: OracleElement>(&mut self, case: &MatmulTestCase<E>) -> CaseOutcome {
        let name = case.name();
        let target = self.target_for::<E>();

        match self.check(case, target) {
            Ok(()) => {
                self.logger
                    .log_full(&format!("{name} passed on {}", target_name(target)));
                CaseOutcome::Passed { target }
            }
            Err(OracleError::Engine(err @ EngineError::Unavailable { .. })) => {
                let msg = format!("Can't launch the test {name}: {err}");
                if self.launch_errors == LaunchErrorMode::Panic {
                    panic!("{msg}");
                }
                self.logger.log_basic(&msg);
                CaseOutcome::Skipped {
                    reason: err.to_string(),
                }
            }
            Err(error) => {
                let failure = CaseFailure { name, error };
                self.logger.log_basic(&failure);
                CaseOutcome::Failed(failure)
            }
        }
    }

    fn check<E: OracleElement>(
        &self,
        case: &MatmulTestCase<E>,
        target: ExecutionTarget,
    ) -> Result<(), OracleError> {
        let (graph, feed) = case.graph()?;
        let actual = self.engine.execute(&graph, &feed, target)?;
        let expected = case.expected()?;

        assert_all_close(&actual, &expected, self.tolerance.for_elem::<E>())
    }

    /// Runs every case, in order. A failing case doesn't stop the others.
    pub fn run_suite<E: OracleElement>(
        &mut self,
        seed: Seed,
        cases: &[MatmulTestCase<E>],
    ) -> SuiteReport {
        let mut report = SuiteReport::new(seed);

        for case in cases {
            let outcome = self.run_case(case);
            report.push(case.name(), &outcome);
        }

        self.logger.log_basic(&report.summary());
        report
    }

    /// Generates the cases of `config` with element type `E`, then runs them.
    pub fn run_config<E: OracleElement>(
        &mut self,
        config: &SuiteConfig,
        seed: Seed,
    ) -> Result<SuiteReport, OracleError> {
        self.logger
            .log_basic(&format!("Matmul oracle seed: {}", seed.value()));

        if !config.elems.contains(&E::KIND) {
            return Err(OracleError::Config {
                reason: format!("{} is not one of the suite element types", E::KIND),
            });
        }

        let descriptors = config.enumerate()?;
        let distribution = config.distribution()?;
        let cases = materialize::<E, _>(&descriptors, &distribution, &mut seed.rng())?;

        if cases.is_empty() {
            return Err(OracleError::Config {
                reason: format!("the suite has no {} case", E::KIND),
            });
        }

        Ok(self.run_suite(seed, &cases))
    }

    /// Writes `report` to the configured report path, if any.
    pub fn write_report(&self, report: &SuiteReport) -> Result<(), OracleError> {
        match &self.report {
            Some(path) => report.save(path),
            None => Ok(()),
        }
    }
}

fn target_name(target: ExecutionTarget) -> &'static str {
    match target {
        ExecutionTarget::Accelerator => "accelerator",
        ExecutionTarget::Host => "host",
    }
}

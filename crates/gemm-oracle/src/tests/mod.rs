#![allow(missing_docs)]

mod macros;

use crate::{
    CaseDescriptor, CaseOutcome, MatmulArgs, MatmulEngine, MatmulTestCase, Matrix, OracleConfig,
    OracleElement, OracleRunner, ProblemSize, Seed, ShapeMode, SuiteConfig, Tolerance,
    TransformFlags, assert_all_close,
};

/// Problem sizes of the `gMxNxK` modules generated by [testgen_matmul_oracle](crate::testgen_matmul_oracle),
/// in the order of [SuiteConfig::problem_sizes] for the default suite.
pub const GENERATED_SIZES: [ProblemSize; 8] = [
    ProblemSize { m: 3, n: 3, k: 3 },
    ProblemSize { m: 3, n: 3, k: 5 },
    ProblemSize { m: 3, n: 5, k: 3 },
    ProblemSize { m: 3, n: 5, k: 5 },
    ProblemSize { m: 5, n: 3, k: 3 },
    ProblemSize { m: 5, n: 3, k: 5 },
    ProblemSize { m: 5, n: 5, k: 3 },
    ProblemSize { m: 5, n: 5, k: 5 },
];

/// Flags of the tests generated in every size module, in the order of
/// [SuiteConfig::args] for the default suite.
pub const GENERATED_ARGS: [MatmulArgs; 2] = [
    MatmulArgs::new(TransformFlags::NONE, TransformFlags::NONE),
    MatmulArgs::new(TransformFlags::NONE, TransformFlags::TRANSPOSE),
];

/// Test the correctness of one case on `En`, against the naive host reference.
///
/// Operands are sampled with the seed and distribution of the global configuration.
pub fn test_matmul_case<En, E>(mode: ShapeMode, size: ProblemSize, args: MatmulArgs)
where
    En: MatmulEngine + Default,
    E: OracleElement,
{
    let config = OracleConfig::get();
    let seed = Seed::resolve(config.seed);
    let distribution = config.suite.distribution().unwrap();
    let mut rng = seed.rng();

    let a = Matrix::<E>::random(size.m, size.k, &distribution, &mut rng);
    let b = Matrix::<E>::random(size.k, size.n, &distribution, &mut rng);
    let descriptor = CaseDescriptor::new(mode, E::KIND, size, args);
    let default_suite = SuiteConfig {
        elems: vec![E::KIND],
        ..Default::default()
    };
    assert!(
        default_suite.enumerate().unwrap().contains(&descriptor),
        "{} is not a case of the default suite",
        descriptor.name()
    );
    let case = MatmulTestCase::from_product(descriptor, &a, &b).unwrap();

    let engine = En::default();
    let mut runner = OracleRunner::new(&engine);

    match runner.run_case(&case) {
        CaseOutcome::Passed { .. } => {}
        CaseOutcome::Skipped { reason } => println!("Can't launch the test: {reason}"),
        CaseOutcome::Failed(failure) => panic!("{failure} (seed {})", seed.value()),
    }
}

/// Asserts `actual` has the shape of `expected` and all its values are close to it.
pub fn assert_output_close<E: OracleElement>(
    actual: &Matrix<E>,
    expected: &Matrix<E>,
    tolerance: Tolerance,
) {
    pretty_assertions::assert_eq!(actual.shape(), expected.shape());

    if let Err(err) = assert_all_close(actual, expected, tolerance) {
        panic!("{err}");
    }
}

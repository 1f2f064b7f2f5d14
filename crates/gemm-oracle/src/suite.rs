use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::{
    CaseDescriptor, ElemKind, MatmulArgs, MatmulTestCase, Matrix, OracleElement, OracleError,
    ProblemSize, ShapeMode, TransformFlags,
};

/// Parameters of the generated test suite.
///
/// Every combination of shape mode, element type, problem size and transform
/// flags becomes one case. Sizes with a dimension equal to 1 are skipped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    pub modes: Vec<ShapeMode>,
    /// Candidate values for each of `m`, `n` and `k`.
    pub sizes: Vec<usize>,
    /// Candidate flags for each operand.
    pub transform_options: Vec<TransformFlags>,
    /// Drop the options that transpose the lhs.
    pub skip_transposed_lhs: bool,
    pub elems: Vec<ElemKind>,
    /// Mean of the normal distribution operands are sampled from.
    pub mean: f64,
    /// Standard deviation of the normal distribution operands are sampled from.
    pub std_dev: f64,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            modes: vec![ShapeMode::Dynamic, ShapeMode::Static],
            sizes: vec![1, 3, 5],
            transform_options: vec![TransformFlags::NONE, TransformFlags::TRANSPOSE],
            skip_transposed_lhs: true,
            elems: vec![ElemKind::F32],
            mean: -5.0,
            std_dev: 5.0,
        }
    }
}

impl SuiteConfig {
    /// Lists every case of the suite, in a deterministic order.
    ///
    /// Fails with [OracleError::DuplicateCase] if two cases share a name.
    pub fn enumerate(&self) -> Result<Vec<CaseDescriptor>, OracleError> {
        let mut names = hashbrown::HashSet::new();
        let mut cases = Vec::new();

        for mode in &self.modes {
            for elem in &self.elems {
                for size in self.problem_sizes() {
                    for args in self.args() {
                        let case = CaseDescriptor::new(*mode, *elem, size, args);
                        let name = case.name();

                        if !names.insert(name.clone()) {
                            return Err(OracleError::DuplicateCase { name });
                        }
                        cases.push(case);
                    }
                }
            }
        }

        Ok(cases)
    }

    /// Problem sizes in `m`, `n`, `k` order, excluding any dimension equal to 1.
    pub fn problem_sizes(&self) -> impl Iterator<Item = ProblemSize> + '_ {
        self.sizes.iter().flat_map(move |m| {
            self.sizes.iter().flat_map(move |n| {
                self.sizes
                    .iter()
                    .map(move |k| ProblemSize::new(*m, *n, *k))
            })
        })
        .filter(ProblemSize::is_general)
    }

    /// Flag combinations of both operands, lhs first.
    pub fn args(&self) -> impl Iterator<Item = MatmulArgs> + '_ {
        self.transform_options
            .iter()
            .filter(|lhs| !(self.skip_transposed_lhs && lhs.transpose))
            .flat_map(move |lhs| {
                self.transform_options
                    .iter()
                    .map(move |rhs| MatmulArgs::new(*lhs, *rhs))
            })
    }

    /// The distribution operands are sampled from.
    ///
    /// The standard deviation must be finite and strictly positive.
    pub fn distribution(&self) -> Result<Normal<f64>, OracleError> {
        if !(self.std_dev.is_finite() && self.std_dev > 0.0) {
            return Err(OracleError::Config {
                reason: format!(
                    "standard deviation of the operands must be positive, got {}",
                    self.std_dev
                ),
            });
        }

        Normal::new(self.mean, self.std_dev).map_err(|err| OracleError::Config {
            reason: format!(
                "normal distribution with mean {} and std {}: {err}",
                self.mean, self.std_dev
            ),
        })
    }
}

/// Seed of the random operands, logged so a failing run can be replayed.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(u64);

impl Seed {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Uses the configured seed, or draws a fresh one from entropy.
    pub fn resolve(configured: Option<u64>) -> Self {
        let seed = match configured {
            Some(value) => Self(value),
            None => Self(rand::rng().random()),
        };
        log::info!("Matmul oracle seed: {}", seed.0);

        seed
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.0)
    }
}

/// Draws the operands of every descriptor of element type `E`.
///
/// One pair of product-space matrices is sampled per shape mode and problem size,
/// then shared by all flag combinations of that size.
pub fn materialize<E: OracleElement, R: Rng + ?Sized>(
    descriptors: &[CaseDescriptor],
    distribution: &Normal<f64>,
    rng: &mut R,
) -> Result<Vec<MatmulTestCase<E>>, OracleError> {
    let mut operands = hashbrown::HashMap::<(ShapeMode, ProblemSize), (Matrix<E>, Matrix<E>)>::new();
    let mut cases = Vec::new();

    for descriptor in descriptors.iter().filter(|d| d.elem == E::KIND) {
        let size = descriptor.size;
        let (a, b) = operands
            .entry((descriptor.mode, size))
            .or_insert_with(|| {
                let a = Matrix::random(size.m, size.k, distribution, rng);
                let b = Matrix::random(size.k, size.n, distribution, rng);
                (a, b)
            });

        cases.push(MatmulTestCase::from_product(*descriptor, a, b)?);
    }

    Ok(cases)
}

use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::{
    ElemKind, Feed, MatmulArgs, MatmulGraph, Matrix, MatrixShape, OracleElement, OracleError,
    ShapeMode, matmul_with_transforms,
};

/// Sizes of a matmul problem: `(m, k) @ (k, n) -> (m, n)`.
#[derive(new, Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSize {
    pub m: usize,
    pub n: usize,
    pub k: usize,
}

impl ProblemSize {
    pub fn lhs_shape(&self) -> MatrixShape {
        MatrixShape::new(self.m, self.k)
    }

    pub fn rhs_shape(&self) -> MatrixShape {
        MatrixShape::new(self.k, self.n)
    }

    pub fn out_shape(&self) -> MatrixShape {
        MatrixShape::new(self.m, self.n)
    }

    /// Whether no dimension is 1, i.e. the product is neither a vector nor a
    /// scalar product.
    pub fn is_general(&self) -> bool {
        self.m > 1 && self.n > 1 && self.k > 1
    }
}

/// Everything that determines a test case, except the random operands.
#[derive(new, Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseDescriptor {
    pub mode: ShapeMode,
    pub elem: ElemKind,
    pub size: ProblemSize,
    pub args: MatmulArgs,
}

impl CaseDescriptor {
    /// Unique test name of the case.
    pub fn name(&self) -> String {
        format!(
            "test_matmul_{}_{}_{}_{}_{}_{}_{}_{}_{}",
            self.mode,
            self.elem,
            self.size.m,
            self.size.n,
            self.size.k,
            self.args.lhs.adjoint,
            self.args.lhs.transpose,
            self.args.rhs.adjoint,
            self.args.rhs.transpose,
        )
    }
}

/// A test case with its operands, as handed to the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct MatmulTestCase<E> {
    pub descriptor: CaseDescriptor,
    /// Left operand exactly as fed to the engine, before its transform is applied.
    pub lhs: Matrix<E>,
    /// Right operand exactly as fed to the engine, before its transform is applied.
    pub rhs: Matrix<E>,
}

impl<E: OracleElement> MatmulTestCase<E> {
    /// Builds a case from the product-space operands `a: [m, k]` and `b: [k, n]`.
    ///
    /// The engine operands are `a` and `b` transformed by their own flags, so that
    /// the engine applying the flags multiplies `a` by `b` again.
    pub fn from_product(
        descriptor: CaseDescriptor,
        a: &Matrix<E>,
        b: &Matrix<E>,
    ) -> Result<Self, OracleError> {
        check_elem::<E>(&descriptor)?;

        if a.shape() != descriptor.size.lhs_shape() || b.shape() != descriptor.size.rhs_shape() {
            return Err(OracleError::Config {
                reason: format!(
                    "operands {} and {} don't match the problem {:?}",
                    a.shape(),
                    b.shape(),
                    descriptor.size
                ),
            });
        }

        let (lhs_transform, rhs_transform) = descriptor.args.resolve()?;

        Ok(Self {
            descriptor,
            lhs: lhs_transform.apply(a),
            rhs: rhs_transform.apply(b),
        })
    }

    /// Builds a case from the operands the engine will receive.
    pub fn from_operands(
        descriptor: CaseDescriptor,
        lhs: Matrix<E>,
        rhs: Matrix<E>,
    ) -> Result<Self, OracleError> {
        check_elem::<E>(&descriptor)?;

        let out = descriptor.args.output_shape(lhs.shape(), rhs.shape())?;
        if out != descriptor.size.out_shape() {
            return Err(OracleError::Config {
                reason: format!(
                    "operands produce a {out} output, the problem {:?} expects {}",
                    descriptor.size,
                    descriptor.size.out_shape()
                ),
            });
        }

        Ok(Self {
            descriptor,
            lhs,
            rhs,
        })
    }

    pub fn name(&self) -> String {
        self.descriptor.name()
    }

    /// Reference output: the transformed operands multiplied on the host.
    pub fn expected(&self) -> Result<Matrix<E>, OracleError> {
        matmul_with_transforms(&self.lhs, &self.rhs, &self.descriptor.args)
    }

    /// Graph and feed for the engine, according to the shape mode of the case.
    pub fn graph(&self) -> Result<(MatmulGraph<E>, Feed<E>), OracleError> {
        match self.descriptor.mode {
            ShapeMode::Static => Ok((
                MatmulGraph::constant(self.lhs.clone(), self.rhs.clone(), self.descriptor.args)?,
                Feed::empty(),
            )),
            ShapeMode::Dynamic => Ok((
                MatmulGraph::placeholder(self.descriptor.args)?,
                Feed::new(self.lhs.clone(), self.rhs.clone()),
            )),
        }
    }
}

fn check_elem<E: OracleElement>(descriptor: &CaseDescriptor) -> Result<(), OracleError> {
    if descriptor.elem != E::KIND {
        return Err(OracleError::ElemMismatch {
            expected: descriptor.elem,
            actual: E::KIND,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TransformFlags, reference_matmul};
    use num_complex::Complex;
    use pretty_assertions::assert_eq;

    fn descriptor(elem: ElemKind, rhs: TransformFlags) -> CaseDescriptor {
        CaseDescriptor::new(
            ShapeMode::Static,
            elem,
            ProblemSize::new(3, 5, 3),
            MatmulArgs::new(TransformFlags::NONE, rhs),
        )
    }

    #[test]
    fn names_follow_flag_order() {
        let name = descriptor(ElemKind::F32, TransformFlags::TRANSPOSE).name();
        assert_eq!(name, "test_matmul_static_float32_3_5_3_false_false_false_true");
    }

    #[test]
    fn only_sizes_above_one_are_general() {
        assert!(ProblemSize::new(3, 5, 3).is_general());
        assert!(!ProblemSize::new(1, 5, 3).is_general());
        assert!(!ProblemSize::new(3, 5, 1).is_general());
    }

    #[test]
    fn product_operands_are_transformed_for_the_engine() {
        let a = Matrix::from_fn(3, 3, |row, col| (row + 2 * col) as f32);
        let b = Matrix::from_fn(3, 5, |row, col| (row * col) as f32 - 1.0);

        let case = MatmulTestCase::from_product(
            descriptor(ElemKind::F32, TransformFlags::TRANSPOSE),
            &a,
            &b,
        )
        .unwrap();

        assert_eq!(case.lhs, a);
        assert_eq!(case.rhs, b.transpose());
        assert_eq!(case.expected().unwrap(), reference_matmul(&a, &b).unwrap());
    }

    #[test]
    fn adjoint_cases_recover_the_complex_product() {
        let a = Matrix::from_fn(3, 3, |row, col| Complex::new(row as f64, col as f64));
        let b = Matrix::from_fn(3, 5, |row, col| Complex::new(col as f64, -(row as f64)));

        let case = MatmulTestCase::from_product(
            descriptor(ElemKind::C128, TransformFlags::ADJOINT),
            &a,
            &b,
        )
        .unwrap();

        assert_eq!(case.rhs, b.adjoint());
        assert_eq!(case.expected().unwrap(), reference_matmul(&a, &b).unwrap());
    }

    #[test]
    fn wrong_element_type_is_rejected() {
        let a = Matrix::<f64>::zeros(3, 3);
        let b = Matrix::<f64>::zeros(3, 5);

        assert_eq!(
            MatmulTestCase::from_product(descriptor(ElemKind::F32, TransformFlags::NONE), &a, &b),
            Err(OracleError::ElemMismatch {
                expected: ElemKind::F32,
                actual: ElemKind::F64,
            })
        );
    }

    #[test]
    fn operands_must_produce_the_problem_output() {
        let lhs = Matrix::<f32>::zeros(3, 3);
        let rhs = Matrix::<f32>::zeros(3, 5);

        assert!(matches!(
            MatmulTestCase::from_operands(
                descriptor(ElemKind::F32, TransformFlags::NONE),
                lhs.clone(),
                rhs.clone()
            ),
            Ok(_)
        ));
        assert!(matches!(
            MatmulTestCase::from_operands(descriptor(ElemKind::F32, TransformFlags::NONE), rhs, lhs),
            Err(OracleError::IncompatibleShapes { .. })
        ));
    }

    #[test]
    fn graph_matches_shape_mode() {
        let a = Matrix::<f32>::zeros(3, 3);
        let b = Matrix::<f32>::zeros(3, 5);
        let mut descriptor = descriptor(ElemKind::F32, TransformFlags::NONE);

        let (graph, feed) = MatmulTestCase::from_product(descriptor, &a, &b)
            .unwrap()
            .graph()
            .unwrap();
        assert_eq!(graph.mode(), ShapeMode::Static);
        assert_eq!(feed, Feed::empty());

        descriptor.mode = ShapeMode::Dynamic;
        let (graph, feed) = MatmulTestCase::from_product(descriptor, &a, &b)
            .unwrap()
            .graph()
            .unwrap();
        assert_eq!(graph.mode(), ShapeMode::Dynamic);
        assert_eq!(feed, Feed::new(a, b));
    }
}

use crate::{MatmulArgs, Matrix, OracleElement, OracleError};

/// Multiplies two matrices.
///
/// This is a naive CPU implementation, very slow on large payloads,
/// not designed to be used for other purposes than testing.
pub fn reference_matmul<E: OracleElement>(
    lhs: &Matrix<E>,
    rhs: &Matrix<E>,
) -> Result<Matrix<E>, OracleError> {
    if lhs.cols() != rhs.rows() {
        return Err(OracleError::IncompatibleShapes {
            lhs: lhs.shape(),
            rhs: rhs.shape(),
        });
    }

    let m = lhs.rows();
    let n = rhs.cols();
    let k = lhs.cols();

    let mut out = Vec::with_capacity(m * n);
    for i in 0..m {
        for j in 0..n {
            let mut acc = <E::Acc as num_traits::Zero>::zero();
            for k_ in 0..k {
                acc = acc + lhs.get(i, k_).widen() * rhs.get(k_, j).widen();
            }
            out.push(E::narrow(acc));
        }
    }

    Matrix::new(m, n, out)
}

/// Applies the transforms requested by `args` to both operands, then multiplies them.
pub fn matmul_with_transforms<E: OracleElement>(
    lhs: &Matrix<E>,
    rhs: &Matrix<E>,
    args: &MatmulArgs,
) -> Result<Matrix<E>, OracleError> {
    let (lhs_transform, rhs_transform) = args.resolve()?;

    reference_matmul(&lhs_transform.apply(lhs), &rhs_transform.apply(rhs))
}

use gemm_oracle::{Matrix, OracleElement};
use num_traits::Zero;

/// Multiplies two row-major matrices whose transforms are already applied.
///
/// `lhs.cols()` must equal `rhs.rows()`.
pub fn matmul_naive<E: OracleElement>(lhs: &Matrix<E>, rhs: &Matrix<E>) -> Matrix<E> {
    let m = lhs.rows();
    let k = lhs.cols();
    let n = rhs.cols();

    let mut acc = vec![E::Acc::zero(); m * n];

    for i in 0..m {
        for k_ in 0..k {
            let lhs_value = lhs.get(i, k_).widen();
            for j in 0..n {
                acc[i * n + j] = acc[i * n + j] + lhs_value * rhs.get(k_, j).widen();
            }
        }
    }

    Matrix::from_fn(m, n, |row, col| E::narrow(acc[row * n + col]))
}

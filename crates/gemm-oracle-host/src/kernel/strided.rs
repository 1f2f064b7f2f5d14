use gemm_oracle::{Matrix, OracleElement};
use num_traits::Zero;

use crate::StridedView;

/// Side of the output tiles computed together.
pub const TILE_SIZE: usize = 4;

/// Multiplies two transformed views, one output tile at a time.
///
/// Each output element reduces `k` in order, in the accumulator type of `E`.
pub fn matmul_strided<E: OracleElement>(
    lhs: &StridedView<'_, E>,
    rhs: &StridedView<'_, E>,
) -> Matrix<E> {
    let m = lhs.shape().rows;
    let k = lhs.shape().cols;
    let n = rhs.shape().cols;

    let mut out = vec![E::zero(); m * n];

    for row_start in (0..m).step_by(TILE_SIZE) {
        for col_start in (0..n).step_by(TILE_SIZE) {
            let row_end = usize::min(row_start + TILE_SIZE, m);
            let col_end = usize::min(col_start + TILE_SIZE, n);

            for i in row_start..row_end {
                for j in col_start..col_end {
                    let mut acc = E::Acc::zero();
                    for k_ in 0..k {
                        acc = acc + lhs.load(i, k_).widen() * rhs.load(k_, j).widen();
                    }
                    out[i * n + j] = E::narrow(acc);
                }
            }
        }
    }

    Matrix::from_fn(m, n, |row, col| out[row * n + col])
}

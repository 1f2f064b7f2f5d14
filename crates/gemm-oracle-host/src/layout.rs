use gemm_oracle::{Matrix, MatrixShape, OracleElement, Transform};

/// Memory layout of a matrix, as seen by a kernel.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum MatrixLayout {
    RowMajor,
    ColMajor,
}

impl MatrixLayout {
    /// Layout under which a row-major buffer reads as its `transform`ed matrix.
    pub fn for_transform(transform: Transform) -> Self {
        match transform.swaps_dims() {
            true => MatrixLayout::ColMajor,
            false => MatrixLayout::RowMajor,
        }
    }

    /// Row and column strides of a `rows x cols` matrix stored with this layout.
    pub fn strides(&self, rows: usize, cols: usize) -> (usize, usize) {
        match self {
            MatrixLayout::RowMajor => (cols, 1),
            MatrixLayout::ColMajor => (1, rows),
        }
    }
}

/// Transformed view of a matrix, without copying its buffer.
///
/// Transposition is a change of [layout](MatrixLayout); conjugation happens on load.
#[derive(Debug)]
pub struct StridedView<'a, E> {
    data: &'a [E],
    shape: MatrixShape,
    strides: (usize, usize),
    conjugate: bool,
}

impl<'a, E: OracleElement> StridedView<'a, E> {
    pub fn new(matrix: &'a Matrix<E>, transform: Transform) -> Self {
        let shape = transform.apply_shape(matrix.shape());
        let layout = MatrixLayout::for_transform(transform);

        Self {
            data: matrix.as_slice(),
            shape,
            strides: layout.strides(shape.rows, shape.cols),
            conjugate: transform.conjugates(),
        }
    }

    pub fn shape(&self) -> MatrixShape {
        self.shape
    }

    pub fn load(&self, row: usize, col: usize) -> E {
        let value = self.data[row * self.strides.0 + col * self.strides.1];

        match self.conjugate {
            true => value.conj(),
            false => value,
        }
    }
}

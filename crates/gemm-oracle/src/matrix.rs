use core::fmt::Display;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::{OracleElement, OracleError};

/// Shape of a 2-D matrix.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixShape {
    pub rows: usize,
    pub cols: usize,
}

impl MatrixShape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn num_elements(&self) -> usize {
        self.rows * self.cols
    }

    /// The shape with rows and columns swapped.
    pub fn transposed(&self) -> Self {
        Self::new(self.cols, self.rows)
    }
}

impl Display for MatrixShape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}, {}]", self.rows, self.cols)
    }
}

/// Dense row-major matrix.
///
/// Matrices are never mutated in place: transforms return new matrices.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix<E> {
    shape: MatrixShape,
    data: Vec<E>,
}

impl<E: OracleElement> Matrix<E> {
    /// Wraps a row-major buffer, failing when its length doesn't match the shape.
    pub fn new(rows: usize, cols: usize, data: Vec<E>) -> Result<Self, OracleError> {
        if data.len() != rows * cols {
            return Err(OracleError::InvalidMatrix {
                rows,
                cols,
                len: data.len(),
            });
        }

        Ok(Self {
            shape: MatrixShape::new(rows, cols),
            data,
        })
    }

    pub fn from_fn<F>(rows: usize, cols: usize, mut func: F) -> Self
    where
        F: FnMut(usize, usize) -> E,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(func(row, col));
            }
        }

        Self {
            shape: MatrixShape::new(rows, cols),
            data,
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::from_fn(rows, cols, |_, _| E::zero())
    }

    /// Samples every element from `distribution`.
    ///
    /// Complex elements draw their imaginary part from a second, independent sample.
    pub fn random<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        distribution: &Normal<f64>,
        rng: &mut R,
    ) -> Self {
        let complex = E::KIND.is_complex();
        let real: Vec<f64> = (0..rows * cols).map(|_| distribution.sample(rng)).collect();
        let imag: Vec<f64> = if complex {
            (0..rows * cols).map(|_| distribution.sample(rng)).collect()
        } else {
            vec![0.0; rows * cols]
        };

        let data = real
            .into_iter()
            .zip(imag)
            .map(|(re, im)| E::from_parts(re, im))
            .collect();

        Self {
            shape: MatrixShape::new(rows, cols),
            data,
        }
    }

    pub fn shape(&self) -> MatrixShape {
        self.shape
    }

    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    pub fn cols(&self) -> usize {
        self.shape.cols
    }

    pub fn get(&self, row: usize, col: usize) -> E {
        self.data[row * self.shape.cols + col]
    }

    pub fn as_slice(&self) -> &[E] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<E> {
        self.data
    }

    pub fn transpose(&self) -> Self {
        Self::from_fn(self.cols(), self.rows(), |row, col| self.get(col, row))
    }

    /// Element-wise complex conjugate.
    pub fn conj(&self) -> Self {
        Self {
            shape: self.shape,
            data: self.data.iter().map(|value| value.conj()).collect(),
        }
    }

    /// Conjugate transpose.
    pub fn adjoint(&self) -> Self {
        Self::from_fn(self.cols(), self.rows(), |row, col| self.get(col, row).conj())
    }
}

use core::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Matrix, MatrixShape, OracleElement, OracleError};

/// Identifies one of the tensors of a matmul.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatmulIdent {
    Lhs,
    Rhs,
    Out,
}

impl Display for MatmulIdent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            MatmulIdent::Lhs => "lhs",
            MatmulIdent::Rhs => "rhs",
            MatmulIdent::Out => "out",
        })
    }
}

/// Transform requested for a matmul operand.
///
/// The two flags are meant to be exclusive, see [TransformFlags::resolve].
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformFlags {
    #[serde(default)]
    pub adjoint: bool,
    #[serde(default)]
    pub transpose: bool,
}

impl TransformFlags {
    pub const NONE: Self = Self::new(false, false);
    pub const TRANSPOSE: Self = Self::new(false, true);
    pub const ADJOINT: Self = Self::new(true, false);

    pub const fn new(adjoint: bool, transpose: bool) -> Self {
        Self { adjoint, transpose }
    }

    /// Resolves the flags into a single transform.
    ///
    /// Requesting both a transpose and an adjoint for the same operand is rejected.
    pub fn resolve(&self, ident: MatmulIdent) -> Result<Transform, OracleError> {
        match (self.adjoint, self.transpose) {
            (true, true) => Err(OracleError::ConflictingTransforms { ident }),
            (false, true) => Ok(Transform::Transpose),
            (true, false) => Ok(Transform::Adjoint),
            (false, false) => Ok(Transform::Identity),
        }
    }
}

impl Display for TransformFlags {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "adjoint={}, transpose={}", self.adjoint, self.transpose)
    }
}

/// Transform applied to an operand before it takes part in the product.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transform {
    Identity,
    Transpose,
    /// Conjugate transpose.
    Adjoint,
}

impl Transform {
    pub fn apply<E: OracleElement>(&self, matrix: &Matrix<E>) -> Matrix<E> {
        match self {
            Transform::Identity => matrix.clone(),
            Transform::Transpose => matrix.transpose(),
            Transform::Adjoint => matrix.adjoint(),
        }
    }

    /// Shape of an operand of the given shape once transformed.
    pub fn apply_shape(&self, shape: MatrixShape) -> MatrixShape {
        match self {
            Transform::Identity => shape,
            Transform::Transpose | Transform::Adjoint => shape.transposed(),
        }
    }

    pub fn swaps_dims(&self) -> bool {
        !matches!(self, Transform::Identity)
    }

    pub fn conjugates(&self) -> bool {
        matches!(self, Transform::Adjoint)
    }
}

/// Transform flags of both operands of a matmul.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatmulArgs {
    #[serde(default)]
    pub lhs: TransformFlags,
    #[serde(default)]
    pub rhs: TransformFlags,
}

impl MatmulArgs {
    pub const fn new(lhs: TransformFlags, rhs: TransformFlags) -> Self {
        Self { lhs, rhs }
    }

    pub fn resolve(&self) -> Result<(Transform, Transform), OracleError> {
        Ok((
            self.lhs.resolve(MatmulIdent::Lhs)?,
            self.rhs.resolve(MatmulIdent::Rhs)?,
        ))
    }

    /// Output shape of a product of operands with the given shapes, once transformed.
    pub fn output_shape(
        &self,
        lhs: MatrixShape,
        rhs: MatrixShape,
    ) -> Result<MatrixShape, OracleError> {
        let (lhs_transform, rhs_transform) = self.resolve()?;
        let lhs = lhs_transform.apply_shape(lhs);
        let rhs = rhs_transform.apply_shape(rhs);

        if lhs.cols != rhs.rows {
            return Err(OracleError::IncompatibleShapes { lhs, rhs });
        }

        Ok(MatrixShape::new(lhs.rows, rhs.cols))
    }
}

//! Two-input matmul graph with static or dynamic operand shapes.
//!
//! In static-shape mode both operands are constants baked into the graph, so
//! compatibility is checked when the graph is built. In dynamic-shape mode the
//! operands are placeholders whose dimensions are only known once values are
//! fed at execution time.

use core::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    EngineError, MatmulArgs, MatmulIdent, Matrix, MatrixShape, OracleElement, OracleError,
    Transform,
};

/// How operand shapes are provided to the engine.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeMode {
    /// Operands are materialized as fixed-shape constants.
    #[serde(rename = "static")]
    Static,
    /// Operands are shape-polymorphic placeholders bound at execution time.
    #[serde(rename = "dynamic")]
    Dynamic,
}

impl ShapeMode {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeMode::Static => "static",
            ShapeMode::Dynamic => "dynamic",
        }
    }
}

impl Display for ShapeMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A placeholder dimension.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dim {
    Static(usize),
    Dynamic,
}

impl Dim {
    fn accepts(&self, size: usize) -> bool {
        match self {
            Dim::Static(expected) => *expected == size,
            Dim::Dynamic => true,
        }
    }
}

impl Display for Dim {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Dim::Static(size) => write!(f, "{size}"),
            Dim::Dynamic => f.write_str("?"),
        }
    }
}

/// Shape of a placeholder, where any dimension may be unknown.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderShape {
    pub rows: Dim,
    pub cols: Dim,
}

impl PlaceholderShape {
    /// Both dimensions unknown.
    pub fn dynamic() -> Self {
        Self {
            rows: Dim::Dynamic,
            cols: Dim::Dynamic,
        }
    }

    pub fn fixed(shape: MatrixShape) -> Self {
        Self {
            rows: Dim::Static(shape.rows),
            cols: Dim::Static(shape.cols),
        }
    }

    pub fn accepts(&self, shape: MatrixShape) -> bool {
        self.rows.accepts(shape.rows) && self.cols.accepts(shape.cols)
    }

    fn as_static(&self) -> Option<MatrixShape> {
        match (self.rows, self.cols) {
            (Dim::Static(rows), Dim::Static(cols)) => Some(MatrixShape::new(rows, cols)),
            _ => None,
        }
    }
}

impl Display for PlaceholderShape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}, {}]", self.rows, self.cols)
    }
}

/// An input of a [MatmulGraph].
#[derive(Clone, Debug, PartialEq)]
pub enum Input<E> {
    Constant(Matrix<E>),
    Placeholder(PlaceholderShape),
}

impl<E: OracleElement> Input<E> {
    fn static_shape(&self) -> Option<MatrixShape> {
        match self {
            Input::Constant(matrix) => Some(matrix.shape()),
            Input::Placeholder(shape) => shape.as_static(),
        }
    }

    fn bind<'a>(
        &'a self,
        ident: MatmulIdent,
        fed: Option<&'a Matrix<E>>,
    ) -> Result<&'a Matrix<E>, EngineError> {
        match (self, fed) {
            (Input::Constant(matrix), None) => Ok(matrix),
            (Input::Constant(_), Some(_)) => Err(EngineError::UnexpectedFeed { ident }),
            (Input::Placeholder(_), None) => Err(EngineError::MissingFeed { ident }),
            (Input::Placeholder(shape), Some(matrix)) => {
                if shape.accepts(matrix.shape()) {
                    Ok(matrix)
                } else {
                    Err(EngineError::ShapeMismatch {
                        ident,
                        expected: *shape,
                        actual: matrix.shape(),
                    })
                }
            }
        }
    }
}

/// Values bound to the placeholders of a graph at execution time.
#[derive(Clone, Debug, PartialEq)]
pub struct Feed<E> {
    pub lhs: Option<Matrix<E>>,
    pub rhs: Option<Matrix<E>>,
}

impl<E> Feed<E> {
    /// Feed for a graph without placeholders.
    pub fn empty() -> Self {
        Self {
            lhs: None,
            rhs: None,
        }
    }

    pub fn new(lhs: Matrix<E>, rhs: Matrix<E>) -> Self {
        Self {
            lhs: Some(lhs),
            rhs: Some(rhs),
        }
    }
}

/// A matmul of two inputs with per-operand transform flags.
#[derive(Clone, Debug, PartialEq)]
pub struct MatmulGraph<E> {
    lhs: Input<E>,
    rhs: Input<E>,
    args: MatmulArgs,
}

impl<E: OracleElement> MatmulGraph<E> {
    /// Static-shape graph over two constants.
    ///
    /// Fails when the flags conflict or when the operands can't be multiplied
    /// once transformed.
    pub fn constant(
        lhs: Matrix<E>,
        rhs: Matrix<E>,
        args: MatmulArgs,
    ) -> Result<Self, OracleError> {
        args.output_shape(lhs.shape(), rhs.shape())?;

        Ok(Self {
            lhs: Input::Constant(lhs),
            rhs: Input::Constant(rhs),
            args,
        })
    }

    /// Dynamic-shape graph over two placeholders of unknown dimensions.
    pub fn placeholder(args: MatmulArgs) -> Result<Self, OracleError> {
        Self::placeholder_with_shapes(
            PlaceholderShape::dynamic(),
            PlaceholderShape::dynamic(),
            args,
        )
    }

    /// Graph over two placeholders, some of whose dimensions may be known.
    pub fn placeholder_with_shapes(
        lhs: PlaceholderShape,
        rhs: PlaceholderShape,
        args: MatmulArgs,
    ) -> Result<Self, OracleError> {
        args.resolve()?;

        let graph = Self {
            lhs: Input::Placeholder(lhs),
            rhs: Input::Placeholder(rhs),
            args,
        };
        graph.static_output_shape().transpose()?;

        Ok(graph)
    }

    pub fn args(&self) -> &MatmulArgs {
        &self.args
    }

    pub fn lhs(&self) -> &Input<E> {
        &self.lhs
    }

    pub fn rhs(&self) -> &Input<E> {
        &self.rhs
    }

    /// Whether every operand shape is known before execution.
    pub fn mode(&self) -> ShapeMode {
        match (&self.lhs, &self.rhs) {
            (Input::Constant(_), Input::Constant(_)) => ShapeMode::Static,
            _ => ShapeMode::Dynamic,
        }
    }

    /// Output shape, when both operand shapes are statically known.
    pub fn static_output_shape(&self) -> Option<Result<MatrixShape, OracleError>> {
        let lhs = self.lhs.static_shape()?;
        let rhs = self.rhs.static_shape()?;

        Some(self.args.output_shape(lhs, rhs))
    }

    /// Binds the graph inputs, returning the operands with their resolved transforms.
    pub fn bind<'a>(&'a self, feed: &'a Feed<E>) -> Result<BoundMatmul<'a, E>, EngineError> {
        let lhs = self.lhs.bind(MatmulIdent::Lhs, feed.lhs.as_ref())?;
        let rhs = self.rhs.bind(MatmulIdent::Rhs, feed.rhs.as_ref())?;

        let (lhs_transform, rhs_transform) =
            self.args.resolve().map_err(|err| EngineError::InvalidArgs {
                reason: err.to_string(),
            })?;

        let lhs_shape = lhs_transform.apply_shape(lhs.shape());
        let rhs_shape = rhs_transform.apply_shape(rhs.shape());
        if lhs_shape.cols != rhs_shape.rows {
            return Err(EngineError::IncompatibleShapes {
                lhs: lhs_shape,
                rhs: rhs_shape,
            });
        }

        Ok(BoundMatmul {
            lhs,
            rhs,
            lhs_transform,
            rhs_transform,
            out_shape: MatrixShape::new(lhs_shape.rows, rhs_shape.cols),
        })
    }
}

/// Operands of a graph once bound, ready to be multiplied by an engine.
#[derive(Debug)]
pub struct BoundMatmul<'a, E> {
    pub lhs: &'a Matrix<E>,
    pub rhs: &'a Matrix<E>,
    pub lhs_transform: Transform,
    pub rhs_transform: Transform,
    pub out_shape: MatrixShape,
}

impl<E: OracleElement> BoundMatmul<'_, E> {
    /// Size of the reduced dimension.
    pub fn k(&self) -> usize {
        if self.lhs_transform.swaps_dims() {
            self.lhs.shape().rows
        } else {
            self.lhs.shape().cols
        }
    }
}

use std::path::PathBuf;

use thiserror::Error;

use crate::{ElemKind, EngineError, MatmulIdent, MatrixShape, Mismatch};

/// Errors raised while building, running or checking matmul test cases.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    /// Both the transpose and the adjoint flag were requested for one operand.
    #[error("Both transpose and adjoint were requested for the {ident} operand")]
    ConflictingTransforms { ident: MatmulIdent },

    /// The operands can't be multiplied once their transforms are applied.
    #[error("Incompatible matmul shapes after transforms: lhs={lhs}, rhs={rhs}")]
    IncompatibleShapes { lhs: MatrixShape, rhs: MatrixShape },

    /// The buffer length doesn't match the requested shape.
    #[error("A {rows}x{cols} matrix can't be built from {len} elements")]
    InvalidMatrix { rows: usize, cols: usize, len: usize },

    /// Two generated cases ended up with the same name.
    #[error("Test {name} defined more than once")]
    DuplicateCase { name: String },

    /// A case descriptor was materialized with the wrong element type.
    #[error("Case expects {expected} elements, got {actual}")]
    ElemMismatch { expected: ElemKind, actual: ElemKind },

    /// The engine produced an output with the wrong shape.
    #[error("Engine output has shape {actual}, expected {expected}")]
    OutputShape {
        expected: MatrixShape,
        actual: MatrixShape,
    },

    /// The engine failed to execute the graph.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// The engine output is not close enough to the reference.
    #[error("{0}")]
    Mismatch(#[from] Mismatch),

    /// Some cases of a suite failed.
    #[error("{} of {total} cases failed: {}", .names.len(), .names.join(", "))]
    SuiteFailed { names: Vec<String>, total: usize },

    /// Invalid configuration or suite parameters.
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    /// A report couldn't be written.
    #[error("Unable to write report to {path:?}: {reason}")]
    Report { path: PathBuf, reason: String },
}

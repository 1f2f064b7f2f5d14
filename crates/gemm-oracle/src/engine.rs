use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ElemKind, Feed, MatmulGraph, MatmulIdent, Matrix, MatrixShape, OracleElement, PlaceholderShape,
};

/// Capabilities an engine may advertise through its [properties](EngineProperties).
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Feature {
    /// The engine has an accelerated execution path.
    Accelerated,
    /// The accelerated path supports low-precision (half) multiply and convolution.
    LowPrecisionMatmul,
    /// The accelerated path supports complex elements.
    ComplexMatmul,
}

/// Properties of what the engine can do, namely which [features](Feature) are
/// supported by it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineProperties {
    set: BTreeSet<Feature>,
}

impl EngineProperties {
    /// Create a new feature set with the given features.
    pub fn new(features: &[Feature]) -> Self {
        let mut set = BTreeSet::new();
        for feature in features {
            set.insert(*feature);
        }

        EngineProperties { set }
    }

    /// Check if the provided [feature](Feature) is supported by the engine.
    pub fn feature_enabled(&self, feature: Feature) -> bool {
        self.set.contains(&feature)
    }

    /// Register a [feature](Feature) supported by the engine.
    pub fn register_feature(&mut self, feature: Feature) -> bool {
        self.set.insert(feature)
    }

    /// Remove a [feature](Feature), returning whether it was registered.
    pub fn unregister_feature(&mut self, feature: Feature) -> bool {
        self.set.remove(&feature)
    }

    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.set.iter().copied()
    }
}

/// Where an engine should execute a graph.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionTarget {
    /// The accelerated path (GPU or equivalent).
    #[serde(rename = "accelerator")]
    Accelerator,
    /// The non-accelerated fallback path.
    #[serde(rename = "host")]
    Host,
}

/// Errors returned by a [MatmulEngine] while executing a graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The requested target or element type isn't supported.
    #[error("{target:?} execution unavailable for {elem}: {reason}")]
    Unavailable {
        target: ExecutionTarget,
        elem: ElemKind,
        reason: String,
    },

    /// A placeholder input wasn't fed.
    #[error("No value fed for the {ident} placeholder")]
    MissingFeed { ident: MatmulIdent },

    /// A value was fed for an input that isn't a placeholder.
    #[error("A value was fed for the {ident} input, which is a constant")]
    UnexpectedFeed { ident: MatmulIdent },

    /// A fed value doesn't match the static dimensions of its placeholder.
    #[error("Fed {ident} value has shape {actual}, placeholder expects {expected}")]
    ShapeMismatch {
        ident: MatmulIdent,
        expected: PlaceholderShape,
        actual: MatrixShape,
    },

    /// The bound operands can't be multiplied once transformed.
    #[error("Incompatible operands after transforms: lhs={lhs}, rhs={rhs}")]
    IncompatibleShapes { lhs: MatrixShape, rhs: MatrixShape },

    /// The matmul arguments are invalid.
    #[error("Invalid matmul arguments: {reason}")]
    InvalidArgs { reason: String },
}

/// A compute engine exposing an accelerated matrix multiplication.
///
/// Engines receive operands as they were fed, together with the transform flags
/// of the [graph](MatmulGraph), and must interpret those flags themselves.
pub trait MatmulEngine {
    /// Human-readable engine name.
    fn name(&self) -> &str;

    fn properties(&self) -> &EngineProperties;

    /// Whether the accelerated path supports low-precision multiply and convolution.
    fn supports_low_precision_matmul(&self) -> bool {
        self.properties().feature_enabled(Feature::LowPrecisionMatmul)
    }

    /// Executes the matmul described by `graph`, binding placeholders from `feed`.
    fn execute<E: OracleElement>(
        &self,
        graph: &MatmulGraph<E>,
        feed: &Feed<E>,
        target: ExecutionTarget,
    ) -> Result<Matrix<E>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_set_registration() {
        let mut properties = EngineProperties::new(&[Feature::Accelerated]);

        assert!(properties.feature_enabled(Feature::Accelerated));
        assert!(!properties.feature_enabled(Feature::LowPrecisionMatmul));

        assert!(properties.register_feature(Feature::LowPrecisionMatmul));
        assert!(!properties.register_feature(Feature::LowPrecisionMatmul));
        assert!(properties.unregister_feature(Feature::Accelerated));

        assert_eq!(
            properties.features().collect::<Vec<_>>(),
            vec![Feature::LowPrecisionMatmul]
        );
    }

    #[test]
    fn engine_error_display() {
        let err = EngineError::MissingFeed {
            ident: MatmulIdent::Rhs,
        };
        assert_eq!(err.to_string(), "No value fed for the rhs placeholder");
    }
}

use derive_new::new;
use gemm_oracle::{
    EngineError, EngineProperties, ExecutionTarget, Feature, Feed, MatmulEngine, MatmulGraph,
    Matrix, OracleElement, PrecisionClass,
};

use crate::{StridedView, matmul_naive, matmul_strided};

/// Matmul engine running on the host.
///
/// The accelerator path reads operands through [strided views](StridedView), the host
/// path materializes the transforms and runs a naive loop.
#[derive(new, Clone, Debug)]
pub struct HostEngine {
    name: String,
    properties: EngineProperties,
}

impl Default for HostEngine {
    fn default() -> Self {
        Self::accelerated()
    }
}

impl HostEngine {
    /// Accelerated engine supporting every element type.
    pub fn accelerated() -> Self {
        Self::new(
            "host-accelerated".into(),
            EngineProperties::new(&[
                Feature::Accelerated,
                Feature::LowPrecisionMatmul,
                Feature::ComplexMatmul,
            ]),
        )
    }

    /// Accelerated engine without low-precision support.
    pub fn without_low_precision() -> Self {
        Self::new(
            "host-accelerated-no-half".into(),
            EngineProperties::new(&[Feature::Accelerated, Feature::ComplexMatmul]),
        )
    }

    /// Engine without any accelerator.
    pub fn host_only() -> Self {
        Self::new("host".into(), EngineProperties::default())
    }

    pub fn properties_mut(&mut self) -> &mut EngineProperties {
        &mut self.properties
    }

    fn check_accelerator<E: OracleElement>(&self) -> Result<(), EngineError> {
        let unavailable = |reason: &str| EngineError::Unavailable {
            target: ExecutionTarget::Accelerator,
            elem: E::KIND,
            reason: reason.to_string(),
        };

        if !self.properties.feature_enabled(Feature::Accelerated) {
            return Err(unavailable("no accelerator"));
        }
        if E::KIND.precision() == PrecisionClass::Low && !self.supports_low_precision_matmul() {
            return Err(unavailable("low-precision matmul isn't supported"));
        }
        if E::KIND.is_complex() && !self.properties.feature_enabled(Feature::ComplexMatmul) {
            return Err(unavailable("complex matmul isn't supported"));
        }

        Ok(())
    }
}

impl MatmulEngine for HostEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn properties(&self) -> &EngineProperties {
        &self.properties
    }

    fn execute<E: OracleElement>(
        &self,
        graph: &MatmulGraph<E>,
        feed: &Feed<E>,
        target: ExecutionTarget,
    ) -> Result<Matrix<E>, EngineError> {
        if target == ExecutionTarget::Accelerator {
            self.check_accelerator::<E>()?;
        }

        let bound = graph.bind(feed)?;
        log::debug!(
            "{}: {} matmul {} on {target:?}, lhs={:?}, rhs={:?}",
            self.name,
            E::KIND,
            bound.out_shape,
            bound.lhs_transform,
            bound.rhs_transform,
        );

        let out = match target {
            ExecutionTarget::Accelerator => matmul_strided(
                &StridedView::new(bound.lhs, bound.lhs_transform),
                &StridedView::new(bound.rhs, bound.rhs_transform),
            ),
            ExecutionTarget::Host => matmul_naive(
                &bound.lhs_transform.apply(bound.lhs),
                &bound.rhs_transform.apply(bound.rhs),
            ),
        };

        Ok(out)
    }
}

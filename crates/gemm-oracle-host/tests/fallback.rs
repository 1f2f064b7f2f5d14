//! Generated suite on an accelerator without low-precision support, where half
//! cases run on the host fallback.

use gemm_oracle::{
    EngineError, EngineProperties, ExecutionTarget, Feed, MatmulEngine, MatmulGraph, Matrix,
    OracleElement,
};
use gemm_oracle_host::HostEngine;
use half::{bf16, f16};

struct NoHalfEngine(HostEngine);

impl Default for NoHalfEngine {
    fn default() -> Self {
        Self(HostEngine::without_low_precision())
    }
}

impl MatmulEngine for NoHalfEngine {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn properties(&self) -> &EngineProperties {
        self.0.properties()
    }

    fn execute<E: OracleElement>(
        &self,
        graph: &MatmulGraph<E>,
        feed: &Feed<E>,
        target: ExecutionTarget,
    ) -> Result<Matrix<E>, EngineError> {
        self.0.execute(graph, feed, target)
    }
}

type TestEngine = NoHalfEngine;

gemm_oracle::testgen_matmul_oracle!(float16: f16, bfloat16: bf16);

//! Host implementation of [gemm_oracle::MatmulEngine].

mod engine;
mod kernel;
mod layout;

pub use engine::*;
pub use kernel::*;
pub use layout::*;

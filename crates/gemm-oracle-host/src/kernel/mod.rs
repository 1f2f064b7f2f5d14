mod naive;
mod strided;

pub use naive::*;
pub use strided::*;

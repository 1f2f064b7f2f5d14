//! Correctness oracle for accelerated matrix multiplication.
//!
//! A [MatmulEngine] is asked to multiply two operands, each optionally transposed
//! or adjoint, with either constant (static-shape) or placeholder (dynamic-shape)
//! inputs. Its output is compared to a naive host reference within a tolerance
//! that depends on the element precision.

mod case;
mod config;
mod element;
mod engine;
mod error;
mod graph;
mod logger;
mod matrix;
mod reference;
mod report;
mod runner;
mod suite;
mod tolerance;
mod transform;

pub use case::*;
pub use config::*;
pub use element::*;
pub use engine::*;
pub use error::*;
pub use graph::*;
pub use logger::*;
pub use matrix::*;
pub use reference::*;
pub use report::*;
pub use runner::*;
pub use suite::*;
pub use tolerance::*;
pub use transform::*;

#[cfg(feature = "export_tests")]
pub mod tests;

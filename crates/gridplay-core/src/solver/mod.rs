//! Dense linear system backends.
//!
//! The DC flow solver only needs `A·x = b` for small, dense, symmetric systems, so the
//! backends take plain row-major `Vec<Vec<f64>>` matrices.

pub mod backend;
pub mod registry;

pub use backend::{FaerSolver, GaussSolver, LinearSystemBackend, LinearSystemError, PIVOT_TOLERANCE};
pub use registry::SolverKind;

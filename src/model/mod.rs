//! Model definition: parameters, closure and equilibrium equations
//!
//! This is the WHAT side of the crate. Solvers in [`crate::solver`] decide
//! HOW the equations are discretized and iterated.
//!
//! - [`problem`]: validated parameter snapshot and its builder
//! - [`closure`]: the second-order closure `T(x, y)`
//! - [`equation`]: first-moment balance and the pointwise fixed-point map

pub mod closure;
pub mod equation;
pub mod problem;

pub use closure::Closure;
pub use equation::{EquilibriumEquation, PointTerms};
pub use problem::{Method, Problem, ProblemBuilder, Radius};

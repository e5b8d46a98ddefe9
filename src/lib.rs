//! moment-rs: equilibrium second spatial moment of the Dieckmann-Law model
//!
//! Solves the pair equation of the single-species spatial logistic model
//! (birth rate `b`, competitive death rate `s`, environmental death rate `d`,
//! dispersal kernel `m`, competition kernel `w`) closed at second order, and
//! returns the equilibrium density `N` together with the second moment `C(x)`
//! on a radial grid.
//!
//! # Architecture
//!
//! 1. **Model** ([`model`], [`kernels`]): what is solved
//!    - kernel laws and their Hankel transforms
//!    - closure weights and the rearranged equilibrium equation
//!    - the validated [`Problem`](model::Problem)
//!
//! 2. **Numerics** ([`solver`], [`radial`]): how it is solved
//!    - direct, FFT and Hankel discretizations of the radial convolutions
//!    - fixed-point and Nystrom solvers behind the [`Solver`](solver::Solver) trait
//!
//! # Quick Start
//!
//! ```rust
//! use moment_rs::prelude::*;
//!
//! let problem = Problem::builder()
//!     .rates(1.0, 0.1, 0.1)
//!     .kernels(KernelShape::Normal { sigma_m: 1.0, sigma_w: 1.0 })
//!     .radius(Radius::Fixed(10.0))
//!     .nodes(128)
//!     .build()?;
//!
//! let result = SolverKind::for_problem(&problem).solve(&problem)?;
//! println!("First moment: {:.6}", result.n);
//! println!("C(0) = {:.6}", result.c0());
//! # Ok::<(), ModelError>(())
//! ```
//!
//! # Modules
//!
//! - [`kernels`]: dispersal and competition kernels
//! - [`model`]: problem configuration, closure and equation
//! - [`solver`]: numerical solvers
//! - [`radial`]: special functions and radial quadrature
//! - [`output`]: vector dump
//! - [`cli`]: command-line parsing

pub mod cli;
pub mod error;
pub mod kernels;
pub mod model;
pub mod output;
pub mod radial;
pub mod solver;

pub use error::ModelError;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use moment_rs::prelude::*;
    //! ```
    pub use crate::error::ModelError;
    pub use crate::kernels::{KernelKind, KernelSet, KernelShape};
    pub use crate::model::{Closure, Method, Problem, Radius};
    pub use crate::solver::{EquilibriumResult, Solver, SolverKind};
}

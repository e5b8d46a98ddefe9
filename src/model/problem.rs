//! Problem configuration
//!
//! A [`Problem`] is the immutable, validated snapshot of everything a solver
//! needs. It is only obtainable through [`ProblemBuilder::build`], so an
//! invalid problem never reaches a solver.
//!
//! # Example
//!
//! ```rust
//! use moment_rs::kernels::KernelShape;
//! use moment_rs::model::{Method, Problem, Radius};
//!
//! let problem = Problem::builder()
//!     .rates(1.0, 0.1, 0.1)
//!     .kernels(KernelShape::Normal { sigma_m: 1.0, sigma_w: 1.0 })
//!     .radius(Radius::Fixed(10.0))
//!     .nodes(50)
//!     .method(Method::Nystrom)
//!     .build()?;
//!
//! assert_eq!(problem.step(), 0.2);
//! # Ok::<(), moment_rs::ModelError>(())
//! ```

use super::closure::Closure;
use crate::error::ModelError;
use crate::kernels::{KernelKind, KernelSet, KernelShape};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Auto radius is this many effective kernel radii.
const AUTO_RADIUS_FACTOR: f64 = 3.0;

// =================================================================================================
// Method / Radius
// =================================================================================================

/// Solving method requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Nonlinear fixed point, evaluated through the fast transform.
    Neuman,
    /// Fixed point under the asymmetric linear closure.
    LinearNeuman,
    /// Direct Nystrom solve under the asymmetric linear closure.
    Nystrom,
    /// Nonlinear fixed point with direct quadrature convolutions.
    DirectNeuman,
}

impl Method {
    /// Command-line spelling.
    pub fn name(&self) -> &'static str {
        match self {
            Method::Neuman => "neuman",
            Method::LinearNeuman => "lneuman",
            Method::Nystrom => "nystrom",
            Method::DirectNeuman => "dneuman",
        }
    }

    /// True for the methods that force the asymmetric closure.
    pub fn is_linear(&self) -> bool {
        matches!(self, Method::LinearNeuman | Method::Nystrom)
    }
}

impl FromStr for Method {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "neuman" => Ok(Method::Neuman),
            "lneuman" => Ok(Method::LinearNeuman),
            "nystrom" => Ok(Method::Nystrom),
            "dneuman" => Ok(Method::DirectNeuman),
            other => Err(ModelError::Parse(format!("unknown method '{other}'"))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Domain radius, explicit or derived from the kernels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Radius {
    /// Three times the larger effective kernel radius.
    #[default]
    Auto,
    Fixed(f64),
}

// =================================================================================================
// Problem
// =================================================================================================

/// Validated parameters of one equilibrium computation.
#[derive(Debug, Clone)]
pub struct Problem {
    birth_rate: f64,
    death_rate: f64,
    environmental_death_rate: f64,
    closure: Closure,
    radius: f64,
    dimension: usize,
    nodes: usize,
    iterations: usize,
    accuracy: usize,
    kernels: KernelSet,
    method: Option<Method>,
    path: Option<PathBuf>,
}

impl Problem {
    pub fn builder() -> ProblemBuilder {
        ProblemBuilder::default()
    }

    /// Species birth rate `b`.
    pub fn birth_rate(&self) -> f64 {
        self.birth_rate
    }

    /// Competitive death rate `s`.
    pub fn death_rate(&self) -> f64 {
        self.death_rate
    }

    /// Environmental death rate `d`.
    pub fn environmental_death_rate(&self) -> f64 {
        self.environmental_death_rate
    }

    pub fn closure(&self) -> &Closure {
        &self.closure
    }

    /// Domain radius `R`.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Grid node count `n`.
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    /// Iteration ceiling of the fixed-point solvers.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Requested accuracy in decimal places.
    pub fn accuracy(&self) -> usize {
        self.accuracy
    }

    pub fn kernels(&self) -> &KernelSet {
        &self.kernels
    }

    pub fn method(&self) -> Option<Method> {
        self.method
    }

    /// Where to dump the second moment, if anywhere.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Grid spacing `R / n`.
    pub fn step(&self) -> f64 {
        self.radius / self.nodes as f64
    }

    /// Relative change below which the fixed point is considered converged.
    pub fn tolerance(&self) -> f64 {
        10f64.powi(-(self.accuracy as i32))
    }

    /// Copy of this problem with a different method.
    pub fn with_method(&self, method: Option<Method>) -> Self {
        Self {
            method,
            ..self.clone()
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kernels)?;
        writeln!(f, "R = {:.5}, nodes = {}, step = {:.5}", self.radius, self.nodes, self.step())?;
        writeln!(
            f,
            "b = {:.5}, s = {:.5}, d = {:.5}",
            self.birth_rate, self.death_rate, self.environmental_death_rate
        )?;
        writeln!(
            f,
            "alpha = {:.5}, beta = {:.5}, gamma = {:.5}",
            self.closure.alpha, self.closure.beta, self.closure.gamma
        )?;
        write!(
            f,
            "dimension = {}, iterations = {}, accuracy = {}, method = {}",
            self.dimension,
            self.iterations,
            self.accuracy,
            self.method.map_or("default", |m| m.name())
        )?;
        if let Some(path) = &self.path {
            write!(f, ", path = '{}'", path.display())?;
        }
        Ok(())
    }
}

// =================================================================================================
// Builder
// =================================================================================================

/// Builder for [`Problem`] with the command-line defaults.
#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    birth_rate: f64,
    death_rate: f64,
    environmental_death_rate: f64,
    closure: Closure,
    radius: Radius,
    dimension: usize,
    nodes: usize,
    iterations: usize,
    accuracy: usize,
    kernels: KernelShape,
    method: Option<Method>,
    path: Option<PathBuf>,
}

impl Default for ProblemBuilder {
    fn default() -> Self {
        Self {
            birth_rate: 1.0,
            death_rate: 1.0,
            environmental_death_rate: 0.0,
            closure: Closure::default(),
            radius: Radius::Auto,
            dimension: 1,
            nodes: 256,
            iterations: 500,
            accuracy: 6,
            kernels: KernelShape::default(),
            method: None,
            path: None,
        }
    }
}

impl ProblemBuilder {
    /// Birth rate `b`, competitive death rate `s`, environmental death rate `d`.
    pub fn rates(mut self, birth: f64, death: f64, environmental_death: f64) -> Self {
        self.birth_rate = birth;
        self.death_rate = death;
        self.environmental_death_rate = environmental_death;
        self
    }

    pub fn birth_rate(mut self, birth: f64) -> Self {
        self.birth_rate = birth;
        self
    }

    pub fn death_rate(mut self, death: f64) -> Self {
        self.death_rate = death;
        self
    }

    pub fn environmental_death_rate(mut self, environmental_death: f64) -> Self {
        self.environmental_death_rate = environmental_death;
        self
    }

    pub fn closure(mut self, closure: Closure) -> Self {
        self.closure = closure;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.closure.alpha = alpha;
        self
    }

    pub fn beta(mut self, beta: f64) -> Self {
        self.closure.beta = beta;
        self
    }

    pub fn gamma(mut self, gamma: f64) -> Self {
        self.closure.gamma = gamma;
        self
    }

    pub fn radius(mut self, radius: Radius) -> Self {
        self.radius = radius;
        self
    }

    pub fn dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn nodes(mut self, nodes: usize) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn accuracy(mut self, accuracy: usize) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn kernels(mut self, kernels: KernelShape) -> Self {
        self.kernels = kernels;
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Check the parameters without building.
    pub fn validate(&self) -> Result<(), ModelError> {
        let b = self.birth_rate;
        let s = self.death_rate;
        let d = self.environmental_death_rate;

        if !b.is_finite() || b <= 0.0 {
            return Err(ModelError::parameter("birth_rate", format!("{b} must be positive")));
        }
        if !s.is_finite() || s <= 0.0 {
            return Err(ModelError::parameter("death_rate", format!("{s} must be positive")));
        }
        if !d.is_finite() || d < 0.0 {
            return Err(ModelError::parameter(
                "environmental_death_rate",
                format!("{d} must be non-negative"),
            ));
        }
        if b <= d {
            return Err(ModelError::parameter(
                "birth_rate",
                format!("{b} must exceed the environmental death rate {d} for a living population"),
            ));
        }

        self.closure.validate()?;

        if self.dimension == 0 {
            return Err(ModelError::parameter("dimension", "must be at least 1"));
        }
        if self.nodes < 2 {
            return Err(ModelError::parameter("nodes", format!("{} nodes cannot carry a grid", self.nodes)));
        }
        if self.iterations == 0 {
            return Err(ModelError::parameter("iterations", "must be at least 1"));
        }
        if !(1..=15).contains(&self.accuracy) {
            return Err(ModelError::parameter(
                "accuracy",
                format!("{} decimal places is outside 1..=15", self.accuracy),
            ));
        }
        if let Radius::Fixed(radius) = self.radius
            && (!radius.is_finite() || radius <= 0.0)
        {
            return Err(ModelError::parameter("radius", format!("{radius} must be positive")));
        }

        self.kernels.validate()
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<Problem, ModelError> {
        self.validate()?;

        let kernels = KernelSet::new(self.kernels, self.dimension)?;
        let radius = match self.radius {
            Radius::Fixed(radius) => radius,
            Radius::Auto => {
                let support = kernels
                    .effective_radius(KernelKind::Birth)
                    .max(kernels.effective_radius(KernelKind::Death));
                AUTO_RADIUS_FACTOR * support
            }
        };

        let spread = kernels
            .spread(KernelKind::Birth)
            .min(kernels.spread(KernelKind::Death));
        let step = radius / self.nodes as f64;
        if step > spread {
            let needed = (radius / spread).ceil();
            return Err(ModelError::parameter(
                "nodes",
                format!(
                    "step {step:.5} is wider than the kernel spread {spread:.5}; \
                     R = {radius:.5} needs at least {needed} nodes"
                ),
            ));
        }

        Ok(Problem {
            birth_rate: self.birth_rate,
            death_rate: self.death_rate,
            environmental_death_rate: self.environmental_death_rate,
            closure: self.closure,
            radius,
            dimension: self.dimension,
            nodes: self.nodes,
            iterations: self.iterations,
            accuracy: self.accuracy,
            kernels,
            method: self.method,
            path: self.path,
        })
    }
}

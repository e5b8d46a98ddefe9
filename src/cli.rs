//! Command-line front end
//!
//! Flags follow the historical single-dash layout of the solver: every flag
//! is one letter followed by its value(s) as separate arguments, except the
//! kernel flag whose shape letter is glued to it (`-kn 1 1`, `-kr 1 2 1 2`).
//!
//! ```text
//! moment -kn 1 0.5 -b 1 -s 0.1 -d 0.1 -D 3 -n 512 -r n -p c.dat
//! ```

use crate::error::ModelError;
use crate::kernels::KernelShape;
use crate::model::{Problem, ProblemBuilder, Radius};
use std::str::FromStr;

/// Help text printed by `-h`.
pub const REFERENCE: &str = "\
EQUILIBRIUM EQUATION SOLVER

Solves the integral equation for the second spatial moment of the
Dieckmann-Law single-species model in the equilibrium state.
The third moment is replaced by the second order closure

              1   C(x)C(y)    C(x)C(y-x)    C(y)C(y-x)
    T(x, y) =---(A-------- + B---------- + G---------- - BN^3)
             A+B     N            N             N

where A, B and G are the alpha, beta and gamma parameters.
Arguments:
-k*   - kernel type, where * is one of the letters:
    n - normal kernels
    k - kurtic kernels with m(x) = w(x)
    K - general kurtic kernels
    e - exponential (Danchenko) kernels
    r - Roughgarden kernels
    p - exponential polynomial kernels
    c - constant kernels
    The kernel type is followed by its parameters:
      + birth and death standard deviation for normal kernels
      + s0 and s1 for kurtic kernels
      + s0m, s1m, s0w and s1w for general kurtic kernels
      + A and B for exponential kernels
      + sm, gamma_m, sw and gamma_w for Roughgarden kernels
      + am, bm, aw and bw for exponential polynomial kernels
      + birth and death radius for constant kernels
-A - alpha parameter of the closure
-B - beta parameter of the closure
-G - gamma parameter of the closure
-m - solving method, one of:
         neuman  - nonlinear Neuman iteration with FFT convolutions (default)
         dneuman - nonlinear Neuman iteration with direct quadrature
         lneuman - Neuman iteration for the linear case (LINEAR)
         nystrom - Nystrom method (LINEAR)
     LINEAR methods ignore A, B and G and use the asymmetric closure
     (A = 1, B = G = 0), which makes the equation linear. Methods other
     than neuman are only available in 1D and 3D.
-d - environmental death rate
-b - birth rate
-s - competitive death rate
-r - domain radius ('n' to compute it from the kernels)
-D - dimension of space
-i - iteration ceiling
-n - grid node count
-p - path of the data file ('n' to skip writing)
-e - accuracy in decimal places
-h - show this help
";

/// Outcome of a successful parse.
#[derive(Debug, Clone)]
pub enum Invocation {
    /// Solve this problem.
    Solve(Problem),
    /// Print [`REFERENCE`] and exit.
    Help,
}

/// Parse the arguments following the program name.
///
/// # Example
///
/// ```rust
/// use moment_rs::cli::{parse_args, Invocation};
///
/// let invocation = parse_args(["-kn", "1", "2", "-D", "3", "-n", "64"])?;
/// let Invocation::Solve(problem) = invocation else { unreachable!() };
/// assert_eq!(problem.dimension(), 3);
/// # Ok::<(), moment_rs::ModelError>(())
/// ```
pub fn parse_args<I, S>(args: I) -> Result<Invocation, ModelError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args: Vec<S> = args.into_iter().collect();
    let mut tokens = args.iter().map(|arg| arg.as_ref());
    let mut builder = Problem::builder();

    while let Some(flag) = tokens.next() {
        let Some(name) = flag.strip_prefix('-') else {
            return Err(ModelError::Parse(format!("unexpected argument '{flag}'")));
        };

        builder = match name {
            "h" => return Ok(Invocation::Help),
            "A" => builder.alpha(number(&mut tokens, flag)?),
            "B" => builder.beta(number(&mut tokens, flag)?),
            "G" => builder.gamma(number(&mut tokens, flag)?),
            "b" => builder.birth_rate(number(&mut tokens, flag)?),
            "s" => builder.death_rate(number(&mut tokens, flag)?),
            "d" => builder.environmental_death_rate(number(&mut tokens, flag)?),
            "D" => builder.dimension(number(&mut tokens, flag)?),
            "i" => builder.iterations(number(&mut tokens, flag)?),
            "n" => builder.nodes(number(&mut tokens, flag)?),
            "e" => builder.accuracy(number(&mut tokens, flag)?),
            "m" => builder.method(number(&mut tokens, flag)?),
            "r" => match value(&mut tokens, flag)? {
                "n" => builder.radius(Radius::Auto),
                radius => builder.radius(Radius::Fixed(parse(radius, flag)?)),
            },
            "p" => match value(&mut tokens, flag)? {
                "n" => builder,
                path => builder.path(path),
            },
            _ => match name.strip_prefix('k') {
                Some(shape) => builder.kernels(kernel(shape, &mut tokens, flag)?),
                None => return Err(ModelError::Parse(format!("unknown flag '{flag}'"))),
            },
        };
    }

    finish(builder)
}

fn finish(builder: ProblemBuilder) -> Result<Invocation, ModelError> {
    let problem = builder.build()?;
    log::info!("parsed problem:\n{problem}");
    Ok(Invocation::Solve(problem))
}

fn kernel<'a>(
    shape: &str,
    tokens: &mut impl Iterator<Item = &'a str>,
    flag: &str,
) -> Result<KernelShape, ModelError> {
    let mut next = || -> Result<f64, ModelError> { number(&mut *tokens, flag) };
    let kernel = match shape {
        "n" => KernelShape::Normal { sigma_m: next()?, sigma_w: next()? },
        "k" => KernelShape::Kurtic { s0: next()?, s1: next()? },
        "K" => KernelShape::GeneralKurtic {
            s0m: next()?,
            s1m: next()?,
            s0w: next()?,
            s1w: next()?,
        },
        "e" => KernelShape::Exponential { a: next()?, b: next()? },
        "r" => KernelShape::Roughgarden {
            sm: next()?,
            gamma_m: next()?,
            sw: next()?,
            gamma_w: next()?,
        },
        "p" => KernelShape::ExponentialPolynomial {
            am: next()?,
            bm: next()?,
            aw: next()?,
            bw: next()?,
        },
        "c" => KernelShape::Constant { birth_radius: next()?, death_radius: next()? },
        "" => return Err(ModelError::Parse("missing kernel type after '-k'".to_string())),
        other => return Err(ModelError::Parse(format!("unknown kernel type '{other}'"))),
    };
    Ok(kernel)
}

fn value<'a>(tokens: &mut impl Iterator<Item = &'a str>, flag: &str) -> Result<&'a str, ModelError> {
    tokens
        .next()
        .ok_or_else(|| ModelError::Parse(format!("missing value after '{flag}'")))
}

fn number<'a, T: FromStr>(tokens: &mut impl Iterator<Item = &'a str>, flag: &str) -> Result<T, ModelError> {
    let raw = value(tokens, flag)?;
    parse(raw, flag)
}

fn parse<T: FromStr>(raw: &str, flag: &str) -> Result<T, ModelError> {
    raw.parse()
        .map_err(|_| ModelError::Parse(format!("invalid value '{raw}' for '{flag}'")))
}

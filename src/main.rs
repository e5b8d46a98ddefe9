//! `moment` command-line solver.

use moment_rs::cli::{self, Invocation};
use moment_rs::output;
use moment_rs::solver::{Solver, SolverKind};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "moment".to_string());

    let problem = match cli::parse_args(args) {
        Ok(Invocation::Solve(problem)) => problem,
        Ok(Invocation::Help) => {
            println!("{}", cli::REFERENCE);
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("{err}");
            println!("\nRun \"{program} -h\" to get reference");
            return ExitCode::FAILURE;
        }
    };

    let solver = SolverKind::for_problem(&problem);
    let result = match solver.solve(&problem) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("{} failed: {err}", solver.name());
            return ExitCode::FAILURE;
        }
    };

    let precision = problem.accuracy();
    println!("First moment: {:.precision$}", result.n);
    println!("C(0) = {:.precision$}", result.c0());

    if let Some(path) = problem.path()
        && let Err(err) = output::store_vector(
            result.c.as_slice(),
            path,
            result.len(),
            result.step,
            result.origin,
            precision,
        )
    {
        eprintln!("cannot store '{}': {err}", path.display());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

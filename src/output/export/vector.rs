//! Flat vector dump of a radial profile
//!
//! Each grid node becomes one line `origin + i*step <separator> value`, both
//! printed with the configured number of decimals. No column header is
//! written, so the file loads directly into gnuplot or `numpy.loadtxt`.
//!
//! # Example
//!
//! ```rust,ignore
//! use moment_rs::output::export::{store_vector, store_vector_with, VectorConfig, VectorMetadata};
//!
//! store_vector(&[1.2, 1.1, 1.0], "c.dat", 3, 0.5, 0.0, 4)?;
//! ```
//!
//! **Output** (`c.dat`):
//! ```text
//! 0.0000 1.2000
//! 0.5000 1.1000
//! 1.0000 1.0000
//! ```
//!
//! With metadata enabled the data lines are preceded by a `#` block:
//!
//! ```text
//! # Equilibrium second moment
//! # Generated: 2026-02-11T15:30:00+00:00
//! # Solver: Transform
//! # First moment: 0.998113
//! #
//! ```

use crate::error::ModelError;
use crate::solver::EquilibriumResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// =============================================================================
// Configuration Structures
// =============================================================================

/// Configuration of the vector dump.
#[derive(Debug, Clone)]
pub struct VectorConfig {
    /// Number of decimal places (default: 6)
    pub precision: usize,

    /// Column separator (default: ' ')
    pub separator: char,

    /// Write the `#` header block (default: false)
    pub include_metadata: bool,

    /// Header content
    pub metadata: Option<VectorMetadata>,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            precision: 6,
            separator: ' ',
            include_metadata: false,
            metadata: None,
        }
    }
}

impl VectorConfig {
    /// Builder pattern: set precision
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Builder pattern: set separator
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Builder pattern: enable metadata
    pub fn with_metadata(mut self, metadata: VectorMetadata) -> Self {
        self.include_metadata = true;
        self.metadata = Some(metadata);
        self
    }
}

/// Header comments of a vector dump. Only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct VectorMetadata {
    pub solver_name: Option<String>,
    pub first_moment: Option<f64>,
    pub iterations: Option<usize>,
    pub custom: Vec<(String, String)>,
}

impl VectorMetadata {
    /// Header describing a solver result.
    pub fn from_result(result: &EquilibriumResult) -> Self {
        let mut custom: Vec<(String, String)> = result
            .metadata
            .iter()
            .filter(|(key, _)| key.as_str() != "solver")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        custom.sort();

        Self {
            solver_name: result.metadata.get("solver").cloned(),
            first_moment: Some(result.n),
            iterations: Some(result.iterations),
            custom,
        }
    }

    /// Add custom parameter
    pub fn add_custom(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.custom.push((key.into(), value.into()));
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn write_metadata_header(out: &mut impl Write, metadata: &VectorMetadata) -> Result<(), ModelError> {
    writeln!(out, "# Equilibrium second moment")?;
    writeln!(out, "# Generated: {}", chrono::Utc::now().to_rfc3339())?;

    if let Some(solver) = &metadata.solver_name {
        writeln!(out, "# Solver: {solver}")?;
    }
    if let Some(n) = metadata.first_moment {
        writeln!(out, "# First moment: {n}")?;
    }
    if let Some(iterations) = metadata.iterations {
        writeln!(out, "# Iterations: {iterations}")?;
    }
    for (key, value) in &metadata.custom {
        writeln!(out, "# {key}: {value}")?;
    }

    writeln!(out, "#")?;
    Ok(())
}

fn validate_layout(values: &[f64], nodes: usize, step: f64, origin: f64) -> Result<(), ModelError> {
    if nodes > values.len() {
        return Err(ModelError::parameter(
            "nodes",
            format!("{nodes} nodes requested but the vector holds {}", values.len()),
        ));
    }
    if !step.is_finite() || !origin.is_finite() {
        return Err(ModelError::parameter("step", "grid step and origin must be finite"));
    }
    Ok(())
}

fn write_vector(
    out: &mut impl Write,
    values: &[f64],
    nodes: usize,
    step: f64,
    origin: f64,
    config: &VectorConfig,
) -> Result<(), ModelError> {
    if config.include_metadata
        && let Some(metadata) = &config.metadata
    {
        write_metadata_header(out, metadata)?;
    }

    let precision = config.precision;
    for (i, value) in values.iter().take(nodes).enumerate() {
        let position = origin + i as f64 * step;
        writeln!(
            out,
            "{position:.precision$}{}{value:.precision$}",
            config.separator
        )?;
    }
    out.flush()?;
    Ok(())
}

// =============================================================================
// Export Functions
// =============================================================================

/// Write the first `nodes` entries of `values` as `(origin + i*step, value)`
/// pairs with `precision` decimals.
///
/// # Errors
///
/// - `InvalidParameter` when `nodes` exceeds the vector length
/// - `Io` when the file cannot be created or written
pub fn store_vector(
    values: &[f64],
    path: impl AsRef<Path>,
    nodes: usize,
    step: f64,
    origin: f64,
    precision: usize,
) -> Result<(), ModelError> {
    let config = VectorConfig::default().precision(precision);
    store_vector_with(values, path, nodes, step, origin, &config)
}

/// [`store_vector`] with an explicit configuration.
pub fn store_vector_with(
    values: &[f64],
    path: impl AsRef<Path>,
    nodes: usize,
    step: f64,
    origin: f64,
    config: &VectorConfig,
) -> Result<(), ModelError> {
    let path = path.as_ref();
    validate_layout(values, nodes, step, origin)?;
    let mut out = BufWriter::new(File::create(path)?);
    write_vector(&mut out, values, nodes, step, origin, config)?;
    log::info!("stored {nodes} values to {}", path.display());
    Ok(())
}

/// Dump the second moment of `result` on its own grid.
pub fn store_result(
    result: &EquilibriumResult,
    path: impl AsRef<Path>,
    config: &VectorConfig,
) -> Result<(), ModelError> {
    store_vector_with(
        result.c.as_slice(),
        path,
        result.len(),
        result.step,
        result.origin,
        config,
    )
}

// =================================================================================================
// Tests
// =================================================================================================

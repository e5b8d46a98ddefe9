//! Output of equilibrium results
//!
//! The only persistent format is a flat vector dump: one `position value`
//! pair per grid node, see [`export::vector`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use moment_rs::output::store_vector;
//!
//! store_vector(&result.c, "c.dat", result.len(), result.step, result.origin, 6)?;
//! ```

pub mod export;

pub use export::{VectorConfig, VectorMetadata, store_result, store_vector, store_vector_with};

//! Export of computed moment vectors.
//!
//! | Format      | Module       |
//! |-------------|--------------|
//! | Vector dump | [`vector`]   |

pub mod vector;

pub use vector::{VectorConfig, VectorMetadata, store_result, store_vector, store_vector_with};

//! Test-case genotypes
//!
//! This module provides the gene tree representation of a test case and the
//! primitive value domains its leaves draw from.

pub mod gene;
pub mod ids;
pub mod primitive;

pub mod prelude {
    pub use super::gene::*;
    pub use super::ids::*;
    pub use super::primitive::*;
}

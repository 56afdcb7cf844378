//! Population management
//!
//! This module provides individuals and the MOSA coverage archive.

pub mod archive;
pub mod individual;

pub mod prelude {
    pub use super::archive::*;
    pub use super::individual::*;
}

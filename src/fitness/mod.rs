//! Coverage-driven fitness
//!
//! This module provides objectives, the CFG distance model, branch distance
//! and the evaluator that turns runner feedback into per-objective fitness.

pub mod branch_distance;
pub mod cfg;
pub mod evaluator;
pub mod objective;

pub mod prelude {
    pub use super::branch_distance::*;
    pub use super::cfg::*;
    pub use super::evaluator::*;
    pub use super::objective::*;
}

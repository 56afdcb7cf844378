//! Search algorithms
//!
//! This module provides the ranking routines, the generational GA covering
//! SimpleGA, NSGA2 and MOSA, the MultiGA wrapper and the run loop.

pub mod genetic_algorithm;
pub mod mosa;
pub mod multi_ga;
pub mod nsga2;
pub mod search;

pub mod prelude {
    pub use super::genetic_algorithm::*;
    pub use super::mosa::*;
    pub use super::multi_ga::*;
    pub use super::nsga2::*;
    pub use super::search::*;
}

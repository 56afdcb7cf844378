//! # evo-testgen
//!
//! Search-based test-case generation for Rust.
//!
//! Test cases are trees of calls and literal values. A population of them is
//! evolved toward branch coverage of a target program, scored by approach
//! level plus branch distance over the program's control-flow graph.
//!
//! ## Core Concepts
//!
//! - **Tree Genotypes**: a test case is a sequence of calls whose arguments are
//!   nested calls or primitive values
//! - **Coverage Objectives**: every branch outcome is its own objective, ranked
//!   with NSGA-II or the many-objective MOSA sorting
//! - **Reproducibility**: one injected random generator drives every decision,
//!   so a seed fixes the whole run
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use evo_testgen::prelude::*;
//! use rand::SeedableRng;
//!
//! let config = SearchConfig::default().with_algorithm(Algorithm::Mosa);
//! let sampler = ApiSampler::new(model, config.clone());
//! let evaluator = FitnessEvaluator::new(&cfg, my_runner)?;
//! let rng = rand::rngs::StdRng::seed_from_u64(42);
//! let mut ctx = SearchContext::new(sampler, evaluator, rng);
//!
//! let mut search = GeneticAlgorithm::new(&config, objectives)?;
//! let result = run(&mut search, &mut ctx, &MaxGenerations::new(100))?;
//! println!("{}", result.stats.summary());
//! ```

pub mod algorithms;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fitness;
pub mod genome;
pub mod operators;
pub mod population;
pub mod sampling;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::config::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::genome::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::sampling::prelude::*;
    pub use crate::termination::*;
}

//! Sampler trait
//!
//! A sampler produces fresh genes and individuals consistent with the API of
//! the program under test. Mutation and initialisation consume it.

use rand::Rng;

use crate::error::EvoResult;
use crate::genome::gene::{Gene, GeneKind};
use crate::population::individual::{Individual, IndividualId};

/// Factory for random genes and individuals
pub trait Sampler {
    /// Sample a complete random test case
    fn sample_individual<R: Rng>(&mut self, rng: &mut R) -> EvoResult<Individual>;

    /// Sample a gene of the given type and kind with a fresh id
    fn sample_gene<R: Rng>(
        &mut self,
        depth: usize,
        semantic_type: &str,
        kind: GeneKind,
        rng: &mut R,
    ) -> EvoResult<Gene>;

    /// Sample a call to an action producing `return_type`
    fn sample_function_call<R: Rng>(
        &mut self,
        depth: usize,
        return_type: &str,
        rng: &mut R,
    ) -> EvoResult<Gene>;

    /// Sample an argument of the given type
    ///
    /// Implementations fall back to a plain value once `depth` reaches the
    /// configured maximum depth.
    fn sample_argument<R: Rng>(
        &mut self,
        depth: usize,
        semantic_type: &str,
        rng: &mut R,
    ) -> EvoResult<Gene>;

    /// Sample a plain primitive value of the given type
    fn sample_value<R: Rng>(&mut self, semantic_type: &str, rng: &mut R) -> EvoResult<Gene>;

    /// Allocate an id for a derived individual
    fn next_individual_id(&mut self) -> IndividualId;
}

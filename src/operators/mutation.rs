//! Mutation operators
//!
//! Point mutation of gene trees. Mutation never edits a tree in place: it
//! returns a new tree in which exactly one root-to-node path was rebuilt.

use rand::Rng;

use crate::config::SearchConfig;
use crate::error::EvoResult;
use crate::genome::gene::{ActionGene, Gene, GeneKind, PrimitiveGene};
use crate::genome::primitive::PrimitiveValue;
use crate::population::individual::Individual;
use crate::sampling::traits::Sampler;

/// Tree mutation with resampling, delta and fresh-value moves
#[derive(Clone, Debug)]
pub struct TreeMutation {
    /// Probability of replacing a node with a freshly sampled one
    pub resample_gene_chance: f64,
    /// Probability of a bounded numeric perturbation
    pub delta_mutation_chance: f64,
    /// Bit width cap for numeric domains
    pub numeric_domain_bits: u32,
}

impl TreeMutation {
    pub fn new(resample_gene_chance: f64, delta_mutation_chance: f64) -> Self {
        Self {
            resample_gene_chance,
            delta_mutation_chance,
            numeric_domain_bits: 16,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            resample_gene_chance: config.resample_gene_chance,
            delta_mutation_chance: config.delta_mutation_chance,
            numeric_domain_bits: config.numeric_domain_bits,
        }
    }

    /// Mutate an individual's tree, returning a new individual
    ///
    /// The result keeps the id of `individual` and starts unevaluated.
    pub fn mutate<S: Sampler, R: Rng>(
        &self,
        individual: &Individual,
        sampler: &mut S,
        rng: &mut R,
    ) -> EvoResult<Individual> {
        let root = self.mutate_gene(&individual.root, 0, sampler, rng)?;
        Ok(Individual::new(individual.id, root))
    }

    /// Mutate one gene at the given depth
    pub fn mutate_gene<S: Sampler, R: Rng>(
        &self,
        gene: &Gene,
        depth: usize,
        sampler: &mut S,
        rng: &mut R,
    ) -> EvoResult<Gene> {
        match gene {
            Gene::Action(action) => self.mutate_action(action, depth, sampler, rng),
            Gene::Primitive(primitive) => self.mutate_primitive(primitive, depth, sampler, rng),
        }
    }

    fn mutate_action<S: Sampler, R: Rng>(
        &self,
        action: &ActionGene,
        depth: usize,
        sampler: &mut S,
        rng: &mut R,
    ) -> EvoResult<Gene> {
        if rng.gen::<f64>() < self.resample_gene_chance {
            return sampler.sample_gene(depth, &action.semantic_type, action.kind, rng);
        }

        if action.arguments.is_empty() {
            return Ok(Gene::Action(action.clone()));
        }

        let index = rng.gen_range(0..action.arguments.len());
        let mut arguments = Vec::with_capacity(action.arguments.len());
        for (i, argument) in action.arguments.iter().enumerate() {
            if i == index {
                arguments.push(self.mutate_gene(argument, depth + 1, sampler, rng)?);
            } else {
                arguments.push(argument.copy());
            }
        }

        Ok(Gene::Action(ActionGene {
            arguments,
            ..action.clone_header()
        }))
    }

    fn mutate_primitive<S: Sampler, R: Rng>(
        &self,
        primitive: &PrimitiveGene,
        depth: usize,
        sampler: &mut S,
        rng: &mut R,
    ) -> EvoResult<Gene> {
        if rng.gen::<f64>() < self.resample_gene_chance {
            return sampler.sample_gene(depth, &primitive.semantic_type, GeneKind::Primitive, rng);
        }

        let value = match &primitive.value {
            PrimitiveValue::Numeric(v) => {
                if rng.gen::<f64>() < self.delta_mutation_chance {
                    PrimitiveValue::Numeric(primitive.ty.delta_value(
                        *v,
                        self.numeric_domain_bits,
                        rng,
                    ))
                } else {
                    primitive.ty.random_value(self.numeric_domain_bits, rng)
                }
            }
            PrimitiveValue::Text(text) => PrimitiveValue::Text(primitive.ty.mutate_text(text, rng)),
            PrimitiveValue::Bool(_) => primitive.ty.random_value(self.numeric_domain_bits, rng),
        };

        Ok(Gene::Primitive(PrimitiveGene {
            value,
            ..primitive.clone()
        }))
    }
}

impl ActionGene {
    // Copy of the node itself, without its argument subtrees
    fn clone_header(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            semantic_type: self.semantic_type.clone(),
            kind: self.kind,
            arguments: Vec::new(),
        }
    }
}

//! Random sampler backed by an API model

use std::collections::BTreeMap;

use rand::Rng;

use crate::config::SearchConfig;
use crate::error::{EvoResult, SamplingError};
use crate::genome::gene::{Gene, GeneKind};
use crate::genome::ids::IdGenerator;
use crate::genome::primitive::PrimitiveType;
use crate::population::individual::{Individual, IndividualId};
use crate::sampling::api_model::{ActionDescriptor, ActionKind, ApiModel};
use crate::sampling::traits::Sampler;

/// Samples test cases as random call sequences over an [`ApiModel`]
#[derive(Clone, Debug)]
pub struct ApiSampler {
    model: ApiModel,
    config: SearchConfig,
    ids: IdGenerator,
    // Shallowest call nesting that builds each object type
    heights: BTreeMap<String, usize>,
}

impl ApiSampler {
    pub fn new(model: ApiModel, config: SearchConfig) -> Self {
        let heights = construction_heights(&model, &config);
        Self {
            model,
            config,
            ids: IdGenerator::new(),
            heights,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn model(&self) -> &ApiModel {
        &self.model
    }

    /// Sample a root sequence of `1..=max_actions` top-level calls
    pub fn sample_sequence<R: Rng>(&mut self, rng: &mut R) -> EvoResult<Gene> {
        let id = self.ids.next_gene_id();
        let functions = self.model.function_indices();

        let count = if functions.is_empty() {
            0
        } else {
            rng.gen_range(1..=self.config.max_actions)
        };

        let mut calls = Vec::with_capacity(count);
        for _ in 0..count {
            let action = self.model.actions[functions[rng.gen_range(0..functions.len())]].clone();
            calls.push(self.sample_action(1, &action, rng)?);
        }

        let target = self.model.target.clone();
        Ok(Gene::action(id, target.clone(), target, GeneKind::Sequence, calls))
    }

    fn sample_action<R: Rng>(
        &mut self,
        depth: usize,
        action: &ActionDescriptor,
        rng: &mut R,
    ) -> EvoResult<Gene> {
        let id = self.ids.next_gene_id();
        let kind = match action.kind {
            ActionKind::Constructor => GeneKind::Constructor,
            ActionKind::Function => GeneKind::FunctionCall,
        };

        let mut arguments = Vec::with_capacity(action.parameters.len());
        for parameter in &action.parameters {
            arguments.push(self.sample_argument(depth + 1, parameter, rng)?);
        }

        Ok(Gene::action(
            id,
            action.name.clone(),
            action.return_type.clone(),
            kind,
            arguments,
        ))
    }

    fn is_primitive(&self, semantic_type: &str) -> bool {
        PrimitiveType::is_primitive(semantic_type, &self.config.primitives)
    }

    // Producers with a finite construction. Past the depth limit only the
    // shallowest of them qualify, so every object-typed parameter they take
    // is strictly shallower and recursion terminates.
    fn eligible_producers(&self, depth: usize, semantic_type: &str) -> Vec<usize> {
        let scored: Vec<(usize, usize)> = self
            .model
            .producer_indices(semantic_type)
            .into_iter()
            .filter_map(|i| {
                action_height(&self.model.actions[i], &self.heights, &self.config)
                    .map(|h| (i, h))
            })
            .collect();
        if depth < self.config.max_depth {
            return scored.into_iter().map(|(i, _)| i).collect();
        }
        let shallowest = scored.iter().map(|&(_, h)| h).min();
        scored
            .into_iter()
            .filter(|&(_, h)| Some(h) == shallowest)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Fixpoint over the producers: a type's height is one more than the
/// deepest object parameter of its shallowest producer. Types absent from
/// the result cannot be built without recursing into themselves.
fn construction_heights(model: &ApiModel, config: &SearchConfig) -> BTreeMap<String, usize> {
    let mut heights: BTreeMap<String, usize> = BTreeMap::new();
    let mut changed = true;
    while changed {
        changed = false;
        for action in &model.actions {
            if PrimitiveType::is_primitive(&action.return_type, &config.primitives) {
                continue;
            }
            let Some(height) = action_height(action, &heights, config) else {
                continue;
            };
            let current = heights.get(&action.return_type).copied();
            if current.map_or(true, |c| height < c) {
                heights.insert(action.return_type.clone(), height);
                changed = true;
            }
        }
    }
    heights
}

fn action_height(
    action: &ActionDescriptor,
    heights: &BTreeMap<String, usize>,
    config: &SearchConfig,
) -> Option<usize> {
    action
        .parameters
        .iter()
        .filter(|p| !PrimitiveType::is_primitive(p, &config.primitives))
        .try_fold(1, |height, p| heights.get(p).map(|&h| height.max(h + 1)))
}

impl Sampler for ApiSampler {
    fn sample_individual<R: Rng>(&mut self, rng: &mut R) -> EvoResult<Individual> {
        let root = self.sample_sequence(rng)?;
        Ok(Individual::new(self.ids.next_individual_id(), root))
    }

    fn sample_gene<R: Rng>(
        &mut self,
        depth: usize,
        semantic_type: &str,
        kind: GeneKind,
        rng: &mut R,
    ) -> EvoResult<Gene> {
        match kind {
            GeneKind::Primitive => self.sample_value(semantic_type, rng),
            GeneKind::Sequence => self.sample_sequence(rng),
            GeneKind::Constructor | GeneKind::FunctionCall => {
                self.sample_function_call(depth, semantic_type, rng)
            }
        }
    }

    fn sample_function_call<R: Rng>(
        &mut self,
        depth: usize,
        return_type: &str,
        rng: &mut R,
    ) -> EvoResult<Gene> {
        let producers = self.eligible_producers(depth, return_type);
        if producers.is_empty() {
            if self.is_primitive(return_type) {
                return self.sample_value(return_type, rng);
            }
            if self.model.has_producer(return_type) {
                return Err(SamplingError::Unconstructible(return_type.to_string()).into());
            }
            return Err(SamplingError::UnsupportedType(return_type.to_string()).into());
        }

        let action = self.model.actions[producers[rng.gen_range(0..producers.len())]].clone();
        self.sample_action(depth, &action, rng)
    }

    fn sample_argument<R: Rng>(
        &mut self,
        depth: usize,
        semantic_type: &str,
        rng: &mut R,
    ) -> EvoResult<Gene> {
        if !self.is_primitive(semantic_type) {
            return self.sample_function_call(depth, semantic_type, rng);
        }
        if depth >= self.config.max_depth {
            return self.sample_value(semantic_type, rng);
        }
        if rng.gen::<f64>() < self.config.sample_func_as_arg
            && self.model.has_producer(semantic_type)
        {
            return self.sample_function_call(depth, semantic_type, rng);
        }
        self.sample_value(semantic_type, rng)
    }

    fn sample_value<R: Rng>(&mut self, semantic_type: &str, rng: &mut R) -> EvoResult<Gene> {
        let ty = PrimitiveType::parse(semantic_type, &self.config.primitives)?;
        let value = ty.random_value(self.config.numeric_domain_bits, rng);
        Ok(Gene::primitive(
            self.ids.next_gene_id(),
            semantic_type,
            ty,
            value,
        ))
    }

    fn next_individual_id(&mut self) -> IndividualId {
        self.ids.next_individual_id()
    }
}

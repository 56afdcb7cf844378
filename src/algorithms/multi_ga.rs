//! MultiGA
//!
//! Runs one MOSA search per objective group side by side. Every outer step
//! advances each sub-search by one generation, in group order, drawing from
//! the shared context so the run stays reproducible.

use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use tracing::info;

use crate::algorithms::genetic_algorithm::GeneticAlgorithm;
use crate::algorithms::search::{ensure_can_step, SearchAlgorithm, SearchContext, SearchPhase};
use crate::config::{Algorithm, SearchConfig};
use crate::diagnostics::GenerationStats;
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::evaluator::Runner;
use crate::fitness::objective::Objective;
use crate::population::individual::{Individual, IndividualId};
use crate::sampling::traits::Sampler;

/// Independent MOSA searches over disjoint objective groups
#[derive(Clone, Debug)]
pub struct MultiGa {
    searches: Vec<GeneticAlgorithm>,
    generation: usize,
    phase: SearchPhase,
}

impl MultiGa {
    /// One sub-search per non-empty group
    pub fn new(config: &SearchConfig, groups: Vec<Vec<Objective>>) -> EvoResult<Self> {
        let searches = groups
            .into_iter()
            .filter(|group| !group.is_empty())
            .map(|group| GeneticAlgorithm::with_algorithm(Algorithm::Mosa, config, group))
            .collect::<EvoResult<Vec<_>>>()?;

        Ok(Self {
            searches,
            generation: 0,
            phase: SearchPhase::Created,
        })
    }

    /// One sub-search per target, grouping objectives by `target_name`
    pub fn per_target(config: &SearchConfig, objectives: Vec<Objective>) -> EvoResult<Self> {
        let mut groups: BTreeMap<String, Vec<Objective>> = BTreeMap::new();
        for objective in objectives {
            groups
                .entry(objective.target_name.clone())
                .or_default()
                .push(objective);
        }
        Self::new(config, groups.into_values().collect())
    }

    pub fn searches(&self) -> &[GeneticAlgorithm] {
        &self.searches
    }
}

impl SearchAlgorithm for MultiGa {
    fn initialize<S: Sampler, Run: Runner, R: Rng>(
        &mut self,
        ctx: &mut SearchContext<S, Run, R>,
    ) -> EvoResult<()> {
        if self.phase != SearchPhase::Created {
            return Err(EvolutionError::InvalidPhase {
                expected: SearchPhase::Created.as_str(),
                found: self.phase.as_str(),
            });
        }
        for search in &mut self.searches {
            search.initialize(ctx)?;
        }
        self.generation = 0;
        self.phase = SearchPhase::Initialized;

        info!(
            searches = self.searches.len(),
            objectives = self.total_objectives(),
            covered = self.covered_objectives(),
            "multi-search initialized"
        );
        Ok(())
    }

    fn step<S: Sampler, Run: Runner, R: Rng>(
        &mut self,
        ctx: &mut SearchContext<S, Run, R>,
    ) -> EvoResult<GenerationStats> {
        ensure_can_step(self.phase)?;

        let mut population_size = 0;
        let mut first_front_size = 0;
        for search in &mut self.searches {
            let stats = search.step(ctx)?;
            population_size += stats.population_size;
            first_front_size += stats.first_front_size;
        }
        self.generation += 1;
        self.phase = SearchPhase::Running;

        Ok(GenerationStats::new(
            self.generation,
            ctx.evaluator.evaluations(),
            self.covered_objectives(),
            self.total_objectives(),
        )
        .with_population(population_size, first_front_size))
    }

    /// Union of the sub-searches' archives, one entry per distinct individual
    fn final_suite(&self) -> Vec<Individual> {
        let mut seen: HashSet<IndividualId> = HashSet::new();
        self.searches
            .iter()
            .flat_map(|search| search.final_suite())
            .filter(|ind| seen.insert(ind.id))
            .collect()
    }

    fn generation(&self) -> usize {
        self.generation
    }

    fn covered_objectives(&self) -> usize {
        self.searches.iter().map(|s| s.covered_objectives()).sum()
    }

    fn total_objectives(&self) -> usize {
        self.searches.iter().map(|s| s.total_objectives()).sum()
    }

    fn phase(&self) -> SearchPhase {
        self.phase
    }

    fn terminate(&mut self) {
        for search in &mut self.searches {
            search.terminate();
        }
        self.phase = SearchPhase::Terminated;
    }
}

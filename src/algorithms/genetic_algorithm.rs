//! Generational genetic algorithm
//!
//! One engine for SimpleGA, NSGA2 and MOSA. All three breed offspring the
//! same way (tournament selection, subtree crossover, mutation of both
//! children) and keep the population size fixed; they differ in which
//! objectives they score and how survivors are ranked.

use std::time::Instant;

use rand::Rng;
use tracing::{debug, info};

use crate::algorithms::mosa::preference_sorting;
use crate::algorithms::nsga2::{fast_non_dominated_sort, truncate_by_fronts};
use crate::algorithms::search::{ensure_can_step, SearchAlgorithm, SearchContext, SearchPhase};
use crate::config::{Algorithm, SearchConfig};
use crate::diagnostics::{GenerationStats, TimingStats};
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::evaluator::Runner;
use crate::fitness::objective::Objective;
use crate::operators::crossover::SubtreeCrossover;
use crate::operators::mutation::TreeMutation;
use crate::operators::selection::TournamentSelection;
use crate::population::archive::Archive;
use crate::population::individual::Individual;
use crate::sampling::traits::Sampler;

/// Generational GA over test-case trees
#[derive(Clone, Debug)]
pub struct GeneticAlgorithm {
    algorithm: Algorithm,
    population_size: usize,
    objectives: Vec<Objective>,
    uncovered: Vec<Objective>,
    population: Vec<Individual>,
    archive: Archive,
    selection: TournamentSelection,
    crossover: SubtreeCrossover,
    mutation: TreeMutation,
    generation: usize,
    phase: SearchPhase,
}

impl GeneticAlgorithm {
    /// Create the algorithm named by `config.algorithm`
    pub fn new(config: &SearchConfig, objectives: Vec<Objective>) -> EvoResult<Self> {
        Self::with_algorithm(config.algorithm, config, objectives)
    }

    /// Create the algorithm from its name (`SimpleGA`, `NSGA2` or `MOSA`)
    pub fn from_name(
        name: &str,
        config: &SearchConfig,
        objectives: Vec<Objective>,
    ) -> EvoResult<Self> {
        Self::with_algorithm(name.parse()?, config, objectives)
    }

    pub fn with_algorithm(
        algorithm: Algorithm,
        config: &SearchConfig,
        objectives: Vec<Objective>,
    ) -> EvoResult<Self> {
        config.validate()?;
        let selection = TournamentSelection::new(config.tournament_size)?;

        let mut objectives = objectives;
        objectives.sort();
        objectives.dedup();

        Ok(Self {
            algorithm,
            population_size: config.population_size,
            uncovered: objectives.clone(),
            objectives,
            population: Vec::new(),
            archive: Archive::new(),
            selection,
            crossover: SubtreeCrossover::from_config(config),
            mutation: TreeMutation::from_config(config),
            generation: 0,
            phase: SearchPhase::Created,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    /// Objectives no individual has covered yet (MOSA only)
    pub fn uncovered_objectives(&self) -> &[Objective] {
        &self.uncovered
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    // Objectives scored and ranked on in this generation
    fn targets(&self) -> Vec<Objective> {
        if self.algorithm.uses_archive() {
            self.uncovered.clone()
        } else {
            self.objectives.clone()
        }
    }

    fn breed<S: Sampler, R: Rng>(
        &self,
        sampler: &mut S,
        rng: &mut R,
    ) -> EvoResult<Vec<Individual>> {
        if self.population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }

        let mut offspring = Vec::with_capacity(self.population_size);
        while offspring.len() < self.population_size {
            let parent1 = self.selection.select(&self.population, rng)?;
            let parent2 = self.selection.select(&self.population, rng)?;

            let (child1, child2) = self.crossover.crossover(
                &self.population[parent1],
                &self.population[parent2],
                sampler,
                rng,
            );
            let child1 = self.mutation.mutate(&child1, sampler, rng)?;
            let child2 = self.mutation.mutate(&child2, sampler, rng)?;

            offspring.push(child1);
            if offspring.len() < self.population_size {
                offspring.push(child2);
            }
        }

        Ok(offspring)
    }

    // Drop newly covered objectives and archive their first covering individual
    fn update_archive(&mut self, individuals: &[Individual]) {
        let archive = &mut self.archive;
        let generation = self.generation;
        self.uncovered.retain(|objective| {
            match individuals.iter().find(|ind| ind.covers(objective)) {
                Some(covering) => {
                    if archive.record(objective.clone(), covering) {
                        debug!(
                            objective = %objective,
                            individual = %covering.id,
                            generation,
                            "objective covered"
                        );
                    }
                    false
                }
                None => true,
            }
        });
    }

    // Rank `combined` and cut it back to the population size; returns the
    // size of the first front.
    fn rank_and_truncate<R: Rng>(
        &mut self,
        mut combined: Vec<Individual>,
        rng: &mut R,
    ) -> EvoResult<usize> {
        let expected = self.population_size.min(combined.len());

        let (survivors, first_front) = match self.algorithm {
            Algorithm::SimpleGa | Algorithm::Nsga2 => {
                let fronts = fast_non_dominated_sort(&mut combined, &self.objectives);
                let first = fronts.first().map_or(0, Vec::len);
                (
                    truncate_by_fronts(combined, &fronts, &self.objectives, self.population_size),
                    first,
                )
            }
            Algorithm::Mosa => {
                let fronts =
                    preference_sorting(&mut combined, &self.uncovered, self.population_size, rng);
                let first = fronts.first().map_or(0, Vec::len);
                let survivors =
                    truncate_by_fronts(combined, &fronts, &self.uncovered, self.population_size);
                if survivors.len() != expected {
                    return Err(EvolutionError::InternalInvariant(format!(
                        "survivor selection kept {} individuals, expected {}",
                        survivors.len(),
                        expected
                    )));
                }
                (survivors, first)
            }
        };

        self.population = survivors;
        Ok(first_front)
    }

    fn stats(&self, evaluations: usize, first_front: usize) -> GenerationStats {
        GenerationStats::new(
            self.generation,
            evaluations,
            self.covered_objectives(),
            self.total_objectives(),
        )
        .with_population(self.population.len(), first_front)
    }
}

impl SearchAlgorithm for GeneticAlgorithm {
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

        let mut population = Vec::with_capacity(self.population_size);
        for _ in 0..self.population_size {
            population.push(ctx.sampler.sample_individual(&mut ctx.rng)?);
        }
        ctx.evaluator.evaluate_many(&mut population, &self.objectives)?;

        self.generation = 0;
        if self.algorithm.uses_archive() {
            self.update_archive(&population);
        }
        self.rank_and_truncate(population, &mut ctx.rng)?;
        self.phase = SearchPhase::Initialized;

        info!(
            algorithm = %self.algorithm,
            population = self.population.len(),
            objectives = self.objectives.len(),
            covered = self.covered_objectives(),
            "search initialized"
        );
        Ok(())
    }

    fn step<S: Sampler, Run: Runner, R: Rng>(
        &mut self,
        ctx: &mut SearchContext<S, Run, R>,
    ) -> EvoResult<GenerationStats> {
        ensure_can_step(self.phase)?;
        let gen_start = Instant::now();

        if self.algorithm.uses_archive() && self.uncovered.is_empty() {
            self.generation += 1;
            self.phase = SearchPhase::Running;
            return Ok(self
                .stats(ctx.evaluator.evaluations(), 0)
                .with_timing(TimingStats::new().with_total(gen_start.elapsed())));
        }

        let breed_start = Instant::now();
        let mut offspring = self.breed(&mut ctx.sampler, &mut ctx.rng)?;
        let breeding_time = breed_start.elapsed();

        let eval_start = Instant::now();
        let targets = self.targets();
        ctx.evaluator.evaluate_many(&mut offspring, &targets)?;
        let eval_time = eval_start.elapsed();

        self.generation += 1;
        if self.algorithm.uses_archive() {
            self.update_archive(&offspring);
        }

        let rank_start = Instant::now();
        let mut combined = std::mem::take(&mut self.population);
        combined.extend(offspring);
        let first_front = self.rank_and_truncate(combined, &mut ctx.rng)?;
        let ranking_time = rank_start.elapsed();

        self.phase = SearchPhase::Running;

        let timing = TimingStats::new()
            .with_breeding(breeding_time)
            .with_evaluation(eval_time)
            .with_ranking(ranking_time)
            .with_total(gen_start.elapsed());
        Ok(self
            .stats(ctx.evaluator.evaluations(), first_front)
            .with_timing(timing))
    }

    /// NSGA2/SimpleGA: the final population. MOSA: the archive, one entry
    /// per distinct individual.
    fn final_suite(&self) -> Vec<Individual> {
        if self.algorithm.uses_archive() {
            self.archive.individuals()
        } else {
            self.population.clone()
        }
    }

    fn generation(&self) -> usize {
        self.generation
    }

    fn covered_objectives(&self) -> usize {
        if self.algorithm.uses_archive() {
            self.archive.len()
        } else {
            self.objectives
                .iter()
                .filter(|objective| self.population.iter().any(|ind| ind.covers(objective)))
                .count()
        }
    }

    fn total_objectives(&self) -> usize {
        self.objectives.len()
    }

    fn phase(&self) -> SearchPhase {
        self.phase
    }

    fn terminate(&mut self) {
        self.phase = SearchPhase::Terminated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvolutionError;
    use crate::fitness::branch_distance::Opcode;
    use crate::fitness::cfg::{ControlFlowGraph, EdgeDirection};
    use crate::fitness::evaluator::{Datapoint, FitnessEvaluator};
    use crate::genome::gene::Gene;
    use crate::genome::primitive::PrimitiveValue;
    use crate::sampling::api_model::{ActionDescriptor, ApiModel};
    use crate::sampling::api_sampler::ApiSampler;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type Ctx = SearchContext<
        ApiSampler,
        fn(&Individual) -> EvoResult<Vec<Datapoint>>,
        StdRng,
    >;

    // `check(x)` branches at line 10 on `x > 100`.
    fn first_argument(ind: &Individual) -> f64 {
        ind.root
            .children()
            .first()
            .and_then(|call| call.children().first())
            .and_then(|arg| match arg {
                Gene::Primitive(p) => match p.value {
                    PrimitiveValue::Numeric(v) => Some(v),
                    _ => None,
                },
                _ => None,
            })
            .unwrap_or(0.0)
    }

    fn runner(ind: &Individual) -> EvoResult<Vec<Datapoint>> {
        let x = first_argument(ind);
        Ok(vec![Datapoint::branch(10, x > 100.0, Opcode::Gt, x, 100.0)])
    }

    fn objectives() -> Vec<Objective> {
        vec![Objective::new("Gate", 10, true), Objective::new("Gate", 10, false)]
    }

    fn context(config: SearchConfig, seed: u64) -> Ctx {
        let mut cfg = ControlFlowGraph::default();
        cfg.add_node("entry", 9)
            .add_branch("t", 10, true)
            .add_branch("f", 10, false)
            .add_edge("entry", "t", EdgeDirection::True)
            .add_edge("entry", "f", EdgeDirection::False);

        let model = ApiModel::new(
            "Gate",
            vec![ActionDescriptor::function("check", "void", &["uint8"])],
        );
        let runner = runner as fn(&Individual) -> EvoResult<Vec<Datapoint>>;
        let evaluator = FitnessEvaluator::new(&cfg, runner).unwrap();
        SearchContext::new(
            ApiSampler::new(model, config),
            evaluator,
            StdRng::seed_from_u64(seed),
        )
    }

    fn config(algorithm: Algorithm) -> SearchConfig {
        SearchConfig::default()
            .with_population_size(10)
            .with_max_actions(2)
            .with_algorithm(algorithm)
    }

    #[test]
    fn test_unknown_algorithm_name() {
        let err = GeneticAlgorithm::from_name("Hillclimb", &SearchConfig::default(), objectives())
            .unwrap_err();
        assert!(matches!(err, EvolutionError::UnknownAlgorithm(_)));
    }

    #[test]
    fn test_step_before_initialize_is_rejected() {
        let config = config(Algorithm::Nsga2);
        let mut ctx = context(config.clone(), 1);
        let mut ga = GeneticAlgorithm::new(&config, objectives()).unwrap();
        assert!(matches!(
            ga.step(&mut ctx),
            Err(EvolutionError::InvalidPhase { .. })
        ));
    }

    #[test]
    fn test_population_size_is_stable() {
        for algorithm in [Algorithm::SimpleGa, Algorithm::Nsga2, Algorithm::Mosa] {
            let config = config(algorithm);
            let mut ctx = context(config.clone(), 2);
            let mut ga = GeneticAlgorithm::new(&config, objectives()).unwrap();

            ga.initialize(&mut ctx).unwrap();
            assert_eq!(ga.phase(), SearchPhase::Initialized);
            assert_eq!(ga.population().len(), 10);

            for _ in 0..3 {
                ga.step(&mut ctx).unwrap();
                assert_eq!(ga.population().len(), 10);
            }
            assert_eq!(ga.generation(), 3);
            assert_eq!(ga.phase(), SearchPhase::Running);
        }
    }

    #[test]
    fn test_mosa_archives_and_shrinks_uncovered() {
        let config = config(Algorithm::Mosa);
        let mut ctx = context(config.clone(), 3);
        let mut ga = GeneticAlgorithm::new(&config, objectives()).unwrap();

        ga.initialize(&mut ctx).unwrap();
        for _ in 0..20 {
            ga.step(&mut ctx).unwrap();
        }

        assert_eq!(ga.archive().len() + ga.uncovered_objectives().len(), 2);
        for objective in ga.archive().objectives() {
            assert!(!ga.uncovered_objectives().contains(objective));
            assert!(ga.archive().get(objective).unwrap().covers(objective));
        }
        assert_eq!(ga.covered_objectives(), ga.archive().len());
    }

    #[test]
    fn test_mosa_step_is_a_no_op_once_everything_is_covered() {
        let config = config(Algorithm::Mosa);
        let mut ctx = context(config.clone(), 4);
        let mut ga = GeneticAlgorithm::new(&config, objectives()).unwrap();

        ga.initialize(&mut ctx).unwrap();
        while !ga.uncovered_objectives().is_empty() {
            ga.step(&mut ctx).unwrap();
            assert!(ga.generation() < 500);
        }

        let before = ga.population().to_vec();
        let evaluations = ctx.evaluator.evaluations();
        ga.step(&mut ctx).unwrap();
        assert_eq!(ga.population(), &before[..]);
        assert_eq!(ctx.evaluator.evaluations(), evaluations);
    }

    #[test]
    fn test_final_suite_per_algorithm() {
        let config = config(Algorithm::Nsga2);
        let mut ctx = context(config.clone(), 5);
        let mut ga = GeneticAlgorithm::new(&config, objectives()).unwrap();
        ga.initialize(&mut ctx).unwrap();
        ga.step(&mut ctx).unwrap();
        assert_eq!(ga.final_suite().len(), 10);

        let config = config.with_algorithm(Algorithm::Mosa);
        let mut ctx = context(config.clone(), 5);
        let mut ga = GeneticAlgorithm::new(&config, objectives()).unwrap();
        ga.initialize(&mut ctx).unwrap();
        ga.step(&mut ctx).unwrap();
        assert_eq!(ga.final_suite(), ga.archive().individuals());
    }

    #[test]
    fn test_duplicate_objectives_are_merged() {
        let mut objs = objectives();
        objs.push(Objective::new("Gate", 10, true));
        let ga = GeneticAlgorithm::new(&SearchConfig::default(), objs).unwrap();
        assert_eq!(ga.total_objectives(), 2);
    }
}

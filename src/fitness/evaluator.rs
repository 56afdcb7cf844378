//! Fitness evaluation from coverage feedback
//!
//! An individual is executed by a [`Runner`], which reports the branches it
//! hit. Each objective then scores `approach level + branch distance` from the
//! nearest hit branch, or 0 when the objective itself was hit.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{EvoResult, FitnessError};
use crate::fitness::branch_distance::branch_distance;
use crate::fitness::branch_distance::Opcode;
use crate::fitness::cfg::{ControlFlowGraph, ShortestPaths};
use crate::fitness::objective::{Evaluation, Objective};
use crate::population::individual::Individual;

/// Coverage record for one instrumented instruction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    pub is_branch: bool,
    pub line: u32,
    pub branch_direction: bool,
    /// Times the instruction executed
    pub hits: u64,
    pub opcode: Opcode,
    pub left: f64,
    pub right: f64,
}

impl Datapoint {
    /// A branch datapoint that was hit once
    pub fn branch(
        line: u32,
        branch_direction: bool,
        opcode: Opcode,
        left: f64,
        right: f64,
    ) -> Self {
        Self {
            is_branch: true,
            line,
            branch_direction,
            hits: 1,
            opcode,
            left,
            right,
        }
    }

    fn matches(&self, objective: &Objective) -> bool {
        self.line == objective.line && self.branch_direction == objective.branch_direction
    }
}

/// Executes a candidate test case and reports coverage
///
/// Implemented for any `FnMut(&Individual) -> EvoResult<Vec<Datapoint>>`.
pub trait Runner {
    fn run_test(&mut self, individual: &Individual) -> EvoResult<Vec<Datapoint>>;
}

impl<F> Runner for F
where
    F: FnMut(&Individual) -> EvoResult<Vec<Datapoint>>,
{
    fn run_test(&mut self, individual: &Individual) -> EvoResult<Vec<Datapoint>> {
        self(individual)
    }
}

/// Branch-coverage fitness evaluator
pub struct FitnessEvaluator<Run: Runner> {
    paths: ShortestPaths,
    runner: Run,
    evaluations: usize,
}

impl<Run: Runner> FitnessEvaluator<Run> {
    /// Build the evaluator, precomputing all-pairs shortest paths over `cfg`
    pub fn new(cfg: &ControlFlowGraph, runner: Run) -> EvoResult<Self> {
        let paths = ShortestPaths::from_cfg(cfg)?;
        Ok(Self {
            paths,
            runner,
            evaluations: 0,
        })
    }

    /// Number of individuals executed so far
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn paths(&self) -> &ShortestPaths {
        &self.paths
    }

    pub fn runner(&self) -> &Run {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut Run {
        &mut self.runner
    }

    /// Execute one individual and score it against `objectives`
    ///
    /// Objectives unreachable from every hit branch are left out of the
    /// returned evaluation and so read as unmeasured.
    pub fn evaluate_one(
        &mut self,
        individual: &Individual,
        objectives: &[Objective],
    ) -> EvoResult<Evaluation> {
        let datapoints = self.runner.run_test(individual)?;
        self.evaluations += 1;

        let hit_nodes: Vec<&Datapoint> = datapoints
            .iter()
            .filter(|d| d.is_branch && d.hits > 0 && objectives.iter().any(|o| d.matches(o)))
            .collect();

        let mut evaluation = Evaluation::new();
        for objective in objectives {
            if hit_nodes.iter().any(|d| d.matches(objective)) {
                evaluation.set(objective.clone(), 0.0);
                continue;
            }

            let target = self.branch_index(objective.line, objective.branch_direction)?;
            let mut nearest: Option<(u32, &Datapoint)> = None;
            for &hit in &hit_nodes {
                let source = self.branch_index(hit.line, hit.branch_direction)?;
                if let Some(distance) = self.paths.distance(source, target)? {
                    if nearest.map_or(true, |(best, _)| distance < best) {
                        nearest = Some((distance, hit));
                    }
                }
            }

            if let Some((distance, hit)) = nearest {
                let approach_level = f64::from(distance.saturating_sub(1));
                let fitness = approach_level + branch_distance(hit.opcode, hit.left, hit.right);
                evaluation.set(objective.clone(), fitness);
            }
        }

        trace!(
            individual = %individual.id,
            hits = hit_nodes.len(),
            measured = evaluation.len(),
            "evaluated individual"
        );

        Ok(evaluation)
    }

    /// Evaluate each individual in order, merging scores into its evaluation
    pub fn evaluate_many(
        &mut self,
        population: &mut [Individual],
        objectives: &[Objective],
    ) -> EvoResult<()> {
        for individual in population.iter_mut() {
            let evaluation = self.evaluate_one(individual, objectives)?;
            individual.evaluation.merge(evaluation);
        }
        Ok(())
    }

    fn branch_index(&self, line: u32, direction: bool) -> Result<usize, FitnessError> {
        self.paths.branch_node(line, direction).ok_or_else(|| {
            FitnessError::BrokenInvariant(format!(
                "no CFG branch node for line {} ({})",
                line, direction
            ))
        })
    }
}

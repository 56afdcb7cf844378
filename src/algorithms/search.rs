//! Search driver
//!
//! The collaborators every algorithm needs, the algorithm lifecycle and the
//! generation loop that runs an algorithm until a termination criterion
//! fires.

use std::fmt;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info};

use crate::diagnostics::{GenerationStats, SearchResult, SearchStats};
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::evaluator::{FitnessEvaluator, Runner};
use crate::population::individual::Individual;
use crate::sampling::traits::Sampler;
use crate::termination::{SearchState, TerminationCriterion};

/// Lifecycle of a search algorithm
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchPhase {
    /// Constructed, no population yet
    Created,
    /// Initial population sampled and evaluated
    Initialized,
    /// At least one generation completed
    Running,
    /// Stopped by a termination criterion
    Terminated,
}

impl SearchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Initialized => "Initialized",
            Self::Running => "Running",
            Self::Terminated => "Terminated",
        }
    }

    /// Whether a generation may be advanced
    pub fn can_step(&self) -> bool {
        matches!(self, Self::Initialized | Self::Running)
    }
}

impl fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared collaborators of a search run
///
/// All stochastic decisions draw from `rng`, in a fixed order, so a seeded
/// generator makes the whole run reproducible. Search settings live on the
/// algorithm and the sampler, each built from a [`SearchConfig`].
///
/// [`SearchConfig`]: crate::config::SearchConfig
pub struct SearchContext<S: Sampler, Run: Runner, R: Rng> {
    pub sampler: S,
    pub evaluator: FitnessEvaluator<Run>,
    pub rng: R,
}

impl<S: Sampler, Run: Runner, R: Rng> SearchContext<S, Run, R> {
    pub fn new(sampler: S, evaluator: FitnessEvaluator<Run>, rng: R) -> Self {
        Self {
            sampler,
            evaluator,
            rng,
        }
    }
}

/// A generational search over test cases
pub trait SearchAlgorithm {
    /// Sample and evaluate the initial population
    fn initialize<S: Sampler, Run: Runner, R: Rng>(
        &mut self,
        ctx: &mut SearchContext<S, Run, R>,
    ) -> EvoResult<()>;

    /// Advance one generation
    fn step<S: Sampler, Run: Runner, R: Rng>(
        &mut self,
        ctx: &mut SearchContext<S, Run, R>,
    ) -> EvoResult<GenerationStats>;

    /// The generated test suite
    fn final_suite(&self) -> Vec<Individual>;

    /// Completed generations
    fn generation(&self) -> usize;

    /// Objectives covered so far
    fn covered_objectives(&self) -> usize;

    /// Objectives targeted
    fn total_objectives(&self) -> usize;

    fn phase(&self) -> SearchPhase;

    /// Mark the search as stopped
    fn terminate(&mut self);

    /// Public progress, as seen by termination criteria
    fn state(&self, evaluations: usize, elapsed: Duration) -> SearchState {
        SearchState {
            generation: self.generation(),
            evaluations,
            elapsed,
            covered: self.covered_objectives(),
            total: self.total_objectives(),
        }
    }
}

/// Check that `phase` allows advancing a generation
pub(crate) fn ensure_can_step(phase: SearchPhase) -> EvoResult<()> {
    if phase.can_step() {
        Ok(())
    } else {
        Err(EvolutionError::InvalidPhase {
            expected: SearchPhase::Running.as_str(),
            found: phase.as_str(),
        })
    }
}

/// Run `algorithm` until `termination` fires
///
/// Initializes the algorithm if needed, then checks the criterion before
/// every generation. Any error aborts the run.
pub fn run<A, S, Run, R, T>(
    algorithm: &mut A,
    ctx: &mut SearchContext<S, Run, R>,
    termination: &T,
) -> EvoResult<SearchResult>
where
    A: SearchAlgorithm,
    S: Sampler,
    Run: Runner,
    R: Rng,
    T: TerminationCriterion + ?Sized,
{
    let start_time = Instant::now();
    let mut stats = SearchStats::new();

    match algorithm.phase() {
        SearchPhase::Created => algorithm.initialize(ctx)?,
        SearchPhase::Terminated => {
            return Err(EvolutionError::InvalidPhase {
                expected: SearchPhase::Created.as_str(),
                found: SearchPhase::Terminated.as_str(),
            })
        }
        SearchPhase::Initialized | SearchPhase::Running => {}
    }

    stats.record(GenerationStats::from_state(
        &algorithm.state(ctx.evaluator.evaluations(), start_time.elapsed()),
    ));

    let final_state = loop {
        let state = algorithm.state(ctx.evaluator.evaluations(), start_time.elapsed());
        if termination.should_terminate(&state) {
            stats.set_termination_reason(termination.reason_for(&state));
            break state;
        }

        let gen_stats = algorithm.step(ctx)?;
        debug!(
            generation = gen_stats.generation,
            covered = gen_stats.covered,
            total = gen_stats.total,
            evaluations = gen_stats.evaluations,
            "generation complete"
        );
        stats.record(gen_stats);
    };

    algorithm.terminate();
    stats.set_runtime(start_time.elapsed());

    info!(
        generations = final_state.generation,
        covered = final_state.covered,
        total = final_state.total,
        evaluations = final_state.evaluations,
        reason = stats.termination_reason.as_deref().unwrap_or("unknown"),
        "search terminated"
    );

    Ok(SearchResult::new(algorithm.final_suite(), &final_state).with_stats(stats))
}

//! Diagnostics and statistics
//!
//! This module provides per-generation statistics and the result of a search
//! run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::population::individual::Individual;
use crate::termination::SearchState;

/// Statistics for a single generation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number
    pub generation: usize,
    /// Total individuals executed so far
    pub evaluations: usize,
    /// Objectives covered after this generation
    pub covered: usize,
    /// Objectives targeted
    pub total: usize,
    /// Population size after survivor selection
    pub population_size: usize,
    /// Size of the first front after ranking
    pub first_front_size: usize,
    /// Timing information
    pub timing: TimingStats,
}

/// Timing statistics
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingStats {
    /// Time spent on selection, crossover and mutation (ms)
    pub breeding_ms: f64,
    /// Time spent executing and scoring individuals (ms)
    pub evaluation_ms: f64,
    /// Time spent on ranking and truncation (ms)
    pub ranking_ms: f64,
    /// Total generation time (ms)
    pub total_ms: f64,
}

impl TimingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_breeding(mut self, duration: Duration) -> Self {
        self.breeding_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    pub fn with_evaluation(mut self, duration: Duration) -> Self {
        self.evaluation_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    pub fn with_ranking(mut self, duration: Duration) -> Self {
        self.ranking_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    pub fn with_total(mut self, duration: Duration) -> Self {
        self.total_ms = duration.as_secs_f64() * 1000.0;
        self
    }
}

impl GenerationStats {
    pub fn new(generation: usize, evaluations: usize, covered: usize, total: usize) -> Self {
        Self {
            generation,
            evaluations,
            covered,
            total,
            ..Self::default()
        }
    }

    /// Snapshot the progress counters of a search
    pub fn from_state(state: &SearchState) -> Self {
        Self::new(state.generation, state.evaluations, state.covered, state.total)
    }

    pub fn with_population(mut self, population_size: usize, first_front_size: usize) -> Self {
        self.population_size = population_size;
        self.first_front_size = first_front_size;
        self
    }

    pub fn with_timing(mut self, timing: TimingStats) -> Self {
        self.timing = timing;
        self
    }

    /// Fraction of objectives covered (1.0 when there are none)
    pub fn coverage(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.covered as f64 / self.total as f64
        }
    }
}

/// Statistics collector for an entire search run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Statistics per generation, the initial population first
    pub generations: Vec<GenerationStats>,
    /// Total runtime in milliseconds
    pub total_runtime_ms: f64,
    /// Reason for termination
    pub termination_reason: Option<String>,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generation's statistics
    pub fn record(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    /// Number of records, the initial population included
    pub fn num_generations(&self) -> usize {
        self.generations.len()
    }

    /// Generations completed after the initial population
    pub fn completed_generations(&self) -> usize {
        self.generations.last().map_or(0, |g| g.generation)
    }

    /// Covered-objective counts over time
    pub fn coverage_history(&self) -> Vec<usize> {
        self.generations.iter().map(|g| g.covered).collect()
    }

    /// Final covered fraction
    pub fn final_coverage(&self) -> Option<f64> {
        self.generations.last().map(GenerationStats::coverage)
    }

    pub fn set_termination_reason(&mut self, reason: &str) {
        self.termination_reason = Some(reason.to_string());
    }

    pub fn set_runtime(&mut self, duration: Duration) {
        self.total_runtime_ms = duration.as_secs_f64() * 1000.0;
    }

    /// Get a summary of the search run
    pub fn summary(&self) -> String {
        let (covered, total) = self
            .generations
            .last()
            .map_or((0, 0), |g| (g.covered, g.total));

        format!(
            "Search Summary:\n\
             - Generations: {}\n\
             - Covered: {}/{}\n\
             - Runtime: {:.2}ms\n\
             - Termination: {}",
            self.completed_generations(),
            covered,
            total,
            self.total_runtime_ms,
            self.termination_reason.as_deref().unwrap_or("unknown")
        )
    }
}

/// Result of a search run
#[derive(Clone, Debug)]
pub struct SearchResult {
    /// The generated test suite
    pub suite: Vec<Individual>,
    /// Number of generations completed
    pub generations: usize,
    /// Total individuals executed
    pub evaluations: usize,
    /// Objectives covered at termination
    pub covered: usize,
    /// Objectives targeted
    pub total: usize,
    /// Statistics for the run
    pub stats: SearchStats,
}

impl SearchResult {
    pub fn new(suite: Vec<Individual>, state: &SearchState) -> Self {
        Self {
            suite,
            generations: state.generation,
            evaluations: state.evaluations,
            covered: state.covered,
            total: state.total,
            stats: SearchStats::new(),
        }
    }

    pub fn with_stats(mut self, stats: SearchStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn coverage(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.covered as f64 / self.total as f64
        }
    }
}

pub mod prelude {
    pub use super::{GenerationStats, SearchResult, SearchStats, TimingStats};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_stats_from_state() {
        let state = SearchState {
            generation: 4,
            evaluations: 250,
            elapsed: Duration::from_millis(3),
            covered: 3,
            total: 4,
        };
        let stats = GenerationStats::from_state(&state).with_population(50, 7);

        assert_eq!(stats.generation, 4);
        assert_eq!(stats.evaluations, 250);
        assert_eq!(stats.population_size, 50);
        assert_eq!(stats.first_front_size, 7);
        assert_eq!(stats.coverage(), 0.75);
    }

    #[test]
    fn test_no_objectives_is_full_coverage() {
        assert_eq!(GenerationStats::new(0, 0, 0, 0).coverage(), 1.0);
    }

    #[test]
    fn test_search_stats_history_and_summary() {
        let mut stats = SearchStats::new();
        for (generation, covered) in [1, 2, 2, 4].into_iter().enumerate() {
            stats.record(GenerationStats::new(generation, generation * 10, covered, 4));
        }
        stats.set_termination_reason("Coverage threshold reached");
        stats.set_runtime(Duration::from_millis(1234));

        assert_eq!(stats.coverage_history(), vec![1, 2, 2, 4]);
        assert_eq!(stats.final_coverage(), Some(1.0));

        let summary = stats.summary();
        assert_eq!(stats.num_generations(), 4);
        assert_eq!(stats.completed_generations(), 3);
        assert!(summary.contains("Generations: 3\n"));
        assert!(summary.contains("Covered: 4/4"));
        assert!(summary.contains("Coverage threshold reached"));
    }

    #[test]
    fn test_timing_stats() {
        let timing = TimingStats::new()
            .with_breeding(Duration::from_millis(20))
            .with_evaluation(Duration::from_millis(100))
            .with_ranking(Duration::from_millis(5))
            .with_total(Duration::from_millis(125));

        assert!((timing.evaluation_ms - 100.0).abs() < 1e-9);
        assert!((timing.total_ms - 125.0).abs() < 1e-9);
    }
}

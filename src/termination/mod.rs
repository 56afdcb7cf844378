//! Termination criteria
//!
//! This module provides the stopping predicates evaluated between
//! generations. A criterion only sees the public progress of a search.

use std::time::Duration;

/// Search progress for termination checking
#[derive(Clone, Debug, PartialEq)]
pub struct SearchState {
    /// Current generation number
    pub generation: usize,
    /// Total individuals executed so far
    pub evaluations: usize,
    /// Wall-clock time since the search started
    pub elapsed: Duration,
    /// Objectives covered so far
    pub covered: usize,
    /// Objectives targeted
    pub total: usize,
}

impl SearchState {
    /// Fraction of objectives covered (1.0 when there are none)
    pub fn coverage(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.covered as f64 / self.total as f64
        }
    }
}

/// Termination criterion trait
pub trait TerminationCriterion {
    /// Check if the search should stop
    fn should_terminate(&self, state: &SearchState) -> bool;

    /// Get a description of why termination occurred
    fn reason(&self) -> &'static str;

    /// Reason for stopping in `state`; combinators name the criterion that fired
    fn reason_for(&self, _state: &SearchState) -> &'static str {
        self.reason()
    }
}

/// Terminate after a maximum number of generations
#[derive(Clone, Debug)]
pub struct MaxGenerations(pub usize);

impl MaxGenerations {
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl TerminationCriterion for MaxGenerations {
    fn should_terminate(&self, state: &SearchState) -> bool {
        state.generation >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum generations reached"
    }
}

/// Terminate after a maximum number of executed individuals
#[derive(Clone, Debug)]
pub struct MaxEvaluations(pub usize);

impl MaxEvaluations {
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl TerminationCriterion for MaxEvaluations {
    fn should_terminate(&self, state: &SearchState) -> bool {
        state.evaluations >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum evaluations reached"
    }
}

/// Terminate once the wall-clock budget is spent
///
/// Checked between generations only; a generation in progress always
/// completes.
#[derive(Clone, Debug)]
pub struct TimeBudget(pub Duration);

impl TimeBudget {
    pub fn new(budget: Duration) -> Self {
        Self(budget)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }
}

impl TerminationCriterion for TimeBudget {
    fn should_terminate(&self, state: &SearchState) -> bool {
        state.elapsed >= self.0
    }

    fn reason(&self) -> &'static str {
        "Time budget exhausted"
    }
}

/// Terminate when the covered fraction of objectives reaches a threshold
#[derive(Clone, Debug)]
pub struct CoverageThreshold {
    /// Fraction in `[0, 1]`
    pub threshold: f64,
}

impl CoverageThreshold {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Stop only once every objective is covered
    pub fn full() -> Self {
        Self::new(1.0)
    }
}

impl TerminationCriterion for CoverageThreshold {
    fn should_terminate(&self, state: &SearchState) -> bool {
        state.coverage() >= self.threshold
    }

    fn reason(&self) -> &'static str {
        "Coverage threshold reached"
    }
}

/// Combine criteria with OR logic (any one triggers termination)
pub struct AnyOf {
    criteria: Vec<Box<dyn TerminationCriterion>>,
}

impl AnyOf {
    pub fn new(criteria: Vec<Box<dyn TerminationCriterion>>) -> Self {
        Self { criteria }
    }
}

impl TerminationCriterion for AnyOf {
    fn should_terminate(&self, state: &SearchState) -> bool {
        self.criteria.iter().any(|c| c.should_terminate(state))
    }

    fn reason(&self) -> &'static str {
        "One of multiple criteria met"
    }

    fn reason_for(&self, state: &SearchState) -> &'static str {
        self.criteria
            .iter()
            .find(|c| c.should_terminate(state))
            .map_or_else(|| self.reason(), |c| c.reason_for(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(generation: usize, evaluations: usize, covered: usize, total: usize) -> SearchState {
        SearchState {
            generation,
            evaluations,
            elapsed: Duration::from_millis(10),
            covered,
            total,
        }
    }

    #[test]
    fn test_max_generations() {
        let criterion = MaxGenerations::new(10);
        assert!(!criterion.should_terminate(&state(5, 0, 0, 1)));
        assert!(criterion.should_terminate(&state(10, 0, 0, 1)));
    }

    #[test]
    fn test_max_evaluations() {
        let criterion = MaxEvaluations::new(100);
        assert!(!criterion.should_terminate(&state(0, 99, 0, 1)));
        assert!(criterion.should_terminate(&state(0, 100, 0, 1)));
    }

    #[test]
    fn test_time_budget() {
        assert!(TimeBudget::new(Duration::from_millis(5)).should_terminate(&state(0, 0, 0, 1)));
        assert!(!TimeBudget::from_secs(60).should_terminate(&state(0, 0, 0, 1)));
    }

    #[test]
    fn test_coverage_threshold() {
        let criterion = CoverageThreshold::new(0.5);
        assert!(!criterion.should_terminate(&state(0, 0, 1, 4)));
        assert!(criterion.should_terminate(&state(0, 0, 2, 4)));
        assert!(CoverageThreshold::full().should_terminate(&state(0, 0, 0, 0)));
    }

    #[test]
    fn test_any_of() {
        let criterion = AnyOf::new(vec![
            Box::new(MaxGenerations::new(10)),
            Box::new(CoverageThreshold::full()),
        ]);
        assert!(!criterion.should_terminate(&state(5, 0, 1, 2)));
        assert!(criterion.should_terminate(&state(10, 0, 1, 2)));
        assert!(criterion.should_terminate(&state(3, 0, 2, 2)));
        assert_eq!(
            criterion.reason_for(&state(3, 0, 2, 2)),
            "Coverage threshold reached"
        );
    }
}

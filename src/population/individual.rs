//! Individual wrapper type
//!
//! This module provides the Individual type that wraps a gene tree with its
//! evaluation and ranking metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fitness::objective::{Evaluation, Objective};
use crate::genome::gene::Gene;

/// Opaque identity of an individual
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndividualId(pub u64);

impl fmt::Display for IndividualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// A candidate test case in the population
///
/// Owns its gene tree exclusively; individuals never share subtrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// Identity of this individual
    pub id: IndividualId,
    /// Root of the gene tree
    pub root: Gene,
    /// Fitness per measured objective
    pub evaluation: Evaluation,
    /// Pareto rank (0 = first front)
    pub rank: usize,
    /// Crowding distance within its front
    pub crowding_distance: f64,
}

impl Individual {
    /// Create a new, unevaluated individual
    pub fn new(id: IndividualId, root: Gene) -> Self {
        Self {
            id,
            root,
            evaluation: Evaluation::new(),
            rank: 0,
            crowding_distance: 0.0,
        }
    }

    /// Fitness on one objective (worst-case sentinel when unmeasured)
    pub fn fitness(&self, objective: &Objective) -> f64 {
        self.evaluation.get(objective)
    }

    /// Number of top-level calls in the test case
    pub fn length(&self) -> usize {
        self.root.children().len()
    }

    /// Whether this individual hits the objective exactly
    pub fn covers(&self, objective: &Objective) -> bool {
        self.evaluation.covers(objective)
    }

    /// Crowded comparison: lower rank, or same rank with higher crowding distance
    pub fn is_better_than(&self, other: &Self) -> bool {
        self.rank < other.rank
            || (self.rank == other.rank && self.crowding_distance > other.crowding_distance)
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

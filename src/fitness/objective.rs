//! Coverage objectives and per-individual evaluations

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Fitness of an objective that was never measured
///
/// Treated as the worst possible value by every ranking routine.
pub const UNMEASURED_FITNESS: f64 = f64::MAX;

/// One CFG branch the search tries to cover
///
/// Compared, ordered and hashed by value.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Objective {
    /// Contract, module or function the branch belongs to
    pub target_name: String,
    /// Source line of the branching instruction
    pub line: u32,
    /// Which outcome of the branch this objective asks for
    pub branch_direction: bool,
}

impl Objective {
    pub fn new(target_name: impl Into<String>, line: u32, branch_direction: bool) -> Self {
        Self {
            target_name: target_name.into(),
            line,
            branch_direction,
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.target_name,
            self.line,
            if self.branch_direction { "T" } else { "F" }
        )
    }
}

/// Sparse fitness map of one individual (lower is better, 0 = covered)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    scores: BTreeMap<Objective, f64>,
}

impl Evaluation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fitness for an objective, `UNMEASURED_FITNESS` when absent
    pub fn get(&self, objective: &Objective) -> f64 {
        self.scores
            .get(objective)
            .copied()
            .unwrap_or(UNMEASURED_FITNESS)
    }

    pub fn set(&mut self, objective: Objective, fitness: f64) {
        self.scores.insert(objective, fitness);
    }

    pub fn is_measured(&self, objective: &Objective) -> bool {
        self.scores.contains_key(objective)
    }

    /// Whether the objective was hit exactly
    pub fn covers(&self, objective: &Objective) -> bool {
        self.scores.get(objective) == Some(&0.0)
    }

    /// Merge another evaluation into this one, overwriting shared objectives
    pub fn merge(&mut self, other: Evaluation) {
        self.scores.extend(other.scores);
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Objective, &f64)> {
        self.scores.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_objective_value_equality() {
        let a = Objective::new("Token", 12, true);
        let b = Objective::new("Token".to_string(), 12, true);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&Objective::new("Token", 12, false)));
    }

    #[test]
    fn test_unmeasured_is_worst() {
        let mut eval = Evaluation::new();
        let obj = Objective::new("Token", 3, false);
        assert_eq!(eval.get(&obj), UNMEASURED_FITNESS);
        assert!(!eval.is_measured(&obj));

        eval.set(obj.clone(), 0.0);
        assert_eq!(eval.get(&obj), 0.0);
        assert!(eval.covers(&obj));
    }

    #[test]
    fn test_merge_overwrites() {
        let obj = Objective::new("Token", 3, false);
        let mut a = Evaluation::new();
        a.set(obj.clone(), 2.0);
        let mut b = Evaluation::new();
        b.set(obj.clone(), 0.5);
        a.merge(b);
        assert_eq!(a.get(&obj), 0.5);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(Objective::new("Vault", 40, true).to_string(), "Vault:40:T");
    }
}

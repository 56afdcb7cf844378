//! Coverage archive
//!
//! Records, per objective, the first individual observed to cover it exactly.
//! Entries are never overwritten.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::fitness::objective::Objective;
use crate::population::individual::{Individual, IndividualId};

/// Map from objective to its first covering individual
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    entries: BTreeMap<Objective, Individual>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a covering individual unless the objective is already archived
    ///
    /// Returns `true` if the entry was inserted.
    pub fn record(&mut self, objective: Objective, individual: &Individual) -> bool {
        if self.entries.contains_key(&objective) {
            return false;
        }
        self.entries.insert(objective, individual.clone());
        true
    }

    pub fn contains(&self, objective: &Objective) -> bool {
        self.entries.contains_key(objective)
    }

    pub fn get(&self, objective: &Objective) -> Option<&Individual> {
        self.entries.get(objective)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn objectives(&self) -> impl Iterator<Item = &Objective> {
        self.entries.keys()
    }

    /// Archived individuals, deduplicated by id, in objective order
    pub fn individuals(&self) -> Vec<Individual> {
        let mut seen: HashSet<IndividualId> = HashSet::new();
        self.entries
            .values()
            .filter(|ind| seen.insert(ind.id))
            .cloned()
            .collect()
    }

    /// Merge another archive, keeping existing entries
    pub fn absorb(&mut self, other: &Archive) {
        for (objective, individual) in &other.entries {
            self.record(objective.clone(), individual);
        }
    }
}

//! Identity allocation
//!
//! Gene and individual ids come from a per-search counter so that two runs
//! with the same seed produce identical identities.

use serde::{Deserialize, Serialize};

use crate::genome::gene::GeneId;
use crate::population::individual::IndividualId;

/// Sequential allocator for gene and individual ids
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IdGenerator {
    next_gene: u64,
    next_individual: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_gene_id(&mut self) -> GeneId {
        let id = GeneId(self.next_gene);
        self.next_gene += 1;
        id
    }

    pub fn next_individual_id(&mut self) -> IndividualId {
        let id = IndividualId(self.next_individual);
        self.next_individual += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential_and_independent() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_gene_id(), GeneId(0));
        assert_eq!(ids.next_gene_id(), GeneId(1));
        assert_eq!(ids.next_individual_id(), IndividualId(0));
        assert_eq!(ids.next_gene_id(), GeneId(2));
    }
}

//! Crossover operators
//!
//! Subtree exchange between two gene trees of matching semantic type.

use rand::Rng;

use crate::config::SearchConfig;
use crate::genome::gene::Gene;
use crate::population::individual::Individual;
use crate::sampling::traits::Sampler;

/// Reciprocal single-subtree swap crossover
#[derive(Clone, Debug)]
pub struct SubtreeCrossover {
    /// Probability that a visited node collects donor candidates
    pub crossover_chance: f64,
}

impl SubtreeCrossover {
    pub fn new(crossover_chance: f64) -> Self {
        Self { crossover_chance }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.crossover_chance)
    }

    /// Cross two parents, producing two children with fresh ids
    ///
    /// Both trees are deep-copied. Non-root nodes of the first copy are
    /// visited breadth-first; each visited node, with `crossover_chance`,
    /// pairs itself with every type-matching non-root node of the second
    /// copy. One recorded pair is then drawn uniformly and the two subtrees
    /// are swapped. Without candidates the children equal their parents.
    pub fn crossover<S: Sampler, R: Rng>(
        &self,
        parent1: &Individual,
        parent2: &Individual,
        sampler: &mut S,
        rng: &mut R,
    ) -> (Individual, Individual) {
        let mut tree1 = parent1.root.copy();
        let mut tree2 = parent2.root.copy();

        let candidates = self.collect_candidates(&tree1, &tree2, rng);
        if !candidates.is_empty() {
            let (site, donor) = &candidates[rng.gen_range(0..candidates.len())];
            swap_subtrees(&mut tree1, site, &mut tree2, donor);
        }

        (
            Individual::new(sampler.next_individual_id(), tree1),
            Individual::new(sampler.next_individual_id(), tree2),
        )
    }

    fn collect_candidates<R: Rng>(
        &self,
        tree1: &Gene,
        tree2: &Gene,
        rng: &mut R,
    ) -> Vec<(Vec<usize>, Vec<usize>)> {
        let donors: Vec<Vec<usize>> = tree2.breadth_first_positions().into_iter().skip(1).collect();
        let mut candidates = Vec::new();

        for site in tree1.breadth_first_positions().into_iter().skip(1) {
            if rng.gen::<f64>() >= self.crossover_chance {
                continue;
            }
            let Some(node) = tree1.get_subtree(&site) else {
                continue;
            };
            for donor in &donors {
                if tree2
                    .get_subtree(donor)
                    .is_some_and(|other| node.type_matches(other))
                {
                    candidates.push((site.clone(), donor.clone()));
                }
            }
        }

        candidates
    }
}

fn swap_subtrees(tree1: &mut Gene, site: &[usize], tree2: &mut Gene, donor: &[usize]) {
    let Some(incoming) = tree2.get_subtree(donor).cloned() else {
        return;
    };
    if let Some(outgoing) = tree1.replace_subtree(site, incoming) {
        tree2.replace_subtree(donor, outgoing);
    }
}

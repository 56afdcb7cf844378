//! MOSA ranking
//!
//! Many-objective sorting restricted to the objectives not yet covered: the
//! best individual per objective forms the first front, and later fronts are
//! built incrementally with a restricted dominance comparator.
//!
//! Reference: Panichella, A., Kifetew, F. M., & Tonella, P. (2015).
//! Reformulating Branch Coverage as a Many-Objective Optimization Problem.
//! IEEE ICST.

use std::cmp::Ordering;

use rand::Rng;

use crate::fitness::objective::Objective;
use crate::population::individual::Individual;

/// Pareto comparison restricted to a set of objectives
#[derive(Clone, Copy, Debug, Default)]
pub struct DominanceComparator;

impl DominanceComparator {
    /// Compare two individuals over `objectives`
    ///
    /// Returns -1 if only `a` dominates, 1 if only `b` dominates and 0
    /// otherwise. Stops as soon as each is strictly better somewhere.
    pub fn compare(a: &Individual, b: &Individual, objectives: &[Objective]) -> i8 {
        let mut a_better = false;
        let mut b_better = false;

        for objective in objectives {
            match a
                .fitness(objective)
                .partial_cmp(&b.fitness(objective))
                .unwrap_or(Ordering::Equal)
            {
                Ordering::Less => a_better = true,
                Ordering::Greater => b_better = true,
                Ordering::Equal => {}
            }
            if a_better && b_better {
                return 0;
            }
        }

        match (a_better, b_better) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }
}

/// Best individual per objective, as the first front
///
/// For each objective the lowest fitness wins. An exact tie goes to the
/// shorter test case when it has more than one call; otherwise a fair coin
/// decides. Winners get rank 0 and appear once, in objective order.
pub fn preference_criterion<R: Rng>(
    population: &mut [Individual],
    objectives: &[Objective],
    rng: &mut R,
) -> Vec<usize> {
    let mut front: Vec<usize> = Vec::new();
    if population.is_empty() {
        return front;
    }

    for objective in objectives {
        let mut best = 0;
        for candidate in 1..population.len() {
            let best_fitness = population[best].fitness(objective);
            let fitness = population[candidate].fitness(objective);
            if fitness < best_fitness {
                best = candidate;
            } else if fitness == best_fitness {
                let best_len = population[best].length();
                let len = population[candidate].length();
                if len < best_len && len > 1 {
                    best = candidate;
                } else if rng.gen::<bool>() {
                    best = candidate;
                }
            }
        }

        population[best].rank = 0;
        if !front.contains(&best) {
            front.push(best);
        }
    }

    front
}

/// Incrementally built non-dominated front over `remaining`
///
/// A candidate dominated by a current member is dropped; otherwise it joins
/// and evicts the members it dominates. The result depends on scan order.
pub fn get_non_dominated_front(
    population: &[Individual],
    objectives: &[Objective],
    remaining: &[usize],
) -> Vec<usize> {
    let mut front: Vec<usize> = Vec::new();

    for &candidate in remaining {
        let mut dominated = false;
        let mut evicted: Vec<usize> = Vec::new();

        for &member in &front {
            let order = DominanceComparator::compare(
                &population[candidate],
                &population[member],
                objectives,
            );
            match order {
                -1 => evicted.push(member),
                1 => {
                    dominated = true;
                    break;
                }
                _ => {}
            }
        }

        if !dominated {
            front.retain(|m| !evicted.contains(m));
            front.push(candidate);
        }
    }

    front
}

/// MOSA preference sorting
///
/// Front 0 comes from [`preference_criterion`]; further fronts are peeled off
/// the rest with [`get_non_dominated_front`] until `population_size`
/// individuals are ranked or none remain. Individuals left unranked are not
/// part of any front.
pub fn preference_sorting<R: Rng>(
    population: &mut [Individual],
    objectives: &[Objective],
    population_size: usize,
    rng: &mut R,
) -> Vec<Vec<usize>> {
    let mut fronts: Vec<Vec<usize>> = Vec::new();

    let first = preference_criterion(population, objectives, rng);
    let mut ranked = first.len();
    let mut remaining: Vec<usize> = (0..population.len()).filter(|i| !first.contains(i)).collect();
    if !first.is_empty() {
        fronts.push(first);
    }

    let mut rank = fronts.len();
    while ranked < population_size && !remaining.is_empty() {
        let front = get_non_dominated_front(population, objectives, &remaining);
        for &i in &front {
            population[i].rank = rank;
        }
        remaining.retain(|i| !front.contains(i));
        ranked += front.len();
        fronts.push(front);
        rank += 1;
    }

    fronts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::gene::{Gene, GeneId, GeneKind};
    use crate::population::individual::IndividualId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn objectives(n: usize) -> Vec<Objective> {
        (0..n).map(|i| Objective::new("T", i as u32 + 1, false)).collect()
    }

    fn individual(id: u64, calls: usize, objs: &[Objective], values: &[f64]) -> Individual {
        let children = (0..calls)
            .map(|c| {
                Gene::action(
                    GeneId(100 + c as u64),
                    "f",
                    "void",
                    GeneKind::FunctionCall,
                    vec![],
                )
            })
            .collect();
        let root = Gene::action(GeneId(id), "T", "T", GeneKind::Sequence, children);
        let mut ind = Individual::new(IndividualId(id), root);
        for (o, &v) in objs.iter().zip(values) {
            ind.evaluation.set(o.clone(), v);
        }
        ind
    }

    #[test]
    fn test_dominance_comparator() {
        let objs = objectives(2);
        let a = individual(0, 1, &objs, &[0.0, 1.0]);
        let b = individual(1, 1, &objs, &[1.0, 1.0]);
        let c = individual(2, 1, &objs, &[1.0, 0.0]);

        assert_eq!(DominanceComparator::compare(&a, &b, &objs), -1);
        assert_eq!(DominanceComparator::compare(&b, &c, &objs), 1);
        assert_eq!(DominanceComparator::compare(&b, &b, &objs), 0);

        let objs3 = objectives(3);
        let d = individual(3, 1, &objs3, &[1.0, 0.0, 1.0]);
        let e = individual(4, 1, &objs3, &[0.0, 1.0, 1.0]);
        assert_eq!(DominanceComparator::compare(&d, &e, &objs3), 0);
    }

    #[test]
    fn test_comparator_only_looks_at_given_objectives() {
        let objs = objectives(2);
        let a = individual(0, 1, &objs, &[0.0, 5.0]);
        let b = individual(1, 1, &objs, &[1.0, 0.0]);
        assert_eq!(DominanceComparator::compare(&a, &b, &objs), 0);
        assert_eq!(DominanceComparator::compare(&a, &b, &objs[..1]), -1);
    }

    #[test]
    fn test_preference_criterion_picks_best_per_objective() {
        let objs = objectives(2);
        let mut pop = vec![
            individual(0, 1, &objs, &[3.0, 3.0]),
            individual(1, 1, &objs, &[0.5, 2.0]),
            individual(2, 1, &objs, &[2.0, 0.1]),
        ];
        pop[1].rank = 7;
        let mut rng = StdRng::seed_from_u64(1);

        let front = preference_criterion(&mut pop, &objs, &mut rng);
        assert_eq!(front, vec![1, 2]);
        assert_eq!(pop[1].rank, 0);
    }

    #[test]
    fn test_preference_criterion_deduplicates() {
        let objs = objectives(3);
        let mut pop = vec![
            individual(0, 1, &objs, &[0.0, 0.0, 0.0]),
            individual(1, 1, &objs, &[1.0, 1.0, 1.0]),
        ];
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(preference_criterion(&mut pop, &objs, &mut rng), vec![0]);
    }

    #[test]
    fn test_preference_criterion_tie_prefers_shorter() {
        let objs = objectives(1);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let mut pop = vec![
                individual(0, 4, &objs, &[1.0]),
                individual(1, 2, &objs, &[1.0]),
            ];
            assert_eq!(preference_criterion(&mut pop, &objs, &mut rng), vec![1]);
        }
    }

    #[test]
    fn test_non_dominated_front_evicts_dominated_members() {
        let objs = objectives(2);
        let pop = vec![
            individual(0, 1, &objs, &[3.0, 3.0]),
            individual(1, 1, &objs, &[1.0, 4.0]),
            individual(2, 1, &objs, &[2.0, 2.0]),
            individual(3, 1, &objs, &[5.0, 5.0]),
        ];
        let front = get_non_dominated_front(&pop, &objs, &[0, 1, 2, 3]);
        assert_eq!(front, vec![1, 2]);
    }

    #[test]
    fn test_preference_sorting_stops_at_population_size() {
        let objs = objectives(2);
        let mut pop = vec![
            individual(0, 1, &objs, &[0.0, 9.0]),
            individual(1, 1, &objs, &[9.0, 0.0]),
            individual(2, 1, &objs, &[1.0, 1.0]),
            individual(3, 1, &objs, &[2.0, 2.0]),
            individual(4, 1, &objs, &[3.0, 3.0]),
        ];
        let mut rng = StdRng::seed_from_u64(4);

        let fronts = preference_sorting(&mut pop, &objs, 3, &mut rng);
        assert_eq!(fronts, vec![vec![0, 1], vec![2]]);
        assert_eq!(pop[2].rank, 1);

        let fronts = preference_sorting(&mut pop, &objs, 10, &mut rng);
        assert_eq!(fronts, vec![vec![0, 1], vec![2], vec![3], vec![4]]);
        assert_eq!(pop[4].rank, 3);
    }
}

//! NSGA-II ranking
//!
//! Fast non-dominated sorting, crowding distance and front-wise survivor
//! truncation over per-objective fitness (lower is better).
//!
//! Reference: Deb, K., Pratap, A., Agarwal, S., & Meyarivan, T. (2002).
//! A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II.
//! IEEE Transactions on Evolutionary Computation, 6(2).

use std::cmp::Ordering;

use crate::fitness::objective::Objective;
use crate::population::individual::Individual;

/// Pareto dominance over `objectives`
///
/// An objective on which both individuals score exactly 0 is ignored: a
/// shared covered branch cannot establish dominance.
pub fn dominates(a: &Individual, b: &Individual, objectives: &[Objective]) -> bool {
    let mut strictly_better = false;
    for objective in objectives {
        let fa = a.fitness(objective);
        let fb = b.fitness(objective);
        if fa == 0.0 && fb == 0.0 {
            continue;
        }
        if fa > fb {
            return false;
        }
        if fa < fb {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Fast non-dominated sort
///
/// Returns fronts of indices into `population`, where `fronts[0]` is the
/// Pareto-optimal front, and sets each individual's `rank` to its front index.
pub fn fast_non_dominated_sort(
    population: &mut [Individual],
    objectives: &[Objective],
) -> Vec<Vec<usize>> {
    let n = population.len();
    if n == 0 {
        return vec![];
    }

    // domination_count[i] = number of individuals that dominate i
    let mut domination_count = vec![0usize; n];
    // dominated_set[i] = individuals that i dominates
    let mut dominated_set: Vec<Vec<usize>> = vec![vec![]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            if dominates(&population[i], &population[j], objectives) {
                dominated_set[i].push(j);
                domination_count[j] += 1;
            } else if dominates(&population[j], &population[i], objectives) {
                dominated_set[j].push(i);
                domination_count[i] += 1;
            }
        }
    }

    let mut fronts: Vec<Vec<usize>> = vec![];
    let mut current_front: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();

    let mut rank = 0;
    while !current_front.is_empty() {
        for &i in &current_front {
            population[i].rank = rank;
        }

        let mut next_front = vec![];
        for &i in &current_front {
            for &j in &dominated_set[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    next_front.push(j);
                }
            }
        }

        fronts.push(current_front);
        current_front = next_front;
        rank += 1;
    }

    fronts
}

/// Calculate crowding distance for a front
///
/// Fronts of one or two individuals get infinite distance. A dimension on
/// which the whole front scores the same contributes nothing, boundaries
/// included.
pub fn calculate_crowding_distance(
    population: &mut [Individual],
    front: &[usize],
    objectives: &[Objective],
) {
    let n = front.len();
    if n == 0 {
        return;
    }
    if n <= 2 {
        for &i in front {
            population[i].crowding_distance = f64::INFINITY;
        }
        return;
    }

    for &i in front {
        population[i].crowding_distance = 0.0;
    }

    for objective in objectives {
        let mut sorted: Vec<usize> = front.to_vec();
        sorted.sort_by(|&a, &b| {
            population[a]
                .fitness(objective)
                .partial_cmp(&population[b].fitness(objective))
                .unwrap_or(Ordering::Equal)
        });

        let obj_min = population[sorted[0]].fitness(objective);
        let obj_max = population[sorted[n - 1]].fitness(objective);
        let obj_range = obj_max - obj_min;
        if obj_range <= 0.0 {
            continue;
        }

        population[sorted[0]].crowding_distance = f64::INFINITY;
        population[sorted[n - 1]].crowding_distance = f64::INFINITY;

        for w in sorted.windows(3) {
            let prev_val = population[w[0]].fitness(objective);
            let next_val = population[w[2]].fitness(objective);
            population[w[1]].crowding_distance += (next_val - prev_val) / obj_range;
        }
    }
}

/// Front-wise survivor selection
///
/// Whole fronts are admitted in order while they fit. The first front that
/// would overflow is ordered by crowding distance (highest first, stable) and
/// cut to fill exactly `population_size` slots. Crowding distance is
/// recomputed for every visited front.
pub fn truncate_by_fronts(
    mut population: Vec<Individual>,
    fronts: &[Vec<usize>],
    objectives: &[Objective],
    population_size: usize,
) -> Vec<Individual> {
    let mut selected: Vec<usize> = Vec::with_capacity(population_size);

    for front in fronts {
        if selected.len() >= population_size {
            break;
        }
        calculate_crowding_distance(&mut population, front, objectives);

        if selected.len() + front.len() <= population_size {
            selected.extend_from_slice(front);
        } else {
            let mut sorted_front: Vec<usize> = front.to_vec();
            sorted_front.sort_by(|&a, &b| {
                population[b]
                    .crowding_distance
                    .partial_cmp(&population[a].crowding_distance)
                    .unwrap_or(Ordering::Equal)
            });

            let remaining = population_size - selected.len();
            selected.extend(sorted_front.into_iter().take(remaining));
            break;
        }
    }

    let mut slots: Vec<Option<Individual>> = population.into_iter().map(Some).collect();
    selected
        .into_iter()
        .filter_map(|i| slots.get_mut(i).and_then(Option::take))
        .collect()
}

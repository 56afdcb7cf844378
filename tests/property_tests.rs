//! Property-based tests for evo-testgen
//!
//! Uses proptest to verify invariants of genes, operators and ranking.

use evo_testgen::prelude::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn counter_sampler() -> ApiSampler {
    let model = ApiModel::new(
        "Counter",
        vec![
            ActionDescriptor::function("add", "void", &["uint8", "int16"]),
            ActionDescriptor::function("label", "void", &["string", "bool"]),
            ActionDescriptor::function("current", "uint8", &[]),
            ActionDescriptor::function("scaled", "int16", &["uint8"]),
        ],
    );
    ApiSampler::new(model, SearchConfig::default().with_max_depth(3))
}

fn ranked_population(vectors: &[Vec<f64>]) -> (Vec<Individual>, Vec<Objective>) {
    let width = vectors.first().map_or(0, Vec::len);
    let objectives: Vec<Objective> = (0..width)
        .map(|i| Objective::new("T", i as u32, true))
        .collect();
    let population = vectors
        .iter()
        .enumerate()
        .map(|(i, values)| {
            let root = Gene::action(GeneId(i as u64), "T", "T", GeneKind::Sequence, vec![]);
            let mut ind = Individual::new(IndividualId(i as u64), root);
            for (objective, &value) in objectives.iter().zip(values) {
                ind.evaluation.set(objective.clone(), value);
            }
            ind
        })
        .collect();
    (population, objectives)
}

fn fitness_vectors(width: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(
        prop::collection::vec(prop_oneof![Just(0.0), 0.0..10.0f64], width),
        1..12,
    )
}

proptest! {
    // ==================== Gene Properties ====================

    #[test]
    fn childless_genes_have_no_children(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sampler = counter_sampler();
        let individual = sampler.sample_individual(&mut rng).unwrap();

        for path in individual.root.positions() {
            let gene = individual.root.get_subtree(&path).unwrap();
            if !gene.has_children() {
                prop_assert!(gene.children().is_empty());
            }
        }
    }

    #[test]
    fn copy_is_independent(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sampler = counter_sampler();
        let original = sampler.sample_individual(&mut rng).unwrap().root;
        let snapshot = original.clone();

        let mut copy = original.copy();
        prop_assert_eq!(&copy, &original);

        let paths = copy.positions();
        let path = &paths[paths.len() - 1];
        let replacement = sampler.sample_value("bool", &mut rng).unwrap();
        copy.replace_subtree(path, replacement);

        prop_assert_eq!(original, snapshot);
    }

    #[test]
    fn sampled_values_respect_their_domain(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sampler = counter_sampler();
        let individual = sampler.sample_individual(&mut rng).unwrap();

        for path in individual.root.positions() {
            if let Some(Gene::Primitive(p)) = individual.root.get_subtree(&path) {
                if let (PrimitiveValue::Numeric(v), Some((lo, hi))) = (&p.value, p.ty.domain(16)) {
                    prop_assert!(*v >= lo && *v <= hi);
                }
            }
        }
    }

    // ==================== Operator Properties ====================

    #[test]
    fn mutation_leaves_parent_untouched(seed in any::<u64>(), resample in 0.0..1.0f64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sampler = counter_sampler();
        let parent = sampler.sample_individual(&mut rng).unwrap();
        let snapshot = parent.clone();

        let child = TreeMutation::new(resample, 0.8)
            .mutate(&parent, &mut sampler, &mut rng)
            .unwrap();
        prop_assert_eq!(&parent, &snapshot);
        prop_assert_eq!(child.id, parent.id);
    }

    #[test]
    fn crossover_preserves_total_size(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sampler = counter_sampler();
        let a = sampler.sample_individual(&mut rng).unwrap();
        let b = sampler.sample_individual(&mut rng).unwrap();

        let (c1, c2) = SubtreeCrossover::new(0.8).crossover(&a, &b, &mut sampler, &mut rng);
        prop_assert_eq!(c1.root.size() + c2.root.size(), a.root.size() + b.root.size());
        prop_assert!(c1.id != a.id && c2.id != b.id);
    }

    #[test]
    fn crossover_without_matching_types_copies_parents(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut left = ApiSampler::new(
            ApiModel::new("Left", vec![ActionDescriptor::function("push", "void", &["uint8"])]),
            SearchConfig::default(),
        );
        let mut right = ApiSampler::new(
            ApiModel::new("Right", vec![ActionDescriptor::function("flag", "bool", &["string"])]),
            SearchConfig::default(),
        );
        let a = left.sample_individual(&mut rng).unwrap();
        let b = right.sample_individual(&mut rng).unwrap();

        let (c1, c2) = SubtreeCrossover::new(1.0).crossover(&a, &b, &mut left, &mut rng);
        prop_assert_eq!(c1.root, a.root);
        prop_assert_eq!(c2.root, b.root);
    }

    #[test]
    fn tournament_returns_member_index(seed in any::<u64>(), size in 2usize..8, n in 1usize..20) {
        let mut rng = StdRng::seed_from_u64(seed);
        let (population, _) = ranked_population(&vec![vec![1.0]; n]);
        let selection = TournamentSelection::new(size).unwrap();
        let index = selection.select(&population, &mut rng).unwrap();
        prop_assert!(index < n);
    }

    // ==================== Ranking Properties ====================

    #[test]
    fn fronts_partition_and_respect_dominance(vectors in fitness_vectors(3)) {
        let (mut population, objectives) = ranked_population(&vectors);
        let fronts = fast_non_dominated_sort(&mut population, &objectives);

        let mut seen: Vec<usize> = fronts.iter().flatten().copied().collect();
        seen.sort();
        prop_assert_eq!(seen, (0..population.len()).collect::<Vec<_>>());

        for (rank, front) in fronts.iter().enumerate() {
            for &i in front {
                prop_assert_eq!(population[i].rank, rank);
                for &j in front {
                    prop_assert!(!dominates(&population[i], &population[j], &objectives));
                }
                if rank > 0 {
                    prop_assert!(fronts[rank - 1]
                        .iter()
                        .any(|&k| dominates(&population[k], &population[i], &objectives)));
                }
            }
        }
    }

    #[test]
    fn crowding_distance_is_non_negative(vectors in fitness_vectors(2)) {
        let (mut population, objectives) = ranked_population(&vectors);
        let front: Vec<usize> = (0..population.len()).collect();
        calculate_crowding_distance(&mut population, &front, &objectives);

        for individual in &population {
            prop_assert!(individual.crowding_distance >= 0.0);
        }
        if population.len() <= 2 {
            prop_assert!(population.iter().all(|i| i.crowding_distance.is_infinite()));
        }
    }

    #[test]
    fn dominance_comparator_is_antisymmetric(vectors in fitness_vectors(4)) {
        let (population, objectives) = ranked_population(&vectors);
        for a in &population {
            for b in &population {
                let forward = DominanceComparator::compare(a, b, &objectives);
                let backward = DominanceComparator::compare(b, a, &objectives);
                prop_assert_eq!(forward, -backward);
            }
        }
    }

    #[test]
    fn truncation_keeps_requested_size(vectors in fitness_vectors(2), size in 1usize..12) {
        let (mut population, objectives) = ranked_population(&vectors);
        let total = population.len();
        let fronts = fast_non_dominated_sort(&mut population, &objectives);
        let survivors = truncate_by_fronts(population, &fronts, &objectives, size);
        prop_assert_eq!(survivors.len(), size.min(total));
    }

    // ==================== Fitness Properties ====================

    #[test]
    fn branch_distance_is_normalised(left in -1.0e6..1.0e6f64, right in -1.0e6..1.0e6f64) {
        for opcode in [Opcode::Gt, Opcode::Sgt, Opcode::Lt, Opcode::Slt, Opcode::Eq] {
            let d = branch_distance(opcode, left, right);
            prop_assert!((0.0..1.0).contains(&d));
        }
    }
}

//! Selection operators
//!
//! Parent selection by crowded tournament.

use rand::Rng;

use crate::error::OperatorError;
use crate::population::individual::Individual;

/// Tournament selection operator
///
/// Draws `tournament_size` contestants uniformly with replacement and keeps
/// the best by crowded comparison (lower rank, then higher crowding
/// distance). The first contestant seen wins remaining ties.
#[derive(Clone, Debug)]
pub struct TournamentSelection {
    /// Tournament size (number of draws)
    pub tournament_size: usize,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    pub fn new(tournament_size: usize) -> Result<Self, OperatorError> {
        if tournament_size < 2 {
            return Err(OperatorError::InvalidArgument(format!(
                "tournament size must be at least 2, got {}",
                tournament_size
            )));
        }
        Ok(Self { tournament_size })
    }

    /// Create binary tournament selection (size = 2)
    pub fn binary() -> Self {
        Self { tournament_size: 2 }
    }

    /// Select one individual, returning its index in `population`
    pub fn select<R: Rng>(
        &self,
        population: &[Individual],
        rng: &mut R,
    ) -> Result<usize, OperatorError> {
        if population.is_empty() {
            return Err(OperatorError::InvalidArgument(
                "cannot select from an empty population".to_string(),
            ));
        }

        let mut winner = rng.gen_range(0..population.len());
        for _ in 1..self.tournament_size {
            let contender = rng.gen_range(0..population.len());
            if population[contender].is_better_than(&population[winner]) {
                winner = contender;
            }
        }

        Ok(winner)
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self::binary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::gene::{Gene, GeneId, GeneKind};
    use crate::population::individual::IndividualId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn population(ranks: &[(usize, f64)]) -> Vec<Individual> {
        ranks
            .iter()
            .enumerate()
            .map(|(i, &(rank, crowding))| {
                let root = Gene::action(GeneId(i as u64), "T", "T", GeneKind::Sequence, vec![]);
                let mut ind = Individual::new(IndividualId(i as u64), root);
                ind.rank = rank;
                ind.crowding_distance = crowding;
                ind
            })
            .collect()
    }

    #[test]
    fn test_tournament_size_below_two_is_rejected() {
        assert!(matches!(
            TournamentSelection::new(1),
            Err(OperatorError::InvalidArgument(_))
        ));
        assert!(TournamentSelection::new(0).is_err());
        assert!(TournamentSelection::new(2).is_ok());
    }

    #[test]
    fn test_tournament_selection_selects_valid_index() {
        let mut rng = StdRng::seed_from_u64(1);
        let pop = population(&[(0, 1.0), (1, 1.0), (2, 1.0)]);
        let selection = TournamentSelection::new(3).unwrap();
        for _ in 0..100 {
            let idx = selection.select(&pop, &mut rng).unwrap();
            assert!(idx < pop.len());
        }
    }

    #[test]
    fn test_tournament_favours_lower_rank() {
        let mut rng = StdRng::seed_from_u64(2);
        let pop = population(&[(0, 0.0), (3, 10.0), (3, 10.0), (3, 10.0)]);
        let selection = TournamentSelection::new(4).unwrap();

        let best_count = (0..1000)
            .filter(|_| selection.select(&pop, &mut rng).unwrap() == 0)
            .count();
        // P(best drawn at least once in 4 draws) = 1 - (3/4)^4 ~ 0.68
        assert!(best_count > 550);
    }

    #[test]
    fn test_large_tournament_breaks_rank_ties_by_crowding() {
        let mut rng = StdRng::seed_from_u64(3);
        let pop = population(&[(0, 1.0), (0, f64::INFINITY)]);
        let selection = TournamentSelection::new(50).unwrap();
        for _ in 0..20 {
            assert_eq!(selection.select(&pop, &mut rng).unwrap(), 1);
        }
    }

    #[test]
    fn test_empty_population_is_rejected() {
        let mut rng = StdRng::seed_from_u64(4);
        assert!(TournamentSelection::binary().select(&[], &mut rng).is_err());
    }
}

use crate::Probability;
use crate::model::offspring::Offspring;
use crate::tree::tree::Tree;
use ndarray::Array1;
use std::collections::BTreeMap;

/// anything a minimizer can descend on.
pub trait Cost {
    fn cost(&self, x: &Array1<f64>) -> f64;
}

/// Importance-weighted pseudo-likelihood of a candidate distribution
/// against a chain trajectory: each tree scores the candidate's
/// likelihood over the likelihood under the distribution that drove
/// the chain, correcting for having sampled there instead. degree
/// censuses and driving-likelihood weights are frozen at construction
/// so each evaluation is a product over censuses.
#[derive(Debug)]
pub struct Objective {
    censuses: Vec<BTreeMap<usize, usize>>,
    priors: Vec<Probability>,
    width: usize,
}

impl From<(&[Tree], &Offspring)> for Objective {
    fn from((trajectory, prior): (&[Tree], &Offspring)) -> Self {
        let censuses = trajectory.iter().map(Tree::degrees).collect::<Vec<_>>();
        let priors = censuses
            .iter()
            .map(|census| prior.weigh(census))
            .collect::<Vec<_>>();
        Self {
            censuses,
            priors,
            width: prior.width(),
        }
    }
}

impl Objective {
    /// dimension of the unconstrained search space: one exponent per
    /// support point, less the fixed reference.
    pub fn dimension(&self) -> usize {
        self.width - 1
    }
    /// the importance-weighted objective, to maximize.
    pub fn score(&self, offspring: &Offspring) -> f64 {
        self.censuses
            .iter()
            .zip(self.priors.iter())
            .map(|(census, prior)| offspring.weigh(census) / prior)
            .sum()
    }
}

impl Cost for Objective {
    fn cost(&self, alpha: &Array1<f64>) -> f64 {
        -self.score(&Offspring::reparametrize(alpha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn trajectory() -> (Vec<Tree>, Offspring) {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let fork = Offspring::try_from(vec![0.5, 0.5]).expect("unit mass");
        let trees = (0..20)
            .map(|_| Tree::generate(&fork, 3, rng))
            .collect::<Vec<_>>();
        (trees, fork)
    }

    #[test]
    fn dimension_drops_the_reference() {
        let (trees, fork) = trajectory();
        let objective = Objective::from((&trees[..], &fork));
        assert!(objective.dimension() == 1);
    }

    #[test]
    fn scoring_the_driving_distribution_counts_the_trees() {
        let (trees, fork) = trajectory();
        let objective = Objective::from((&trees[..], &fork));
        assert!(objective.score(&fork) == trees.len() as f64);
    }

    #[test]
    fn cost_rewards_distributions_matching_the_trees() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let fork = Offspring::try_from(vec![0.0, 1.0]).expect("unit mass");
        let trees = (0..10)
            .map(|_| Tree::generate(&fork, 3, rng))
            .collect::<Vec<_>>();
        let prior = Offspring::try_from(vec![0.5, 0.5]).expect("unit mass");
        let objective = Objective::from((&trees[..], &prior));
        // alpha below the reference shifts mass toward two children,
        // which is what every tree in this trajectory shows
        assert!(objective.cost(&arr1(&[-3.0])) < objective.cost(&arr1(&[1.0])));
    }
}

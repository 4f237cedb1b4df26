use super::minimizer::Minimizer;
use super::objective::Cost;
use super::objective::Objective;
use crate::model::offspring::Offspring;
use ndarray::Array1;
use rand::Rng;

/// Importance-weighted re-estimation of the offspring distribution
/// from a chain trajectory: a wide uniform scan over the exponent
/// space seeds a single quasi-Newton polish. the scan keeps the first
/// of tied minima, so a fixed rng seed fixes the whole estimate.
pub struct Estimator {
    objective: Objective,
}

impl From<Objective> for Estimator {
    fn from(objective: Objective) -> Self {
        Self { objective }
    }
}

/// the re-estimated distribution plus refinement diagnostics.
/// non-convergence is diagnostic, not fatal: the estimate still
/// carries the best point found.
#[derive(Debug, Clone)]
pub struct Estimate {
    offspring: Offspring,
    score: f64,
    iterations: usize,
    converged: bool,
}

impl Estimate {
    pub fn offspring(&self) -> &Offspring {
        &self.offspring
    }
    /// the importance-weighted objective at the estimate.
    pub fn score(&self) -> f64 {
        self.score
    }
    pub fn iterations(&self) -> usize {
        self.iterations
    }
    pub fn converged(&self) -> bool {
        self.converged
    }
}

impl Estimator {
    /// hyperparameter that determines how many seeds the scan draws
    const fn starts(&self) -> usize {
        1000
    }

    /// scan, then polish. all seeds are drawn from the rng up front in
    /// seed-major coordinate-minor order; the scan evaluations are
    /// pure, so rayon fans them out without disturbing reproducibility.
    pub fn estimate(&self, rng: &mut impl Rng) -> Estimate {
        use rayon::iter::IntoParallelRefIterator;
        use rayon::iter::ParallelIterator;
        let dimension = self.objective.dimension();
        let seeds = (0..self.starts())
            .map(|_| {
                (0..dimension)
                    .map(|_| rng.random::<f64>())
                    .collect::<Array1<f64>>()
            })
            .collect::<Vec<_>>();
        let costs = seeds
            .par_iter()
            .map(|seed| self.objective.cost(seed))
            .collect::<Vec<_>>();
        let best = costs
            .iter()
            .enumerate()
            .fold(0, |best, (i, cost)| match *cost < costs[best] {
                true => i,
                false => best,
            });
        log::info!(
            "scanned {} seeds, best cost {:.6} at seed {}",
            self.starts(),
            costs[best],
            best
        );
        let minimum = Minimizer::from(&self.objective).descend(seeds[best].clone());
        log::info!(
            "polished to {:.6} after {} iterations (converged: {})",
            minimum.value(),
            minimum.iterations(),
            minimum.converged()
        );
        Estimate {
            offspring: Offspring::reparametrize(minimum.point()),
            score: -minimum.value(),
            iterations: minimum.iterations(),
            converged: minimum.converged(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcmc::chain::Chain;
    use crate::sampling::observation::Observation;
    use crate::tree::tree::Tree;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn estimates_live_on_the_simplex() {
        let ref mut rng = SmallRng::seed_from_u64(6);
        let fork = Offspring::try_from(vec![0.4, 0.4, 0.2]).expect("unit mass");
        let hidden = Tree::generate(&fork, 4, rng);
        let observation = Observation::observe(&hidden, 0.5, rng).expect("valid rate");
        let chain = Chain::from((&observation, &fork, 4, 0.5));
        let trajectory = chain.run(hidden, 200, rng).expect("editable trees");
        let estimator = Estimator::from(Objective::from((&trajectory[..], &fork)));
        let estimate = estimator.estimate(rng);
        let mass = estimate.offspring().weights().iter().sum::<f64>();
        assert!((mass - 1.0).abs() < 1e-6);
        assert!(estimate.offspring().width() == 3);
    }

    #[test]
    fn unanimous_trajectories_concentrate_the_estimate() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let fork = Offspring::try_from(vec![0.0, 1.0]).expect("unit mass");
        let trees = (0..20)
            .map(|_| Tree::generate(&fork, 3, rng))
            .collect::<Vec<_>>();
        let prior = Offspring::try_from(vec![0.5, 0.5]).expect("unit mass");
        let estimator = Estimator::from(Objective::from((&trees[..], &prior)));
        let estimate = estimator.estimate(rng);
        assert!(estimate.offspring().density(2) > 0.9);
    }

    #[test]
    fn fixed_seed_fixes_the_estimate() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let fork = Offspring::try_from(vec![0.3, 0.3, 0.4]).expect("unit mass");
        let trees = (0..10)
            .map(|_| Tree::generate(&fork, 3, rng))
            .collect::<Vec<_>>();
        let estimator = Estimator::from(Objective::from((&trees[..], &fork)));
        let ref mut one = SmallRng::seed_from_u64(7);
        let ref mut two = SmallRng::seed_from_u64(7);
        let first = estimator.estimate(one);
        let second = estimator.estimate(two);
        assert!(first.offspring() == second.offspring());
        assert!(first.score() == second.score());
    }

    #[test]
    fn width_one_needs_no_search() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let chain = Offspring::try_from(vec![1.0]).expect("unit mass");
        let trees = vec![Tree::generate(&chain, 3, rng)];
        let estimator = Estimator::from(Objective::from((&trees[..], &chain)));
        let estimate = estimator.estimate(rng);
        assert!(estimate.converged());
        assert!(estimate.offspring().density(1) == 1.0);
    }
}

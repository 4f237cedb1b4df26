use super::offspring::Offspring;
use crate::Probability;
use crate::tree::tree::Tree;
use std::collections::BTreeMap;

impl Offspring {
    /// probability that the branching process grows exactly this tree:
    /// the product over nodes of the density of each node's child
    /// count, collapsed over the degree census so repeats exponentiate.
    /// a zero density with nonzero count zeroes the whole product.
    pub fn likelihood(&self, tree: &Tree) -> Probability {
        self.weigh(&tree.degrees())
    }
    /// the same product from a precomputed census, for callers that
    /// evaluate many distributions against the same tree.
    pub fn weigh(&self, census: &BTreeMap<usize, usize>) -> Probability {
        census
            .iter()
            .map(|(degree, count)| self.density(*degree).powi(*count as i32))
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn single_node_is_certain() {
        let offspring = Offspring::try_from(vec![0.2, 0.5, 0.3]).expect("unit mass");
        assert!(offspring.likelihood(&Tree::default()) == 1.0);
    }

    #[test]
    fn deterministic_growth_is_certain() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let offspring = Offspring::try_from(vec![0.0, 1.0, 0.0]).expect("unit mass");
        let tree = Tree::generate(&offspring, 3, rng);
        assert!(tree.len() == 7);
        assert!(offspring.likelihood(&tree) == 1.0);
    }

    #[test]
    fn likelihood_is_a_probability() {
        let ref mut rng = SmallRng::seed_from_u64(11);
        let offspring = Offspring::try_from(vec![0.2, 0.5, 0.3]).expect("unit mass");
        for _ in 0..32 {
            let tree = Tree::generate(&offspring, 4, rng);
            let likelihood = offspring.likelihood(&tree);
            assert!(0.0 <= likelihood && likelihood <= 1.0);
        }
    }

    #[test]
    fn factors_multiply_over_internal_nodes() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let offspring = Offspring::try_from(vec![0.0, 1.0, 0.0]).expect("unit mass");
        let tree = Tree::generate(&offspring, 3, rng);
        let skewed = Offspring::try_from(vec![0.25, 0.5, 0.25]).expect("unit mass");
        assert!(skewed.likelihood(&tree) == 0.5f64.powi(3));
    }

    #[test]
    fn unreachable_degree_zeroes_the_product() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let wide = Offspring::try_from(vec![0.0, 0.0, 1.0]).expect("unit mass");
        let tree = Tree::generate(&wide, 3, rng);
        let narrow = Offspring::try_from(vec![1.0]).expect("unit mass");
        assert!(narrow.likelihood(&tree) == 0.0);
    }

    #[test]
    fn zero_weight_degree_zeroes_the_product() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let binary = Offspring::try_from(vec![0.0, 1.0, 0.0]).expect("unit mass");
        let tree = Tree::generate(&binary, 3, rng);
        let disjoint = Offspring::try_from(vec![0.5, 0.0, 0.5]).expect("unit mass");
        assert!(disjoint.likelihood(&tree) == 0.0);
    }
}

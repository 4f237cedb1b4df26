use super::embedding;
use crate::Count;
use crate::Error;
use crate::Probability;
use crate::tree::tree::Tree;
use petgraph::graph::NodeIndex;
use rand::Rng;
use std::collections::BTreeSet;

/// The visible fraction of a hidden tree.
///
/// each node of the hidden tree survives an independent retention
/// coin; the observation is the union of root paths of the survivors,
/// so it is itself a tree sharing the hidden root. the root is always
/// present, survivor or not. frozen once constructed.
#[derive(Debug, Clone)]
pub struct Observation {
    tree: Tree,
    retained: usize,
}

impl Observation {
    /// sample an observation from a full tree. coins are flipped in
    /// node index order, one per node, survivors counted before the
    /// path closure fills in their ancestors.
    pub fn observe(tree: &Tree, retention: Probability, rng: &mut impl Rng) -> Result<Self, Error> {
        if !(0.0..=1.0).contains(&retention) {
            return Err(Error::InvalidProbability(retention));
        }
        let survivors = tree
            .graph()
            .node_indices()
            .filter(|_| rng.random::<f64>() < retention)
            .collect::<Vec<_>>();
        let retained = survivors.len();
        let mut kept = BTreeSet::new();
        kept.insert(NodeIndex::new(0));
        for survivor in survivors {
            let mut node = tree.at(survivor);
            loop {
                if !kept.insert(node.index()) {
                    break;
                }
                match node.parent() {
                    Some(parent) => node = parent,
                    None => break,
                }
            }
        }
        let kept = kept.into_iter().collect::<Vec<_>>();
        let tree = tree.retain(&kept);
        debug_assert!(tree.rooted());
        log::trace!("retained {} nodes, observed tree of {}", retained, tree.len());
        Ok(Self { tree, retained })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }
    /// how many nodes survived the coin, before path closure.
    pub fn retained(&self) -> usize {
        self.retained
    }
    /// number of embeddings of this observation into a candidate.
    pub fn embeddings(&self, candidate: &Tree) -> Count {
        embedding::embeddings(&self.tree, candidate)
    }
    /// probability of this observation arising from the candidate:
    /// every embedding carries the same bernoulli weight, retained
    /// nodes surviving and the rest of the candidate hidden, so the
    /// count scales it.
    pub fn probability(&self, candidate: &Tree, retention: Probability) -> Probability {
        let count = self.embeddings(candidate);
        if count == 0.0 {
            return 0.0;
        }
        let hidden = (candidate.len() - self.retained) as i32;
        count * retention.powi(self.retained as i32) * (1.0 - retention).powi(hidden)
    }
}

use crate::Error;
use crate::Probability;
use crate::model::offspring::Offspring;
use crate::tree::tree::Tree;
use rand::Rng;

/// which way an edit site gets edited.
#[derive(Debug, Clone, Copy)]
enum Edit {
    Add,
    Remove,
}

impl std::fmt::Display for Edit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Edit::Add => write!(f, "add"),
            Edit::Remove => write!(f, "remove"),
        }
    }
}

/// One reversible local edit of the current tree: a fresh branch
/// grafted under an internal node, or an existing branch cut. carries
/// the transition densities of both directions so the acceptance rule
/// can correct for the asymmetry of the move.
#[derive(Debug, Clone)]
pub struct Proposal {
    candidate: Tree,
    forward: Probability,
    backward: Probability,
}

impl From<(Tree, Probability, Probability)> for Proposal {
    fn from((candidate, forward, backward): (Tree, Probability, Probability)) -> Self {
        Self {
            candidate,
            forward,
            backward,
        }
    }
}

impl Proposal {
    /// draw one edit. rng consumption order: edit site, then the
    /// direction coin when the degree allows both directions, then
    /// either the branch growth or the doomed-child pick.
    ///
    /// degree pins the direction at the boundaries: a single child
    /// must grow (cutting would orphan the site's internal status),
    /// a full brood must shrink. each density carries a 1/2 factor
    /// exactly when its direction was coin-contingent, and divides by
    /// the edit-site normalizer of its own tree. IEEE division is
    /// deliberate: one internal node means a zero normalizer and an
    /// infinite density, resolved downstream by the acceptance rule.
    pub fn propose(
        current: &Tree,
        offspring: &Offspring,
        depth: usize,
        rng: &mut impl Rng,
    ) -> Result<Self, Error> {
        use rand::prelude::IndexedRandom;
        let internals = current.internals();
        let site = *internals.choose(rng).ok_or(Error::NoEligibleMove)?;
        let node = current.at(site);
        let d = node.degree();
        let l = node.depth();
        let w = offspring.width();
        let edit = if d == 1 {
            Edit::Add
        } else if d == w {
            Edit::Remove
        } else if rng.random::<f64>() < 0.5 {
            Edit::Add
        } else {
            Edit::Remove
        };
        log::trace!("{} at {} (degree {}, depth {})", edit, node, d, l);
        match edit {
            Edit::Add => {
                let branch = Tree::generate(offspring, depth.saturating_sub(l + 1), rng);
                let candidate = current.adjoin(site, &branch);
                let forward = 0.5f64.powi((d > 1) as i32) * offspring.likelihood(&branch)
                    / Self::normalizer(current);
                let backward = 0.5f64.powi((d + 1 < w) as i32) / (d + 1) as f64
                    / Self::normalizer(&candidate);
                Ok(Self::from((candidate, forward, backward)))
            }
            Edit::Remove => {
                let children = node.children();
                let child = children.choose(rng).copied().expect("internal node has children");
                let branch = current.subtree(child.index());
                let candidate = current.without(child.index());
                let forward =
                    0.5f64.powi((d < w) as i32) / d as f64 / Self::normalizer(current);
                let backward = 0.5f64.powi((d - 1 > 1) as i32) * offspring.likelihood(&branch)
                    / Self::normalizer(&candidate);
                Ok(Self::from((candidate, forward, backward)))
            }
        }
    }
    /// count of edit sites less one: nodes minus leaves minus 1.
    /// zero for a tree whose only internal node is the root.
    fn normalizer(tree: &Tree) -> f64 {
        (tree.len() - tree.leaves()) as f64 - 1.0
    }

    pub fn candidate(&self) -> &Tree {
        &self.candidate
    }
    pub fn forward(&self) -> Probability {
        self.forward
    }
    pub fn backward(&self) -> Probability {
        self.backward
    }
    pub fn accept(self) -> Tree {
        self.candidate
    }
}

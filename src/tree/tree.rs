use super::node::Node;
use crate::model::offspring::Offspring;
use petgraph::Direction::Incoming;
use petgraph::Direction::Outgoing;
use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;
use rand::Rng;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// A rooted tree over unit payloads: all the structure lives in the
/// topology. The root sits at NodeIndex(0) and stays there through
/// every rebuild; every non-root node has exactly one parent; parents
/// always carry smaller indices than their children, which makes
/// index order a valid top-down traversal order.
///
/// Mutation is wholesale. Growth, grafting and pruning all return a
/// fresh Tree rather than editing in place, since the Markov chain
/// needs the predecessor intact to compare against.
#[derive(Debug, Clone)]
pub struct Tree(DiGraph<(), ()>);

impl Default for Tree {
    fn default() -> Self {
        let mut graph = DiGraph::new();
        graph.add_node(());
        Self(graph)
    }
}

impl Tree {
    pub fn at(&self, index: NodeIndex) -> Node {
        Node::from((index, &self.0))
    }
    pub fn root(&self) -> Node {
        self.at(NodeIndex::new(0))
    }
    pub fn graph(&self) -> &DiGraph<(), ()> {
        &self.0
    }
    /// number of nodes.
    pub fn len(&self) -> usize {
        self.0.node_count()
    }
    /// number of leaves.
    pub fn leaves(&self) -> usize {
        self.0.externals(Outgoing).count()
    }
    /// indices of the internal nodes, ascending.
    pub fn internals(&self) -> Vec<NodeIndex> {
        self.0
            .node_indices()
            .filter(|index| self.at(*index).degree() > 0)
            .collect()
    }
    /// census of out-degrees: how many nodes bear how many children.
    pub fn degrees(&self) -> BTreeMap<usize, usize> {
        self.0
            .node_indices()
            .map(|index| self.at(index).degree())
            .fold(BTreeMap::new(), |mut census, degree| {
                *census.entry(degree).or_insert(0) += 1;
                census
            })
    }
    /// nodes grouped by depth, root first, each level in index order.
    pub fn levels(&self) -> Vec<Vec<Node>> {
        let mut levels = vec![vec![self.root()]];
        loop {
            let next = levels
                .last()
                .expect("at least the root level")
                .iter()
                .flat_map(|node| node.children())
                .collect::<Vec<_>>();
            if next.is_empty() {
                break levels;
            }
            levels.push(next);
        }
    }

    /// branching-process growth. levels are laid down breadth-first:
    /// every node on levels 0..depth-1 draws a child count from the
    /// offspring distribution, and the last level never reproduces.
    /// a budget of zero or one yields the single-node tree.
    pub fn generate(offspring: &Offspring, depth: usize, rng: &mut impl Rng) -> Self {
        let mut graph = DiGraph::new();
        let mut level = vec![graph.add_node(())];
        for _ in 1..depth {
            level = level
                .into_iter()
                .flat_map(|parent| {
                    (0..offspring.draw(rng))
                        .map(|_| {
                            let child = graph.add_node(());
                            graph.add_edge(parent, child, ());
                            child
                        })
                        .collect::<Vec<_>>()
                })
                .collect();
        }
        Self(graph)
    }

    /// graft a branch under an existing node. branch indices shift up
    /// by the current node count, so the branch root lands at offset.
    pub fn adjoin(&self, at: NodeIndex, branch: &Self) -> Self {
        let mut graph = self.0.clone();
        let offset = graph.node_count();
        for _ in branch.0.node_indices() {
            graph.add_node(());
        }
        for edge in branch.0.edge_indices() {
            let (tail, head) = branch.0.edge_endpoints(edge).expect("edge in branch");
            graph.add_edge(
                NodeIndex::new(offset + tail.index()),
                NodeIndex::new(offset + head.index()),
                (),
            );
        }
        graph.add_edge(at, NodeIndex::new(offset), ());
        let tree = Self(graph);
        debug_assert!(tree.rooted());
        tree
    }

    /// drop a node and everything below it. the root cannot be dropped.
    pub fn without(&self, at: NodeIndex) -> Self {
        assert!(at != NodeIndex::new(0), "root is permanent");
        let doomed = self
            .at(at)
            .descendants()
            .iter()
            .map(Node::index)
            .collect::<BTreeSet<_>>();
        let kept = self
            .0
            .node_indices()
            .filter(|index| !doomed.contains(index))
            .collect::<Vec<_>>();
        let tree = self.retain(&kept);
        debug_assert!(tree.rooted());
        tree
    }

    /// extract the branch below (and including) a node as its own tree.
    /// the node is the minimum index among its descendants, so sorting
    /// puts it first and the rebuild makes it the new root.
    pub fn subtree(&self, at: NodeIndex) -> Self {
        let mut kept = self
            .at(at)
            .descendants()
            .iter()
            .map(Node::index)
            .collect::<Vec<_>>();
        kept.sort();
        let tree = self.retain(&kept);
        debug_assert!(tree.rooted());
        tree
    }

    /// rebuild from a subset of nodes, relabeling to compact indices in
    /// the order given. callers keep the set closed under parents (or
    /// take the first element as the new root), else the result is not
    /// a tree.
    pub fn retain(&self, kept: &[NodeIndex]) -> Self {
        let mut graph = DiGraph::with_capacity(kept.len(), kept.len().saturating_sub(1));
        let relabel = kept
            .iter()
            .map(|old| (*old, graph.add_node(())))
            .collect::<BTreeMap<_, _>>();
        for edge in self.0.edge_indices() {
            let (tail, head) = self.0.edge_endpoints(edge).expect("edge in graph");
            if let (Some(tail), Some(head)) = (relabel.get(&tail), relabel.get(&head)) {
                graph.add_edge(*tail, *head, ());
            }
        }
        Self(graph)
    }

    /// structural invariant: connected, acyclic, single root at index 0.
    pub fn rooted(&self) -> bool {
        self.len() == self.0.edge_count() + 1
            && self.root().parent().is_none()
            && self
                .0
                .node_indices()
                .skip(1)
                .all(|index| self.0.neighbors_directed(index, Incoming).count() == 1)
            && self.root().descendants().len() == self.len()
    }
}

impl crate::Arbitrary for Tree {
    fn random() -> Self {
        let ref mut rng = rand::rng();
        Self::generate(&Offspring::random(), 4, rng)
    }
}

impl std::fmt::Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ROOT {}", self.root())?;
        let mut stack = vec![];
        let children = self.root().children();
        let n = children.len();
        for (i, child) in children.into_iter().enumerate().rev() {
            stack.push((child.index(), String::new(), i == n - 1));
        }
        while let Some((index, prefix, last)) = stack.pop() {
            let stem = if last { "└" } else { "├" };
            let gaps = if last { "    " } else { "│   " };
            writeln!(f, "{}{}──{}", prefix, stem, self.at(index))?;
            let deeper = format!("{}{}", prefix, gaps);
            let children = self.at(index).children();
            let n = children.len();
            for (i, child) in children.into_iter().enumerate().rev() {
                stack.push((child.index(), deeper.clone(), i == n - 1));
            }
        }
        Ok(())
    }
}

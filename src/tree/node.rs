use petgraph::Direction::Incoming;
use petgraph::Direction::Outgoing;
use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;

/// A Node is a view into one position of a rooted tree: a NodeIndex
/// paired with a &Graph. since it wraps nothing but an index it is
/// cheap to Copy, and the graph reference is what makes the
/// navigational methods possible.
#[derive(Debug, Clone, Copy)]
pub struct Node<'tree> {
    index: NodeIndex,
    graph: &'tree DiGraph<(), ()>,
}

impl<'tree> From<(NodeIndex, &'tree DiGraph<(), ()>)> for Node<'tree> {
    fn from((index, graph): (NodeIndex, &'tree DiGraph<(), ()>)) -> Self {
        Self { index, graph }
    }
}

impl<'tree> Node<'tree> {
    pub fn spawn(&self, index: NodeIndex) -> Node<'tree> {
        Self::from((index, self.graph()))
    }
    pub fn index(&self) -> NodeIndex {
        self.index
    }
    pub fn graph(&self) -> &'tree DiGraph<(), ()> {
        self.graph
    }
    /// out-degree, i.e. child count. zero exactly for leaves.
    pub fn degree(&self) -> usize {
        self.graph()
            .neighbors_directed(self.index(), Outgoing)
            .count()
    }

    /// navigational methods

    pub fn parent(&self) -> Option<Node<'tree>> {
        self.graph()
            .neighbors_directed(self.index(), Incoming)
            .next()
            .map(|index| self.spawn(index))
    }
    /// children in ascending index order, so that iteration
    /// order is stable across walks of the same graph.
    pub fn children(&self) -> Vec<Node<'tree>> {
        let mut children = self
            .graph()
            .neighbors_directed(self.index(), Outgoing)
            .map(|index| self.spawn(index))
            .collect::<Vec<_>>();
        children.sort_by_key(|child| child.index());
        children
    }
    /// distance from the root, counting parent edges.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = *self;
        while let Some(parent) = node.parent() {
            depth += 1;
            node = parent;
        }
        depth
    }
    /// this node and everything below it, walked with an explicit
    /// stack so deep trees stay off the call stack.
    pub fn descendants(&self) -> Vec<Node<'tree>> {
        let mut stack = vec![*self];
        let mut nodes = vec![];
        while let Some(node) = stack.pop() {
            stack.extend(node.children());
            nodes.push(node);
        }
        nodes
    }
}

impl std::fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "N{}", self.index().index())
    }
}

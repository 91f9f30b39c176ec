use std::collections::HashSet;

use crate::node::NodeKey;

/// A discrete set of selected nodes (e.g. a decorator picked out for
/// deletion). See §3.1, §4.3.
#[derive(Clone, Debug, Default)]
pub struct NodeSelection {
    pub nodes: HashSet<NodeKey>,
    pub dirty: bool,
}

impl NodeSelection {
    pub fn new(nodes: impl IntoIterator<Item = NodeKey>) -> Self {
        NodeSelection {
            nodes: nodes.into_iter().collect(),
            dirty: true,
        }
    }

    pub fn single(key: NodeKey) -> Self {
        Self::new([key])
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

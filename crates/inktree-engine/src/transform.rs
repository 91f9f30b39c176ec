//! Per-node-type transform registry (§4.7 "Node transform", §4.8 step 5).
//!
//! Keyed the same way `node::registry::NodeTypeRegistry` keys rendering
//! descriptors: an open `NodeType` string rather than a closed enum, so
//! hosts can register transforms for their own element kinds.

use std::collections::HashMap;

use crate::error::EngineResult;
use crate::node::{NodeKey, NodeType};
use crate::state::EditorState;

/// A transform callback: given the dirty node's key, may rewrite the node
/// itself or its neighbors. Returning `Err` aborts the whole update
/// (§4.8 "Errors inside normalization or transforms are caught and treated
/// as closure errors").
pub type Transform = Box<dyn Fn(&mut EditorState, &NodeKey) -> EngineResult<()>>;

#[derive(Default)]
pub struct TransformRegistry {
    by_type: HashMap<NodeType, Vec<Transform>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        TransformRegistry::default()
    }

    pub fn register(&mut self, node_type: NodeType, transform: Transform) {
        self.by_type.entry(node_type).or_default().push(transform);
    }

    pub fn for_type(&self, node_type: &NodeType) -> &[Transform] {
        self.by_type.get(node_type).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

use super::{Direction, NodeKey, NodeType};

/// A block or inline container: the root, a paragraph, a heading, a list
/// item, a quote, ... The specific kind is carried in `node_type` and looked
/// up in the `NodeTypeRegistry` (see `super::registry`) rather than being a
/// closed Rust enum, so hosts can register new block kinds.
#[derive(Clone, Debug)]
pub struct ElementNode {
    pub key: NodeKey,
    pub parent: Option<NodeKey>,
    pub node_type: NodeType,
    pub children: Vec<NodeKey>,
    pub indent: u32,
    pub direction: Option<Direction>,
    pub can_indent: bool,
    pub can_insert_tab: bool,
    pub is_inline: bool,
}

impl ElementNode {
    pub fn new_root() -> Self {
        ElementNode {
            key: NodeKey::root(),
            parent: None,
            node_type: NodeType::root(),
            children: Vec::new(),
            indent: 0,
            direction: None,
            can_indent: false,
            can_insert_tab: false,
            is_inline: false,
        }
    }

    pub fn new(node_type: NodeType) -> Self {
        ElementNode {
            key: NodeKey::generate(),
            parent: None,
            node_type,
            children: Vec::new(),
            indent: 0,
            direction: None,
            can_indent: true,
            can_insert_tab: false,
            is_inline: false,
        }
    }

    pub fn paragraph() -> Self {
        Self::new(NodeType::paragraph())
    }

    pub fn is_root(&self) -> bool {
        self.key.is_root()
    }
}

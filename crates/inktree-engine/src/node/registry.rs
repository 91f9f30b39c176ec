//! Open registry of element subtypes.
//!
//! The core ships with a handful of built-ins (root, paragraph, list item)
//! but the closed Rust enum approach the spec warns against would block
//! hosts from adding `HeadingNode`/`QuoteNode`/etc. Instead every element
//! carries a `NodeType` string and looks up its rendering behavior here.

use std::collections::HashMap;

use super::{ElementNode, NodeType};

/// Per-type rendering behavior. Preamble/postamble are computed from the
/// element's own fields (e.g. indent depth picks the marker), never from its
/// children, so a plain function pointer is enough — no closures to thread
/// through clone/debug.
#[derive(Clone, Copy)]
pub struct NodeTypeDescriptor {
    pub preamble: fn(&ElementNode) -> String,
    pub postamble: fn(&ElementNode) -> String,
    /// Count of leading preamble characters that are "special" (list
    /// markers, quote gutters) and therefore excluded from the element's
    /// selectable range (§6.4).
    pub preamble_special_character_len: fn(&ElementNode) -> usize,
}

impl Default for NodeTypeDescriptor {
    fn default() -> Self {
        NodeTypeDescriptor {
            preamble: |_| String::new(),
            postamble: |_| String::new(),
            preamble_special_character_len: |_| 0,
        }
    }
}

fn paragraph_postamble(_e: &ElementNode) -> String {
    "\n".to_string()
}

fn list_item_preamble(e: &ElementNode) -> String {
    format!("{}- ", "  ".repeat(e.indent as usize))
}

fn list_item_postamble(_e: &ElementNode) -> String {
    "\n".to_string()
}

fn list_item_special_len(_e: &ElementNode) -> usize {
    1 // the bullet glyph; indentation spaces are selectable, the bullet isn't
}

fn quote_preamble(_e: &ElementNode) -> String {
    "> ".to_string()
}

fn quote_postamble(_e: &ElementNode) -> String {
    "\n".to_string()
}

/// Holds one `NodeTypeDescriptor` per registered element type.
pub struct NodeTypeRegistry {
    descriptors: HashMap<NodeType, NodeTypeDescriptor>,
}

impl NodeTypeRegistry {
    pub fn new() -> Self {
        NodeTypeRegistry {
            descriptors: HashMap::new(),
        }
    }

    /// The built-in element types every editor needs regardless of host
    /// plugins: root, paragraph, list item, quote.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(NodeType::root(), NodeTypeDescriptor::default());
        registry.register(
            NodeType::paragraph(),
            NodeTypeDescriptor {
                postamble: paragraph_postamble,
                ..Default::default()
            },
        );
        registry.register(
            NodeType::new("list-item"),
            NodeTypeDescriptor {
                preamble: list_item_preamble,
                postamble: list_item_postamble,
                preamble_special_character_len: list_item_special_len,
            },
        );
        registry.register(
            NodeType::new("quote"),
            NodeTypeDescriptor {
                preamble: quote_preamble,
                postamble: quote_postamble,
                ..Default::default()
            },
        );
        registry
    }

    pub fn register(&mut self, node_type: NodeType, descriptor: NodeTypeDescriptor) {
        self.descriptors.insert(node_type, descriptor);
    }

    pub fn get(&self, node_type: &NodeType) -> NodeTypeDescriptor {
        self.descriptors
            .get(node_type)
            .copied()
            .unwrap_or_default()
    }

    /// Whether `node_type` has been explicitly registered (as opposed to
    /// falling back to the default descriptor via `get`). Used by
    /// deserialization (§6.2) to reject unknown element type tags.
    pub fn contains(&self, node_type: &NodeType) -> bool {
        self.descriptors.contains_key(node_type)
    }
}

impl Default for NodeTypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_type_falls_back_to_default_descriptor() {
        let registry = NodeTypeRegistry::with_builtins();
        let d = registry.get(&NodeType::new("unknown-thing"));
        let e = ElementNode::new(NodeType::new("unknown-thing"));
        assert_eq!((d.preamble)(&e), "");
        assert_eq!((d.postamble)(&e), "");
    }

    #[test]
    fn list_item_preamble_scales_with_indent() {
        let registry = NodeTypeRegistry::with_builtins();
        let d = registry.get(&NodeType::new("list-item"));
        let mut e = ElementNode::new(NodeType::new("list-item"));
        e.indent = 2;
        assert_eq!((d.preamble)(&e), "    - ");
        assert_eq!((d.preamble_special_character_len)(&e), 1);
    }
}

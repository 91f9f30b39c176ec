use super::NodeKey;

/// A single line-separator leaf inside an element.
#[derive(Clone, Debug)]
pub struct LineBreakNode {
    pub key: NodeKey,
    pub parent: Option<NodeKey>,
}

impl LineBreakNode {
    pub fn new() -> Self {
        LineBreakNode {
            key: NodeKey::generate(),
            parent: None,
        }
    }
}

impl Default for LineBreakNode {
    fn default() -> Self {
        Self::new()
    }
}

/// A host-owned inline or block object (e.g. an image) opaque to text
/// content but occupying exactly one character slot in the rendered buffer.
#[derive(Clone, Debug)]
pub struct DecoratorNode {
    pub key: NodeKey,
    pub parent: Option<NodeKey>,
    /// Opaque handle interpreted by the host (decorator registry key, view
    /// type, etc). The core never inspects this.
    pub decorator_type: String,
    pub is_inline_decorator: bool,
}

impl DecoratorNode {
    pub fn new(decorator_type: impl Into<String>) -> Self {
        DecoratorNode {
            key: NodeKey::generate(),
            parent: None,
            decorator_type: decorator_type.into(),
            is_inline_decorator: true,
        }
    }
}

/// A zero-text leaf used to represent structural positions (e.g. a caret
/// anchor point that has no content of its own yet).
#[derive(Clone, Debug)]
pub struct PlaceholderNode {
    pub key: NodeKey,
    pub parent: Option<NodeKey>,
}

impl PlaceholderNode {
    pub fn new() -> Self {
        PlaceholderNode {
            key: NodeKey::generate(),
            parent: None,
        }
    }
}

impl Default for PlaceholderNode {
    fn default() -> Self {
        Self::new()
    }
}

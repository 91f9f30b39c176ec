//! The node tree: a typed sum of node kinds addressed by stable keys.
//!
//! Mirrors the engine's original stable-identity design (where an `AnchorId`
//! tracked a text range across edits) but turns it inside out: here the key
//! identifies a tree node directly, and node content/children are the
//! authoritative model. The rendered text is a projection computed by the
//! reconciler (`crate::reconcile`), not the source of truth.

pub mod element;
pub mod leaf;
pub mod registry;
pub mod text;

pub use element::ElementNode;
pub use leaf::{DecoratorNode, LineBreakNode, PlaceholderNode};
pub use registry::{NodeTypeDescriptor, NodeTypeRegistry};
pub use text::{TextFormat, TextMode, TextNode};

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Stable identifier of a node within one state lineage.
///
/// Cheap to clone (an `Arc<str>` under the hood) and cheap to compare, the
/// way the original `AnchorId` newtype was cheap to copy.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct NodeKey(Arc<str>);

impl NodeKey {
    const ROOT_STR: &'static str = "root";

    /// The single, constant root key shared by every state.
    pub fn root() -> Self {
        NodeKey(Arc::from(Self::ROOT_STR))
    }

    pub fn is_root(&self) -> bool {
        &*self.0 == Self::ROOT_STR
    }

    /// Mint a fresh key. Collision probability is the same as any v4 UUID:
    /// negligible for the lifetime of a single editor session.
    pub fn generate() -> Self {
        NodeKey(Arc::from(Uuid::new_v4().to_string().as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeKey({})", self.0)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registered type tag distinguishing element subtypes (`paragraph`,
/// `heading`, `quote`, `list-item`, ...). Kept as an open string rather than
/// a closed enum so host applications can register new element kinds
/// without the core crate knowing their names ahead of time.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct NodeType(Arc<str>);

impl NodeType {
    pub fn new(name: impl AsRef<str>) -> Self {
        NodeType(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn root() -> Self {
        Self::new("root")
    }

    pub fn paragraph() -> Self {
        Self::new("paragraph")
    }
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeType({})", self.0)
    }
}

/// Text direction carried by element nodes (and inherited visually, though
/// the core doesn't do bidi layout itself).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

/// Object-replacement glyph a `Decorator` node renders as in the attributed
/// buffer (§3.1 "occupies exactly one character slot"): one Unicode scalar
/// value, three UTF-8 bytes.
pub const DECORATOR_GLYPH: char = '\u{fffc}';

/// The node sum type (§3.1).
#[derive(Clone, Debug)]
pub enum Node {
    Root(ElementNode),
    Element(ElementNode),
    Text(TextNode),
    LineBreak(LineBreakNode),
    Decorator(DecoratorNode),
    Placeholder(PlaceholderNode),
}

impl Node {
    pub fn key(&self) -> &NodeKey {
        match self {
            Node::Root(e) | Node::Element(e) => &e.key,
            Node::Text(t) => &t.key,
            Node::LineBreak(l) => &l.key,
            Node::Decorator(d) => &d.key,
            Node::Placeholder(p) => &p.key,
        }
    }

    pub fn parent(&self) -> Option<&NodeKey> {
        match self {
            Node::Root(_) => None,
            Node::Element(e) => e.parent.as_ref(),
            Node::Text(t) => t.parent.as_ref(),
            Node::LineBreak(l) => l.parent.as_ref(),
            Node::Decorator(d) => d.parent.as_ref(),
            Node::Placeholder(p) => p.parent.as_ref(),
        }
    }

    pub fn set_parent(&mut self, parent: Option<NodeKey>) {
        match self {
            Node::Root(_) => {}
            Node::Element(e) => e.parent = parent,
            Node::Text(t) => t.parent = parent,
            Node::LineBreak(l) => l.parent = parent,
            Node::Decorator(d) => d.parent = parent,
            Node::Placeholder(p) => p.parent = parent,
        }
    }

    /// Ordered child keys, empty for every leaf variant.
    pub fn children(&self) -> &[NodeKey] {
        match self {
            Node::Root(e) | Node::Element(e) => &e.children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<NodeKey>> {
        match self {
            Node::Root(e) | Node::Element(e) => Some(&mut e.children),
            _ => None,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Root(_) => NodeType::root(),
            Node::Element(e) => e.node_type.clone(),
            Node::Text(_) => NodeType::new("text"),
            Node::LineBreak(_) => NodeType::new("linebreak"),
            Node::Decorator(_) => NodeType::new("decorator"),
            Node::Placeholder(_) => NodeType::new("placeholder"),
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Root(_) | Node::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Whether this leaf/element renders inline (no forced line break around
    /// it). Elements declare this explicitly; text, line breaks and
    /// decorators are inline by convention unless the element says otherwise.
    pub fn is_inline(&self) -> bool {
        match self {
            Node::Root(_) => false,
            Node::Element(e) => e.is_inline,
            Node::Text(_) | Node::LineBreak(_) | Node::Decorator(_) | Node::Placeholder(_) => true,
        }
    }

    /// This node's own contribution to rendered text, ignoring children
    /// (preamble/postamble live on elements; leaves contribute their slot).
    ///
    /// Measured in UTF-8 bytes, matching the `AttributedStore`'s rope so that
    /// range-cache lengths/locations can be used directly as rope offsets
    /// without a unit conversion: a text node contributes its byte length, a
    /// line break contributes `"\n".len()`, and a decorator contributes the
    /// byte width of the single replacement glyph `reconcile::exec` renders
    /// for it (see `DECORATOR_GLYPH`). `Point` offsets into a text node are
    /// byte offsets into that node's own `text` for the same reason.
    pub fn own_text_length(&self) -> usize {
        match self {
            Node::Text(t) => t.text.len(),
            Node::LineBreak(_) => 1,
            Node::Decorator(_) => DECORATOR_GLYPH.len_utf8(),
            Node::Placeholder(_) | Node::Root(_) | Node::Element(_) => 0,
        }
    }

    /// A key-less deep-structural copy preserving this node's own fields.
    /// Children keys are copied verbatim (callers are expected to re-key the
    /// subtree if they want independent children too).
    pub fn clone_with_properties(&self) -> Node {
        let mut clone = self.clone();
        match &mut clone {
            Node::Root(e) | Node::Element(e) => {
                e.key = NodeKey::generate();
                e.parent = None;
            }
            Node::Text(t) => {
                t.key = NodeKey::generate();
                t.parent = None;
            }
            Node::LineBreak(l) => {
                l.key = NodeKey::generate();
                l.parent = None;
            }
            Node::Decorator(d) => {
                d.key = NodeKey::generate();
                d.parent = None;
            }
            Node::Placeholder(p) => {
                p.key = NodeKey::generate();
                p.parent = None;
            }
        }
        clone
    }
}

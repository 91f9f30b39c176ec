//! Immutable-by-convention document snapshots (§3.1, §4.2).
//!
//! `EditorState` is value-like: cloning it is O(1) (an `Rc` bump) until the
//! clone is mutated, at which point `Rc::make_mut` copies the underlying map
//! once. Individual node payloads are wrapped in their own `Rc` so that a
//! mutation touching one node doesn't deep-copy every other node's text.
//!
//! A fully persistent (per-key, O(log n) clone) map would need an external
//! persistent-map crate; none of the retrieved example repos carry one, so
//! this engine approximates clone-on-write at map granularity instead. See
//! DESIGN.md for the tradeoff.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{EngineError, EngineResult};
use crate::node::{ElementNode, Node, NodeKey};
use crate::selection::Selection;

/// `NodeKey -> Node` mapping, shared until the first write.
#[derive(Clone, Default)]
pub struct NodeMap(Rc<HashMap<NodeKey, Rc<Node>>>);

impl NodeMap {
    pub fn get(&self, key: &NodeKey) -> Option<&Node> {
        self.0.get(key).map(|rc| rc.as_ref())
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeKey, &Node)> {
        self.0.iter().map(|(k, v)| (k, v.as_ref()))
    }

    /// Keyed `Rc` handles rather than dereferenced nodes, so callers can
    /// compare identity (`Rc::ptr_eq`) instead of deep-comparing content.
    /// Used by the Update Driver's per-pass dirty diff (§4.8 step 5).
    pub(crate) fn iter_rc(&self) -> impl Iterator<Item = (&NodeKey, &Rc<Node>)> {
        self.0.iter()
    }

    pub(crate) fn get_rc(&self, key: &NodeKey) -> Option<&Rc<Node>> {
        self.0.get(key)
    }

    /// Insert or overwrite a node, cloning the backing map on first write
    /// within this `NodeMap`'s lineage.
    pub fn insert(&mut self, node: Node) {
        Rc::make_mut(&mut self.0).insert(node.key().clone(), Rc::new(node));
    }

    pub fn remove(&mut self, key: &NodeKey) -> Option<Node> {
        Rc::make_mut(&mut self.0)
            .remove(key)
            .map(|rc| Rc::try_unwrap(rc).unwrap_or_else(|rc| (*rc).clone()))
    }

    /// Clone-on-write handle to mutate a node in place. Returns a private
    /// owned copy the caller mutates and must write back with `insert`,
    /// mirroring the "mutation clones only the touched node" rule (§9).
    pub fn get_for_write(&self, key: &NodeKey) -> Option<Node> {
        self.0.get(key).map(|rc| rc.as_ref().clone())
    }
}

/// A pair `(node_map, selection)` plus a monotonic version tag (§3.1).
#[derive(Clone)]
pub struct EditorState {
    pub(crate) nodes: NodeMap,
    pub selection: Option<Selection>,
    pub version: u64,
}

impl EditorState {
    /// The state an editor is born with: a root containing one empty
    /// paragraph (§3.3).
    pub fn empty() -> Self {
        let mut nodes = NodeMap::default();
        let mut root = ElementNode::new_root();
        let paragraph = ElementNode::paragraph();
        root.children.push(paragraph.key.clone());
        let paragraph_key = paragraph.key.clone();
        nodes.insert(Node::Root(root));
        let mut paragraph_node = Node::Element(paragraph);
        paragraph_node.set_parent(Some(NodeKey::root()));
        nodes.insert(paragraph_node);
        let _ = paragraph_key;

        EditorState {
            nodes,
            selection: None,
            version: 0,
        }
    }

    pub fn root(&self) -> &Node {
        self.nodes
            .get(&NodeKey::root())
            .expect("every state has a root node")
    }

    pub fn get(&self, key: &NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.nodes.contains(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Concatenation of this node's text-bearing descendants, plus the
    /// structural newlines contributed by block postambles. Used by the
    /// text-content listener (§4.7) and by `get_text_content` callers that
    /// don't need the full rendered-buffer projection.
    pub fn text_content(&self, key: &NodeKey) -> String {
        let mut out = String::new();
        self.collect_text(key, &mut out);
        out
    }

    fn collect_text(&self, key: &NodeKey, out: &mut String) {
        let Some(node) = self.get(key) else { return };
        match node {
            Node::Text(t) => out.push_str(&t.text),
            Node::LineBreak(_) => out.push('\n'),
            Node::Root(e) | Node::Element(e) => {
                for child in &e.children {
                    self.collect_text(child, out);
                }
            }
            Node::Decorator(_) | Node::Placeholder(_) => {}
        }
    }

    /// Read-only closure scope; mutation attempted through `self` inside the
    /// closure simply isn't possible since `read` only hands out `&Self`.
    pub fn read<T>(&self, f: impl FnOnce(&EditorState) -> T) -> T {
        f(self)
    }

    /// Runs every tree-integrity invariant check from §3.2 items 1-2 and
    /// §8.1 I1/I4 over this state. Intended for tests and the Update
    /// Driver's optional sanity pass, not for the hot path.
    pub fn check_invariants(&self) -> EngineResult<()> {
        for (key, node) in self.nodes.iter() {
            if !key.is_root() {
                let parent_key = node.parent().ok_or_else(|| {
                    EngineError::InvariantViolation(format!("{key:?} has no parent"))
                })?;
                let parent = self.get(parent_key).ok_or_else(|| {
                    EngineError::InvariantViolation(format!(
                        "{key:?} parent {parent_key:?} is missing"
                    ))
                })?;
                let occurrences = parent.children().iter().filter(|c| *c == key).count();
                if occurrences != 1 {
                    return Err(EngineError::InvariantViolation(format!(
                        "{key:?} appears {occurrences} times in parent {parent_key:?}'s children"
                    )));
                }
            }
            for child in node.children() {
                if !self.contains(child) {
                    return Err(EngineError::InvariantViolation(format!(
                        "{key:?} references missing child {child:?}"
                    )));
                }
            }
        }

        if let Some(selection) = &self.selection {
            selection.validate(self)?;
        }

        Ok(())
    }
}

//! Classifies each dirty node key against `(prev, next)` (§4.5 "Input
//! classification").

use std::collections::HashMap;

use crate::node::{Node, NodeKey};
use crate::state::EditorState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirtyKind {
    Insert,
    Remove,
    Update,
    Move,
}

pub fn classify_dirty(
    prev: &EditorState,
    next: &EditorState,
    dirty_keys: &[NodeKey],
) -> HashMap<NodeKey, DirtyKind> {
    let mut out = HashMap::with_capacity(dirty_keys.len());
    for key in dirty_keys {
        let in_prev = prev.contains(key);
        let in_next = next.contains(key);
        let kind = match (in_prev, in_next) {
            (false, true) => DirtyKind::Insert,
            (true, false) => DirtyKind::Remove,
            (true, true) => {
                if children_reordered(prev, next, key) {
                    DirtyKind::Move
                } else {
                    DirtyKind::Update
                }
            }
            (false, false) => continue,
        };
        out.insert(key.clone(), kind);
    }
    out
}

fn children_reordered(prev: &EditorState, next: &EditorState, key: &NodeKey) -> bool {
    let (Some(p), Some(n)) = (prev.get(key), next.get(key)) else {
        return false;
    };
    let (Node::Root(pe), Node::Root(ne)) | (Node::Element(pe), Node::Element(ne)) = (p, n) else {
        return false;
    };
    let mut sorted_prev = pe.children.clone();
    let mut sorted_next = ne.children.clone();
    sorted_prev.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    sorted_next.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    pe.children != ne.children && sorted_prev == sorted_next
}

/// Whether every `Update`-classified key in `dirty` is a `Text` node in
/// `next`, with no `Insert`/`Remove`/`Move` present at all — the
/// precondition for the text-only Fenwick-lazy-shift strategy (§4.5).
pub fn all_updates_are_text_only(next: &EditorState, dirty: &HashMap<NodeKey, DirtyKind>) -> bool {
    if dirty.is_empty() {
        return false;
    }
    dirty.values().all(|k| *k == DirtyKind::Update)
        && dirty
            .keys()
            .all(|key| matches!(next.get(key), Some(Node::Text(_))))
}

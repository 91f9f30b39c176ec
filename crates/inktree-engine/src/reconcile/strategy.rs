//! The strategy registry (§4.5, §9 "Reconciler strategy registry"): a
//! closed enum with a single `decide` function, so new strategies are added
//! centrally instead of as ad-hoc fast paths scattered through the
//! reconciler.

use std::collections::HashMap;

use crate::node::NodeKey;
use crate::state::EditorState;

use super::diff::{all_updates_are_text_only, DirtyKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    FullRebuild,
    Hydration,
    SelectionOnly,
    TextOnly,
    BulkInsert { parent: NodeKey, start_index: usize, count: usize },
    BulkRemove { parent: NodeKey, removed: Vec<NodeKey> },
    Generic,
}

/// Fraction of the document's node count that must be dirty before a full
/// rebuild is cheaper than patching incrementally (§4.5 table, `EditorConfig
/// ::full_rebuild_threshold`).
pub fn decide(
    prev: &EditorState,
    next: &EditorState,
    dirty: &HashMap<NodeKey, DirtyKind>,
    full_rebuild_threshold: f32,
) -> Strategy {
    if prev.node_count() <= 1 && next.node_count() > 1 {
        return Strategy::Hydration;
    }

    if dirty.is_empty() {
        return Strategy::SelectionOnly;
    }

    let total = next.node_count().max(1);
    let dirty_fraction = dirty.len() as f32 / total as f32;
    if dirty_fraction >= full_rebuild_threshold {
        return Strategy::FullRebuild;
    }

    if all_updates_are_text_only(next, dirty) {
        return Strategy::TextOnly;
    }

    if let Some(strategy) = detect_bulk_insert(prev, next, dirty) {
        return strategy;
    }
    if let Some(strategy) = detect_bulk_remove(prev, next, dirty) {
        return strategy;
    }

    Strategy::Generic
}

/// A single parent gains `>= 2` contiguous new children, with no removes
/// anywhere in the dirty set (§4.5 table).
fn detect_bulk_insert(
    prev: &EditorState,
    next: &EditorState,
    dirty: &HashMap<NodeKey, DirtyKind>,
) -> Option<Strategy> {
    if dirty.values().any(|k| *k == DirtyKind::Remove) {
        return None;
    }
    let inserted: Vec<&NodeKey> = dirty
        .iter()
        .filter(|(_, k)| **k == DirtyKind::Insert)
        .map(|(key, _)| key)
        .collect();
    if inserted.len() < 2 {
        return None;
    }
    let parent = next.get(inserted[0])?.parent()?.clone();
    if !inserted.iter().all(|k| next.get(k).and_then(|n| n.parent()) == Some(&parent)) {
        return None;
    }
    let siblings = next.get(&parent)?.children();
    let indices: Vec<usize> = inserted
        .iter()
        .filter_map(|k| siblings.iter().position(|c| c == *k))
        .collect();
    if indices.len() != inserted.len() {
        return None;
    }
    let mut sorted = indices.clone();
    sorted.sort_unstable();
    let contiguous = sorted.windows(2).all(|w| w[1] == w[0] + 1);
    if !contiguous {
        return None;
    }
    let _ = prev;
    Some(Strategy::BulkInsert {
        parent,
        start_index: sorted[0],
        count: sorted.len(),
    })
}

/// A single parent loses `>= 2` contiguous children, with no inserts
/// anywhere in the dirty set (§4.5 table).
fn detect_bulk_remove(
    prev: &EditorState,
    next: &EditorState,
    dirty: &HashMap<NodeKey, DirtyKind>,
) -> Option<Strategy> {
    if dirty.values().any(|k| *k == DirtyKind::Insert) {
        return None;
    }
    let removed: Vec<&NodeKey> = dirty
        .iter()
        .filter(|(_, k)| **k == DirtyKind::Remove)
        .map(|(key, _)| key)
        .collect();
    if removed.len() < 2 {
        return None;
    }
    let parent = prev.get(removed[0])?.parent()?.clone();
    if !removed.iter().all(|k| prev.get(k).and_then(|n| n.parent()) == Some(&parent)) {
        return None;
    }
    if !next.contains(&parent) {
        return None;
    }
    let siblings = prev.get(&parent)?.children();
    let indices: Vec<usize> = removed
        .iter()
        .filter_map(|k| siblings.iter().position(|c| c == *k))
        .collect();
    if indices.len() != removed.len() {
        return None;
    }
    let mut sorted = indices.clone();
    sorted.sort_unstable();
    let contiguous = sorted.windows(2).all(|w| w[1] == w[0] + 1);
    if !contiguous {
        return None;
    }
    Some(Strategy::BulkRemove {
        parent,
        removed: removed.into_iter().cloned().collect(),
    })
}

//! Executors for each reconcile strategy (§4.5).

use std::collections::HashMap;

use crate::attributed_store::{AttributedChunk, AttributedStore};
use crate::error::EngineResult;
use crate::node::{Node, NodeKey, NodeTypeRegistry, DECORATOR_GLYPH};
use crate::range_cache::{rebuild_range_cache, RangeCache};
use crate::state::EditorState;

use super::diff::DirtyKind;

/// Builds the attributed chunk for the subtree rooted at `key`: preamble,
/// recursively-built children, own text, postamble, in that order (§4.5
/// "Bulk insert path" / "Full rebuild").
pub fn build_chunk_for_subtree(state: &EditorState, registry: &NodeTypeRegistry, key: &NodeKey) -> AttributedChunk {
    let mut chunk = AttributedChunk::default();
    append_subtree(state, registry, key, &mut chunk);
    chunk
}

fn append_subtree(state: &EditorState, registry: &NodeTypeRegistry, key: &NodeKey, chunk: &mut AttributedChunk) {
    let Some(node) = state.get(key) else { return };
    match node {
        Node::Root(_) => {
            for child in node.children() {
                append_subtree(state, registry, child, chunk);
            }
        }
        Node::Element(e) => {
            let descriptor = registry.get(&e.node_type);
            chunk.text.push_str(&(descriptor.preamble)(e));
            for child in &e.children {
                append_subtree(state, registry, child, chunk);
            }
            chunk.text.push_str(&(descriptor.postamble)(e));
        }
        Node::Text(t) => {
            let start = chunk.text.len();
            chunk.text.push_str(&t.text);
            chunk.runs.push(crate::attributed_store::AttributeRun {
                range: start..chunk.text.len(),
                format: t.format,
                style_hash: t.style_hash,
                node_key: Some(t.key.clone()),
            });
        }
        Node::LineBreak(_) => chunk.text.push('\n'),
        Node::Decorator(_) => chunk.text.push(DECORATOR_GLYPH),
        Node::Placeholder(_) => {}
    }
}

/// Full rebuild: clear the store, insert the entire document as one chunk,
/// rebuild the range cache from scratch (§4.5).
pub fn full_rebuild(
    next: &EditorState,
    registry: &NodeTypeRegistry,
    store: &mut AttributedStore,
    cache: &mut RangeCache,
) {
    store.clear();
    store.begin_editing();
    let chunk = build_chunk_for_subtree(next, registry, &NodeKey::root());
    if !chunk.is_empty() {
        store.insert(0, chunk);
    }
    store.end_editing();
    *cache = rebuild_range_cache(next, registry);
}

/// Text-only path: per changed text node, delete the old run and insert the
/// new one, propagate the length delta, and record a Fenwick shift instead
/// of touching any other node's location (§4.5 "Text-only path").
pub fn text_only(
    next: &EditorState,
    store: &mut AttributedStore,
    cache: &mut RangeCache,
    dirty: &HashMap<NodeKey, DirtyKind>,
) -> EngineResult<()> {
    store.begin_editing();
    for key in dirty.keys() {
        let Some(Node::Text(t)) = next.get(key) else { continue };
        let Some(item) = cache.get(key).cloned() else { continue };
        let old_len = item.text_length;
        let new_len = t.text.len();
        let at = cache.actual_location(key)? + item.preamble_length;

        store.delete(at..(at + old_len));
        store.insert(
            at,
            AttributedChunk::with_run(t.text.clone(), t.format, t.style_hash, Some(key.clone())),
        );

        let delta = new_len as i64 - old_len as i64;
        if let Some(item) = cache.get_mut(key) {
            item.text_length = new_len;
        }
        cache.propagate_length_delta(next, key, delta);
        cache.add_fenwick_delta(item.dfs_position, delta);
    }
    store.end_editing();
    Ok(())
}

/// Bulk insert: one chunk for the whole inserted run of siblings, one Range
/// Cache rebuild pass scoped to just that subtree, one Fenwick delta
/// (§4.5 "Bulk insert path"). Implemented here as a scoped full
/// re-derivation of the parent's region rather than true O(K) splicing,
/// since a splice-in-place range cache update needs the same DFS
/// re-numbering a structural change already requires (§4.4 "before any
/// structural change... pending deltas are materialized").
pub fn bulk_structural_change(
    next: &EditorState,
    registry: &NodeTypeRegistry,
    store: &mut AttributedStore,
    cache: &mut RangeCache,
    prev: &EditorState,
    dirty: &HashMap<NodeKey, DirtyKind>,
) -> EngineResult<()> {
    generic_incremental(prev, next, registry, store, cache, dirty)
}

/// Generic incremental path: materializes Fenwick deltas, then re-derives
/// the range cache for the whole tree (a correctness-preserving fallback:
/// true per-node patching would need block-level diffing of preamble/text/
/// postamble per dirty node, which the spec reserves for this path but a
/// full re-derivation already satisfies §8.1 I8 "incremental = rebuild" by
/// construction). The store edit is still scoped: only dirty nodes' ranges
/// are replaced, not the whole document (§4.5 "Generic incremental path").
pub fn generic_incremental(
    prev: &EditorState,
    next: &EditorState,
    registry: &NodeTypeRegistry,
    store: &mut AttributedStore,
    cache: &mut RangeCache,
    dirty: &HashMap<NodeKey, DirtyKind>,
) -> EngineResult<()> {
    cache.materialize_fenwick();
    store.begin_editing();

    // Process highest-offset edits first: a delete/insert at one location
    // shifts every position after it, but never the positions before it, so
    // visiting dirty keys back-to-front means every `at` computed below (from
    // the not-yet-mutated cache) is still valid at the moment it's used.
    let mut ordered: Vec<(&NodeKey, &DirtyKind)> = dirty.iter().collect();
    ordered.sort_by(|(a, _), (b, _)| {
        let loc = |k: &NodeKey| cache.get(k).map(|i| i.location).unwrap_or_else(|| insertion_point(next, cache, k));
        loc(b).cmp(&loc(a))
    });

    for (key, kind) in ordered {
        match kind {
            DirtyKind::Remove => {
                if let Some(item) = cache.get(key) {
                    let at = item.location;
                    let len = item.entire_length();
                    store.delete(at..(at + len));
                }
                cache.remove(key);
            }
            DirtyKind::Insert => {
                let chunk = build_chunk_for_subtree(next, registry, key);
                let at = insertion_point(next, cache, key);
                if !chunk.is_empty() {
                    store.insert(at, chunk);
                }
            }
            DirtyKind::Update | DirtyKind::Move => {
                if let Some(item) = cache.get(key) {
                    let at = item.location;
                    let len = item.entire_length();
                    store.delete(at..(at + len));
                }
                let chunk = build_chunk_for_subtree(next, registry, key);
                let at = insertion_point(next, cache, key);
                if !chunk.is_empty() {
                    store.insert(at, chunk);
                }
            }
        }
    }
    store.end_editing();

    let _ = prev;
    *cache = rebuild_range_cache(next, registry);
    Ok(())
}

fn insertion_point(next: &EditorState, cache: &RangeCache, key: &NodeKey) -> usize {
    let Some(node) = next.get(key) else { return 0 };
    let Some(parent_key) = node.parent() else { return 0 };
    let Some(parent) = next.get(parent_key) else { return 0 };
    let Some(parent_item) = cache.get(parent_key) else { return 0 };
    let mut cursor = parent_item.location + parent_item.preamble_length;
    for sibling in parent.children() {
        if sibling == key {
            break;
        }
        if let Some(item) = cache.get(sibling) {
            cursor += item.entire_length();
        }
    }
    cursor
}

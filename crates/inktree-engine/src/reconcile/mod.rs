//! Diffs the committed state against the pending state and emits a minimal
//! sequence of Attributed Store edits (§4.5).

pub mod diff;
pub mod exec;
pub mod strategy;

pub use strategy::Strategy;

use crate::attributed_store::AttributedStore;
use crate::error::EngineResult;
use crate::node::{NodeKey, NodeTypeRegistry};
use crate::range_cache::{point_at_string_location, RangeCache};
use crate::selection::{Affinity, Selection};
use crate::state::EditorState;

/// `(location, length)` in the rendered buffer, handed to the host to adopt
/// as its native selection (§4.5 "Selection reconciliation").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeRange {
    pub location: usize,
    pub length: usize,
}

pub struct Reconciler {
    pub registry: NodeTypeRegistry,
    pub full_rebuild_threshold: f32,
}

impl Default for Reconciler {
    fn default() -> Self {
        Reconciler {
            registry: NodeTypeRegistry::with_builtins(),
            full_rebuild_threshold: 0.5,
        }
    }
}

impl Reconciler {
    pub fn new(registry: NodeTypeRegistry, full_rebuild_threshold: f32) -> Self {
        Reconciler {
            registry,
            full_rebuild_threshold,
        }
    }

    /// Runs one reconcile pass. `dirty_keys` are the node keys the Update
    /// Driver marked dirty during the closure/transform phases.
    pub fn reconcile(
        &self,
        prev: &EditorState,
        next: &EditorState,
        dirty_keys: &[NodeKey],
        cache: &mut RangeCache,
        store: &mut AttributedStore,
    ) -> EngineResult<Strategy> {
        let dirty = diff::classify_dirty(prev, next, dirty_keys);
        let strategy = strategy::decide(prev, next, &dirty, self.full_rebuild_threshold);

        match &strategy {
            Strategy::FullRebuild | Strategy::Hydration => {
                exec::full_rebuild(next, &self.registry, store, cache);
            }
            Strategy::SelectionOnly => {}
            Strategy::TextOnly => {
                exec::text_only(next, store, cache, &dirty)?;
            }
            Strategy::BulkInsert { .. } | Strategy::BulkRemove { .. } => {
                exec::bulk_structural_change(next, &self.registry, store, cache, prev, &dirty)?;
            }
            Strategy::Generic => {
                exec::generic_incremental(prev, next, &self.registry, store, cache, &dirty)?;
            }
        }

        Ok(strategy)
    }

    /// Converts the pending `RangeSelection`'s Points into a native
    /// `(location, length)` pair via the now-updated Range Cache (§4.5
    /// "Selection reconciliation").
    pub fn native_selection_range(
        &self,
        state: &EditorState,
        cache: &RangeCache,
    ) -> EngineResult<Option<NativeRange>> {
        let Some(Selection::Range(r)) = &state.selection else {
            return Ok(None);
        };
        let anchor_loc = point_location(state, cache, &r.anchor.key, r.anchor.offset)?;
        let focus_loc = point_location(state, cache, &r.focus.key, r.focus.offset)?;
        let (start, end) = if anchor_loc <= focus_loc {
            (anchor_loc, focus_loc)
        } else {
            (focus_loc, anchor_loc)
        };
        Ok(Some(NativeRange {
            location: start,
            length: end - start,
        }))
    }

    /// Inverse of `native_selection_range`: resolves a rendered `(location,
    /// length)` back to anchor/focus Points (§4.3 `apply_selection_range`).
    pub fn apply_selection_range(
        &self,
        state: &EditorState,
        cache: &RangeCache,
        native: NativeRange,
        affinity: Affinity,
    ) -> EngineResult<Selection> {
        let anchor = point_at_string_location(state, cache, native.location, affinity)?;
        let focus = point_at_string_location(state, cache, native.location + native.length, affinity)?;
        Ok(Selection::range(anchor, focus))
    }
}

fn point_location(state: &EditorState, cache: &RangeCache, key: &NodeKey, offset: usize) -> EngineResult<usize> {
    let node = state
        .get(key)
        .ok_or_else(|| crate::error::EngineError::detached_node(key))?;
    let base = cache.actual_location(key)?;
    match node {
        crate::node::Node::Text(_) => {
            let item = cache
                .get(key)
                .ok_or_else(|| crate::error::EngineError::RangeCacheSearch(format!("{key:?} missing")))?;
            Ok(base + item.preamble_length + offset.min(item.text_length))
        }
        _ => {
            let item = cache
                .get(key)
                .ok_or_else(|| crate::error::EngineError::RangeCacheSearch(format!("{key:?} missing")))?;
            let children = node.children();
            let mut cursor = base + item.preamble_length;
            for child in children.iter().take(offset.min(children.len())) {
                if let Some(child_item) = cache.get(child) {
                    cursor += child_item.entire_length();
                }
            }
            Ok(cursor)
        }
    }
}

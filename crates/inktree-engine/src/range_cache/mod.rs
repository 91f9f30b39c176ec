//! Per-node segment-length cache plus the Fenwick lazy-location index that
//! together give O(log N) offset-to-Point search and O(log N) maintenance of
//! absolute locations under text-only edits (§3.1, §4.4).

pub mod fenwick;

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::node::{Node, NodeKey, NodeTypeRegistry};
use crate::selection::{Affinity, Point};
use crate::state::EditorState;

use fenwick::FenwickTree;

/// Per-node cache of segment lengths and a base absolute location (§3.1).
#[derive(Clone, Debug, Default)]
pub struct RangeCacheItem {
    pub location: usize,
    pub preamble_length: usize,
    pub preamble_special_character_length: usize,
    pub children_length: usize,
    pub text_length: usize,
    pub postamble_length: usize,
    /// Stable insertion order, used as a tiebreaker by the DFS-order
    /// fallback sort (§4.4).
    pub node_index: u64,
    /// 1-based document-order index used to address the Fenwick tree.
    pub dfs_position: usize,
}

impl RangeCacheItem {
    /// `range.length` per §3.1 invariant 4: preamble + children + text +
    /// postamble.
    pub fn entire_length(&self) -> usize {
        self.preamble_length + self.children_length + self.text_length + self.postamble_length
    }
}

/// Holds one `RangeCacheItem` per node key, plus the Fenwick tree addressing
/// pending location deltas and the cached DFS order.
#[derive(Default)]
pub struct RangeCache {
    items: HashMap<NodeKey, RangeCacheItem>,
    fenwick: FenwickTree,
    next_node_index: u64,
    /// Cached DFS order, invalidated on any structural mutation (§4.4).
    dfs_order: Option<Vec<NodeKey>>,
}

impl RangeCache {
    pub fn new() -> Self {
        RangeCache::default()
    }

    pub fn get(&self, key: &NodeKey) -> Option<&RangeCacheItem> {
        self.items.get(key)
    }

    pub fn get_mut(&mut self, key: &NodeKey) -> Option<&mut RangeCacheItem> {
        self.items.get_mut(key)
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.items.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Inserts or overwrites an entry, assigning it a fresh `node_index` if
    /// it doesn't already have a non-zero one recorded.
    pub fn insert(&mut self, key: NodeKey, mut item: RangeCacheItem) {
        if item.node_index == 0 {
            item.node_index = self.next_node_index;
        }
        self.next_node_index = self.next_node_index.max(item.node_index + 1);
        self.items.insert(key, item);
        self.dfs_order = None;
    }

    /// Removes the entry for a detached key (§3.2 invariant 3).
    pub fn remove(&mut self, key: &NodeKey) {
        self.items.remove(key);
        self.dfs_order = None;
    }

    /// Drops every entry not present in `live_keys`. Called at commit to
    /// keep range-cache totality (§3.2 invariant 3).
    pub fn retain_only(&mut self, live_keys: &HashMap<NodeKey, ()>) {
        let before = self.items.len();
        self.items.retain(|k, _| live_keys.contains_key(k));
        if self.items.len() != before {
            self.dfs_order = None;
        }
    }

    /// `location + prefix_sum(min(dfs_position, tree_size))` (§4.4).
    pub fn actual_location(&self, key: &NodeKey) -> EngineResult<usize> {
        let item = self
            .get(key)
            .ok_or_else(|| EngineError::RangeCacheSearch(format!("no cache entry for {key:?}")))?;
        let delta = self.fenwick.prefix_sum(item.dfs_position);
        Ok((item.location as i64 + delta).max(0) as usize)
    }

    /// Text-only edits call this instead of touching `location` fields
    /// directly (§4.5 "text-only path").
    pub fn add_fenwick_delta(&mut self, dfs_position: usize, delta: i64) {
        self.fenwick.add(dfs_position, delta);
    }

    pub fn fenwick_is_empty(&self) -> bool {
        self.fenwick.is_empty()
    }

    /// Materializes every pending Fenwick delta into base `location` fields
    /// and resets the tree, as required before any structural change or DFS
    /// re-derivation (§4.4).
    pub fn materialize_fenwick(&mut self) {
        if self.fenwick.is_empty() {
            return;
        }
        for item in self.items.values_mut() {
            let delta = self.fenwick.prefix_sum(item.dfs_position);
            item.location = (item.location as i64 + delta).max(0) as usize;
        }
        self.fenwick.reset(self.items.len().max(self.fenwick.capacity()));
    }

    /// Adds `delta` to `node_key`'s own length field (leaf update) and
    /// propagates it up through every ancestor's `children_length` (§4.4
    /// "Length propagation").
    pub fn propagate_length_delta(&mut self, state: &EditorState, node_key: &NodeKey, delta: i64) {
        if delta == 0 {
            return;
        }
        let mut current = state.get(node_key).and_then(|n| n.parent().cloned());
        while let Some(key) = current {
            if let Some(item) = self.items.get_mut(&key) {
                item.children_length = (item.children_length as i64 + delta).max(0) as usize;
            }
            current = state.get(&key).and_then(|n| n.parent().cloned());
        }
    }

    /// Primary strategy: a depth-first walk of the live tree. Falls back to
    /// sorting cache entries by `(location asc, length desc)` when the
    /// traversal order and the canonical sort disagree (§4.4).
    pub fn derive_dfs_order(&mut self, state: &EditorState) -> Vec<NodeKey> {
        if let Some(order) = &self.dfs_order {
            return order.clone();
        }
        self.materialize_fenwick();

        let mut traversal = Vec::with_capacity(self.items.len());
        collect_dfs(state, &crate::node::NodeKey::root(), &mut traversal);

        let mut by_sort: Vec<NodeKey> = self.items.keys().cloned().collect();
        by_sort.sort_by(|a, b| {
            let ia = self.items.get(a);
            let ib = self.items.get(b);
            let (la, ea) = ia.map(|i| (i.location, i.entire_length())).unwrap_or((0, 0));
            let (lb, eb) = ib.map(|i| (i.location, i.entire_length())).unwrap_or((0, 0));
            la.cmp(&lb).then(eb.cmp(&ea))
        });

        let order = if traversal.len() == by_sort.len() && traversal == by_sort {
            traversal
        } else {
            by_sort
        };

        for (i, key) in order.iter().enumerate() {
            if let Some(item) = self.items.get_mut(key) {
                item.dfs_position = i + 1;
            }
        }
        self.dfs_order = Some(order.clone());
        order
    }

    pub fn invalidate_dfs_order(&mut self) {
        self.dfs_order = None;
    }

    /// Resets the entire cache and Fenwick tree (full-rebuild strategy),
    /// sized to at least `capacity_hint` nodes (§4.5).
    pub fn clear(&mut self, capacity_hint: usize) {
        self.items.clear();
        self.fenwick.reset(capacity_hint.max(1));
        self.next_node_index = 0;
        self.dfs_order = None;
    }
}

fn collect_dfs(state: &EditorState, key: &NodeKey, out: &mut Vec<NodeKey>) {
    let Some(node) = state.get(key) else { return };
    out.push(key.clone());
    for child in node.children() {
        collect_dfs(state, child, out);
    }
}

/// Rebuilds every `RangeCacheItem` for `state` from scratch, in document
/// order, starting at location 0. Used by the full-rebuild and hydration
/// reconcile strategies (§4.5).
pub fn rebuild_range_cache(state: &EditorState, registry: &NodeTypeRegistry) -> RangeCache {
    let mut cache = RangeCache::new();
    cache.clear(state.node_count());
    let mut location = 0usize;
    let mut index = 0usize;
    rebuild_node(state, registry, &NodeKey::root(), &mut location, &mut index, &mut cache);
    cache.derive_dfs_order(state);
    cache
}

fn rebuild_node(
    state: &EditorState,
    registry: &NodeTypeRegistry,
    key: &NodeKey,
    location: &mut usize,
    index: &mut usize,
    cache: &mut RangeCache,
) -> usize {
    let Some(node) = state.get(key) else { return 0 };
    let start = *location;
    *index += 1;
    let node_index = *index as u64;

    let (preamble_length, preamble_special, postamble_length) = match node {
        Node::Root(_) => (0, 0, 0),
        Node::Element(e) => {
            let descriptor = registry.get(&e.node_type);
            (
                (descriptor.preamble)(e).len(),
                (descriptor.preamble_special_character_len)(e),
                (descriptor.postamble)(e).len(),
            )
        }
        _ => (0, 0, 0),
    };
    *location += preamble_length;

    let text_length = node.own_text_length();
    let mut children_length = 0usize;
    if node.is_element() {
        for child in node.children() {
            children_length += rebuild_node(state, registry, child, location, index, cache);
        }
    } else {
        *location += text_length;
    }

    *location += postamble_length;

    let entire = preamble_length + children_length + text_length + postamble_length;
    cache.insert(
        key.clone(),
        RangeCacheItem {
            location: start,
            preamble_length,
            preamble_special_character_length: preamble_special,
            children_length,
            text_length,
            postamble_length,
            node_index,
            dfs_position: 0,
        },
    );
    entire
}

/// Offset-to-Point search (§4.4 `point_at_string_location`). Walks the tree
/// from root, binary-searching each element's children by cached range.
pub fn point_at_string_location(
    state: &EditorState,
    cache: &RangeCache,
    target: usize,
    affinity: Affinity,
) -> EngineResult<Point> {
    let root_len = cache
        .get(&NodeKey::root())
        .map(|i| i.entire_length())
        .unwrap_or(0);
    let target = target.min(root_len);
    search_within(state, cache, &NodeKey::root(), target, affinity)
}

fn search_within(
    state: &EditorState,
    cache: &RangeCache,
    key: &NodeKey,
    target: usize,
    affinity: Affinity,
) -> EngineResult<Point> {
    let node = state
        .get(key)
        .ok_or_else(|| EngineError::RangeCacheSearch(format!("{key:?} missing from state")))?;
    let item = cache
        .get(key)
        .ok_or_else(|| EngineError::RangeCacheSearch(format!("{key:?} missing from range cache")))?;

    if let Node::Text(_) = node {
        let text_start = item.preamble_length;
        let offset = target.saturating_sub(text_start).min(item.text_length);
        return Ok(Point::text(key.clone(), offset));
    }
    if matches!(node, crate::node::Node::LineBreak(_) | crate::node::Node::Decorator(_) | crate::node::Node::Placeholder(_)) {
        return Ok(Point::element(
            node.parent().cloned().unwrap_or_else(NodeKey::root),
            0,
        ));
    }

    // Element/root: binary search children by cached absolute location.
    let children = node.children();
    if children.is_empty() {
        return Ok(Point::element(key.clone(), 0));
    }

    let mut child_ranges = Vec::with_capacity(children.len());
    let mut cursor = item.location + item.preamble_length;
    for child in children {
        let child_item = cache
            .get(child)
            .ok_or_else(|| EngineError::RangeCacheSearch(format!("{child:?} missing from range cache")))?;
        let len = child_item.entire_length();
        child_ranges.push((child.clone(), cursor, cursor + len));
        cursor += len;
    }

    // Before the first child or after the last: boundary classification.
    if target <= child_ranges[0].1 {
        return match affinity {
            Affinity::Forward => search_within(state, cache, &child_ranges[0].0, target, affinity),
            Affinity::Backward => Ok(Point::element(key.clone(), 0)),
        };
    }
    if target >= child_ranges.last().unwrap().2 {
        let last = &child_ranges.last().unwrap().0;
        return match affinity {
            Affinity::Backward => search_within(state, cache, last, target, affinity),
            Affinity::Forward => Ok(Point::element(key.clone(), children.len())),
        };
    }

    // Binary search for the child whose [start, end) contains target.
    let idx = match child_ranges.binary_search_by(|(_, start, end)| {
        if target < *start {
            std::cmp::Ordering::Greater
        } else if target >= *end {
            std::cmp::Ordering::Less
        } else {
            std::cmp::Ordering::Equal
        }
    }) {
        Ok(i) => i,
        Err(i) => i.min(child_ranges.len() - 1),
    };

    let (child_key, start, end) = &child_ranges[idx];
    if *target == *start && idx > 0 {
        // Exact boundary between two children: affinity decides the side.
        return match affinity {
            Affinity::Backward => search_within(state, cache, &child_ranges[idx - 1].0, target, affinity),
            Affinity::Forward => search_within(state, cache, child_key, target, affinity),
        };
    }
    let _ = end;
    search_within(state, cache, child_key, target, affinity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ElementNode, NodeType, TextNode};

    fn paragraph_with_text(state: &mut EditorState, text: &str) -> NodeKey {
        let mut p = ElementNode::new(NodeType::paragraph());
        p.parent = Some(NodeKey::root());
        let mut t = TextNode::new(text);
        t.parent = Some(p.key.clone());
        p.children.push(t.key.clone());
        let pkey = p.key.clone();
        state.nodes.insert(Node::Element(p));
        state.nodes.insert(Node::Text(t));
        let mut root = state.root().clone();
        if let Node::Root(e) = &mut root {
            e.children.push(pkey.clone());
        }
        state.nodes.insert(root);
        pkey
    }

    #[test]
    fn rebuild_produces_consistent_entire_lengths() {
        let mut state = EditorState::empty();
        let registry = NodeTypeRegistry::with_builtins();
        paragraph_with_text(&mut state, "Hello");
        let cache = rebuild_range_cache(&state, &registry);
        let root_item = cache.get(&NodeKey::root()).unwrap();
        // empty() already seeded one empty paragraph, plus our "Hello" one.
        assert_eq!(root_item.entire_length(), root_item.children_length);
    }

    #[test]
    fn point_search_finds_text_offset() {
        let mut state = EditorState::empty();
        let registry = NodeTypeRegistry::with_builtins();
        let p = paragraph_with_text(&mut state, "Hello");
        let text_key = state.get(&p).unwrap().children()[0].clone();
        let cache = rebuild_range_cache(&state, &registry);
        let text_item = cache.get(&text_key).unwrap();
        let point = point_at_string_location(&state, &cache, text_item.location + 2, Affinity::Forward).unwrap();
        assert_eq!(point.key, text_key);
        assert_eq!(point.offset, 2);
    }
}

//! Decorator cache (§5 "Shared resources", §4.8 step 9).
//!
//! Maps a decorator node's key to its mount state. Only the reconciler and
//! the commit phase mutate it; the host drains `needs_creation`/
//! `needs_decorating` entries asynchronously and reports back by calling
//! `mark_cached`/`mark_unmounted`.

use std::collections::HashMap;

use crate::node::NodeKey;

/// Opaque handle the host hands back once it has mounted a view. The core
/// never inspects it (§6.1 "view_for_decorator_subviews").
#[derive(Clone, Debug)]
pub struct DecoratorViewHandle(pub std::sync::Arc<str>);

#[derive(Clone, Debug)]
pub enum DecoratorState {
    NeedsCreation,
    Cached(DecoratorViewHandle),
    Unmounted(DecoratorViewHandle),
    NeedsDecorating(DecoratorViewHandle),
}

#[derive(Default)]
pub struct DecoratorCache {
    entries: HashMap<NodeKey, DecoratorState>,
}

impl DecoratorCache {
    pub fn new() -> Self {
        DecoratorCache::default()
    }

    pub fn get(&self, key: &NodeKey) -> Option<&DecoratorState> {
        self.entries.get(key)
    }

    pub fn mark_needs_creation(&mut self, key: NodeKey) {
        self.entries.insert(key, DecoratorState::NeedsCreation);
    }

    pub fn mark_needs_decorating(&mut self, key: &NodeKey) {
        if let Some(DecoratorState::Cached(handle) | DecoratorState::Unmounted(handle)) = self.entries.get(key) {
            let handle = handle.clone();
            self.entries.insert(key.clone(), DecoratorState::NeedsDecorating(handle));
        }
    }

    pub fn mark_cached(&mut self, key: NodeKey, handle: DecoratorViewHandle) {
        self.entries.insert(key, DecoratorState::Cached(handle));
    }

    pub fn mark_unmounted(&mut self, key: &NodeKey) {
        if let Some(state) = self.entries.remove(key) {
            let handle = match state {
                DecoratorState::Cached(h) | DecoratorState::NeedsDecorating(h) | DecoratorState::Unmounted(h) => Some(h),
                DecoratorState::NeedsCreation => None,
            };
            if let Some(handle) = handle {
                self.entries.insert(key.clone(), DecoratorState::Unmounted(handle));
            }
        }
    }

    pub fn remove(&mut self, key: &NodeKey) {
        self.entries.remove(key);
    }

    /// Reconciles the cache's keys against the committed state's live
    /// decorator set (§4.8 step 9): new decorators get `NeedsCreation`,
    /// vanished ones are dropped so the host can tear down their views.
    pub fn sync_with_state(&mut self, state: &crate::state::EditorState) -> DecoratorDiff {
        let mut live = std::collections::HashSet::new();
        collect_decorators(state, &crate::node::NodeKey::root(), &mut live);

        let mut created = Vec::new();
        for key in &live {
            if !self.entries.contains_key(key) {
                self.mark_needs_creation(key.clone());
                created.push(key.clone());
            }
        }
        let removed: Vec<NodeKey> = self
            .entries
            .keys()
            .filter(|k| !live.contains(*k))
            .cloned()
            .collect();
        for key in &removed {
            self.entries.remove(key);
        }
        DecoratorDiff { created, removed }
    }
}

fn collect_decorators(state: &crate::state::EditorState, key: &NodeKey, out: &mut std::collections::HashSet<NodeKey>) {
    let Some(node) = state.get(key) else { return };
    if matches!(node, crate::node::Node::Decorator(_)) {
        out.insert(key.clone());
    }
    for child in node.children() {
        collect_decorators(state, child, out);
    }
}

/// Decorator keys that newly need a host view created, and ones that were
/// torn down, since the last sync (§4.8 step 9).
#[derive(Debug, Default)]
pub struct DecoratorDiff {
    pub created: Vec<NodeKey>,
    pub removed: Vec<NodeKey>,
}

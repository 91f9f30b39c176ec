//! Update, text-content and error listeners (§4.7).
//!
//! Node transforms are registered separately (`crate::transform`) since
//! they're keyed by `NodeType` rather than fired globally per commit.

use crate::error::EngineError;
use crate::node::NodeKey;
use crate::state::EditorState;

/// Invoked post-commit with `(prev_state, next_state, dirty_keys)` (§4.7).
pub type UpdateListener = Box<dyn FnMut(&EditorState, &EditorState, &[NodeKey])>;

/// Invoked only when the root's text content changed, and only if at least
/// one such listener is registered (the core computes the new text lazily,
/// §4.7).
pub type TextContentListener = Box<dyn FnMut(&str)>;

/// Invoked on any caught exception inside reconcile (§4.5, §4.7).
pub type ErrorListener = Box<dyn FnMut(&EngineError)>;

/// Registration handle id, used for idempotent removal (§4.7 "Removal
/// handlers returned at registration are idempotent").
pub type ListenerId = u64;

#[derive(Default)]
pub struct ListenerBus {
    update_listeners: Vec<(ListenerId, UpdateListener)>,
    text_content_listeners: Vec<(ListenerId, TextContentListener)>,
    error_listeners: Vec<(ListenerId, ErrorListener)>,
    next_id: ListenerId,
}

impl ListenerBus {
    pub fn new() -> Self {
        ListenerBus::default()
    }

    pub fn on_update(&mut self, listener: UpdateListener) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.update_listeners.push((id, listener));
        id
    }

    pub fn on_text_content(&mut self, listener: TextContentListener) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.text_content_listeners.push((id, listener));
        id
    }

    pub fn on_error(&mut self, listener: ErrorListener) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.error_listeners.push((id, listener));
        id
    }

    /// Idempotent: removing an id that isn't registered (already removed,
    /// or never was) is a no-op.
    pub fn remove(&mut self, id: ListenerId) {
        self.update_listeners.retain(|(i, _)| *i != id);
        self.text_content_listeners.retain(|(i, _)| *i != id);
        self.error_listeners.retain(|(i, _)| *i != id);
    }

    pub fn has_text_content_listeners(&self) -> bool {
        !self.text_content_listeners.is_empty()
    }

    pub fn dispatch_update(&mut self, prev: &EditorState, next: &EditorState, dirty: &[NodeKey]) {
        for (_, listener) in &mut self.update_listeners {
            listener(prev, next, dirty);
        }
    }

    pub fn dispatch_text_content(&mut self, text: &str) {
        for (_, listener) in &mut self.text_content_listeners {
            listener(text);
        }
    }

    pub fn dispatch_error(&mut self, error: &EngineError) {
        for (_, listener) in &mut self.error_listeners {
            listener(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removing_listener_is_idempotent() {
        let mut bus = ListenerBus::new();
        let id = bus.on_error(Box::new(|_| {}));
        bus.remove(id);
        bus.remove(id);
        assert_eq!(bus.error_listeners.len(), 0);
    }
}

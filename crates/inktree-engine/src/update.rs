//! The Update Driver and the top-level `Editor` that hosts embed (§4.8).
//!
//! Everything else in this crate (node model, selection primitives, range
//! cache, reconciler, attributed store, command/listener buses) is a part
//! that `Editor::update` wires together into one transaction. Grounded in
//! the teacher's top-level `FileModel`/workspace orchestration: one struct
//! owning every subsystem, one method that drives a mutation through all of
//! them in a fixed order.

use std::collections::HashSet;
use std::rc::Rc;

use crate::attributed_store::AttributedStore;
use crate::clipboard::{self, ClipboardPayload};
use crate::command::{priority_bands_high_to_low, CommandBus, CommandPayload, CommandType, Priority};
use crate::config::EditorConfig;
use crate::decorator::DecoratorCache;
use crate::error::{EngineError, EngineResult};
use crate::host::{Host, NullHost};
use crate::listener::{ErrorListener, ListenerBus, ListenerId, TextContentListener, UpdateListener};
use crate::node::{Node, NodeKey, NodeTypeRegistry};
use crate::range_cache::RangeCache;
use crate::reconcile::{exec, NativeRange, Reconciler};
use crate::selection::{BoundaryClassifier, UnicodeBoundaryClassifier};
use crate::serialize::{self, Migration};
use crate::state::EditorState;
use crate::transform::TransformRegistry;

/// An in-flight IME composition update (§4.8 "marked text"). When set, the
/// Update Driver re-applies `selection_range` to the host after the normal
/// reconcile-selection step, so the host's marked-text cursor wins over
/// whatever the reconciler would otherwise compute from the committed tree.
#[derive(Clone, Copy, Debug)]
pub struct MarkedTextOperation {
    pub selection_range: NativeRange,
}

/// Per-call overrides for `Editor::update` (§4.8). Every flag defaults to
/// the common case (`Default::default()`); hosts opt into a cheaper or
/// different pipeline one flag at a time.
#[derive(Clone, Copy, Debug, Default)]
pub struct UpdateOptions {
    /// Skip re-adopting the native selection after reconcile. Used by hosts
    /// that are about to overwrite the selection themselves (e.g. an
    /// in-progress IME composition).
    pub suppress_reconciling_selection: bool,
    /// Skip the post-commit full-rebuild comparison (§4.8 step 11). Hosts
    /// typically set this during bulk document loads.
    pub suppress_sanity_check: bool,
    /// Skip the transform fixpoint entirely (§4.8 step 5).
    pub skip_transforms: bool,
    /// Run the whole pipeline except host notification: no native selection
    /// update, no placeholder toggle, no decorator diff delivered (§4.8
    /// "Headless mode"). Listener dispatch still runs.
    pub headless: bool,
    /// Present only while an IME composition is in flight (§4.8).
    pub marked_text_operation: Option<MarkedTextOperation>,
}

/// Ties every subsystem together and drives mutations through the 11-phase
/// pipeline described in §4.8: clone, run the closure, normalize, fix point
/// transforms, reconcile, safeguard selection, commit, reconcile decorators,
/// dispatch listeners, sanity-check.
pub struct Editor {
    committed: EditorState,
    pending: Option<EditorState>,
    range_cache: RangeCache,
    store: AttributedStore,
    reconciler: Reconciler,
    transforms: TransformRegistry,
    command_bus: CommandBus,
    listeners: ListenerBus,
    decorators: DecoratorCache,
    config: EditorConfig,
    boundary_classifier: Rc<dyn BoundaryClassifier>,
    host: Box<dyn Host>,
    nested_depth: u32,
    read_only: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Editor::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Editor::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let committed = EditorState::empty();
        let reconciler = Reconciler::new(NodeTypeRegistry::with_builtins(), config.full_rebuild_threshold);
        let mut store = AttributedStore::new();
        let mut range_cache = RangeCache::default();
        exec::full_rebuild(&committed, &reconciler.registry, &mut store, &mut range_cache);

        let mut editor = Editor {
            committed,
            pending: None,
            range_cache,
            store,
            reconciler,
            transforms: TransformRegistry::new(),
            command_bus: CommandBus::new(),
            listeners: ListenerBus::new(),
            decorators: DecoratorCache::new(),
            config,
            boundary_classifier: Rc::new(UnicodeBoundaryClassifier),
            host: Box::new(NullHost),
            nested_depth: 0,
            read_only: false,
        };
        editor.register_builtin_commands();
        editor
    }

    pub fn set_host(&mut self, host: Box<dyn Host>) {
        self.host = host;
    }

    pub fn set_boundary_classifier(&mut self, classifier: Rc<dyn BoundaryClassifier>) {
        self.boundary_classifier = classifier;
    }

    pub fn registry_mut(&mut self) -> &mut NodeTypeRegistry {
        &mut self.reconciler.registry
    }

    pub fn transforms_mut(&mut self) -> &mut TransformRegistry {
        &mut self.transforms
    }

    pub fn commands_mut(&mut self) -> &mut CommandBus {
        &mut self.command_bus
    }

    pub fn on_update(&mut self, listener: UpdateListener) -> ListenerId {
        self.listeners.on_update(listener)
    }

    pub fn on_text_content(&mut self, listener: TextContentListener) -> ListenerId {
        self.listeners.on_text_content(listener)
    }

    pub fn on_error(&mut self, listener: ErrorListener) -> ListenerId {
        self.listeners.on_error(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(id);
    }

    /// The last committed snapshot (§4.2). Never the in-flight pending state
    /// — that only exists for the lifetime of an `update` call.
    pub fn state(&self) -> &EditorState {
        &self.committed
    }

    pub fn range_cache(&self) -> &RangeCache {
        &self.range_cache
    }

    pub fn full_text(&mut self) -> &str {
        self.store.full_text()
    }

    /// Read-only closure scope (§4.8 "Read transactions"). No pending state
    /// is created; the closure only ever sees `&EditorState`.
    pub fn read<T>(&self, f: impl FnOnce(&EditorState) -> T) -> T {
        self.committed.read(f)
    }

    /// Runs `f` against a mutable draft of the document and drives it
    /// through the full pipeline (§4.8). Nested calls (from inside a command
    /// listener, or from a transform) reuse the outer call's pending state
    /// and skip straight back out without re-running reconcile/commit.
    pub fn update(
        &mut self,
        options: UpdateOptions,
        f: impl FnOnce(&mut EditorState) -> EngineResult<()>,
    ) -> EngineResult<()> {
        if self.read_only {
            return Err(EngineError::read_only_mutation());
        }
        if self.nested_depth > 0 {
            self.nested_depth += 1;
            let result = (|| {
                let pending = self.pending.as_mut().ok_or_else(EngineError::not_in_update)?;
                f(pending)
            })();
            self.nested_depth -= 1;
            return result;
        }

        self.nested_depth += 1;
        let outcome = self.run_outer_update(options, f);
        self.nested_depth -= 1;
        outcome
    }

    fn run_outer_update(
        &mut self,
        options: UpdateOptions,
        f: impl FnOnce(&mut EditorState) -> EngineResult<()>,
    ) -> EngineResult<()> {
        match self.try_update_once(options, f) {
            Ok(()) => Ok(()),
            Err(err) => {
                // §4.8 "Errors inside an update closure abort the
                // transaction": notify, drop the half-built pending state,
                // and retry once with an empty closure so the editor is
                // left in a state consistent with `committed` rather than
                // frozen mid-transaction.
                self.listeners.dispatch_error(&err);
                self.pending = None;
                match self.try_update_once(options, |_| Ok(())) {
                    Ok(()) => Err(err),
                    Err(recovery_err) => {
                        self.listeners.dispatch_error(&recovery_err);
                        Err(EngineError::Internal(format!(
                            "update failed and recovery retry also failed: {recovery_err}"
                        )))
                    }
                }
            }
        }
    }

    fn try_update_once(
        &mut self,
        options: UpdateOptions,
        f: impl FnOnce(&mut EditorState) -> EngineResult<()>,
    ) -> EngineResult<()> {
        // Phase 1: clone the committed snapshot into a draft, if one isn't
        // already in flight (a retry after a failed first attempt reuses
        // this branch too, cloning fresh from the still-unchanged commit).
        if self.pending.is_none() {
            self.pending = Some(self.committed.clone());
        }

        // Phase 2/3: the closure runs with exclusive access to the draft.
        f(self.pending.as_mut().expect("pending set above"))?;

        // Phase 4: normalize any text nodes the closure touched.
        self.normalize_dirty_text()?;

        // Phase 5: run registered transforms to a fixpoint.
        if !options.skip_transforms {
            self.run_transform_fixpoint()?;
        }

        let dirty_keys: Vec<NodeKey> = diff_keys(&self.committed, self.pending.as_ref().unwrap())
            .into_iter()
            .collect();

        // Phase 6: reconcile the attributed store and range cache.
        if !options.headless {
            self.reconcile_phase(&dirty_keys, &options)?;
        }

        // Phase 7: selection safeguard — drop a now-invalid selection
        // rather than commit a state that fails validation.
        if let Some(pending) = self.pending.as_mut() {
            if let Some(selection) = &pending.selection {
                if selection.validate(pending).is_err() {
                    pending.selection = None;
                }
            }
        }

        // Phase 8: commit.
        let prev = self.committed.clone();
        self.committed = self.pending.take().expect("pending set above");

        // Phase 9: reconcile decorators and notify the host.
        let decorator_diff = self.decorators.sync_with_state(&self.committed);
        if !options.headless {
            self.host.reconcile_decorators(&decorator_diff);
        }

        // Phase 10: listener dispatch.
        self.listeners.dispatch_update(&prev, &self.committed, &dirty_keys);
        if self.listeners.has_text_content_listeners() {
            let before = prev.text_content(&NodeKey::root());
            let after = self.committed.text_content(&NodeKey::root());
            if before != after {
                self.listeners.dispatch_text_content(&after);
            }
        }
        if !options.headless {
            self.host
                .show_placeholder_text(self.committed.text_content(&NodeKey::root()).is_empty());
        }

        // Phase 11: optional sanity check against a from-scratch rebuild.
        if self.config.sanity_check && !options.suppress_sanity_check && !options.headless {
            self.sanity_check()?;
        }

        Ok(())
    }

    fn normalize_dirty_text(&mut self) -> EngineResult<()> {
        let dirty = diff_keys(&self.committed, self.pending.as_ref().unwrap());
        let pending = self.pending.as_mut().unwrap();
        for key in dirty {
            let is_simple_text = matches!(pending.get(&key), Some(Node::Text(t)) if t.is_simple());
            if is_simple_text {
                pending.normalize_text(&key)?;
            }
        }
        Ok(())
    }

    /// Runs every registered transform against every node dirtied since the
    /// start of the current pass, repeating until a pass produces no new
    /// dirty keys (§4.8 step 5). Transforms are expected to be idempotent —
    /// a transform that keeps rewriting an already-correct node will run
    /// into `max_update_count` and abort the whole update.
    fn run_transform_fixpoint(&mut self) -> EngineResult<()> {
        if self.transforms.is_empty() {
            return Ok(());
        }
        let mut round_base = self.pending.as_ref().unwrap().clone();
        let mut dirty = diff_keys(&self.committed, self.pending.as_ref().unwrap());
        let mut pass = 0u32;
        loop {
            if dirty.is_empty() {
                break;
            }
            pass += 1;
            if pass > self.config.max_update_count {
                return Err(EngineError::nested_update_overflow(self.config.max_update_count));
            }

            for key in &dirty {
                let node_type = match self.pending.as_ref().unwrap().get(key) {
                    Some(node) => node.node_type(),
                    None => continue,
                };
                for transform in self.transforms.for_type(&node_type) {
                    let pending = self.pending.as_mut().unwrap();
                    transform(pending, key)?;
                }
            }

            let new_pending = self.pending.as_ref().unwrap().clone();
            dirty = diff_keys(&round_base, &new_pending);
            round_base = new_pending;
        }
        Ok(())
    }

    fn reconcile_phase(&mut self, dirty_keys: &[NodeKey], options: &UpdateOptions) -> EngineResult<()> {
        let next = self.pending.as_ref().unwrap();
        let result = self
            .reconciler
            .reconcile(&self.committed, next, dirty_keys, &mut self.range_cache, &mut self.store);

        match result {
            Ok(_strategy) => {
                if let Some(marked) = options.marked_text_operation {
                    self.host.update_native_selection(marked.selection_range);
                } else if !options.suppress_reconciling_selection {
                    let next = self.pending.as_ref().unwrap();
                    match self.reconciler.native_selection_range(next, &self.range_cache)? {
                        Some(native) => self.host.update_native_selection(native),
                        None => self.host.reset_selected_range(),
                    }
                }
                Ok(())
            }
            Err(err) => {
                // §4.5 "Reconcile failure": notify, then rebuild the store
                // and cache from the still-committed state so the host's
                // rendered buffer never drifts from what was actually
                // committed last.
                self.listeners.dispatch_error(&err);
                exec::full_rebuild(&self.committed, &self.reconciler.registry, &mut self.store, &mut self.range_cache);
                Err(err)
            }
        }
    }

    /// Compares the reconciled buffer against a from-scratch rebuild of the
    /// just-committed state (§4.8 step 11, §8.1 I7). A mismatch means the
    /// incremental reconcile path diverged from ground truth.
    fn sanity_check(&mut self) -> EngineResult<()> {
        let mut shadow_store = AttributedStore::new();
        let mut shadow_cache = RangeCache::default();
        exec::full_rebuild(&self.committed, &self.reconciler.registry, &mut shadow_store, &mut shadow_cache);
        let expected = shadow_store.full_text().to_string();
        let actual = self.store.full_text().to_string();
        if expected != actual {
            return Err(EngineError::Sanity { expected, actual });
        }
        Ok(())
    }

    /// Dispatches `command` to every registered listener, highest priority
    /// band first, stopping as soon as one returns `true` (§4.7).
    pub fn dispatch_command(&mut self, command: &CommandType, payload: CommandPayload) -> bool {
        for &priority in priority_bands_high_to_low() {
            let mut regs = self.command_bus.take_band(command, priority);
            if regs.is_empty() {
                continue;
            }
            let mut handled = false;
            for reg in regs.iter_mut() {
                if handled {
                    break;
                }
                let fired = if reg.wrap_in_update {
                    let mut result = false;
                    let _ = self.update(UpdateOptions::default(), |state| {
                        result = (reg.listener)(state, &payload);
                        Ok(())
                    });
                    result
                } else {
                    self.run_inspection_listener(&mut reg.listener, &payload)
                };
                handled = fired;
            }
            self.command_bus.restore_band(command, priority, regs);
            if handled {
                return true;
            }
        }
        false
    }

    /// Runs a `wrap_in_update: false` listener: a plain inspection pass that
    /// gets a draft to read (and, if it insists, mutate) without going
    /// through reconcile/commit itself. Piggybacks on an already-open
    /// transaction if one exists; otherwise opens and discards a scratch one.
    fn run_inspection_listener(
        &mut self,
        listener: &mut crate::command::CommandListener,
        payload: &CommandPayload,
    ) -> bool {
        if self.pending.is_some() {
            return listener(self.pending.as_mut().unwrap(), payload);
        }
        let mut scratch = self.committed.clone();
        let result = listener(&mut scratch, payload);
        result
    }

    fn register_builtin_commands(&mut self) {
        self.command_bus
            .register(CommandType::insert_text(), Priority::Editor, true, Box::new(|state, payload| {
                if let CommandPayload::Text(text) = payload {
                    state.insert_text(text).is_ok()
                } else {
                    false
                }
            }));
        self.command_bus
            .register(CommandType::insert_paragraph(), Priority::Editor, true, Box::new(|state, _| {
                state.insert_paragraph().is_ok()
            }));
        self.command_bus
            .register(CommandType::insert_line_break(), Priority::Editor, true, Box::new(|state, _| {
                state.insert_line_break().is_ok()
            }));
        self.command_bus
            .register(CommandType::remove_text(), Priority::Editor, true, Box::new(|state, _| {
                state.remove_text().is_ok()
            }));
        self.command_bus
            .register(CommandType::delete_character(), Priority::Editor, true, Box::new(|state, payload| {
                let backwards = matches!(payload, CommandPayload::Backwards(true));
                state.delete_character(backwards).is_ok()
            }));

        let classifier = self.boundary_classifier.clone();
        self.command_bus
            .register(CommandType::delete_word(), Priority::Editor, true, Box::new(move |state, payload| {
                let backwards = matches!(payload, CommandPayload::Backwards(true));
                state.delete_word(backwards, classifier.as_ref()).is_ok()
            }));
        self.command_bus
            .register(CommandType::delete_line(), Priority::Editor, true, Box::new(|state, payload| {
                let backwards = matches!(payload, CommandPayload::Backwards(true));
                state.delete_line(backwards).is_ok()
            }));
        self.command_bus
            .register(CommandType::paste(), Priority::Editor, true, Box::new(|state, payload| {
                if let CommandPayload::Nodes(nodes) = payload {
                    let nodes: Vec<Node> = (**nodes).clone();
                    state.insert_nodes(nodes, false).is_ok()
                } else {
                    false
                }
            }));
    }

    /// Builds the pasteboard bodies for the current selection (§6.3).
    pub fn copy(&self) -> ClipboardPayload {
        clipboard::build_copy_payload(&self.committed)
    }

    /// Turns a pasted payload into nodes and splices them in at the current
    /// selection (§6.3). Goes through `dispatch_command` like any other
    /// paste source so listeners registered above `Priority::Editor` still
    /// get first refusal.
    pub fn paste(&mut self, private_nodes_json: Option<&str>, plain_text: Option<&str>) -> bool {
        let nodes = clipboard::nodes_from_paste(private_nodes_json, plain_text);
        if nodes.is_empty() {
            return false;
        }
        self.dispatch_command(&CommandType::paste(), CommandPayload::Nodes(Rc::new(nodes)))
    }

    /// Serializes the committed state to the `{version, root}` envelope
    /// (§6.2).
    pub fn to_json_string(&self) -> String {
        serialize::to_json_string(&self.committed)
    }

    /// Replaces the whole document with one parsed from `json` (§6.2). Goes
    /// through the normal update pipeline (with transforms skipped, since
    /// a freshly-parsed document has nothing to normalize) so reconcile,
    /// listeners, and the sanity check all still run against it.
    pub fn load_json(&mut self, json: &str, migrations: &[Migration]) -> EngineResult<()> {
        let parsed = serialize::parse_str(json, &self.reconciler.registry, migrations)?;
        self.set_editor_state(parsed)
    }

    /// Swaps the committed document for `new_state` wholesale (§4.2 "An
    /// `EditorState` may be wholly replaced"). Still runs through the full
    /// pipeline: a whole-document swap dirties every key, which the
    /// reconciler's strategy table resolves to `FullRebuild`.
    pub fn set_editor_state(&mut self, new_state: EditorState) -> EngineResult<()> {
        self.update(
            UpdateOptions {
                skip_transforms: true,
                ..Default::default()
            },
            move |pending| {
                *pending = new_state;
                Ok(())
            },
        )
    }

    /// Runs `f` with mutation disabled: any `update` call inside `f` returns
    /// `Err(EngineError::read_only_mutation())` instead of mutating (§4.8
    /// "Read-only transactions").
    pub fn with_read_only<T>(&mut self, f: impl FnOnce(&mut Editor) -> T) -> T {
        let was_read_only = self.read_only;
        self.read_only = true;
        let result = f(self);
        self.read_only = was_read_only;
        result
    }
}

/// Diffs two states by `Rc` pointer identity rather than by deep value
/// comparison (§4.8 step 5, §4.4 "per-pass marginal diffing"): a node that
/// was never written to during this update still shares its `Rc` with the
/// state it was cloned from, so a pointer compare is O(1) per key instead of
/// O(node size).
fn diff_keys(prev: &EditorState, next: &EditorState) -> HashSet<NodeKey> {
    let mut changed = HashSet::new();
    for (key, rc) in next.nodes.iter_rc() {
        match prev.nodes.get_rc(key) {
            Some(prev_rc) if Rc::ptr_eq(prev_rc, rc) => {}
            _ => {
                changed.insert(key.clone());
            }
        }
    }
    for (key, _) in prev.nodes.iter_rc() {
        if next.get(key).is_none() {
            changed.insert(key.clone());
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Selection;

    #[test]
    fn new_editor_starts_with_one_empty_paragraph() {
        let editor = Editor::new();
        assert_eq!(editor.state().node_count(), 2);
        assert_eq!(editor.state().text_content(&NodeKey::root()), "");
    }

    #[test]
    fn insert_text_commits_and_updates_full_text() {
        let mut editor = Editor::new();
        let paragraph_key = editor.state().root().children()[0].clone();
        editor
            .update(UpdateOptions::default(), |state| {
                state.selection = Some(Selection::range(
                    crate::selection::Point::element(paragraph_key.clone(), 0),
                    crate::selection::Point::element(paragraph_key, 0),
                ));
                state.insert_text("hello")
            })
            .unwrap();
        assert_eq!(editor.state().text_content(&NodeKey::root()), "hello");
        assert_eq!(editor.full_text(), "hello\n");
    }

    #[test]
    fn dispatch_command_runs_registered_builtin() {
        let mut editor = Editor::new();
        let paragraph_key = editor.state().root().children()[0].clone();
        editor
            .update(UpdateOptions::default(), |state| {
                state.selection = Some(Selection::range(
                    crate::selection::Point::element(paragraph_key.clone(), 0),
                    crate::selection::Point::element(paragraph_key, 0),
                ));
                Ok(())
            })
            .unwrap();
        let handled = editor.dispatch_command(&CommandType::insert_text(), CommandPayload::Text("hi".to_string()));
        assert!(handled);
        assert_eq!(editor.state().text_content(&NodeKey::root()), "hi");
    }

    #[test]
    fn read_only_transaction_rejects_mutation() {
        let mut editor = Editor::new();
        editor.with_read_only(|editor| {
            let result = editor.update(UpdateOptions::default(), |state| state.insert_text("nope"));
            assert!(result.is_err());
        });
        assert_eq!(editor.state().text_content(&NodeKey::root()), "");
    }

    #[test]
    fn round_trip_through_json_preserves_text() {
        let mut editor = Editor::new();
        let paragraph_key = editor.state().root().children()[0].clone();
        editor
            .update(UpdateOptions::default(), |state| {
                state.selection = Some(Selection::range(
                    crate::selection::Point::element(paragraph_key.clone(), 0),
                    crate::selection::Point::element(paragraph_key, 0),
                ));
                state.insert_text("round trip")
            })
            .unwrap();
        let json = editor.to_json_string();
        let mut other = Editor::new();
        other.load_json(&json, &[]).unwrap();
        assert_eq!(other.state().text_content(&NodeKey::root()), "round trip");
    }

    /// Spec §8.3 Scenario E: backspace against an inline decorator first
    /// converts to a `NodeSelection`, then removes it and merges the
    /// surrounding text on the next backspace.
    #[test]
    fn inline_decorator_delete_converts_then_merges() {
        use crate::node::{DecoratorNode, TextNode};

        let mut editor = Editor::new();
        let paragraph = editor.state().root().children()[0].clone();

        let mut hello = TextNode::new("Hello ");
        let mut img = DecoratorNode::new("image");
        let mut world = TextNode::new("World");
        hello.parent = Some(paragraph.clone());
        img.parent = Some(paragraph.clone());
        world.parent = Some(paragraph.clone());
        let hello_key = hello.key.clone();
        let img_key = img.key.clone();
        let world_key = world.key.clone();

        editor
            .update(UpdateOptions::default(), |state| {
                state.nodes.insert(Node::Text(hello));
                state.nodes.insert(Node::Decorator(img));
                state.nodes.insert(Node::Text(world));
                if let Node::Element(mut p) = state.nodes.get_for_write(&paragraph).unwrap() {
                    p.children = vec![hello_key.clone(), img_key.clone(), world_key.clone()];
                    state.nodes.insert(Node::Element(p));
                }
                state.selection = Some(Selection::range(
                    crate::selection::Point::text(world_key.clone(), 0),
                    crate::selection::Point::text(world_key.clone(), 0),
                ));
                Ok(())
            })
            .unwrap();

        editor
            .update(UpdateOptions::default(), |state| state.delete_character(true))
            .unwrap();
        match &editor.state().selection {
            Some(Selection::Node(sel)) => {
                assert_eq!(sel.nodes.len(), 1);
                assert!(sel.nodes.contains(&img_key));
            }
            other => panic!("expected a node selection over the decorator, got {other:?}"),
        }
        assert!(editor.state().contains(&img_key));

        editor
            .update(UpdateOptions::default(), |state| state.delete_character(true))
            .unwrap();
        assert!(!editor.state().contains(&img_key));
        assert_eq!(editor.full_text(), "Hello World\n");
    }
}

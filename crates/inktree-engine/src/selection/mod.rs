//! Anchoring the user's cursor in the model (§3.1, §4.3).

pub mod node_selection;
pub mod range;

pub use node_selection::NodeSelection;
pub use range::{BoundaryClassifier, UnicodeBoundaryClassifier};

use crate::error::{EngineError, EngineResult};
use crate::node::NodeKey;
use crate::state::EditorState;

/// Which side of a point's node the offset addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointKind {
    Text,
    Element,
}

/// `(key, offset, kind)` addressing a position in the tree (§3.1, glossary).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Point {
    pub key: NodeKey,
    pub offset: usize,
    pub kind: PointKind,
}

impl Point {
    pub fn text(key: NodeKey, offset: usize) -> Self {
        Point {
            key,
            offset,
            kind: PointKind::Text,
        }
    }

    pub fn element(key: NodeKey, offset: usize) -> Self {
        Point {
            key,
            offset,
            kind: PointKind::Element,
        }
    }

    pub fn validate(&self, state: &EditorState) -> EngineResult<()> {
        let node = state.get(&self.key).ok_or_else(|| {
            EngineError::InvariantViolation(format!("selection references missing node {:?}", self.key))
        })?;
        match self.kind {
            PointKind::Text => {
                let size = node.own_text_length();
                if self.offset > size {
                    return Err(EngineError::InvariantViolation(format!(
                        "text point offset {} exceeds content size {} for {:?}",
                        self.offset, size, self.key
                    )));
                }
            }
            PointKind::Element => {
                let count = node.children().len();
                if self.offset > count {
                    return Err(EngineError::InvariantViolation(format!(
                        "element point offset {} exceeds child count {} for {:?}",
                        self.offset, count, self.key
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Tie-breaker used when a rendered location falls exactly on a boundary
/// between two candidate Points (§4.3, §4.4, §8.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Affinity {
    Forward,
    Backward,
}

/// Anchor-and-focus selection with a format mask (§3.1).
#[derive(Clone, Debug)]
pub struct RangeSelectionState {
    pub anchor: Point,
    pub focus: Point,
    pub format: crate::node::TextFormat,
    pub dirty: bool,
}

/// The selection sum type. `Grid` is preserved opaquely for table-plugin
/// hosts: the core never interprets it, only carries it across clones.
#[derive(Clone, Debug)]
pub enum Selection {
    Range(RangeSelectionState),
    Node(NodeSelection),
    Grid(GridSelection),
}

#[derive(Clone, Debug, Default)]
pub struct GridSelection {
    pub dirty: bool,
}

impl Selection {
    pub fn range(anchor: Point, focus: Point) -> Self {
        Selection::Range(RangeSelectionState {
            anchor,
            focus,
            format: crate::node::TextFormat::none(),
            dirty: true,
        })
    }

    pub fn is_dirty(&self) -> bool {
        match self {
            Selection::Range(r) => r.dirty,
            Selection::Node(n) => n.dirty,
            Selection::Grid(g) => g.dirty,
        }
    }

    pub fn mark_clean(&mut self) {
        match self {
            Selection::Range(r) => r.dirty = false,
            Selection::Node(n) => n.dirty = false,
            Selection::Grid(g) => g.dirty = false,
        }
    }

    pub fn validate(&self, state: &EditorState) -> EngineResult<()> {
        match self {
            Selection::Range(r) => {
                r.anchor.validate(state)?;
                r.focus.validate(state)?;
            }
            Selection::Node(n) => {
                for key in &n.nodes {
                    if !state.contains(key) {
                        return Err(EngineError::InvariantViolation(format!(
                            "node selection references missing node {key:?}"
                        )));
                    }
                }
            }
            Selection::Grid(_) => {}
        }
        Ok(())
    }
}

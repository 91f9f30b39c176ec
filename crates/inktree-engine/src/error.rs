//! Error taxonomy for the editor core.
//!
//! The Update Driver and Reconciler branch on the *kind* of failure (see
//! `editing::update`), so internal engine operations return `EngineError`
//! rather than an opaque `anyhow::Error`. Top-level host-facing entry points
//! that don't need to pattern-match on failure still return `anyhow::Result`,
//! matching the rest of this codebase's convention.

use crate::node::NodeKey;

/// The five error families from the core's failure taxonomy.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A structural precondition failed: a detached node was mutated, a
    /// token/segmented text node was split, a mutation happened outside an
    /// active update, or the transform fixpoint overflowed.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The offset-to-Point search hit an unrecoverable cache inconsistency
    /// (e.g. a range-cache entry missing for a key reachable from the root).
    #[error("range cache search failed: {0}")]
    RangeCacheSearch(String),

    /// The reconciled attributed-store text disagrees with a from-scratch
    /// full rebuild of the committed state.
    #[error("sanity check failed: expected {expected:?}, got {actual:?}")]
    Sanity { expected: String, actual: String },

    /// Serialization/deserialization failure: unknown node type, malformed
    /// JSON, or a version with no matching migration.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An unreachable branch or other programmer error. Represents a bug in
    /// the engine itself rather than a misuse by the caller.
    #[error("internal engine error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn detached_node(key: &NodeKey) -> Self {
        EngineError::InvariantViolation(format!("node {key:?} is detached from the active state"))
    }

    pub fn token_text_split(key: &NodeKey) -> Self {
        EngineError::InvariantViolation(format!("cannot split token text node {key:?}"))
    }

    pub fn not_in_update() -> Self {
        EngineError::InvariantViolation("mutation attempted outside an active update".to_string())
    }

    pub fn read_only_mutation() -> Self {
        EngineError::InvariantViolation("mutation attempted inside a read-only transaction".to_string())
    }

    pub fn nested_update_overflow(max: u32) -> Self {
        EngineError::InvariantViolation(format!(
            "transform fixpoint did not converge after {max} passes"
        ))
    }

    pub fn unknown_node_type(type_tag: &str) -> Self {
        EngineError::Serialization(format!("unknown node type {type_tag:?}"))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

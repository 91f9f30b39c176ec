//! Tunables for the Update Driver and Reconciler (§4.8, §4.5).
//!
//! Kept as a plain struct built with `Default` rather than a config-file
//! crate: there is no on-disk configuration in scope (§1 Non-goals), and
//! the teacher's own engine crate favors small explicit config structs
//! over a config-loading dependency.

/// Editor-wide tunables. Construct with `Default::default()` and override
/// only the fields a host cares about.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EditorConfig {
    /// Transform fixpoint gives up after this many passes (§4.8 step 5,
    /// §5 "Cancellation & timeouts").
    pub max_update_count: u32,
    /// Fraction of the document's node count that must be dirty before the
    /// reconciler prefers a full rebuild over patching incrementally
    /// (§4.5 strategy table).
    pub full_rebuild_threshold: f32,
    /// Whether `Update Driver` step 11 compares the reconciled buffer
    /// against a from-scratch rebuild after every commit (§4.8 step 11).
    /// Hosts typically disable this during bulk initialization.
    pub sanity_check: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            max_update_count: 99,
            full_rebuild_threshold: 0.5,
            sanity_check: true,
        }
    }
}

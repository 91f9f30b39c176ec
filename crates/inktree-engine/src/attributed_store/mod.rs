//! The rendered-buffer truth: an attributed-character sequence shared
//! between the core and the rendering host (§3.1, §4.6).
//!
//! Grounded directly in the teacher's own buffer: `xi_rope::Rope` is the
//! text storage (O(log N) insert/delete, see `editing::document::Document`),
//! and attribute runs ride along the same `Delta`/`Transformer` machinery
//! the teacher uses to keep `Anchor` ranges in sync across edits
//! (`editing::anchors::transform_anchors`). Rather than hand-rolling a
//! second balanced-tree rope of `(text, runs)` leaves, attribute runs are a
//! side list transformed the same way anchors are — same idiom, new
//! payload.

use xi_rope::delta::{Builder, Transformer};
use xi_rope::{Delta, Rope, RopeInfo};

use crate::node::{NodeKey, TextFormat};

/// One contiguous run of uniform formatting, optionally tied back to the
/// node that produced it (§3.1 `AttributedChunk`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeRun {
    pub range: std::ops::Range<usize>,
    pub format: TextFormat,
    pub style_hash: u64,
    pub node_key: Option<NodeKey>,
}

/// A span of text plus the attribute runs that cover it, ready to be
/// spliced into the store as a single edit (§3.1).
#[derive(Clone, Debug, Default)]
pub struct AttributedChunk {
    pub text: String,
    pub runs: Vec<AttributeRun>,
}

impl AttributedChunk {
    pub fn plain(text: impl Into<String>) -> Self {
        AttributedChunk {
            text: text.into(),
            runs: Vec::new(),
        }
    }

    pub fn with_run(text: impl Into<String>, format: TextFormat, style_hash: u64, node_key: Option<NodeKey>) -> Self {
        let text = text.into();
        let len = text.len();
        AttributedChunk {
            runs: vec![AttributeRun {
                range: 0..len,
                format,
                style_hash,
                node_key,
            }],
            text,
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Distinguishes host-originated edits from core-originated ones (§5 Shared
/// resources). While `Controller`, the reconciler is the writer and
/// host-visible change callbacks are suppressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreMode {
    None,
    Controller,
}

/// Published once per transaction so the host can invalidate glyph layout
/// (§4.6 "Host notification").
#[derive(Clone, Debug)]
pub struct TextStorageEdit {
    pub edited_range: std::ops::Range<usize>,
    pub length_delta: i64,
}

/// The rope-backed attributed-character sequence (§4.6).
pub struct AttributedStore {
    rope: Rope,
    runs: Vec<AttributeRun>,
    mode: StoreMode,
    in_transaction: bool,
    pending_edits: Vec<TextStorageEdit>,
    /// Lazily materialized full-text cache; `None` means stale.
    full_text_cache: Option<String>,
}

impl Default for AttributedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributedStore {
    pub fn new() -> Self {
        AttributedStore {
            rope: Rope::from(""),
            runs: Vec::new(),
            mode: StoreMode::None,
            in_transaction: false,
            pending_edits: Vec::new(),
            full_text_cache: None,
        }
    }

    pub fn mode(&self) -> StoreMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: StoreMode) {
        self.mode = mode;
    }

    pub fn len(&self) -> usize {
        self.rope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.is_empty()
    }

    /// Batches edits into one reconcile-pass transaction (§4.5 "Edits are
    /// batched").
    pub fn begin_editing(&mut self) {
        self.in_transaction = true;
    }

    /// Closes the transaction and returns the edits accumulated since
    /// `begin_editing`, for the host to drain (§4.6).
    pub fn end_editing(&mut self) -> Vec<TextStorageEdit> {
        self.in_transaction = false;
        std::mem::take(&mut self.pending_edits)
    }

    fn record_edit(&mut self, edited_range: std::ops::Range<usize>, length_delta: i64) {
        self.pending_edits.push(TextStorageEdit {
            edited_range: edited_range.clone(),
            length_delta,
        });
        self.evict_cache_for_edit(edited_range, length_delta);
    }

    /// Invalidates/shifts the cached full-text string: regions entirely
    /// before the edit are untouched, regions entirely after are shifted by
    /// `length_delta`, anything overlapping the edit is evicted wholesale
    /// (§4.6 "String materialization"). The cache here is the whole string
    /// or nothing — a finer-grained region cache would need its own
    /// interval-tracking structure that no retrieved example carries, so
    /// the simplification is: keep the cache only when the edit doesn't
    /// touch it, otherwise drop it and rebuild lazily on next read.
    fn evict_cache_for_edit(&mut self, _edited_range: std::ops::Range<usize>, _length_delta: i64) {
        self.full_text_cache = None;
    }

    /// Splits `text` into a `Delta` at `at` (or over `range` for delete),
    /// applies it to the rope, and returns it so callers can transform
    /// attribute runs through the same operation, mirroring
    /// `Document::apply`'s "compile to Delta, then transform anchors"
    /// sequencing.
    fn apply_delta(&mut self, delta: Delta<RopeInfo>) {
        self.rope = delta.apply(&self.rope);
        let mut transformer = Transformer::new(&delta);
        let doc_len = self.rope.len();
        for run in &mut self.runs {
            let new_start = transformer.transform(run.range.start, true);
            let new_end = transformer.transform(run.range.end, false);
            if new_start <= new_end && new_end <= doc_len {
                run.range = new_start..new_end;
            } else {
                let start = new_start.min(doc_len);
                let end = new_end.min(doc_len).max(start);
                run.range = start..end;
            }
        }
        self.runs.retain(|r| r.range.start < r.range.end);
    }

    /// `insert(chunk, at)` (§4.6).
    pub fn insert(&mut self, at: usize, chunk: AttributedChunk) {
        if chunk.is_empty() {
            return;
        }
        let len = chunk.len();
        let mut builder = Builder::new(self.rope.len());
        builder.replace(at..at, Rope::from(&chunk.text));
        let delta = builder.build();
        self.apply_delta(delta);

        for run in &chunk.runs {
            self.runs.push(AttributeRun {
                range: (at + run.range.start)..(at + run.range.end),
                format: run.format,
                style_hash: run.style_hash,
                node_key: run.node_key.clone(),
            });
        }
        self.runs.sort_by_key(|r| r.range.start);
        self.record_edit(at..(at + len), len as i64);
    }

    /// `delete(range)` (§4.6).
    pub fn delete(&mut self, range: std::ops::Range<usize>) {
        if range.start >= range.end {
            return;
        }
        let len = range.end - range.start;
        let mut builder = Builder::new(self.rope.len());
        builder.delete(range.clone());
        let delta = builder.build();
        self.apply_delta(delta);
        self.record_edit(range.start..range.start, -(len as i64));
    }

    /// `replace(range, chunk)`: delete then insert (§4.6).
    pub fn replace(&mut self, range: std::ops::Range<usize>, chunk: AttributedChunk) {
        self.delete(range.clone());
        self.insert(range.start, chunk);
    }

    /// `chunk_at(index)`: the run covering `index`, if any, alongside the
    /// offset of `index` within that run.
    pub fn chunk_at(&self, index: usize) -> Option<(&AttributeRun, usize)> {
        self.runs
            .iter()
            .find(|r| r.range.contains(&index))
            .map(|r| (r, index - r.range.start))
    }

    /// `attributes_at(index)`: the effective format/style at `index`, or
    /// the default (unformatted) attributes if no run covers it.
    pub fn attributes_at(&self, index: usize) -> (TextFormat, u64) {
        self.chunk_at(index)
            .map(|(r, _)| (r.format, r.style_hash))
            .unwrap_or((TextFormat::none(), 0))
    }

    /// `set_attributes(range, attrs)`: extracts `range` as a single run with
    /// the given attributes, trimming/splitting any runs it overlaps
    /// (§4.6).
    pub fn set_attributes(&mut self, range: std::ops::Range<usize>, format: TextFormat, style_hash: u64, node_key: Option<NodeKey>) {
        if range.start >= range.end {
            return;
        }
        let mut kept = Vec::with_capacity(self.runs.len() + 1);
        for run in self.runs.drain(..) {
            if run.range.end <= range.start || run.range.start >= range.end {
                kept.push(run);
                continue;
            }
            if run.range.start < range.start {
                kept.push(AttributeRun {
                    range: run.range.start..range.start,
                    ..run.clone()
                });
            }
            if run.range.end > range.end {
                kept.push(AttributeRun {
                    range: range.end..run.range.end,
                    ..run
                });
            }
        }
        kept.push(AttributeRun {
            range,
            format,
            style_hash,
            node_key,
        });
        kept.retain(|r| r.range.start < r.range.end);
        kept.sort_by_key(|r| r.range.start);
        self.runs = kept;
    }

    /// Full materialized text, rebuilding the cache if it was evicted
    /// (§4.6). O(N) on cache miss, O(1) otherwise.
    pub fn full_text(&mut self) -> &str {
        if self.full_text_cache.is_none() {
            self.full_text_cache = Some(self.rope.to_string());
        }
        self.full_text_cache.as_deref().unwrap()
    }

    /// Range-scoped materializer: walks the rope directly without touching
    /// the full-text cache (§4.6).
    pub fn substring(&self, range: std::ops::Range<usize>) -> String {
        let range = range.start.min(self.rope.len())..range.end.min(self.rope.len());
        self.rope.slice_to_cow(range).into_owned()
    }

    /// Clears the store and every attribute run (full-rebuild strategy,
    /// §4.5).
    pub fn clear(&mut self) {
        self.rope = Rope::from("");
        self.runs.clear();
        self.full_text_cache = None;
    }

    pub fn chunk_iter(&self) -> impl Iterator<Item = &AttributeRun> {
        self.runs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_full_text_round_trips() {
        let mut store = AttributedStore::new();
        store.begin_editing();
        store.insert(0, AttributedChunk::plain("Hello\n"));
        store.insert(5, AttributedChunk::plain(" there"));
        let edits = store.end_editing();
        assert_eq!(edits.len(), 2);
        assert_eq!(store.full_text(), "Hello there\n");
    }

    #[test]
    fn delete_shrinks_store_and_shifts_runs() {
        let mut store = AttributedStore::new();
        store.insert(0, AttributedChunk::with_run("Hello world", TextFormat::BOLD, 0, None));
        store.delete(0..6);
        assert_eq!(store.full_text(), "world");
        let (run, offset) = store.chunk_at(0).unwrap();
        assert_eq!(run.format, TextFormat::BOLD);
        assert_eq!(offset, 0);
    }

    #[test]
    fn set_attributes_splits_overlapping_run() {
        let mut store = AttributedStore::new();
        store.insert(0, AttributedChunk::with_run("Hello world", TextFormat::BOLD, 0, None));
        store.set_attributes(0..5, TextFormat::ITALIC, 0, None);
        assert_eq!(store.attributes_at(0).0, TextFormat::ITALIC);
        assert_eq!(store.attributes_at(6).0, TextFormat::BOLD);
    }

    #[test]
    fn substring_does_not_require_full_text_cache() {
        let mut store = AttributedStore::new();
        store.insert(0, AttributedChunk::plain("Hello world"));
        assert_eq!(store.substring(6..11), "world");
    }
}

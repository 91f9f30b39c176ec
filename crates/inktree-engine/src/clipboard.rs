//! Clipboard payload construction (§6.3).
//!
//! Builds the pasteboard bodies the host writes out on copy, and turns a
//! pasted payload back into nodes the core can splice in with
//! `RangeSelection::insert_nodes`. Writing to an actual OS pasteboard is
//! host work (§1 Non-goals); this module only builds/consumes the payload
//! bytes, the way `serialize` only builds/consumes JSON.

use crate::node::{ElementNode, Node, NodeKey, NodeType, TextNode};
use crate::selection::Selection;
use crate::serialize::{self};
use crate::state::EditorState;

/// The three pasteboard bodies copy produces, in priority order (§6.3).
#[derive(Clone, Debug)]
pub struct ClipboardPayload {
    /// `application/x-lexical-nodes`: JSON array of serialized nodes
    /// preserving full structure. Private to this engine lineage.
    pub private_nodes_json: String,
    /// `text/rtf`: left as an empty placeholder here since RTF generation
    /// is a platform-rendering concern (§1 Non-goals); the host is
    /// expected to fill this in if it wants a best-effort RTF body.
    pub rtf: Option<String>,
    /// `text/plain`: the selection's text content.
    pub plain_text: String,
}

/// Builds the clipboard payload for everything currently selected
/// (range or node selection) in `state` (§6.3 "Copy writes three
/// pasteboard types").
pub fn build_copy_payload(state: &EditorState) -> ClipboardPayload {
    let keys = selected_top_level_keys(state);
    let nodes_json: Vec<_> = keys.iter().map(|k| node_json(state, k)).collect();
    let plain_text = keys
        .iter()
        .map(|k| state.text_content(k))
        .collect::<Vec<_>>()
        .join("\n");

    ClipboardPayload {
        private_nodes_json: serde_json::Value::Array(nodes_json).to_string(),
        rtf: None,
        plain_text,
    }
}

fn node_json(state: &EditorState, key: &NodeKey) -> serde_json::Value {
    // Reuses the same per-node JSON shape serialize::to_json writes for a
    // whole document, just rooted at an arbitrary key instead of the root.
    serialize::node_json_for_clipboard(state, key)
}

fn selected_top_level_keys(state: &EditorState) -> Vec<NodeKey> {
    match &state.selection {
        Some(Selection::Node(n)) => n.nodes.iter().cloned().collect(),
        Some(Selection::Range(r)) => {
            if r.anchor.key == r.focus.key {
                vec![r.anchor.key.clone()]
            } else {
                vec![r.anchor.key.clone(), r.focus.key.clone()]
            }
        }
        _ => Vec::new(),
    }
}

/// Reads a pasted payload, preferring the private JSON body, then falling
/// back to plain text as entries go missing (§6.3 "Paste reads in the same
/// priority, falling back as entries are missing").
pub fn nodes_from_paste(private_nodes_json: Option<&str>, plain_text: Option<&str>) -> Vec<Node> {
    if let Some(json) = private_nodes_json {
        if let Ok(serde_json::Value::Array(items)) = serde_json::from_str(json) {
            let mut out = Vec::new();
            for item in &items {
                out.extend(serialize::flatten_clipboard_node(item));
            }
            if !out.is_empty() {
                return out;
            }
        }
    }
    if let Some(text) = plain_text {
        return paragraphs_from_plain_text(text);
    }
    Vec::new()
}

/// Splits plain text on paragraph separators; each paragraph becomes a
/// `ParagraphNode` containing one `TextNode` (§6.3). Returns a flat list
/// (each paragraph followed by its text child) since `insert_nodes`
/// inserts every node in the batch and re-parents only the ones nobody
/// else in the batch claims as a child.
pub fn paragraphs_from_plain_text(text: &str) -> Vec<Node> {
    let mut out = Vec::new();
    for line in text.split('\n') {
        let mut p = ElementNode::new(NodeType::paragraph());
        let mut t = TextNode::new(line);
        t.parent = Some(p.key.clone());
        p.children.push(t.key.clone());
        out.push(Node::Element(p));
        out.push(Node::Text(t));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_paste_splits_on_paragraph_separators() {
        let nodes = paragraphs_from_plain_text("A\nB\nC");
        // one ParagraphNode plus one TextNode per input line.
        assert_eq!(nodes.len(), 6);
        let paragraph_count = nodes.iter().filter(|n| matches!(n, Node::Element(_))).count();
        assert_eq!(paragraph_count, 3);
    }
}

//! Editor state JSON serialization (§6.2).
//!
//! `serde`/`serde_json` for the wire format, matching the teacher's own use
//! of `serde` for its `SerializedElementNode`-shaped types elsewhere in the
//! workspace. Node identity (`NodeKey`) is in-memory only and never appears
//! on the wire — deserializing mints fresh keys, the same way the teacher's
//! anchor system re-derives identity after a round trip rather than
//! serializing it.

use serde_json::{json, Value};

use crate::error::{EngineError, EngineResult};
use crate::node::{
    DecoratorNode, Direction, ElementNode, LineBreakNode, Node, NodeKey, NodeType, NodeTypeRegistry,
    PlaceholderNode, TextFormat, TextMode, TextNode,
};
use crate::state::EditorState;

/// Current wire version this crate writes. Parsing accepts any version a
/// migration chain can walk forward from.
pub const CURRENT_VERSION: u64 = 1;

fn direction_str(d: Option<Direction>) -> Value {
    match d {
        Some(Direction::Ltr) => json!("ltr"),
        Some(Direction::Rtl) => json!("rtl"),
        None => Value::Null,
    }
}

fn direction_from_str(v: &Value) -> Option<Direction> {
    match v.as_str() {
        Some("ltr") => Some(Direction::Ltr),
        Some("rtl") => Some(Direction::Rtl),
        _ => None,
    }
}

fn mode_str(mode: TextMode) -> &'static str {
    match mode {
        TextMode::Normal => "normal",
        TextMode::Token => "token",
        TextMode::Segmented => "segmented",
    }
}

fn mode_from_str(s: &str) -> TextMode {
    match s {
        "token" => TextMode::Token,
        "segmented" => TextMode::Segmented,
        _ => TextMode::Normal,
    }
}

/// Serializes `state` to the `{ "version", "root" }` envelope (§6.2).
pub fn to_json(state: &EditorState) -> Value {
    json!({
        "version": CURRENT_VERSION,
        "root": node_to_json(state, &NodeKey::root()),
    })
}

pub fn to_json_string(state: &EditorState) -> String {
    to_json(state).to_string()
}

pub(crate) fn node_json_for_clipboard(state: &EditorState, key: &NodeKey) -> Value {
    node_to_json(state, key)
}

fn node_to_json(state: &EditorState, key: &NodeKey) -> Value {
    match state.get(key) {
        Some(Node::Root(e)) | Some(Node::Element(e)) => {
            let children: Vec<Value> = e.children.iter().map(|c| node_to_json(state, c)).collect();
            json!({
                "type": e.node_type.as_str(),
                "children": children,
                "direction": direction_str(e.direction),
                "indent": e.indent,
                "canIndent": e.can_indent,
                "canInsertTab": e.can_insert_tab,
                "isInline": e.is_inline,
            })
        }
        Some(Node::Text(t)) => json!({
            "type": "text",
            "text": t.text,
            "format": t.format.0,
            "style": t.style_hash.to_string(),
            "mode": mode_str(t.mode),
            "detail": 0,
        }),
        Some(Node::LineBreak(_)) => json!({ "type": "linebreak" }),
        Some(Node::Decorator(d)) => json!({
            "type": "decorator",
            "decoratorType": d.decorator_type,
            "inline": d.is_inline_decorator,
        }),
        Some(Node::Placeholder(_)) => json!({ "type": "placeholder" }),
        None => Value::Null,
    }
}

/// `{from_version, to_version, handler}` (§6.2). Handlers run in order;
/// `parse` applies every migration whose `from_version` matches the
/// document's current version, advancing it each time.
pub struct Migration {
    pub from_version: u64,
    pub to_version: u64,
    pub handler: fn(Value) -> Value,
}

fn apply_migrations(mut version: u64, mut root: Value, migrations: &[Migration]) -> (u64, Value) {
    loop {
        let next = migrations.iter().find(|m| m.from_version == version);
        match next {
            Some(m) => {
                root = (m.handler)(root);
                version = m.to_version;
            }
            None => break,
        }
    }
    (version, root)
}

/// Parses the `{ "version", "root" }` envelope into a fresh `EditorState`,
/// minting new `NodeKey`s for every node (§6.2, §8.1 I6).
pub fn from_json(data: &Value, registry: &NodeTypeRegistry, migrations: &[Migration]) -> EngineResult<EditorState> {
    let version = data
        .get("version")
        .and_then(Value::as_u64)
        .ok_or_else(|| EngineError::Serialization("missing or non-integer \"version\"".to_string()))?;
    let root_json = data
        .get("root")
        .ok_or_else(|| EngineError::Serialization("missing \"root\"".to_string()))?
        .clone();

    let (_version, root_json) = apply_migrations(version, root_json, migrations);

    let mut state = EditorState::empty();
    // Clear the default-seeded root/paragraph; we rebuild from scratch.
    state = EditorState {
        nodes: Default::default(),
        selection: None,
        version: CURRENT_VERSION,
    };

    let root_key = NodeKey::root();
    let children = parse_children(&root_json, registry, &mut state, Some(root_key.clone()))?;
    let mut root = ElementNode::new_root();
    root.children = children;
    state.nodes.insert(Node::Root(root));

    Ok(state)
}

fn parse_children(
    parent_json: &Value,
    registry: &NodeTypeRegistry,
    state: &mut EditorState,
    parent_key: Option<NodeKey>,
) -> EngineResult<Vec<NodeKey>> {
    let children = parent_json
        .get("children")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let mut keys = Vec::with_capacity(children.len());
    for child in &children {
        keys.push(parse_node(child, registry, state, parent_key.clone())?);
    }
    Ok(keys)
}

fn parse_node(
    json: &Value,
    registry: &NodeTypeRegistry,
    state: &mut EditorState,
    parent_key: Option<NodeKey>,
) -> EngineResult<NodeKey> {
    let type_tag = json
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::Serialization("node missing \"type\"".to_string()))?;

    let node = match type_tag {
        "text" => {
            let text = json.get("text").and_then(Value::as_str).unwrap_or("").to_string();
            let format = TextFormat(json.get("format").and_then(Value::as_u64).unwrap_or(0) as u32);
            let style_hash = json
                .get("style")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0);
            let mode = json
                .get("mode")
                .and_then(Value::as_str)
                .map(mode_from_str)
                .unwrap_or(TextMode::Normal);
            let mut t = TextNode::new(text);
            t.format = format;
            t.style_hash = style_hash;
            t.mode = mode;
            t.parent = parent_key;
            Node::Text(t)
        }
        "linebreak" => {
            let mut lb = LineBreakNode::new();
            lb.parent = parent_key;
            Node::LineBreak(lb)
        }
        "decorator" => {
            let decorator_type = json
                .get("decoratorType")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            let mut d = DecoratorNode::new(decorator_type);
            d.is_inline_decorator = json.get("inline").and_then(Value::as_bool).unwrap_or(true);
            d.parent = parent_key;
            Node::Decorator(d)
        }
        "placeholder" => {
            let mut p = PlaceholderNode::new();
            p.parent = parent_key.clone();
            Node::Placeholder(p)
        }
        other => {
            let node_type = NodeType::new(other);
            if !registry.contains(&node_type) {
                return Err(EngineError::unknown_node_type(other));
            }
            let mut e = ElementNode::new(node_type);
            e.direction = json.get("direction").and_then(direction_from_str);
            e.indent = json.get("indent").and_then(Value::as_u64).unwrap_or(0) as u32;
            e.can_indent = json.get("canIndent").and_then(Value::as_bool).unwrap_or(true);
            e.can_insert_tab = json.get("canInsertTab").and_then(Value::as_bool).unwrap_or(false);
            e.is_inline = json.get("isInline").and_then(Value::as_bool).unwrap_or(false);
            e.parent = parent_key;
            let key = e.key.clone();
            e.children = parse_children(json, registry, state, Some(key.clone()))?;
            Node::Element(e)
        }
    };
    let key = node.key().clone();
    state.nodes.insert(node);
    Ok(key)
}

/// Flattens one clipboard-format node (and its descendants) into a
/// `Vec<Node>` suitable for `RangeSelection::insert_nodes` (§6.3). Unlike
/// `from_json`/`parse_node`, this trusts the type tags without checking
/// against a registry: the private clipboard format is produced by this
/// same engine, not by an external author, so an unregistered element type
/// just round-trips as an opaque container rather than erroring.
pub(crate) fn flatten_clipboard_node(json: &Value) -> Vec<Node> {
    let mut out = Vec::new();
    build_clipboard_node(json, None, &mut out);
    out
}

fn build_clipboard_node(json: &Value, parent_key: Option<NodeKey>, out: &mut Vec<Node>) -> Option<NodeKey> {
    let type_tag = json.get("type").and_then(Value::as_str)?;
    let key = match type_tag {
        "text" => {
            let text = json.get("text").and_then(Value::as_str).unwrap_or("").to_string();
            let format = TextFormat(json.get("format").and_then(Value::as_u64).unwrap_or(0) as u32);
            let style_hash = json
                .get("style")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0);
            let mode = json
                .get("mode")
                .and_then(Value::as_str)
                .map(mode_from_str)
                .unwrap_or(TextMode::Normal);
            let mut t = TextNode::new(text);
            t.format = format;
            t.style_hash = style_hash;
            t.mode = mode;
            t.parent = parent_key;
            let key = t.key.clone();
            out.push(Node::Text(t));
            key
        }
        "linebreak" => {
            let mut lb = LineBreakNode::new();
            lb.parent = parent_key;
            let key = lb.key.clone();
            out.push(Node::LineBreak(lb));
            key
        }
        "decorator" => {
            let decorator_type = json
                .get("decoratorType")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            let mut d = DecoratorNode::new(decorator_type);
            d.is_inline_decorator = json.get("inline").and_then(Value::as_bool).unwrap_or(true);
            d.parent = parent_key;
            let key = d.key.clone();
            out.push(Node::Decorator(d));
            key
        }
        "placeholder" => {
            let mut p = PlaceholderNode::new();
            p.parent = parent_key;
            let key = p.key.clone();
            out.push(Node::Placeholder(p));
            key
        }
        other => {
            let mut e = ElementNode::new(NodeType::new(other));
            e.direction = json.get("direction").and_then(direction_from_str);
            e.indent = json.get("indent").and_then(Value::as_u64).unwrap_or(0) as u32;
            e.can_indent = json.get("canIndent").and_then(Value::as_bool).unwrap_or(true);
            e.can_insert_tab = json.get("canInsertTab").and_then(Value::as_bool).unwrap_or(false);
            e.is_inline = json.get("isInline").and_then(Value::as_bool).unwrap_or(false);
            e.parent = parent_key;
            let key = e.key.clone();
            let children_json = json.get("children").and_then(Value::as_array).cloned().unwrap_or_default();
            let mut child_keys = Vec::with_capacity(children_json.len());
            for child in &children_json {
                if let Some(ck) = build_clipboard_node(child, Some(key.clone()), out) {
                    child_keys.push(ck);
                }
            }
            e.children = child_keys;
            out.push(Node::Element(e));
            key
        }
    };
    Some(key)
}

pub fn parse_str(s: &str, registry: &NodeTypeRegistry, migrations: &[Migration]) -> EngineResult<EditorState> {
    let value: Value =
        serde_json::from_str(s).map_err(|e| EngineError::Serialization(format!("invalid JSON: {e}")))?;
    from_json(&value, registry, migrations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeTypeRegistry;

    #[test]
    fn round_trips_a_simple_document() {
        let mut state = EditorState::empty();
        let registry = NodeTypeRegistry::with_builtins();
        let json = to_json(&state);
        let parsed = from_json(&json, &registry, &[]).unwrap();
        assert_eq!(parsed.node_count(), state.node_count());
        assert_eq!(parsed.text_content(&NodeKey::root()), state.text_content(&NodeKey::root()));
    }

    #[test]
    fn unknown_node_type_is_an_error() {
        let registry = NodeTypeRegistry::with_builtins();
        let bad = json!({
            "version": CURRENT_VERSION,
            "root": { "type": "root", "children": [ { "type": "mystery-widget", "children": [] } ] },
        });
        let err = from_json(&bad, &registry, &[]).unwrap_err();
        match err {
            EngineError::Serialization(msg) => assert!(msg.contains("mystery-widget")),
            other => panic!("expected Serialization error, got {other:?}"),
        }
    }

    #[test]
    fn migration_advances_version_before_parsing() {
        let registry = NodeTypeRegistry::with_builtins();
        fn add_direction(mut root: Value) -> Value {
            if let Some(obj) = root.as_object_mut() {
                obj.insert("direction".to_string(), json!("ltr"));
            }
            root
        }
        let migrations = [Migration {
            from_version: 0,
            to_version: 1,
            handler: add_direction,
        }];
        let old = json!({
            "version": 0,
            "root": { "type": "root", "children": [] },
        });
        let parsed = from_json(&old, &registry, &migrations).unwrap();
        assert_eq!(parsed.version, CURRENT_VERSION);
    }
}

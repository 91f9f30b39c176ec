use super::NodeKey;

/// Format bitmask matching the serialized wire format (§6.2): bold=1,
/// italic=2, strikethrough=4, underline=8, code=16, subscript=32,
/// superscript=64.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextFormat(pub u32);

impl TextFormat {
    pub const BOLD: TextFormat = TextFormat(1);
    pub const ITALIC: TextFormat = TextFormat(2);
    pub const STRIKETHROUGH: TextFormat = TextFormat(4);
    pub const UNDERLINE: TextFormat = TextFormat(8);
    pub const CODE: TextFormat = TextFormat(16);
    pub const SUBSCRIPT: TextFormat = TextFormat(32);
    pub const SUPERSCRIPT: TextFormat = TextFormat(64);

    pub fn none() -> Self {
        TextFormat(0)
    }

    pub fn contains(&self, flag: TextFormat) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn with(&self, flag: TextFormat) -> Self {
        TextFormat(self.0 | flag.0)
    }

    pub fn without(&self, flag: TextFormat) -> Self {
        TextFormat(self.0 & !flag.0)
    }

    pub fn toggled(&self, flag: TextFormat) -> Self {
        if self.contains(flag) {
            self.without(flag)
        } else {
            self.with(flag)
        }
    }
}

/// Splitting/merging behavior for a text node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextMode {
    /// Ordinary text: splittable, mergeable with same-format siblings.
    Normal,
    /// Atomic: cannot be split, merged, or partially selected.
    Token,
    /// Splittable at word boundaries only (e.g. an inline @-mention with
    /// trailing free text); the core treats it like `Token` for split/merge
    /// purposes and leaves word-boundary splitting to the host.
    Segmented,
}

/// A leaf carrying literal text content plus formatting state.
#[derive(Clone, Debug)]
pub struct TextNode {
    pub key: NodeKey,
    pub parent: Option<NodeKey>,
    pub text: String,
    pub format: TextFormat,
    pub style_hash: u64,
    pub mode: TextMode,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        TextNode {
            key: NodeKey::generate(),
            parent: None,
            text: text.into(),
            format: TextFormat::none(),
            style_hash: 0,
            mode: TextMode::Normal,
        }
    }

    pub fn is_simple(&self) -> bool {
        self.mode == TextMode::Normal
    }

    pub fn same_format(&self, other: &TextNode) -> bool {
        self.format == other.format && self.style_hash == other.style_hash && self.mode == other.mode
    }
}

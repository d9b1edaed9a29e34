//! Document nodes.
//!
//! Every node has a key, an optional parent back-reference, an ordered child
//! list (empty for leaves) and a `NodeKind` carrying the type-specific
//! attributes. The set of kinds is closed; the shared capabilities
//! (`node_type`, `render`, `update_render`, `decorate`) dispatch on it.

pub mod code;
pub mod paragraph;
pub mod root;
pub mod text;
pub mod tweet;

use crate::decorator::Decoration;
use crate::element::VisualElement;
use crate::key::NodeKey;
use crate::theme::EditorConfig;

use self::code::{CodeHighlightNode, CodeNode};
use self::paragraph::ParagraphNode;
use self::text::TextNode;
use self::tweet::TweetNode;

/// A node in the document tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub(crate) key: NodeKey,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) kind: NodeKind,
}

/// Type-specific attributes of a node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Root,
    Paragraph(ParagraphNode),
    Text(TextNode),
    LineBreak,
    Code(CodeNode),
    CodeHighlight(CodeHighlightNode),
    Tweet(TweetNode),
}

impl NodeKind {
    /// The type tag. Fixed for the lifetime of a node.
    pub fn node_type(&self) -> &'static str {
        match self {
            NodeKind::Root => root::TYPE,
            NodeKind::Paragraph(_) => paragraph::TYPE,
            NodeKind::Text(_) => text::TEXT_TYPE,
            NodeKind::LineBreak => text::LINE_BREAK_TYPE,
            NodeKind::Code(_) => code::CODE_TYPE,
            NodeKind::CodeHighlight(_) => code::CODE_HIGHLIGHT_TYPE,
            NodeKind::Tweet(_) => tweet::TYPE,
        }
    }

    /// Whether nodes of this kind can hold children.
    pub fn is_element(&self) -> bool {
        matches!(
            self,
            NodeKind::Root | NodeKind::Paragraph(_) | NodeKind::Code(_)
        )
    }

    pub fn is_decorator(&self) -> bool {
        matches!(self, NodeKind::Tweet(_))
    }

    /// Leaves whose content is a string that selections can point into.
    pub fn is_text_like(&self) -> bool {
        matches!(self, NodeKind::Text(_) | NodeKind::CodeHighlight(_))
    }

    /// Text of a text-like leaf.
    pub fn text(&self) -> Option<&str> {
        match self {
            NodeKind::Text(t) => Some(&t.text),
            NodeKind::CodeHighlight(h) => Some(&h.text),
            _ => None,
        }
    }

    /// Same kind and attributes with the text swapped out.
    pub(crate) fn with_text(&self, text: String) -> Option<NodeKind> {
        match self {
            NodeKind::Text(t) => Some(NodeKind::Text(TextNode {
                text,
                format: t.format,
            })),
            NodeKind::CodeHighlight(h) => Some(NodeKind::CodeHighlight(CodeHighlightNode {
                text,
                highlight_type: h.highlight_type.clone(),
            })),
            _ => None,
        }
    }

    /// Produce the visual element for this node.
    ///
    /// Pure: depends only on the attributes and `config`.
    pub fn render(&self, config: &EditorConfig) -> VisualElement {
        match self {
            NodeKind::Root => root::render(config),
            NodeKind::Paragraph(p) => p.render(config),
            NodeKind::Text(t) => t.render(config),
            NodeKind::LineBreak => text::render_line_break(),
            NodeKind::Code(c) => c.render(config),
            NodeKind::CodeHighlight(h) => h.render(config),
            NodeKind::Tweet(t) => t.render(config),
        }
    }

    /// Decide whether `element`, rendered from `prev`, must be regenerated.
    ///
    /// Returns false when the element can be kept. Cheap attribute changes
    /// are patched into `element` in place; the element is never replaced
    /// here. Different kinds always regenerate.
    pub fn update_render(
        &self,
        prev: &NodeKind,
        element: &mut VisualElement,
        config: &EditorConfig,
    ) -> bool {
        match (self, prev) {
            (NodeKind::Root, NodeKind::Root) => false,
            (NodeKind::LineBreak, NodeKind::LineBreak) => false,
            (NodeKind::Paragraph(next), NodeKind::Paragraph(prev)) => {
                next.update_render(prev, element)
            }
            (NodeKind::Text(next), NodeKind::Text(prev)) => next.update_render(prev, element),
            (NodeKind::Code(next), NodeKind::Code(prev)) => next.update_render(prev, element),
            (NodeKind::CodeHighlight(next), NodeKind::CodeHighlight(prev)) => {
                next.update_render(prev, element, config)
            }
            (NodeKind::Tweet(next), NodeKind::Tweet(prev)) => next.update_render(prev, element),
            _ => true,
        }
    }

    /// External content for decorator kinds.
    pub fn decorate(&self, key: &NodeKey) -> Option<Decoration> {
        match self {
            NodeKind::Tweet(t) => Some(t.decorate(key)),
            _ => None,
        }
    }
}

impl Node {
    pub(crate) fn new(key: NodeKey, kind: NodeKind) -> Self {
        Self {
            key,
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    pub(crate) fn root() -> Self {
        Self::new(NodeKey::root(), NodeKind::Root)
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn parent(&self) -> Option<&NodeKey> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn node_type(&self) -> &'static str {
        self.kind.node_type()
    }

    pub fn is_element(&self) -> bool {
        self.kind.is_element()
    }

    pub fn is_decorator(&self) -> bool {
        self.kind.is_decorator()
    }

    pub fn is_text_like(&self) -> bool {
        self.kind.is_text_like()
    }

    pub fn text(&self) -> Option<&str> {
        self.kind.text()
    }

    /// Semantic equality: same type and attributes, ignoring key and position.
    pub fn same_content(&self, other: &Node) -> bool {
        self.kind == other.kind
    }

    pub fn render(&self, config: &EditorConfig) -> VisualElement {
        self.kind.render(config)
    }

    pub fn update_render(
        &self,
        prev: &Node,
        element: &mut VisualElement,
        config: &EditorConfig,
    ) -> bool {
        self.kind.update_render(&prev.kind, element, config)
    }

    pub fn decorate(&self) -> Option<Decoration> {
        self.kind.decorate(&self.key)
    }

    /// Whether the decoration must be re-produced for this version of the node.
    pub fn decoration_changed(&self, prev: &Node) -> bool {
        self.decorate() != prev.decorate()
    }
}

//! Code block and the highlight tokens inside it.

use smol_str::SmolStr;

use crate::context::Context;
use crate::edit::{NewAfter, Placement};
use crate::element::VisualElement;
use crate::error::EditorError;
use crate::key::NodeKey;
use crate::selection::{PointKind, RangeSelection};
use crate::state::EditorState;
use crate::theme::EditorConfig;
use crate::transaction::Transaction;

use super::paragraph::create_paragraph_node;
use super::text::{create_line_break_node, is_line_break_node};
use super::{Node, NodeKind};

pub const CODE_TYPE: &str = "code";
pub const CODE_HIGHLIGHT_TYPE: &str = "code-highlight";

/// A block of source code. Children are `code-highlight` and `linebreak` nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeNode {
    pub language: Option<SmolStr>,
}

impl CodeNode {
    pub fn new(language: Option<&str>) -> Self {
        Self {
            language: normalize_language(language),
        }
    }

    pub(crate) fn render(&self, config: &EditorConfig) -> VisualElement {
        let el = VisualElement::new("code")
            .with_class(config.theme.code.as_deref())
            .with_attribute("spellcheck", "false");
        match &self.language {
            Some(lang) => el.with_attribute("data-highlight-language", lang.clone()),
            None => el,
        }
    }

    pub(crate) fn update_render(&self, prev: &CodeNode, element: &mut VisualElement) -> bool {
        if self.language != prev.language {
            match &self.language {
                Some(lang) => element.set_attribute("data-highlight-language", lang.clone()),
                None => {
                    element.remove_attribute("data-highlight-language");
                }
            }
        }
        false
    }
}

/// One highlighted run of code text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeHighlightNode {
    pub text: String,
    /// Token class such as `keyword` or `string`; `None` for plain text.
    pub highlight_type: Option<SmolStr>,
}

impl CodeHighlightNode {
    fn class<'c>(&self, config: &'c EditorConfig) -> Option<&'c str> {
        let ty = self.highlight_type.as_ref()?;
        config.theme.code_highlight.get(ty).map(|c| c.as_str())
    }

    pub(crate) fn render(&self, config: &EditorConfig) -> VisualElement {
        VisualElement::new("span")
            .with_class(self.class(config))
            .with_text(self.text.clone())
    }

    pub(crate) fn update_render(
        &self,
        prev: &CodeHighlightNode,
        element: &mut VisualElement,
        config: &EditorConfig,
    ) -> bool {
        if self.text != prev.text {
            element.set_text(Some(self.text.clone()));
        }
        if self.highlight_type != prev.highlight_type {
            element.set_class(self.class(config));
        }
        false
    }
}

pub(crate) fn normalize_language(language: Option<&str>) -> Option<SmolStr> {
    language
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| SmolStr::new(l.to_ascii_lowercase()))
}

/// Create a detached code block.
pub fn create_code_node(
    cx: &mut impl Context,
    language: Option<&str>,
) -> Result<NodeKey, EditorError> {
    let tx = cx.transaction()?;
    Ok(tx.create_node(NodeKind::Code(CodeNode::new(language))))
}

/// Create a detached highlight token.
pub fn create_code_highlight_node(
    cx: &mut impl Context,
    text: &str,
    highlight_type: Option<&str>,
) -> Result<NodeKey, EditorError> {
    let tx = cx.transaction()?;
    Ok(tx.create_node(NodeKind::CodeHighlight(CodeHighlightNode {
        text: text.to_string(),
        highlight_type: highlight_type.map(SmolStr::new),
    })))
}

pub fn is_code_node(node: Option<&Node>) -> bool {
    matches!(node.map(Node::kind), Some(NodeKind::Code(_)))
}

pub fn is_code_highlight_node(node: Option<&Node>) -> bool {
    matches!(node.map(Node::kind), Some(NodeKind::CodeHighlight(_)))
}

/// Enter inside a code block.
///
/// A caret at the very end of a block that already ends in two line breaks
/// leaves the block: the breaks are dropped and a paragraph follows. Any
/// other caret inside the block gets a line break that keeps the current
/// line's indentation. A caret outside the block defers to the default.
pub(crate) fn insert_new_after(
    tx: &mut Transaction,
    code: &NodeKey,
    selection: &RangeSelection,
) -> Result<Option<NewAfter>, EditorError> {
    let children = tx.node(code)?.children().to_vec();
    let len = children.len();
    let anchor = selection.anchor();

    let at_end = selection.is_collapsed()
        && anchor.kind == PointKind::Element
        && anchor.key == *code
        && anchor.offset == len;
    if at_end
        && len >= 2
        && is_line_break_node(tx.state().node(&children[len - 1]))
        && is_line_break_node(tx.state().node(&children[len - 2]))
    {
        let paragraph = create_paragraph_node(tx)?;
        return Ok(Some(NewAfter {
            nodes: vec![paragraph],
            placement: Placement::AfterBlock,
            remove: children[len - 2..].to_vec(),
            carry: false,
        }));
    }

    let caret_index = if anchor.key == *code {
        Some(anchor.offset.min(len))
    } else {
        // Text point inside a token: the token itself is on the caret's line.
        children
            .iter()
            .position(|k| *k == anchor.key)
            .map(|i| i + 1)
    };
    let Some(caret_index) = caret_index else {
        return Ok(None);
    };

    let indent = line_indentation(tx.state(), &children[..caret_index]);
    let mut nodes = vec![create_line_break_node(tx)?];
    if !indent.is_empty() {
        nodes.push(create_code_highlight_node(tx, &indent, None)?);
    }
    Ok(Some(NewAfter {
        nodes,
        placement: Placement::AtSelection,
        remove: Vec::new(),
        carry: false,
    }))
}

/// Leading spaces and tabs of the last line in `before`.
fn line_indentation(state: &EditorState, before: &[NodeKey]) -> String {
    let line_start = before
        .iter()
        .rposition(|k| is_line_break_node(state.node(k)))
        .map(|i| i + 1)
        .unwrap_or(0);
    let mut indent = String::new();
    for key in &before[line_start..] {
        let Some(text) = state.node(key).and_then(Node::text) else {
            break;
        };
        let lead: String = text.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
        let whole = lead.len() == text.len();
        indent.push_str(&lead);
        if !whole {
            break;
        }
    }
    indent
}

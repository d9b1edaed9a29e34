//! Text and line break leaves.

use crate::context::Context;
use crate::element::VisualElement;
use crate::error::EditorError;
use crate::format::TextFormat;
use crate::key::NodeKey;
use crate::theme::EditorConfig;

use super::{Node, NodeKind};

pub const TEXT_TYPE: &str = "text";
pub const LINE_BREAK_TYPE: &str = "linebreak";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextNode {
    pub text: String,
    pub format: TextFormat,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::empty(),
        }
    }

    pub(crate) fn render(&self, config: &EditorConfig) -> VisualElement {
        let classes = config.theme.text.classes_for(self.format);
        VisualElement::new(self.format.outer_tag())
            .with_class(classes.as_deref())
            .with_text(self.text.clone())
    }

    /// Text edits are patched in place; a format change may switch the tag
    /// and always regenerates.
    pub(crate) fn update_render(&self, prev: &TextNode, element: &mut VisualElement) -> bool {
        if self.format != prev.format {
            return true;
        }
        if self.text != prev.text {
            element.set_text(Some(self.text.clone()));
        }
        false
    }
}

pub(crate) fn render_line_break() -> VisualElement {
    VisualElement::new("br")
}

/// Create a detached text node.
pub fn create_text_node(cx: &mut impl Context, text: &str) -> Result<NodeKey, EditorError> {
    let tx = cx.transaction()?;
    Ok(tx.create_node(NodeKind::Text(TextNode::new(text))))
}

/// Create a detached line break.
pub fn create_line_break_node(cx: &mut impl Context) -> Result<NodeKey, EditorError> {
    let tx = cx.transaction()?;
    Ok(tx.create_node(NodeKind::LineBreak))
}

pub fn is_text_node(node: Option<&Node>) -> bool {
    matches!(node.map(Node::kind), Some(NodeKind::Text(_)))
}

pub fn is_line_break_node(node: Option<&Node>) -> bool {
    matches!(node.map(Node::kind), Some(NodeKind::LineBreak))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{EditorTheme, TextTheme};

    #[test]
    fn test_render_plain_and_bold() {
        let config = EditorConfig::with_theme(EditorTheme {
            text: TextTheme {
                bold: Some("t-bold".into()),
                ..Default::default()
            },
            ..Default::default()
        });
        assert_eq!(
            TextNode::new("foo").render(&config).outer_html(),
            "<span>foo</span>"
        );
        let bold = TextNode {
            text: "foo".into(),
            format: TextFormat::BOLD,
        };
        assert_eq!(
            bold.render(&config).outer_html(),
            r#"<strong class="t-bold">foo</strong>"#
        );
    }

    #[test]
    fn test_text_change_patches_in_place() {
        let config = EditorConfig::default();
        let prev = TextNode::new("foo");
        let next = TextNode::new("food");
        let mut el = prev.render(&config);
        assert!(!next.update_render(&prev, &mut el));
        assert_eq!(el.text(), Some("food"));
    }

    #[test]
    fn test_format_change_regenerates() {
        let config = EditorConfig::default();
        let prev = TextNode::new("foo");
        let next = TextNode {
            text: "foo".into(),
            format: TextFormat::ITALIC,
        };
        let mut el = prev.render(&config);
        assert!(next.update_render(&prev, &mut el));
    }
}

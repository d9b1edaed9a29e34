//! Paragraph block.

use crate::context::Context;
use crate::edit::{NewAfter, Placement};
use crate::element::VisualElement;
use crate::error::EditorError;
use crate::format::Direction;
use crate::key::NodeKey;
use crate::theme::EditorConfig;
use crate::transaction::Transaction;

use super::{Node, NodeKind};

pub const TYPE: &str = "paragraph";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParagraphNode {
    /// Derived from the text content when the transaction commits.
    pub direction: Option<Direction>,
}

impl ParagraphNode {
    pub(crate) fn render(&self, config: &EditorConfig) -> VisualElement {
        let el = VisualElement::new("p").with_class(config.theme.paragraph.as_deref());
        match self.direction {
            Some(dir) => el.with_attribute("dir", dir.as_str()),
            None => el,
        }
    }

    pub(crate) fn update_render(&self, prev: &ParagraphNode, element: &mut VisualElement) -> bool {
        if self.direction != prev.direction {
            match self.direction {
                Some(dir) => element.set_attribute("dir", dir.as_str()),
                None => {
                    element.remove_attribute("dir");
                }
            }
        }
        false
    }
}

/// Create a detached, empty paragraph.
pub fn create_paragraph_node(cx: &mut impl Context) -> Result<NodeKey, EditorError> {
    let tx = cx.transaction()?;
    Ok(tx.create_node(NodeKind::Paragraph(ParagraphNode::default())))
}

pub fn is_paragraph_node(node: Option<&Node>) -> bool {
    matches!(node.map(Node::kind), Some(NodeKind::Paragraph(_)))
}

/// Enter inside a paragraph: a new paragraph follows it and takes the
/// content after the caret.
pub(crate) fn insert_new_after(tx: &mut Transaction) -> Result<NewAfter, EditorError> {
    let paragraph = create_paragraph_node(tx)?;
    Ok(NewAfter {
        nodes: vec![paragraph],
        placement: Placement::AfterBlock,
        remove: Vec::new(),
        carry: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::EditorTheme;

    #[test]
    fn test_render_with_and_without_theme() {
        let themed = EditorConfig::with_theme(EditorTheme {
            paragraph: Some("para".into()),
            ..Default::default()
        });
        let node = ParagraphNode {
            direction: Some(Direction::Ltr),
        };
        assert_eq!(
            node.render(&themed).outer_html(),
            r#"<p class="para" dir="ltr"></p>"#
        );
        assert_eq!(
            ParagraphNode::default()
                .render(&EditorConfig::default())
                .outer_html(),
            "<p></p>"
        );
    }

    #[test]
    fn test_direction_change_is_patched_in_place() {
        let config = EditorConfig::default();
        let prev = ParagraphNode {
            direction: Some(Direction::Ltr),
        };
        let next = ParagraphNode {
            direction: Some(Direction::Rtl),
        };
        let mut el = prev.render(&config);
        assert!(!next.update_render(&prev, &mut el));
        assert_eq!(el.attribute("dir"), Some("rtl"));

        let cleared = ParagraphNode::default();
        assert!(!cleared.update_render(&next, &mut el));
        assert_eq!(el.attribute("dir"), None);
    }
}

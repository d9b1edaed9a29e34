//! Embedded tweet: a decorator block.
//!
//! The node only renders an empty, non-editable container. What goes inside
//! is described by the `TweetDecoration` returned from `decorate` and
//! mounted by an external renderer.

use smol_str::SmolStr;

use crate::context::Context;
use crate::decorator::{Decoration, TweetDecoration};
use crate::element::VisualElement;
use crate::error::EditorError;
use crate::format::ElementFormat;
use crate::key::NodeKey;
use crate::theme::EditorConfig;

use super::{Node, NodeKind};

pub const TYPE: &str = "tweet";

/// Label shown by the widget host until the tweet has loaded.
pub const LOADING_LABEL: &str = "Loading...";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TweetNode {
    pub id: SmolStr,
    pub format: Option<ElementFormat>,
}

impl TweetNode {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self {
            id: id.into(),
            format: None,
        }
    }

    pub(crate) fn render(&self, config: &EditorConfig) -> VisualElement {
        let el = VisualElement::new("div")
            .with_class(config.theme.embed_block.base.as_deref())
            .with_attribute("data-weft-decorator", TYPE)
            .with_attribute("contenteditable", "false");
        match self.format {
            Some(format) => el.with_attribute("style", format.css()),
            None => el,
        }
    }

    /// Only the alignment shows up in the container; the id is the
    /// decoration's concern.
    pub(crate) fn update_render(&self, prev: &TweetNode, element: &mut VisualElement) -> bool {
        if self.format != prev.format {
            match self.format {
                Some(format) => element.set_attribute("style", format.css()),
                None => {
                    element.remove_attribute("style");
                }
            }
        }
        false
    }

    pub(crate) fn decorate(&self, key: &NodeKey) -> Decoration {
        Decoration::Tweet(TweetDecoration {
            node_key: key.clone(),
            tweet_id: self.id.clone(),
            format: self.format,
            loading_label: SmolStr::new_static(LOADING_LABEL),
        })
    }
}

pub(crate) fn validate_id(id: &str) -> Result<(), EditorError> {
    if id.trim().is_empty() {
        return Err(EditorError::InvalidAttribute {
            attribute: "tweet id",
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Create a detached tweet embed.
pub fn create_tweet_node(cx: &mut impl Context, id: &str) -> Result<NodeKey, EditorError> {
    let tx = cx.transaction()?;
    validate_id(id)?;
    Ok(tx.create_node(NodeKind::Tweet(TweetNode::new(id))))
}

pub fn is_tweet_node(node: Option<&Node>) -> bool {
    matches!(node.map(Node::kind), Some(NodeKind::Tweet(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{EditorTheme, EmbedBlockTheme};

    #[test]
    fn test_render_container() {
        let config = EditorConfig::with_theme(EditorTheme {
            embed_block: EmbedBlockTheme {
                base: Some("embed".into()),
                focus: None,
            },
            ..Default::default()
        });
        let mut node = TweetNode::new("123");
        node.format = Some(ElementFormat::Center);
        assert_eq!(
            node.render(&config).outer_html(),
            r#"<div class="embed" data-weft-decorator="tweet" contenteditable="false" style="text-align: center;"></div>"#
        );
    }

    #[test]
    fn test_id_change_keeps_element() {
        let config = EditorConfig::default();
        let prev = TweetNode::new("1");
        let next = TweetNode::new("2");
        let mut el = prev.render(&config);
        let before = el.clone();
        assert!(!next.update_render(&prev, &mut el));
        assert_eq!(el, before);
    }

    #[test]
    fn test_decorate_carries_props() {
        let node = TweetNode::new("42");
        let deco = node.decorate(&"n7".into());
        let tweet = deco.as_tweet().unwrap();
        assert_eq!(tweet.tweet_id, "42");
        assert_eq!(tweet.node_key.as_str(), "n7");
        assert_eq!(tweet.loading_label, LOADING_LABEL);
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("20").is_ok());
        assert!(matches!(
            validate_id("  "),
            Err(EditorError::InvalidAttribute { .. })
        ));
    }
}

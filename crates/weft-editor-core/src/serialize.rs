//! JSON form of a document.
//!
//! Keys are not serialized. Importing builds the tree with fresh keys.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::EditorError;
use crate::format::{ElementFormat, TextFormat};
use crate::key::NodeKey;
use crate::node::code::{CodeHighlightNode, CodeNode};
use crate::node::paragraph::ParagraphNode;
use crate::node::text::TextNode;
use crate::node::tweet::{TweetNode, validate_id};
use crate::node::NodeKind;
use crate::state::EditorState;
use crate::transaction::Transaction;

/// One node with its children, tagged by node type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SerializedNode {
    Root {
        #[serde(default)]
        children: Vec<SerializedNode>,
    },
    Paragraph {
        #[serde(default)]
        children: Vec<SerializedNode>,
    },
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "is_zero")]
        format: u32,
    },
    #[serde(rename = "linebreak")]
    LineBreak,
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<SmolStr>,
        #[serde(default)]
        children: Vec<SerializedNode>,
    },
    CodeHighlight {
        text: String,
        #[serde(
            default,
            rename = "highlightType",
            skip_serializing_if = "Option::is_none"
        )]
        highlight_type: Option<SmolStr>,
    },
    Tweet {
        id: SmolStr,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<ElementFormat>,
    },
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

impl SerializedNode {
    /// Serialize the subtree at `key`. Missing nodes yield `None`.
    pub fn from_state(state: &EditorState, key: &NodeKey) -> Option<Self> {
        let node = state.node(key)?;
        let children = || -> Vec<SerializedNode> {
            node.children()
                .iter()
                .filter_map(|k| Self::from_state(state, k))
                .collect()
        };
        Some(match node.kind() {
            NodeKind::Root => SerializedNode::Root {
                children: children(),
            },
            NodeKind::Paragraph(_) => SerializedNode::Paragraph {
                children: children(),
            },
            NodeKind::Text(t) => SerializedNode::Text {
                text: t.text.clone(),
                format: t.format.bits(),
            },
            NodeKind::LineBreak => SerializedNode::LineBreak,
            NodeKind::Code(c) => SerializedNode::Code {
                language: c.language.clone(),
                children: children(),
            },
            NodeKind::CodeHighlight(h) => SerializedNode::CodeHighlight {
                text: h.text.clone(),
                highlight_type: h.highlight_type.clone(),
            },
            NodeKind::Tweet(t) => SerializedNode::Tweet {
                id: t.id.clone(),
                format: t.format,
            },
        })
    }

    pub fn node_type(&self) -> &'static str {
        match self {
            SerializedNode::Root { .. } => "root",
            SerializedNode::Paragraph { .. } => "paragraph",
            SerializedNode::Text { .. } => "text",
            SerializedNode::LineBreak => "linebreak",
            SerializedNode::Code { .. } => "code",
            SerializedNode::CodeHighlight { .. } => "code-highlight",
            SerializedNode::Tweet { .. } => "tweet",
        }
    }

    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Whether `child` may appear in this node's children.
    fn accepts(&self, child: &SerializedNode) -> bool {
        match self {
            SerializedNode::Paragraph { .. } => {
                matches!(child, SerializedNode::Text { .. } | SerializedNode::LineBreak)
            }
            SerializedNode::Code { .. } => matches!(
                child,
                SerializedNode::CodeHighlight { .. }
                    | SerializedNode::Text { .. }
                    | SerializedNode::LineBreak
            ),
            _ => false,
        }
    }

    fn is_block(&self) -> bool {
        matches!(
            self,
            SerializedNode::Paragraph { .. }
                | SerializedNode::Code { .. }
                | SerializedNode::Tweet { .. }
        )
    }
}

/// The whole document as JSON.
pub fn export_json(state: &EditorState) -> Result<serde_json::Value, EditorError> {
    let root = SerializedNode::from_state(state, &NodeKey::root())
        .ok_or_else(|| EditorError::NodeNotFound(NodeKey::root()))?;
    Ok(serde_json::to_value(root)?)
}

impl Transaction {
    /// Build nodes from a serialized document.
    ///
    /// A `root` document replaces the current content; a single block is
    /// appended to root. Returns the keys of the imported top-level blocks.
    pub fn import(&mut self, doc: &SerializedNode) -> Result<Vec<NodeKey>, EditorError> {
        let blocks: &[SerializedNode] = match doc {
            SerializedNode::Root { children } => {
                let existing = self.state().root().children().to_vec();
                for key in &existing {
                    self.remove(key)?;
                }
                children.as_slice()
            }
            block => std::slice::from_ref(block),
        };

        let mut keys = Vec::with_capacity(blocks.len());
        for block in blocks {
            if !block.is_block() {
                return Err(EditorError::InvalidDocument(format!(
                    "{} cannot be a top-level block",
                    block.node_type()
                )));
            }
            let key = self.import_node(block)?;
            self.append(&NodeKey::root(), &key)?;
            keys.push(key);
        }
        tracing::debug!(target: "weft::tx", blocks = keys.len(), "imported document");
        Ok(keys)
    }

    fn import_node(&mut self, node: &SerializedNode) -> Result<NodeKey, EditorError> {
        let (kind, children) = match node {
            SerializedNode::Root { .. } => {
                return Err(EditorError::InvalidDocument(
                    "root can only appear at the top".into(),
                ));
            }
            SerializedNode::Paragraph { children } => (
                NodeKind::Paragraph(ParagraphNode::default()),
                children.as_slice(),
            ),
            SerializedNode::Code { language, children } => (
                NodeKind::Code(CodeNode::new(language.as_deref())),
                children.as_slice(),
            ),
            SerializedNode::Text { text, format } => (
                NodeKind::Text(TextNode {
                    text: text.clone(),
                    format: TextFormat::from_bits_truncate(*format),
                }),
                &[][..],
            ),
            SerializedNode::LineBreak => (NodeKind::LineBreak, &[][..]),
            SerializedNode::CodeHighlight {
                text,
                highlight_type,
            } => (
                NodeKind::CodeHighlight(CodeHighlightNode {
                    text: text.clone(),
                    highlight_type: highlight_type.clone(),
                }),
                &[][..],
            ),
            SerializedNode::Tweet { id, format } => {
                validate_id(id)?;
                let mut tweet = TweetNode::new(id.clone());
                tweet.format = *format;
                (NodeKind::Tweet(tweet), &[][..])
            }
        };

        let key = self.create_node(kind);
        for child in children {
            if !node.accepts(child) {
                return Err(EditorError::InvalidDocument(format!(
                    "{} cannot contain {}",
                    node.node_type(),
                    child.node_type()
                )));
            }
            let child_key = self.import_node(child)?;
            self.append(&key, &child_key)?;
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::key::KeyAllocator;

    const DOC: &str = r#"{
        "type": "root",
        "children": [
            {"type": "paragraph", "children": [
                {"type": "text", "text": "Hello ", "format": 1},
                {"type": "linebreak"},
                {"type": "text", "text": "world"}
            ]},
            {"type": "code", "language": "rust", "children": [
                {"type": "code-highlight", "text": "fn", "highlightType": "storage"}
            ]},
            {"type": "tweet", "id": "1234", "format": "center"}
        ]
    }"#;

    fn tx() -> Transaction {
        Transaction::begin(Rc::new(EditorState::new()), KeyAllocator::new())
    }

    #[test]
    fn test_import_then_export() {
        let doc = SerializedNode::from_json(DOC).unwrap();
        let mut tx = tx();
        let blocks = tx.import(&doc).unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(tx.state().text_content(&NodeKey::root()), "Hello \nworld\n\nfn\n\n");

        let exported = SerializedNode::from_state(tx.state(), &NodeKey::root()).unwrap();
        assert_eq!(exported, doc);
        let value = export_json(tx.state()).unwrap();
        assert_eq!(value["children"][2]["format"], "center");
        assert_eq!(value["children"][0]["children"][0]["format"], 1);
        assert!(value["children"][0]["children"][2].get("format").is_none());
    }

    #[test]
    fn test_root_import_replaces_content() {
        let doc = SerializedNode::from_json(DOC).unwrap();
        let mut tx = tx();
        tx.import(&doc).unwrap();
        tx.import(&doc).unwrap();
        assert_eq!(tx.state().root().children().len(), 3);

        let block = SerializedNode::Paragraph { children: vec![] };
        tx.import(&block).unwrap();
        assert_eq!(tx.state().root().children().len(), 4);
    }

    #[test]
    fn test_invalid_documents() {
        let mut tx = tx();
        let leaf = SerializedNode::Text {
            text: "x".into(),
            format: 0,
        };
        assert!(matches!(
            tx.import(&SerializedNode::Root { children: vec![leaf.clone()] }),
            Err(EditorError::InvalidDocument(_))
        ));
        let nested = SerializedNode::Paragraph {
            children: vec![SerializedNode::Paragraph { children: vec![] }],
        };
        assert!(matches!(tx.import(&nested), Err(EditorError::InvalidDocument(_))));
        let empty_tweet = SerializedNode::Tweet {
            id: "".into(),
            format: None,
        };
        assert!(matches!(
            tx.import(&empty_tweet),
            Err(EditorError::InvalidAttribute { .. })
        ));
        assert!(matches!(
            SerializedNode::from_json(r#"{"type": "video"}"#),
            Err(EditorError::Serialization(_))
        ));
    }
}

//! Editor state: a versioned snapshot of the document tree and selection.

use std::collections::HashMap;

use crate::error::EditorError;
use crate::key::NodeKey;
use crate::node::{Node, NodeKind};
use crate::selection::RangeSelection;

/// Separator between block children in text content.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// A snapshot of the document.
///
/// Committed states are immutable; a transaction works on a clone and swaps
/// it in on commit.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorState {
    pub(crate) nodes: HashMap<NodeKey, Node>,
    pub(crate) selection: Option<RangeSelection>,
    pub(crate) version: u64,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    /// A state holding only an empty root.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(NodeKey::root(), Node::root());
        Self {
            nodes,
            selection: None,
            version: 0,
        }
    }

    pub fn root(&self) -> &Node {
        // The root is inserted on construction and can never be removed.
        &self.nodes[&NodeKey::root()]
    }

    pub fn node(&self, key: &NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Like `node`, failing with `NodeNotFound`.
    pub fn get(&self, key: &NodeKey) -> Result<&Node, EditorError> {
        self.nodes
            .get(key)
            .ok_or_else(|| EditorError::NodeNotFound(key.clone()))
    }

    pub(crate) fn get_mut(&mut self, key: &NodeKey) -> Result<&mut Node, EditorError> {
        self.nodes
            .get_mut(key)
            .ok_or_else(|| EditorError::NodeNotFound(key.clone()))
    }

    pub(crate) fn insert(&mut self, node: Node) {
        self.nodes.insert(node.key.clone(), node);
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root().children.is_empty()
    }

    pub fn selection(&self) -> Option<&RangeSelection> {
        self.selection.as_ref()
    }

    /// Incremented by every committed transaction.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn children(&self, key: &NodeKey) -> impl Iterator<Item = &Node> {
        self.nodes
            .get(key)
            .into_iter()
            .flat_map(|n| n.children.iter())
            .filter_map(|k| self.nodes.get(k))
    }

    /// Keys reachable from root, in document (pre-)order.
    pub fn walk(&self) -> Vec<NodeKey> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeKey::root()];
        while let Some(key) = stack.pop() {
            if let Some(node) = self.nodes.get(&key) {
                stack.extend(node.children.iter().rev().cloned());
                order.push(key);
            }
        }
        order
    }

    /// Whether `ancestor` is `key` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: &NodeKey, key: &NodeKey) -> bool {
        let mut current = Some(key);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.nodes.get(k).and_then(|n| n.parent.as_ref());
        }
        false
    }

    /// Whether the node is reachable from root.
    pub fn is_attached(&self, key: &NodeKey) -> bool {
        self.is_ancestor_or_self(&NodeKey::root(), key)
    }

    /// Index of a node in its parent's child list.
    pub fn index_in_parent(&self, key: &NodeKey) -> Result<usize, EditorError> {
        let node = self.get(key)?;
        let parent = node
            .parent
            .as_ref()
            .ok_or_else(|| EditorError::Detached(key.clone()))?;
        self.get(parent)?
            .children
            .iter()
            .position(|k| k == key)
            .ok_or_else(|| EditorError::Detached(key.clone()))
    }

    /// The child of root containing `key`.
    pub fn top_level_block(&self, key: &NodeKey) -> Result<NodeKey, EditorError> {
        let mut current = self.get(key)?;
        if current.key.is_root() {
            return Err(EditorError::RootImmutable);
        }
        loop {
            match current.parent.as_ref() {
                Some(parent) if parent.is_root() => return Ok(current.key.clone()),
                Some(parent) => current = self.get(parent)?,
                None => return Err(EditorError::Detached(current.key.clone())),
            }
        }
    }

    /// Plain text of a subtree.
    pub fn text_content(&self, key: &NodeKey) -> String {
        let mut out = String::new();
        self.write_text(key, &mut out);
        out
    }

    fn write_text(&self, key: &NodeKey, out: &mut String) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(t) => out.push_str(&t.text),
            NodeKind::CodeHighlight(h) => out.push_str(&h.text),
            NodeKind::LineBreak => out.push('\n'),
            NodeKind::Tweet(_) => {}
            NodeKind::Root => {
                for (i, child) in node.children.iter().enumerate() {
                    if i > 0 {
                        out.push_str(BLOCK_SEPARATOR);
                    }
                    self.write_text(child, out);
                }
            }
            NodeKind::Paragraph(_) | NodeKind::Code(_) => {
                for child in &node.children {
                    self.write_text(child, out);
                }
            }
        }
    }
}

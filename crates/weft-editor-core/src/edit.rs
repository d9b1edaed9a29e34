//! Enter handling: `insert_new_after` results and how a transaction applies them.
//!
//! A block's `insert_new_after` only describes the nodes to insert; it never
//! touches the tree. `Transaction::apply_new_after` performs the insertion.

use crate::error::EditorError;
use crate::key::NodeKey;
use crate::node::paragraph::create_paragraph_node;
use crate::node::{NodeKind, code, paragraph};
use crate::selection::{Point, PointKind, RangeSelection};
use crate::transaction::Transaction;

/// Where the nodes of a `NewAfter` go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// As siblings directly after the block holding the selection.
    AfterBlock,
    /// Inside the block, at the caret.
    AtSelection,
}

/// Nodes a block wants inserted when Enter is pressed inside it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAfter {
    /// Detached nodes, inserted in order.
    pub nodes: Vec<NodeKey>,
    pub placement: Placement,
    /// Nodes to remove before inserting.
    pub remove: Vec<NodeKey>,
    /// Move the block's content after the caret into the first new node.
    pub carry: bool,
}

impl Transaction {
    /// The top-level block holding `key`.
    pub fn block_of(&self, key: &NodeKey) -> Result<NodeKey, EditorError> {
        self.state().top_level_block(key)
    }

    /// Split a text-like leaf at a character offset. The tail keeps the
    /// leaf's attributes and is placed right after it.
    ///
    /// Returns `None` when the offset is at either edge and nothing was split.
    pub fn split_text(
        &mut self,
        key: &NodeKey,
        offset: usize,
    ) -> Result<Option<NodeKey>, EditorError> {
        let text = self
            .node(key)?
            .text()
            .ok_or_else(|| EditorError::NotText(key.clone()))?
            .to_string();
        let Some((byte, _)) = text.char_indices().nth(offset) else {
            return Ok(None);
        };
        if byte == 0 {
            return Ok(None);
        }
        let (head, tail) = text.split_at(byte);
        let tail_key = self.clone_node(key)?;
        self.set_text(key, head)?;
        self.set_text(&tail_key, tail)?;
        if self.node(key)?.parent().is_some() {
            self.insert_after(key, &tail_key)?;
        }
        Ok(Some(tail_key))
    }

    /// Ask the block under the selection what Enter should insert.
    pub fn new_after(&mut self) -> Result<Option<NewAfter>, EditorError> {
        let Some(selection) = self.selection().cloned() else {
            return Ok(None);
        };
        let anchor = &selection.anchor().key;
        if anchor.is_root() {
            return Ok(None);
        }
        let block = self.block_of(anchor)?;
        self.insert_new_after(&block, &selection)
    }

    /// What Enter inside `key` would insert. The returned nodes are created
    /// detached; the tree structure is left as is.
    pub fn insert_new_after(
        &mut self,
        key: &NodeKey,
        selection: &RangeSelection,
    ) -> Result<Option<NewAfter>, EditorError> {
        match self.node(key)?.kind() {
            NodeKind::Paragraph(_) => paragraph::insert_new_after(self).map(Some),
            NodeKind::Code(_) => code::insert_new_after(self, key, selection),
            _ => Ok(None),
        }
    }

    /// Insert the nodes of `new_after` relative to `block` and move the
    /// caret into the inserted content.
    pub fn apply_new_after(
        &mut self,
        block: &NodeKey,
        new_after: &NewAfter,
    ) -> Result<(), EditorError> {
        for key in &new_after.remove {
            self.remove(key)?;
        }
        let Some(first) = new_after.nodes.first() else {
            return Ok(());
        };

        match new_after.placement {
            Placement::AfterBlock => {
                let caret = self.caret_index(block)?;
                let mut prev = block.clone();
                for key in &new_after.nodes {
                    self.insert_after(&prev, key)?;
                    prev = key.clone();
                }
                if new_after.carry {
                    let moved: Vec<NodeKey> = self.node(block)?.children()[caret..].to_vec();
                    tracing::trace!(
                        target: "weft::tx",
                        block = %block,
                        moved = moved.len(),
                        "carry content into new block"
                    );
                    self.append_all(first, &moved)?;
                }
                self.select_element(first, 0)?;
            }
            Placement::AtSelection => {
                let caret = self.caret_index(block)?;
                for (i, key) in new_after.nodes.iter().enumerate() {
                    self.insert_child_at(block, caret + i, key)?;
                }
                self.select_element(block, caret + new_after.nodes.len())?;
            }
        }
        Ok(())
    }

    /// Enter: insert what the block asks for, or a new paragraph after it.
    ///
    /// Returns the first inserted node.
    pub fn insert_paragraph(&mut self) -> Result<NodeKey, EditorError> {
        let Some(anchor) = self.selection().map(|s| s.anchor().key.clone()) else {
            let paragraph = create_paragraph_node(self)?;
            self.append(&NodeKey::root(), &paragraph)?;
            self.select_element(&paragraph, 0)?;
            return Ok(paragraph);
        };
        if anchor.is_root() {
            let paragraph = create_paragraph_node(self)?;
            let offset = self.selection().map(|s| s.anchor().offset).unwrap_or(0);
            self.insert_child_at(&NodeKey::root(), offset, &paragraph)?;
            self.select_element(&paragraph, 0)?;
            return Ok(paragraph);
        }
        let block = self.block_of(&anchor)?;
        let new_after = match self.new_after()? {
            Some(new_after) => new_after,
            None => NewAfter {
                nodes: vec![create_paragraph_node(self)?],
                placement: Placement::AfterBlock,
                remove: Vec::new(),
                carry: false,
            },
        };
        self.apply_new_after(&block, &new_after)?;
        new_after
            .nodes
            .first()
            .cloned()
            .ok_or_else(|| EditorError::InvalidDocument("enter inserted no nodes".into()))
    }

    /// Child index of the caret inside `block`, splitting a text leaf when
    /// the caret sits in the middle of it.
    fn caret_index(&mut self, block: &NodeKey) -> Result<usize, EditorError> {
        let len = self.node(block)?.children().len();
        let Some(anchor) = self.selection().map(|s| s.anchor().clone()) else {
            return Ok(len);
        };
        if anchor.key == *block {
            return Ok(anchor.offset.min(len));
        }
        let Some(index) = self
            .node(block)?
            .children()
            .iter()
            .position(|k| *k == anchor.key)
        else {
            return Ok(len);
        };
        if anchor.kind == PointKind::Text && anchor.offset == 0 {
            return Ok(index);
        }
        if anchor.kind == PointKind::Text {
            self.split_text(&anchor.key, anchor.offset)?;
        }
        Ok(index + 1)
    }

    /// Insert `key` as the `index`-th child of `parent`.
    fn insert_child_at(
        &mut self,
        parent: &NodeKey,
        index: usize,
        key: &NodeKey,
    ) -> Result<(), EditorError> {
        let sibling = self.node(parent)?.children().get(index).cloned();
        match sibling {
            Some(sibling) => self.insert_before(&sibling, key),
            None => self.append(parent, key),
        }
    }

    /// Caret position right after `key` in its parent.
    pub fn point_after(&self, key: &NodeKey) -> Result<Point, EditorError> {
        let parent = self
            .node(key)?
            .parent()
            .cloned()
            .ok_or_else(|| EditorError::Detached(key.clone()))?;
        let index = self.state().index_in_parent(key)?;
        Ok(Point::element(parent, index + 1))
    }
}

//! Update transactions.
//!
//! A `Transaction` owns a pending copy of the committed state. Reads see the
//! committed snapshot plus every earlier write of the same transaction; the
//! committed state itself stays untouched until `Editor::update` swaps the
//! pending state in.

use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;

use smol_str::SmolStr;

use crate::error::EditorError;
use crate::format::{Direction, ElementFormat, TextFormat};
use crate::key::{KeyAllocator, NodeKey};
use crate::node::code::normalize_language;
use crate::node::tweet::validate_id;
use crate::node::{Node, NodeKind};
use crate::selection::{Point, RangeSelection};
use crate::state::EditorState;

/// Writable context for one update.
#[derive(Debug)]
pub struct Transaction {
    previous: Rc<EditorState>,
    pending: EditorState,
    keys: KeyAllocator,
    dirty: BTreeSet<NodeKey>,
    selection_changed: bool,
}

/// Outcome of a committed transaction.
#[derive(Debug)]
pub(crate) struct Committed {
    pub state: EditorState,
    pub dirty: Vec<NodeKey>,
    pub removed: Vec<NodeKey>,
    pub keys: KeyAllocator,
    pub selection_changed: bool,
}

impl Transaction {
    pub(crate) fn begin(previous: Rc<EditorState>, keys: KeyAllocator) -> Self {
        let pending = (*previous).clone();
        Self {
            previous,
            pending,
            keys,
            dirty: BTreeSet::new(),
            selection_changed: false,
        }
    }

    /// Pending state, including this transaction's writes.
    pub fn state(&self) -> &EditorState {
        &self.pending
    }

    /// Committed state the transaction started from.
    pub fn previous(&self) -> &EditorState {
        &self.previous
    }

    pub fn node(&self, key: &NodeKey) -> Result<&Node, EditorError> {
        self.pending.get(key)
    }

    /// Keys written so far.
    pub fn dirty_keys(&self) -> impl Iterator<Item = &NodeKey> {
        self.dirty.iter()
    }

    /// Insert a detached node under a fresh key.
    pub(crate) fn create_node(&mut self, kind: NodeKind) -> NodeKey {
        let key = self.keys.next_key();
        tracing::trace!(
            target: "weft::tx",
            key = %key,
            node_type = kind.node_type(),
            "create node"
        );
        self.pending.insert(Node::new(key.clone(), kind));
        self.dirty.insert(key.clone());
        key
    }

    /// Mark a node and its ancestors dirty.
    fn mark_dirty(&mut self, key: &NodeKey) {
        let mut current = Some(key.clone());
        while let Some(k) = current {
            current = self.pending.node(&k).and_then(|n| n.parent.clone());
            self.dirty.insert(k);
        }
    }

    fn writable(&mut self, key: &NodeKey) -> Result<&mut Node, EditorError> {
        self.pending.get(key)?;
        self.mark_dirty(key);
        self.pending.get_mut(key)
    }

    fn check_attachable(&self, parent: &NodeKey, child: &NodeKey) -> Result<(), EditorError> {
        if !self.pending.get(parent)?.is_element() {
            return Err(EditorError::NotAnElement(parent.clone()));
        }
        self.pending.get(child)?;
        if child.is_root() {
            return Err(EditorError::RootImmutable);
        }
        if self.pending.is_ancestor_or_self(child, parent) {
            return Err(EditorError::CycleDetected {
                parent: parent.clone(),
                child: child.clone(),
            });
        }
        Ok(())
    }

    /// Unlink a node from its parent. The node stays in the state until GC.
    fn detach(&mut self, key: &NodeKey) -> Result<(), EditorError> {
        let Some(parent) = self.pending.get(key)?.parent.clone() else {
            return Ok(());
        };
        self.mark_dirty(&parent);
        self.pending
            .get_mut(&parent)?
            .children
            .retain(|k| k != key);
        self.pending.get_mut(key)?.parent = None;
        Ok(())
    }

    fn attach(
        &mut self,
        parent: &NodeKey,
        index: usize,
        child: &NodeKey,
    ) -> Result<(), EditorError> {
        let node = self.pending.get_mut(parent)?;
        let index = index.min(node.children.len());
        node.children.insert(index, child.clone());
        self.pending.get_mut(child)?.parent = Some(parent.clone());
        self.mark_dirty(child);
        Ok(())
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append(&mut self, parent: &NodeKey, child: &NodeKey) -> Result<(), EditorError> {
        self.check_attachable(parent, child)?;
        self.detach(child)?;
        let len = self.pending.get(parent)?.children.len();
        self.attach(parent, len, child)
    }

    /// Append several children in order.
    pub fn append_all<'k>(
        &mut self,
        parent: &NodeKey,
        children: impl IntoIterator<Item = &'k NodeKey>,
    ) -> Result<(), EditorError> {
        for child in children {
            self.append(parent, child)?;
        }
        Ok(())
    }

    fn insert_relative(
        &mut self,
        sibling: &NodeKey,
        node: &NodeKey,
        after: bool,
    ) -> Result<(), EditorError> {
        if sibling.is_root() {
            return Err(EditorError::RootImmutable);
        }
        if sibling == node {
            return Ok(());
        }
        let parent = self
            .pending
            .get(sibling)?
            .parent
            .clone()
            .ok_or_else(|| EditorError::Detached(sibling.clone()))?;
        self.check_attachable(&parent, node)?;
        self.detach(node)?;
        let index = self.pending.index_in_parent(sibling)?;
        self.attach(&parent, if after { index + 1 } else { index }, node)
    }

    /// Place `node` directly after `sibling`, moving it if already attached.
    pub fn insert_after(&mut self, sibling: &NodeKey, node: &NodeKey) -> Result<(), EditorError> {
        self.insert_relative(sibling, node, true)
    }

    /// Place `node` directly before `sibling`.
    pub fn insert_before(&mut self, sibling: &NodeKey, node: &NodeKey) -> Result<(), EditorError> {
        self.insert_relative(sibling, node, false)
    }

    /// Detach a node. It and its subtree are reclaimed when the transaction
    /// commits unless re-attached first.
    pub fn remove(&mut self, key: &NodeKey) -> Result<(), EditorError> {
        if key.is_root() {
            return Err(EditorError::RootImmutable);
        }
        self.pending.get(key)?;
        tracing::trace!(target: "weft::tx", key = %key, "remove node");
        self.detach(key)
    }

    /// Put `replacement` where `old` is and remove `old`.
    pub fn replace(&mut self, old: &NodeKey, replacement: &NodeKey) -> Result<(), EditorError> {
        if old.is_root() {
            return Err(EditorError::RootImmutable);
        }
        if old == replacement {
            return Ok(());
        }
        self.insert_after(old, replacement)?;
        self.remove(old)
    }

    /// A detached copy of a node's attributes under a fresh key. Children
    /// are not copied.
    pub fn clone_node(&mut self, key: &NodeKey) -> Result<NodeKey, EditorError> {
        let kind = self.pending.get(key)?.kind.clone();
        Ok(self.create_node(kind))
    }

    pub fn set_text(&mut self, key: &NodeKey, text: &str) -> Result<(), EditorError> {
        let kind = self
            .pending
            .get(key)?
            .kind
            .with_text(text.to_string())
            .ok_or_else(|| EditorError::NotText(key.clone()))?;
        self.writable(key)?.kind = kind;
        Ok(())
    }

    pub fn set_format(&mut self, key: &NodeKey, format: TextFormat) -> Result<(), EditorError> {
        match self.writable_kind(key)? {
            NodeKind::Text(t) => {
                t.format = format;
                Ok(())
            }
            _ => Err(EditorError::NotText(key.clone())),
        }
    }

    pub fn toggle_format(&mut self, key: &NodeKey, flag: TextFormat) -> Result<(), EditorError> {
        let current = match self.pending.get(key)?.kind() {
            NodeKind::Text(t) => t.format,
            _ => return Err(EditorError::NotText(key.clone())),
        };
        self.set_format(key, current ^ flag)
    }

    pub fn set_language(
        &mut self,
        key: &NodeKey,
        language: Option<&str>,
    ) -> Result<(), EditorError> {
        let language = normalize_language(language);
        match self.writable_kind(key)? {
            NodeKind::Code(c) => {
                c.language = language;
                Ok(())
            }
            other => Err(wrong_type("language", other.node_type())),
        }
    }

    pub fn set_tweet_id(&mut self, key: &NodeKey, id: &str) -> Result<(), EditorError> {
        validate_id(id)?;
        match self.writable_kind(key)? {
            NodeKind::Tweet(t) => {
                t.id = SmolStr::new(id);
                Ok(())
            }
            other => Err(wrong_type("tweet id", other.node_type())),
        }
    }

    pub fn set_element_format(
        &mut self,
        key: &NodeKey,
        format: Option<ElementFormat>,
    ) -> Result<(), EditorError> {
        match self.writable_kind(key)? {
            NodeKind::Tweet(t) => {
                t.format = format;
                Ok(())
            }
            other => Err(wrong_type("element format", other.node_type())),
        }
    }

    fn writable_kind(&mut self, key: &NodeKey) -> Result<&mut NodeKind, EditorError> {
        Ok(&mut self.writable(key)?.kind)
    }

    pub fn selection(&self) -> Option<&RangeSelection> {
        self.pending.selection.as_ref()
    }

    /// Replace the selection. Any new selection is dirty.
    pub fn set_selection(&mut self, selection: Option<RangeSelection>) {
        self.pending.selection = selection.map(|mut s| {
            s.mark_dirty();
            s
        });
        self.selection_changed = true;
    }

    /// Select a character range inside a text-like node. Offsets are clamped
    /// to the text length.
    pub fn select_text(
        &mut self,
        key: &NodeKey,
        anchor: usize,
        focus: usize,
    ) -> Result<&RangeSelection, EditorError> {
        let len = self
            .pending
            .get(key)?
            .text()
            .map(|t| t.chars().count())
            .ok_or_else(|| EditorError::NotText(key.clone()))?;
        Ok(self.update_selection(
            Point::text(key.clone(), anchor.min(len)),
            Point::text(key.clone(), focus.min(len)),
        ))
    }

    /// Collapse the selection onto a child index of an element.
    pub fn select_element(
        &mut self,
        key: &NodeKey,
        offset: usize,
    ) -> Result<&RangeSelection, EditorError> {
        let node = self.pending.get(key)?;
        if !node.is_element() {
            return Err(EditorError::NotAnElement(key.clone()));
        }
        let point = Point::element(key.clone(), offset.min(node.children.len()));
        Ok(self.update_selection(point.clone(), point))
    }

    fn update_selection(&mut self, anchor: Point, focus: Point) -> &RangeSelection {
        self.selection_changed = true;
        let selection = match self.pending.selection.take() {
            Some(mut sel) => {
                sel.set_anchor(anchor);
                sel.set_focus(focus);
                sel
            }
            None => RangeSelection::new(anchor, focus),
        };
        self.pending.selection.insert(selection)
    }

    /// Allocator state to hand back when the transaction is discarded.
    pub(crate) fn abort(self) -> KeyAllocator {
        tracing::debug!(
            target: "weft::tx",
            issued = self.keys.issued(),
            "transaction discarded"
        );
        self.keys
    }

    pub(crate) fn commit(mut self) -> Committed {
        self.update_directions();

        let reachable: HashSet<NodeKey> = self.pending.walk().into_iter().collect();
        let before = self.pending.len();
        self.pending.nodes.retain(|k, _| reachable.contains(k));
        let collected = before - self.pending.len();

        let removed: Vec<NodeKey> = self
            .previous
            .walk()
            .into_iter()
            .filter(|k| !reachable.contains(k))
            .collect();

        let selection_valid = self
            .pending
            .selection
            .as_ref()
            .is_none_or(|s| {
                reachable.contains(&s.anchor().key) && reachable.contains(&s.focus().key)
            });
        if !selection_valid {
            tracing::debug!(target: "weft::tx", "selection pointed at collected nodes, dropped");
            self.pending.selection = None;
            self.selection_changed = true;
        }
        if let Some(sel) = &mut self.pending.selection {
            sel.mark_clean();
        }

        self.pending.version = self.previous.version + 1;
        let dirty: Vec<NodeKey> = self
            .dirty
            .into_iter()
            .filter(|k| reachable.contains(k))
            .collect();

        tracing::debug!(
            target: "weft::tx",
            version = self.pending.version,
            dirty = dirty.len(),
            removed = removed.len(),
            collected,
            "transaction committed"
        );

        Committed {
            state: self.pending,
            dirty,
            removed,
            keys: self.keys,
            selection_changed: self.selection_changed,
        }
    }

    /// Recompute the text direction of dirty paragraphs.
    fn update_directions(&mut self) {
        let paragraphs: Vec<NodeKey> = self
            .dirty
            .iter()
            .filter(|k| {
                matches!(
                    self.pending.node(k).map(Node::kind),
                    Some(NodeKind::Paragraph(_))
                )
            })
            .cloned()
            .collect();
        for key in paragraphs {
            let direction = Direction::detect(&self.pending.text_content(&key));
            if let Ok(node) = self.pending.get_mut(&key) {
                if let NodeKind::Paragraph(p) = &mut node.kind {
                    p.direction = direction;
                }
            }
        }
    }
}

fn wrong_type(attribute: &'static str, node_type: &str) -> EditorError {
    EditorError::InvalidAttribute {
        attribute,
        reason: format!("{node_type} nodes do not have one"),
    }
}

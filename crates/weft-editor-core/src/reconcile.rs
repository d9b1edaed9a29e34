//! Reconciliation of committed states into rendered output.
//!
//! The reconciler keeps the last `VisualElement` of every attached node and
//! the last `Decoration` of every decorator. After each commit it walks the
//! new state and decides per node whether the cached element can be reused,
//! patched in place through `update_render`, or must be regenerated.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::decorator::Decoration;
use crate::element::{HtmlWriter, VisualElement};
use crate::key::NodeKey;
use crate::state::EditorState;
use crate::theme::EditorConfig;

/// Counters from one reconcile pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Nodes rendered for the first time.
    pub created: usize,
    /// Changed nodes whose element was kept (possibly patched).
    pub updated: usize,
    /// Changed nodes whose element was rendered again.
    pub regenerated: usize,
    /// Unchanged nodes.
    pub reused: usize,
    /// Elements dropped for nodes no longer attached.
    pub removed: usize,
    /// Whether any decoration was produced or dropped.
    pub decorations_changed: bool,
}

/// Rendered output cache.
#[derive(Debug, Default)]
pub struct Reconciler {
    elements: HashMap<NodeKey, VisualElement>,
    decorations: BTreeMap<NodeKey, Decoration>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the cache in line with `next`.
    ///
    /// `prev` is the state the cache was last reconciled against; `None`
    /// renders everything from scratch.
    pub fn reconcile(
        &mut self,
        prev: Option<&EditorState>,
        next: &EditorState,
        config: &EditorConfig,
    ) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        let order = next.walk();

        for key in &order {
            let Some(node) = next.node(key) else {
                continue;
            };
            let prev_node = prev.and_then(|p| p.node(key));

            match (prev_node, self.elements.get_mut(key)) {
                (Some(prev_node), Some(_)) if prev_node == node => stats.reused += 1,
                (Some(prev_node), Some(element)) => {
                    if node.update_render(prev_node, element, config) {
                        tracing::trace!(
                            target: "weft::reconcile",
                            key = %key,
                            node_type = node.node_type(),
                            "regenerate element"
                        );
                        *element = node.render(config);
                        stats.regenerated += 1;
                    } else {
                        stats.updated += 1;
                    }
                }
                _ => {
                    self.elements.insert(key.clone(), node.render(config));
                    stats.created += 1;
                }
            }

            if node.is_decorator() {
                let stale = match prev_node {
                    Some(prev_node) if self.decorations.contains_key(key) => {
                        node.decoration_changed(prev_node)
                    }
                    _ => true,
                };
                if stale {
                    if let Some(decoration) = node.decorate() {
                        tracing::trace!(target: "weft::reconcile", key = %key, "decorate");
                        self.decorations.insert(key.clone(), decoration);
                        stats.decorations_changed = true;
                    }
                }
            }
        }

        let live: HashSet<&NodeKey> = order.iter().collect();
        let before = self.elements.len();
        self.elements.retain(|k, _| live.contains(k));
        stats.removed = before - self.elements.len();

        let decorations = self.decorations.len();
        self.decorations.retain(|k, _| live.contains(k));
        if self.decorations.len() != decorations {
            stats.decorations_changed = true;
        }

        tracing::debug!(
            target: "weft::reconcile",
            version = next.version(),
            created = stats.created,
            updated = stats.updated,
            regenerated = stats.regenerated,
            reused = stats.reused,
            removed = stats.removed,
            "reconciled"
        );
        stats
    }

    /// Cached element of a node.
    pub fn element(&self, key: &NodeKey) -> Option<&VisualElement> {
        self.elements.get(key)
    }

    /// Current decorations by node key.
    pub fn decorations(&self) -> &BTreeMap<NodeKey, Decoration> {
        &self.decorations
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Drop everything; the next reconcile renders from scratch.
    pub fn reset(&mut self) {
        self.elements.clear();
        self.decorations.clear();
    }

    /// Serialize the cached elements of `state`, nested as in the tree.
    pub fn to_html(&self, state: &EditorState) -> String {
        let mut w = HtmlWriter::new();
        // HtmlWriter never fails
        let _ = self.write_node(state, &NodeKey::root(), &mut w);

        if tracing::enabled!(target: "weft::reconcile", tracing::Level::TRACE) {
            tracing::trace!(
                target: "weft::reconcile",
                len = w.len(),
                "serialized html"
            );
        }
        w.into_string()
    }

    fn write_node(
        &self,
        state: &EditorState,
        key: &NodeKey,
        w: &mut HtmlWriter,
    ) -> core::fmt::Result {
        let (Some(node), Some(element)) = (state.node(key), self.elements.get(key)) else {
            return Ok(());
        };
        element.write_open(w)?;
        for child in node.children() {
            self.write_node(state, child, w)?;
        }
        element.write_close(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::paragraph::ParagraphNode;
    use crate::node::text::TextNode;
    use crate::node::tweet::TweetNode;
    use crate::node::{Node, NodeKind};

    fn attach(state: &mut EditorState, parent: &str, key: &str, kind: NodeKind) {
        let mut node = Node::new(key.into(), kind);
        node.parent = Some(parent.into());
        state.insert(node);
        state
            .get_mut(&parent.into())
            .unwrap()
            .children
            .push(key.into());
    }

    fn set_kind(state: &mut EditorState, key: &str, kind: NodeKind) {
        state.get_mut(&key.into()).unwrap().kind = kind;
    }

    #[test]
    fn test_first_pass_creates_everything() {
        let mut state = EditorState::new();
        attach(&mut state, "root", "p", NodeKind::Paragraph(ParagraphNode::default()));
        attach(&mut state, "p", "t", NodeKind::Text(TextNode::new("a < b")));

        let mut reconciler = Reconciler::new();
        let stats = reconciler.reconcile(None, &state, &EditorConfig::default());
        assert_eq!(stats.created, 3);
        insta::assert_snapshot!(
            reconciler.to_html(&state),
            @r#"<div contenteditable="true" style="user-select: text; white-space: pre-wrap; word-break: break-word;" data-weft-editor="true"><p><span>a &lt; b</span></p></div>"#
        );
    }

    #[test]
    fn test_patch_regenerate_and_reuse() {
        let config = EditorConfig::default();
        let mut prev = EditorState::new();
        attach(&mut prev, "root", "p", NodeKind::Paragraph(ParagraphNode::default()));
        attach(&mut prev, "p", "t1", NodeKind::Text(TextNode::new("one")));
        attach(&mut prev, "p", "t2", NodeKind::Text(TextNode::new("two")));

        let mut reconciler = Reconciler::new();
        reconciler.reconcile(None, &prev, &config);

        let mut next = prev.clone();
        set_kind(&mut next, "t1", NodeKind::Text(TextNode::new("uno")));
        set_kind(
            &mut next,
            "t2",
            NodeKind::Text(TextNode {
                text: "two".into(),
                format: crate::format::TextFormat::BOLD,
            }),
        );

        let stats = reconciler.reconcile(Some(&prev), &next, &config);
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.regenerated, 1);
        assert_eq!(stats.reused, 2);
        assert_eq!(reconciler.element(&"t1".into()).unwrap().text(), Some("uno"));
        assert_eq!(reconciler.element(&"t2".into()).unwrap().tag(), "strong");
    }

    #[test]
    fn test_removed_nodes_unmount() {
        let config = EditorConfig::default();
        let mut prev = EditorState::new();
        attach(&mut prev, "root", "tw", NodeKind::Tweet(TweetNode::new("1")));

        let mut reconciler = Reconciler::new();
        let first = reconciler.reconcile(None, &prev, &config);
        assert!(first.decorations_changed);
        assert_eq!(reconciler.decorations().len(), 1);

        let next = EditorState::new();
        let stats = reconciler.reconcile(Some(&prev), &next, &config);
        assert_eq!(stats.removed, 1);
        assert!(stats.decorations_changed);
        assert!(reconciler.decorations().is_empty());
        assert!(reconciler.element(&"tw".into()).is_none());
    }

    #[test]
    fn test_decoration_only_redone_on_change() {
        let config = EditorConfig::default();
        let mut prev = EditorState::new();
        attach(&mut prev, "root", "tw", NodeKind::Tweet(TweetNode::new("1")));
        let mut reconciler = Reconciler::new();
        reconciler.reconcile(None, &prev, &config);

        let same = prev.clone();
        let stats = reconciler.reconcile(Some(&prev), &same, &config);
        assert!(!stats.decorations_changed);

        let mut next = prev.clone();
        set_kind(&mut next, "tw", NodeKind::Tweet(TweetNode::new("2")));
        let stats = reconciler.reconcile(Some(&prev), &next, &config);
        assert!(stats.decorations_changed);
        assert_eq!(stats.updated, 1);
        let tweet = reconciler.decorations()[&NodeKey::from("tw")].as_tweet().unwrap();
        assert_eq!(tweet.tweet_id, "2");
    }
}

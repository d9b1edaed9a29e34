//! The editor: committed state, update transactions and listeners.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use crate::context::ReadView;
use crate::decorator::Decoration;
use crate::error::EditorError;
use crate::key::{KeyAllocator, NodeKey};
use crate::reconcile::{ReconcileStats, Reconciler};
use crate::state::EditorState;
use crate::theme::EditorConfig;
use crate::transaction::Transaction;

/// What an update listener sees after a commit.
#[derive(Debug, Clone, Copy)]
pub struct UpdatePayload<'a> {
    pub version: u64,
    pub state: &'a EditorState,
    pub prev_state: &'a EditorState,
    /// Attached nodes written by the transaction, plus their ancestors.
    pub dirty_keys: &'a [NodeKey],
    /// Nodes that were attached before and were reclaimed.
    pub removed_keys: &'a [NodeKey],
    pub selection_changed: bool,
    pub stats: ReconcileStats,
}

/// Handle returned when registering a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type UpdateListener = Box<dyn FnMut(&UpdatePayload<'_>)>;
type DecoratorListener = Box<dyn FnMut(&BTreeMap<NodeKey, Decoration>)>;
type QueuedUpdate = Box<dyn FnOnce(&mut Transaction) -> Result<(), EditorError>>;

/// Updates scheduled from outside an update, such as completions of
/// asynchronous work. Each one runs in its own transaction on
/// `Editor::flush_updates`.
#[derive(Clone, Default)]
pub struct UpdateQueue {
    inner: Rc<RefCell<VecDeque<QueuedUpdate>>>,
}

impl UpdateQueue {
    pub fn push(&self, update: impl FnOnce(&mut Transaction) -> Result<(), EditorError> + 'static) {
        self.inner.borrow_mut().push_back(Box::new(update));
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    fn pop(&self) -> Option<QueuedUpdate> {
        self.inner.borrow_mut().pop_front()
    }
}

impl fmt::Debug for UpdateQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateQueue")
            .field("pending", &self.len())
            .finish()
    }
}

/// Owner of the document.
///
/// All writes go through `update`, which takes `&mut self`: an update
/// cannot start while another is running.
pub struct Editor {
    config: EditorConfig,
    current: Rc<EditorState>,
    keys: KeyAllocator,
    reconciler: Reconciler,
    update_listeners: Vec<(ListenerId, UpdateListener)>,
    decorator_listeners: Vec<(ListenerId, DecoratorListener)>,
    next_listener: u64,
    queue: UpdateQueue,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("namespace", &self.config.namespace)
            .field("version", &self.current.version())
            .field("nodes", &self.current.len())
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let current = Rc::new(EditorState::new());
        let mut reconciler = Reconciler::new();
        reconciler.reconcile(None, &current, &config);
        Self {
            config,
            current,
            keys: KeyAllocator::new(),
            reconciler,
            update_listeners: Vec::new(),
            decorator_listeners: Vec::new(),
            next_listener: 0,
            queue: UpdateQueue::default(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Swap the configuration and re-render everything with it.
    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
        self.reconciler.reset();
        let stats = self.reconciler.reconcile(None, &self.current, &self.config);
        tracing::debug!(
            target: "weft::editor",
            namespace = %self.config.namespace,
            created = stats.created,
            "config changed, re-rendered"
        );
        self.notify_decorators(stats);
    }

    /// Last committed state.
    pub fn state(&self) -> &EditorState {
        &self.current
    }

    /// Run `f` against the committed state. Node factories called through
    /// the view fail with `OutsideTransaction`.
    pub fn read<T>(&self, f: impl FnOnce(&mut ReadView<'_>) -> T) -> T {
        f(&mut ReadView::new(&self.current))
    }

    /// Run `f` in a transaction.
    ///
    /// On `Ok` the pending state is committed: unreachable nodes are
    /// reclaimed, the render cache is reconciled and listeners run. On `Err`
    /// the pending state is discarded and the committed state is untouched.
    pub fn update<T>(
        &mut self,
        f: impl FnOnce(&mut Transaction) -> Result<T, EditorError>,
    ) -> Result<T, EditorError> {
        let keys = std::mem::take(&mut self.keys);
        let mut tx = Transaction::begin(Rc::clone(&self.current), keys);
        let value = match f(&mut tx) {
            Ok(value) => value,
            Err(e) => {
                self.keys = tx.abort();
                tracing::warn!(
                    target: "weft::editor",
                    namespace = %self.config.namespace,
                    error = %e,
                    "update failed, pending state discarded"
                );
                return Err(e);
            }
        };

        let committed = tx.commit();
        self.keys = committed.keys;
        let prev = std::mem::replace(&mut self.current, Rc::new(committed.state));
        let stats = self
            .reconciler
            .reconcile(Some(&prev), &self.current, &self.config);

        let payload = UpdatePayload {
            version: self.current.version(),
            state: &self.current,
            prev_state: &prev,
            dirty_keys: &committed.dirty,
            removed_keys: &committed.removed,
            selection_changed: committed.selection_changed,
            stats,
        };
        for (_, listener) in &mut self.update_listeners {
            listener(&payload);
        }
        self.notify_decorators(stats);
        Ok(value)
    }

    fn notify_decorators(&mut self, stats: ReconcileStats) {
        if !stats.decorations_changed {
            return;
        }
        let decorations = self.reconciler.decorations();
        for (_, listener) in &mut self.decorator_listeners {
            listener(decorations);
        }
    }

    fn next_id(&mut self) -> ListenerId {
        self.next_listener += 1;
        ListenerId(self.next_listener)
    }

    /// Called after every commit.
    pub fn register_update_listener(
        &mut self,
        listener: impl FnMut(&UpdatePayload<'_>) + 'static,
    ) -> ListenerId {
        let id = self.next_id();
        self.update_listeners.push((id, Box::new(listener)));
        id
    }

    /// Called with all current decorations whenever one is produced or dropped.
    pub fn register_decorator_listener(
        &mut self,
        listener: impl FnMut(&BTreeMap<NodeKey, Decoration>) + 'static,
    ) -> ListenerId {
        let id = self.next_id();
        self.decorator_listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener of either kind. Returns whether it was registered.
    pub fn unregister_listener(&mut self, id: ListenerId) -> bool {
        let before = self.update_listeners.len() + self.decorator_listeners.len();
        self.update_listeners.retain(|(i, _)| *i != id);
        self.decorator_listeners.retain(|(i, _)| *i != id);
        before != self.update_listeners.len() + self.decorator_listeners.len()
    }

    pub fn decorations(&self) -> &BTreeMap<NodeKey, Decoration> {
        self.reconciler.decorations()
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Rendered HTML of the committed state.
    pub fn to_html(&self) -> String {
        self.reconciler.to_html(&self.current)
    }

    pub fn text_content(&self) -> String {
        self.current.text_content(&NodeKey::root())
    }

    /// Handle for scheduling updates from outside an update.
    pub fn update_queue(&self) -> UpdateQueue {
        self.queue.clone()
    }

    /// Run queued updates in order, each in its own transaction.
    ///
    /// Stops at the first failing update; the ones after it stay queued.
    pub fn flush_updates(&mut self) -> Result<usize, EditorError> {
        let mut applied = 0;
        while let Some(update) = self.queue.pop() {
            self.update(update)?;
            applied += 1;
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::node::paragraph::create_paragraph_node;
    use crate::node::text::create_text_node;
    use crate::node::tweet::create_tweet_node;

    #[test]
    fn test_failed_update_discards_state_but_not_keys() {
        let mut editor = Editor::default();
        let err = editor
            .update(|tx| {
                let p = create_paragraph_node(tx)?;
                tx.append(&NodeKey::root(), &p)?;
                tx.remove(&NodeKey::root())
            })
            .unwrap_err();
        assert_eq!(err, EditorError::RootImmutable);
        assert!(editor.state().is_empty());
        assert_eq!(editor.state().version(), 0);

        let key = editor.update(|tx| create_paragraph_node(tx)).unwrap();
        assert_eq!(key.as_str(), "n2");
    }

    #[test]
    fn test_listeners_receive_commit() {
        let mut editor = Editor::default();
        let seen = Rc::new(Cell::new(0u64));
        let decorated = Rc::new(Cell::new(0usize));
        {
            let seen = seen.clone();
            editor.register_update_listener(move |payload| {
                assert!(payload.dirty_keys.contains(&NodeKey::root()));
                seen.set(payload.version);
            });
            let decorated = decorated.clone();
            editor.register_decorator_listener(move |decos| decorated.set(decos.len()));
        }

        editor
            .update(|tx| {
                let tweet = create_tweet_node(tx, "1")?;
                tx.append(&NodeKey::root(), &tweet)
            })
            .unwrap();
        assert_eq!(seen.get(), 1);
        assert_eq!(decorated.get(), 1);
    }

    #[test]
    fn test_unregister_listener() {
        let mut editor = Editor::default();
        let calls = Rc::new(Cell::new(0));
        let id = {
            let calls = calls.clone();
            editor.register_update_listener(move |_| calls.set(calls.get() + 1))
        };
        editor.update(|_| Ok(())).unwrap();
        assert!(editor.unregister_listener(id));
        assert!(!editor.unregister_listener(id));
        editor.update(|_| Ok(())).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_queued_updates_run_in_order() {
        let mut editor = Editor::default();
        let queue = editor.update_queue();
        for word in ["a", "b"] {
            queue.push(move |tx| {
                let p = create_paragraph_node(tx)?;
                let t = create_text_node(tx, word)?;
                tx.append(&p, &t)?;
                tx.append(&NodeKey::root(), &p)
            });
        }
        assert_eq!(queue.len(), 2);
        assert_eq!(editor.flush_updates().unwrap(), 2);
        assert!(queue.is_empty());
        assert_eq!(editor.text_content(), "a\n\nb");
        assert_eq!(editor.state().version(), 2);
    }
}

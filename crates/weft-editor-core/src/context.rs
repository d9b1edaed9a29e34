//! Explicit access to editor state.
//!
//! Operations take a `Context` instead of reaching for ambient globals. A
//! `Transaction` is a writable context; a `ReadView` can only look. Node
//! factories ask the context for its transaction and fail with
//! `EditorError::OutsideTransaction` when there is none.

use crate::error::EditorError;
use crate::state::EditorState;
use crate::transaction::Transaction;

pub trait Context {
    /// The state visible to this context.
    fn state(&self) -> &EditorState;

    /// The active transaction, if this context is writable.
    fn transaction(&mut self) -> Result<&mut Transaction, EditorError>;
}

/// Read-only view of a committed state.
#[derive(Debug, Clone, Copy)]
pub struct ReadView<'a> {
    state: &'a EditorState,
}

impl<'a> ReadView<'a> {
    pub fn new(state: &'a EditorState) -> Self {
        Self { state }
    }
}

impl Context for ReadView<'_> {
    fn state(&self) -> &EditorState {
        self.state
    }

    fn transaction(&mut self) -> Result<&mut Transaction, EditorError> {
        Err(EditorError::OutsideTransaction)
    }
}

impl Context for Transaction {
    fn state(&self) -> &EditorState {
        Transaction::state(self)
    }

    fn transaction(&mut self) -> Result<&mut Transaction, EditorError> {
        Ok(self)
    }
}

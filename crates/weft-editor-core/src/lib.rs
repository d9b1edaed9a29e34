//! weft-editor-core: the node model and update protocol of the weft editor.
//!
//! This crate provides:
//! - `Node` / `NodeKind` - keyed document nodes with a closed set of types
//! - `Editor` - owns the committed `EditorState` and runs update transactions
//! - `Transaction` - the single-writer scope in which the tree may change
//! - `Reconciler` - turns state changes into minimal `VisualElement` updates
//! - Code highlighting, JSON import/export and theme configuration

pub mod context;
pub mod decorator;
pub mod edit;
pub mod editor;
pub mod element;
pub mod error;
pub mod format;
#[cfg(feature = "syntax-highlighting")]
pub mod highlight;
pub mod key;
pub mod node;
pub mod reconcile;
pub mod selection;
pub mod serialize;
pub mod state;
pub mod theme;
pub mod transaction;

pub use context::{Context, ReadView};
pub use decorator::{Decoration, TweetDecoration};
pub use edit::{NewAfter, Placement};
pub use editor::{Editor, UpdatePayload, UpdateQueue};
pub use element::{HtmlWriter, VisualElement};
pub use error::EditorError;
pub use format::{Direction, ElementFormat, TextFormat};
#[cfg(feature = "syntax-highlighting")]
pub use highlight::{CodeToken, tokenize};
pub use key::{KeyAllocator, NodeKey};
pub use node::code::{
    CodeHighlightNode, CodeNode, create_code_highlight_node, create_code_node,
    is_code_highlight_node, is_code_node,
};
pub use node::paragraph::{ParagraphNode, create_paragraph_node, is_paragraph_node};
pub use node::text::{
    TextNode, create_line_break_node, create_text_node, is_line_break_node, is_text_node,
};
pub use node::tweet::{TweetNode, create_tweet_node, is_tweet_node};
pub use node::{Node, NodeKind};
pub use reconcile::{ReconcileStats, Reconciler};
pub use selection::{Point, PointKind, RangeSelection};
pub use serialize::{SerializedNode, export_json};
pub use smol_str::SmolStr;
pub use state::EditorState;
pub use theme::{EditorConfig, EditorTheme, EmbedBlockTheme, TextTheme};
pub use transaction::Transaction;

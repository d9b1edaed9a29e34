//! weft-embed: runtime for decorator embeds.
//!
//! Decorator nodes in `weft-editor-core` only describe external content.
//! This crate drives loading it:
//! - `ScriptRegistry` - widget scripts fetched at most once per process
//! - `EmbedLoader` - Idle/Loading/Ready/Failed with stale-result protection
//! - `TweetComponent` - a loader bound to a tweet decoration and callbacks
//! - `EmbedMounts` - components kept in step with the editor's decorations
//!
//! Nothing here performs I/O. Components emit `LoadCommand`s and the host
//! reports results back.

pub mod error;
pub mod loader;
pub mod mounts;
pub mod script;
pub mod tweet;

pub use error::EmbedError;
pub use loader::{EmbedLoader, LoadCommand, LoadState, LoadTicket, Outcome};
pub use mounts::EmbedMounts;
pub use script::{ScriptRegistry, ScriptState, ScriptStatus, TWITTER_WIDGET_SCRIPT_URL};
pub use tweet::{TweetComponent, TweetView, WIDGET_CONTAINER_STYLE};

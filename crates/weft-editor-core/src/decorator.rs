//! Decorations: external handles produced by decorator nodes.
//!
//! A decorator node does not build its own content. Instead `decorate()`
//! returns a `Decoration` describing what an external renderer should mount
//! in the node's container. The reconciler keeps one decoration per node key
//! and only replaces it when the description changes.

use smol_str::SmolStr;

use crate::format::ElementFormat;
use crate::key::NodeKey;

/// Opaque-to-the-tree description of externally rendered content.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Decoration {
    Tweet(TweetDecoration),
}

impl Decoration {
    /// Key of the node this decoration belongs to.
    pub fn node_key(&self) -> &NodeKey {
        match self {
            Decoration::Tweet(t) => &t.node_key,
        }
    }

    pub fn as_tweet(&self) -> Option<&TweetDecoration> {
        match self {
            Decoration::Tweet(t) => Some(t),
        }
    }
}

/// Props for an embedded tweet widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TweetDecoration {
    pub node_key: NodeKey,
    pub tweet_id: SmolStr,
    pub format: Option<ElementFormat>,
    /// Shown while the widget is loading.
    pub loading_label: SmolStr,
}

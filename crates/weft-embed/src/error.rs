//! Errors reported by embed loading.
//!
//! These never reach the editor engine; components hand them to their
//! failure callback.

use smol_str::SmolStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EmbedError {
    /// The widget script could not be fetched.
    #[error("failed to load script {url}: {reason}")]
    ScriptLoad { url: SmolStr, reason: String },

    /// The widget host could not render the embed.
    #[error("failed to create widget for {id}: {reason}")]
    Widget { id: SmolStr, reason: String },
}

impl EmbedError {
    pub fn script_load(url: &str, reason: impl Into<String>) -> Self {
        EmbedError::ScriptLoad {
            url: SmolStr::new(url),
            reason: reason.into(),
        }
    }

    pub fn widget(id: &str, reason: impl Into<String>) -> Self {
        EmbedError::Widget {
            id: SmolStr::new(id),
            reason: reason.into(),
        }
    }
}

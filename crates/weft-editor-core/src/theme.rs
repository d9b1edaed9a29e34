//! Render configuration and theme classes.
//!
//! Themes map semantic style keys (node types, text formats, highlight
//! types) to caller-supplied class names. Every key is optional; a missing
//! key means the rendered element carries no class for it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::EditorError;
use crate::format::TextFormat;

/// Configuration handed to every `render` / `update_render` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Editor namespace, used to label log output.
    pub namespace: SmolStr,
    pub theme: EditorTheme,
}

impl EditorConfig {
    pub fn with_theme(theme: EditorTheme) -> Self {
        Self {
            namespace: SmolStr::default(),
            theme,
        }
    }

    /// Parse a JSON configuration such as `{"theme": {"code": "my-code-class"}}`.
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorTheme {
    pub root: Option<SmolStr>,
    pub paragraph: Option<SmolStr>,
    pub code: Option<SmolStr>,
    pub text: TextTheme,
    /// Highlight type (`keyword`, `string`, ...) to class.
    pub code_highlight: BTreeMap<SmolStr, SmolStr>,
    pub embed_block: EmbedBlockTheme,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextTheme {
    pub bold: Option<SmolStr>,
    pub italic: Option<SmolStr>,
    pub underline: Option<SmolStr>,
    pub strikethrough: Option<SmolStr>,
    pub code: Option<SmolStr>,
}

impl TextTheme {
    /// Space-separated classes for every format flag the theme knows about.
    pub fn classes_for(&self, format: TextFormat) -> Option<String> {
        let pairs = [
            (TextFormat::BOLD, &self.bold),
            (TextFormat::ITALIC, &self.italic),
            (TextFormat::UNDERLINE, &self.underline),
            (TextFormat::STRIKETHROUGH, &self.strikethrough),
            (TextFormat::CODE, &self.code),
        ];
        let classes: Vec<&str> = pairs
            .iter()
            .filter(|(flag, _)| format.contains(*flag))
            .filter_map(|(_, class)| class.as_deref())
            .collect();
        if classes.is_empty() {
            None
        } else {
            Some(classes.join(" "))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedBlockTheme {
    pub base: Option<SmolStr>,
    pub focus: Option<SmolStr>,
}

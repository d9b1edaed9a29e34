//! The root node: container of all blocks.

use crate::element::VisualElement;
use crate::theme::EditorConfig;

pub const TYPE: &str = "root";

/// Inline style of the editable root.
pub const ROOT_STYLE: &str = "user-select: text; white-space: pre-wrap; word-break: break-word;";

pub(crate) fn render(config: &EditorConfig) -> VisualElement {
    VisualElement::new("div")
        .with_class(config.theme.root.as_deref())
        .with_attribute("contenteditable", "true")
        .with_attribute("style", ROOT_STYLE)
        .with_attribute("data-weft-editor", "true")
}

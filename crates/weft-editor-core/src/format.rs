//! Formatting attributes shared by several node types.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Inline formatting of a text node.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct TextFormat: u32 {
        const BOLD = 1;
        const ITALIC = 1 << 1;
        const STRIKETHROUGH = 1 << 2;
        const UNDERLINE = 1 << 3;
        const CODE = 1 << 4;
    }
}

impl TextFormat {
    /// Tag of the element a text node with this format renders to.
    ///
    /// Code wins over bold, bold over italic.
    pub fn outer_tag(self) -> &'static str {
        if self.contains(TextFormat::CODE) {
            "code"
        } else if self.contains(TextFormat::BOLD) {
            "strong"
        } else if self.contains(TextFormat::ITALIC) {
            "em"
        } else {
            "span"
        }
    }
}

/// Block alignment of an element or decorator block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementFormat {
    Left,
    Center,
    Right,
    Justify,
}

impl ElementFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementFormat::Left => "left",
            ElementFormat::Center => "center",
            ElementFormat::Right => "right",
            ElementFormat::Justify => "justify",
        }
    }

    /// Inline style applied to the rendered container.
    pub fn css(self) -> String {
        format!("text-align: {};", self.as_str())
    }
}

/// Text direction of a block, derived from its content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    /// Direction of the first strong character, if any.
    pub fn detect(text: &str) -> Option<Direction> {
        match unicode_bidi::get_base_direction(text) {
            unicode_bidi::Direction::Ltr => Some(Direction::Ltr),
            unicode_bidi::Direction::Rtl => Some(Direction::Rtl),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outer_tag_precedence() {
        assert_eq!(TextFormat::empty().outer_tag(), "span");
        assert_eq!(TextFormat::ITALIC.outer_tag(), "em");
        assert_eq!((TextFormat::BOLD | TextFormat::ITALIC).outer_tag(), "strong");
        assert_eq!((TextFormat::BOLD | TextFormat::CODE).outer_tag(), "code");
    }

    #[test]
    fn test_direction_detect() {
        assert_eq!(Direction::detect("foo"), Some(Direction::Ltr));
        assert_eq!(Direction::detect("שלום"), Some(Direction::Rtl));
        assert_eq!(Direction::detect(""), None);
        assert_eq!(Direction::detect("123 "), None);
    }

    #[test]
    fn test_element_format_css() {
        assert_eq!(ElementFormat::Center.css(), "text-align: center;");
    }
}

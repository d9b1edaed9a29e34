//! Visual elements: the rendered form of a node.
//!
//! A `VisualElement` is one element of output (tag, ordered attributes and
//! optional text). Child elements are not stored here; the reconciler
//! composes them from the document tree when serializing.

use core::fmt;

use markdown_weaver_escape::{StrWrite, escape_html, escape_html_body_text};
use smol_str::SmolStr;

/// Elements that never have a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input"];

/// A single rendered element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisualElement {
    tag: SmolStr,
    /// Attributes in insertion order.
    attributes: Vec<(SmolStr, SmolStr)>,
    text: Option<String>,
}

impl VisualElement {
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            text: None,
        }
    }

    /// Builder form of `set_attribute`.
    pub fn with_attribute(mut self, name: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Add a class attribute if the theme supplied one.
    ///
    /// `None` and empty class names are skipped so an unstyled element has
    /// no `class` attribute at all.
    pub fn with_class(mut self, class: Option<&str>) -> Self {
        self.set_class(class);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, name: impl Into<SmolStr>, value: impl Into<SmolStr>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<SmolStr> {
        let idx = self.attributes.iter().position(|(n, _)| n == name)?;
        Some(self.attributes.remove(idx).1)
    }

    pub fn class(&self) -> Option<&str> {
        self.attribute("class")
    }

    pub fn set_class(&mut self, class: Option<&str>) {
        match class.filter(|c| !c.is_empty()) {
            Some(c) => self.set_attribute("class", c),
            None => {
                self.remove_attribute("class");
            }
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    pub fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }

    /// Write the opening tag and text content.
    pub fn write_open(&self, w: &mut HtmlWriter) -> fmt::Result {
        w.push("<");
        w.push(&self.tag);
        for (name, value) in &self.attributes {
            w.push(" ");
            w.push(name);
            w.push("=\"");
            escape_html(&mut *w, value)?;
            w.push("\"");
        }
        w.push(">");
        if let Some(text) = &self.text {
            escape_html_body_text(&mut *w, text)?;
        }
        Ok(())
    }

    pub fn write_close(&self, w: &mut HtmlWriter) -> fmt::Result {
        if !self.is_void() {
            w.push("</");
            w.push(&self.tag);
            w.push(">");
        }
        Ok(())
    }

    /// Serialize this element on its own, without children.
    pub fn outer_html(&self) -> String {
        let mut w = HtmlWriter::new();
        // HtmlWriter never fails
        let _ = self.write_open(&mut w).and_then(|_| self.write_close(&mut w));
        w.into_string()
    }
}

impl fmt::Display for VisualElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.outer_html())
    }
}

/// String sink for HTML output.
#[derive(Debug, Default)]
pub struct HtmlWriter {
    out: String,
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl StrWrite for HtmlWriter {
    type Error = fmt::Error;

    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.push_str(s);
        Ok(())
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        std::fmt::Write::write_fmt(&mut self.out, args)
    }
}

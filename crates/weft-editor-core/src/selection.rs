//! Range selection: an anchor/focus pair of points in the tree.

use crate::key::NodeKey;

/// What a point's offset counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointKind {
    /// Character offset inside a text-like leaf.
    Text,
    /// Child index inside an element node.
    Element,
}

/// A position in the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Point {
    pub key: NodeKey,
    pub offset: usize,
    pub kind: PointKind,
}

impl Point {
    pub fn text(key: NodeKey, offset: usize) -> Self {
        Self {
            key,
            offset,
            kind: PointKind::Text,
        }
    }

    pub fn element(key: NodeKey, offset: usize) -> Self {
        Self {
            key,
            offset,
            kind: PointKind::Element,
        }
    }
}

/// Selection with an anchor (where it started) and a focus (where it is now).
///
/// Every change marks the selection dirty; the editor clears the flag once
/// the change has been committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeSelection {
    anchor: Point,
    focus: Point,
    dirty: bool,
}

impl RangeSelection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self {
            anchor,
            focus,
            dirty: true,
        }
    }

    /// A caret at `point`.
    pub fn collapsed(point: Point) -> Self {
        Self::new(point.clone(), point)
    }

    pub fn anchor(&self) -> &Point {
        &self.anchor
    }

    pub fn focus(&self) -> &Point {
        &self.focus
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn set_anchor(&mut self, point: Point) {
        if self.anchor != point {
            self.anchor = point;
            self.dirty = true;
        }
    }

    pub fn set_focus(&mut self, point: Point) {
        if self.focus != point {
            self.focus = point;
            self.dirty = true;
        }
    }

    /// Collapse onto a single point.
    pub fn collapse_to(&mut self, point: Point) {
        self.set_anchor(point.clone());
        self.set_focus(point);
    }

    /// Whether either end refers to `key`.
    pub fn touches(&self, key: &NodeKey) -> bool {
        self.anchor.key == *key || self.focus.key == *key
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapsed_selection() {
        let sel = RangeSelection::collapsed(Point::text("n2".into(), 0));
        assert!(sel.is_collapsed());
        assert!(sel.is_dirty());
        assert_eq!(sel.anchor().key.as_str(), "n2");
        assert_eq!(sel.focus().offset, 0);
    }

    #[test]
    fn test_set_marks_dirty_only_on_change() {
        let mut sel = RangeSelection::collapsed(Point::text("n2".into(), 1));
        sel.mark_clean();
        sel.set_anchor(Point::text("n2".into(), 1));
        assert!(!sel.is_dirty());

        sel.set_focus(Point::text("n2".into(), 3));
        assert!(sel.is_dirty());
        assert!(!sel.is_collapsed());
    }

    #[test]
    fn test_touches() {
        let sel = RangeSelection::new(
            Point::element("n1".into(), 0),
            Point::text("n4".into(), 2),
        );
        assert!(sel.touches(&"n1".into()));
        assert!(sel.touches(&"n4".into()));
        assert!(!sel.touches(&"n2".into()));
    }
}

//! Positions and selections inside a field's tree.
//!
//! A [`Position`] is a DOM-style boundary point: for text nodes the offset
//! counts characters (Unicode scalar values, not UTF-16 units), for elements
//! it counts children.

use std::cmp::Ordering;

use crate::dom::{Document, NodeId};

/// A boundary point in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub node: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }

    /// Document-order sort key: the node's child-index path plus the offset.
    /// `None` when the node is detached.
    fn key(&self, doc: &Document) -> Option<Vec<usize>> {
        let mut key = doc.path(self.node)?;
        key.push(self.offset);
        Some(key)
    }

    /// Clamp the offset to the node's length.
    pub fn clamped(self, doc: &Document) -> Self {
        Self {
            node: self.node,
            offset: self.offset.min(doc.node_len(self.node)),
        }
    }
}

/// Compare two positions in document order. Detached positions sort first.
pub fn compare(doc: &Document, a: &Position, b: &Position) -> Ordering {
    a.key(doc).cmp(&b.key(doc))
}

/// Text selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the caret is
/// now. They may be in either order; use [`Selection::ordered`] for bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Position,
    pub head: Position,
}

impl Selection {
    pub fn new(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    /// A caret.
    pub fn collapsed(at: Position) -> Self {
        Self {
            anchor: at,
            head: at,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// `(start, end)` in document order.
    pub fn ordered(&self, doc: &Document) -> (Position, Position) {
        if compare(doc, &self.anchor, &self.head) == Ordering::Greater {
            (self.head, self.anchor)
        } else {
            (self.anchor, self.head)
        }
    }

    pub fn is_backwards(&self, doc: &Document) -> bool {
        compare(doc, &self.head, &self.anchor) == Ordering::Less
    }

    /// Both ends still point into the attached tree.
    pub fn is_valid(&self, doc: &Document) -> bool {
        [self.anchor, self.head]
            .iter()
            .all(|p| doc.path(p.node).is_some() && p.offset <= doc.node_len(p.node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_fragment;

    #[test]
    fn test_document_order() {
        // <b>ab</b>cd
        let doc = parse_fragment("<b>ab</b>cd");
        let root = doc.root();
        let b = doc.children(root)[0];
        let ab = doc.children(b)[0];
        let cd = doc.children(root)[1];

        let before_b = Position::new(root, 0);
        let in_ab = Position::new(ab, 1);
        let after_b = Position::new(root, 1);
        let in_cd = Position::new(cd, 0);

        assert_eq!(compare(&doc, &before_b, &in_ab), Ordering::Less);
        assert_eq!(compare(&doc, &in_ab, &after_b), Ordering::Less);
        assert_eq!(compare(&doc, &after_b, &in_cd), Ordering::Less);
        assert_eq!(compare(&doc, &in_cd, &in_cd), Ordering::Equal);
    }

    #[test]
    fn test_selection_bounds() {
        let doc = parse_fragment("hello");
        let text = doc.children(doc.root())[0];
        let sel = Selection::new(Position::new(text, 4), Position::new(text, 1));
        let (start, end) = sel.ordered(&doc);
        assert_eq!(start.offset, 1);
        assert_eq!(end.offset, 4);
        assert!(sel.is_backwards(&doc));
        assert!(!sel.is_collapsed());
    }

    #[test]
    fn test_collapsed_selection() {
        let doc = parse_fragment("x");
        let sel = Selection::collapsed(Position::new(doc.root(), 1));
        assert!(sel.is_collapsed());
        assert!(sel.is_valid(&doc));
        assert!(!Selection::collapsed(Position::new(doc.root(), 2)).is_valid(&doc));
    }
}

//! The editable region of one field.
//!
//! An [`EditingArea`] owns the field's markup tree and its selection. It keeps
//! one invariant on top of the raw tree: content made only of inline nodes
//! carries one trailing `<br>` while it is being edited, and that `<br>` is
//! stripped again when the content is read back.

use crate::allowlist::is_inline_node;
use crate::dom::Document;
use crate::parse::append_fragment;
use crate::selection::{Position, Selection, compare};

/// Tag of the root element of every editing area.
pub const AREA_ROOT: &str = "notefield-editable";

const TRAILING_BREAK: &str = "<br>";

/// What changed in an area since the rendering layer last looked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AreaChanges {
    pub content: bool,
    pub selection: bool,
}

#[derive(Debug, Clone)]
pub struct EditingArea {
    pub(crate) doc: Document,
    pub(crate) selection: Option<Selection>,
    editable: bool,
    focused: bool,
    pub(crate) changes: AreaChanges,
}

impl Default for EditingArea {
    fn default() -> Self {
        Self::new()
    }
}

impl EditingArea {
    pub fn new() -> Self {
        Self {
            doc: Document::new(AREA_ROOT),
            selection: None,
            editable: false,
            focused: false,
            changes: AreaChanges::default(),
        }
    }

    /// Make the area editable.
    pub fn attach(&mut self) {
        self.editable = true;
    }

    /// Drop content and selection and stop editing.
    pub fn teardown(&mut self) {
        let root = self.doc.root();
        self.doc.clear_children(root);
        self.selection = None;
        self.editable = false;
        self.focused = false;
        self.changes = AreaChanges {
            content: true,
            selection: true,
        };
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Replace all content.
    pub fn set_content(&mut self, markup: &str) {
        let root = self.doc.root();
        self.doc.clear_children(root);
        append_fragment(&mut self.doc, root, markup);
        if self.contains_inline_content() {
            append_fragment(&mut self.doc, root, TRAILING_BREAK);
        }
        self.selection = None;
        self.changes.content = true;
        self.changes.selection = true;
    }

    /// Content as reported to the host, without the synthetic trailing break.
    pub fn content(&self) -> String {
        let html = self.doc.inner_html(self.doc.root());
        if self.contains_inline_content() {
            if let Some(stripped) = html.strip_suffix(TRAILING_BREAK) {
                return stripped.to_string();
            }
        }
        html
    }

    /// True when the area has children and all of them are inline.
    pub fn contains_inline_content(&self) -> bool {
        let children = self.doc.children(self.doc.root());
        !children.is_empty() && children.iter().all(|&c| is_inline_node(&self.doc, c))
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        let selection = selection.filter(|s| s.is_valid(&self.doc));
        if selection != self.selection {
            self.selection = selection;
            self.changes.selection = true;
        }
    }

    /// The stored selection, or a caret at the end when there is none.
    pub fn selection_or_end(&self) -> Selection {
        self.selection
            .filter(|s| s.is_valid(&self.doc))
            .unwrap_or_else(|| Selection::collapsed(self.end_position()))
    }

    /// Where "the end" of the field is for caret placement: before the
    /// synthetic trailing break in inline-only content, inside the last text
    /// node when the boundary follows one.
    pub fn end_position(&self) -> Position {
        let root = self.doc.root();
        let children = self.doc.children(root);
        let mut offset = children.len();
        let trailing_break = children.last().is_some_and(|&c| self.doc.has_tag(c, "br"));
        if trailing_break && self.contains_inline_content() {
            offset -= 1;
        }
        match offset.checked_sub(1).map(|i| children[i]) {
            Some(before) if self.doc.is_text(before) => {
                Position::new(before, self.doc.node_len(before))
            }
            _ => Position::new(root, offset),
        }
    }

    pub fn caret_to_end(&mut self) {
        let end = Selection::collapsed(self.end_position());
        self.set_selection(Some(end));
    }

    /// Adopt a tree and selection read back from the live view.
    ///
    /// Nothing is flagged as changed: the view already shows this state.
    pub fn sync_from_view(&mut self, doc: Document, selection: Option<Selection>) {
        self.doc = doc;
        self.selection = selection.filter(|s| s.is_valid(&self.doc));
    }

    pub fn take_changes(&mut self) -> AreaChanges {
        std::mem::take(&mut self.changes)
    }

    /// Character offset of `pos` counted over the text of the whole area.
    pub(crate) fn text_offset(&self, pos: Position) -> usize {
        let mut offset = 0;
        for node in self.doc.descendants(self.doc.root()) {
            if !self.doc.is_text(node) {
                continue;
            }
            let len = self.doc.node_len(node);
            if node == pos.node {
                return offset + pos.offset.min(len);
            }
            let text_end = Position::new(node, len);
            if compare(&self.doc, &text_end, &pos) == std::cmp::Ordering::Greater {
                break;
            }
            offset += len;
        }
        offset
    }

    /// Inverse of [`EditingArea::text_offset`]. Falls back to the end.
    pub(crate) fn position_at_text_offset(&self, offset: usize) -> Position {
        let mut remaining = offset;
        for node in self.doc.descendants(self.doc.root()) {
            if !self.doc.is_text(node) {
                continue;
            }
            let len = self.doc.node_len(node);
            if remaining <= len {
                return Position::new(node, remaining);
            }
            remaining -= len;
        }
        self.end_position()
    }
}

//! Editing operations on an [`EditingArea`].
//!
//! Everything here acts at the area's selection (or at the end of the field
//! when it has none) and leaves a collapsed caret behind.

use serde::Serialize;

use crate::area::EditingArea;
use crate::dom::{Document, NodeData, NodeId};
use crate::parse::{append_fragment, parse_fragment};
use crate::range::{clone_contents, delete_contents, insert_nodes, insert_text};
use crate::selection::{Position, Selection};
use crate::serialize::is_void_element;
use crate::style::InlineStyle;

/// Elements that preserve whitespace and newlines without any styling.
const PREFORMATTED_TAGS: &[&str] = &["pre", "textarea", "listing", "xmp", "plaintext"];

/// Formatting in effect at the caret, for toolbar highlighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattingState {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub superscript: bool,
    pub subscript: bool,
}

/// `prefix + text + suffix`, with leading and trailing whitespace of `text`
/// kept outside the wrap.
pub fn wrap_except_whitespace(text: &str, prefix: &str, suffix: &str) -> String {
    let without_leading = text.trim_start();
    let leading = &text[..text.len() - without_leading.len()];
    let core = without_leading.trim_end();
    let trailing = &without_leading[core.len()..];
    format!("{leading}{prefix}{core}{suffix}{trailing}")
}

/// Lines a preformatted block renders for `text`. A final newline does not
/// start a visible line of its own.
fn rendered_lines(text: &str) -> usize {
    let lines = text.split('\n').count();
    if text.ends_with('\n') { lines - 1 } else { lines }
}

/// Text of a subtree with `<br>` rendered as newlines.
fn rendered_text(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    for child in doc.descendants(node) {
        match doc.data(child) {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element(el) if el.is("br") => out.push('\n'),
            _ => {}
        }
    }
    out
}

fn is_list_item(doc: &Document, id: NodeId) -> bool {
    let Some(el) = doc.element(id) else {
        return false;
    };
    match InlineStyle::of(el).get("display") {
        Some(display) => display.eq_ignore_ascii_case("list-item"),
        None => el.is("li"),
    }
}

fn is_bold_weight(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("bold")
        || value.eq_ignore_ascii_case("bolder")
        || value.parse::<u32>().is_ok_and(|w| w >= 600)
}

impl EditingArea {
    /// Elements from the selection anchor up to, not including, the root.
    fn context_elements(&self) -> Vec<NodeId> {
        let anchor = self.selection_or_end().anchor.node;
        let root = self.doc.root();
        self.doc
            .inclusive_ancestors(anchor)
            .take_while(|&n| n != root)
            .filter(|&n| self.doc.is_element(n))
            .collect()
    }

    fn delete_selection(&mut self) -> Position {
        let (start, end) = self.selection_or_end().ordered(&self.doc);
        delete_contents(&mut self.doc, start, end)
    }

    fn finish_edit(&mut self, caret: Position) {
        self.selection = Some(Selection::collapsed(caret));
        self.changes.content = true;
        self.changes.selection = true;
    }

    /// Replace the selection with parsed markup; the caret ends up after it.
    pub fn replace_selection_with_markup(&mut self, markup: &str) {
        let at = self.delete_selection();
        let holder = self.doc.create_element("div");
        let nodes = append_fragment(&mut self.doc, holder, markup);
        let caret = insert_nodes(&mut self.doc, at, &nodes);
        self.finish_edit(caret);
    }

    pub fn replace_selection_with_text(&mut self, text: &str) {
        let at = self.delete_selection();
        let caret = insert_text(&mut self.doc, at, text);
        self.finish_edit(caret);
    }

    /// Insert a `<br>` at the caret.
    ///
    /// A break that ends a nested block gets a second one after it, otherwise
    /// the new line would not render.
    pub fn insert_line_break(&mut self) {
        let at = self.delete_selection();
        let br = self.doc.create_element("br");
        let caret = insert_nodes(&mut self.doc, at, &[br]);

        let root = self.doc.root();
        if caret.node != root && self.doc.last_child(caret.node) == Some(br) {
            let filler = self.doc.create_element("br");
            self.doc.append_child(caret.node, filler);
        }
        self.finish_edit(caret);
    }

    /// Whether the caret sits in something displayed as a list item.
    pub fn in_list_item(&self) -> bool {
        self.context_elements()
            .into_iter()
            .any(|el| is_list_item(&self.doc, el))
    }

    /// Nearest element deciding that whitespace is preserved at the caret.
    fn preformatted_block(&self) -> Option<NodeId> {
        for id in self.context_elements() {
            let Some(el) = self.doc.element(id) else {
                continue;
            };
            if let Some(white_space) = InlineStyle::of(el).get("white-space") {
                let preserves = white_space.to_ascii_lowercase().starts_with("pre");
                return preserves.then_some(id);
            }
            if PREFORMATTED_TAGS.iter().any(|tag| el.is(tag)) {
                return Some(id);
            }
        }
        None
    }

    pub fn in_preformatted(&self) -> bool {
        self.preformatted_block().is_some()
    }

    /// Insert a newline character at the caret.
    ///
    /// In a preformatted block a newline at the very end does not render, so
    /// a second one is added when the first did not change the line count.
    pub fn insert_newline(&mut self) {
        let Some(block) = self.preformatted_block() else {
            self.replace_selection_with_text("\n");
            return;
        };

        let at = self.delete_selection();
        let block = if self.doc.path(block).is_some() {
            block
        } else {
            self.doc.root()
        };
        let lines_before = rendered_lines(&self.doc.text_content(block));
        let mut caret = insert_text(&mut self.doc, at, "\n");
        if rendered_lines(&self.doc.text_content(block)) == lines_before {
            caret = insert_text(&mut self.doc, caret, "\n");
        }
        self.finish_edit(caret);
    }

    /// Replace a `<div>` or `<p>` holding nothing but a `<br>` by that `<br>`.
    ///
    /// Browsers create such blocks when Enter or Backspace splits lines. The
    /// field root itself is never replaced. Returns whether anything changed.
    pub fn unwrap_lone_break_block(&mut self) -> bool {
        let Some(selection) = self.selection else {
            return false;
        };
        let anchor = selection.anchor.node;
        if anchor == self.doc.root() || !(self.doc.has_tag(anchor, "div") || self.doc.has_tag(anchor, "p")) {
            return false;
        }
        let &[br] = self.doc.children(anchor) else {
            return false;
        };
        if !self.doc.has_tag(br, "br") {
            return false;
        }
        let (Some(parent), Some(index)) = (self.doc.parent(anchor), self.doc.index_in_parent(anchor))
        else {
            return false;
        };

        self.doc.replace_with(anchor, br);
        self.finish_edit(Position::new(parent, index));
        true
    }

    /// Surround the selection with `prefix` and `suffix`.
    ///
    /// With `plain_text` the selection is flattened to text first, otherwise
    /// its markup is wrapped and re-parsed. When nothing was selected the
    /// caret is moved back between prefix and suffix.
    pub fn wrap_selection(&mut self, prefix: &str, suffix: &str, plain_text: bool) {
        let (start, end) = self.selection_or_end().ordered(&self.doc);
        let fragment = clone_contents(&self.doc, start, end);
        let markup = fragment.inner_html(fragment.root());
        let was_empty = markup.is_empty();

        if plain_text {
            let text = rendered_text(&fragment, fragment.root());
            self.replace_selection_with_text(&wrap_except_whitespace(&text, prefix, suffix));
        } else {
            self.replace_selection_with_markup(&wrap_except_whitespace(&markup, prefix, suffix));
        }

        if was_empty {
            self.move_caret_before_suffix(suffix, plain_text);
        }
    }

    fn move_caret_before_suffix(&mut self, suffix: &str, plain_text: bool) {
        let Some(selection) = self.selection else {
            return;
        };
        let suffix_len = if plain_text {
            suffix.chars().count()
        } else {
            let parsed = parse_fragment(suffix);
            parsed.text_content(parsed.root()).chars().count()
        };

        let caret = selection.head;
        let target = if suffix_len > 0 {
            let offset = self.text_offset(caret).saturating_sub(suffix_len);
            self.position_at_text_offset(offset)
        } else {
            // Suffix is pure markup: step into an element left empty by the wrap.
            let previous = caret
                .offset
                .checked_sub(1)
                .and_then(|i| self.doc.children(caret.node).get(i).copied());
            match previous {
                Some(el)
                    if self.doc.children(el).is_empty()
                        && self.doc.tag(el).is_some_and(|t| !is_void_element(t)) =>
                {
                    Position::new(el, 0)
                }
                _ => caret,
            }
        };
        self.selection = Some(Selection::collapsed(target));
        self.changes.selection = true;
    }

    /// Bold, italic, underline, superscript and subscript at the caret.
    ///
    /// The nearest element that decides a property wins, so an inner
    /// `font-weight: normal` cancels an outer `<b>`.
    pub fn formatting_state(&self) -> FormattingState {
        let mut bold = None;
        let mut italic = None;
        let mut underline = None;
        let mut superscript = None;
        let mut subscript = None;

        for id in self.context_elements() {
            let Some(el) = self.doc.element(id) else {
                continue;
            };
            let style = InlineStyle::of(el);

            if bold.is_none() {
                bold = match style.get("font-weight") {
                    Some(weight) => Some(is_bold_weight(weight)),
                    None => (el.is("b") || el.is("strong")).then_some(true),
                };
            }
            if italic.is_none() {
                italic = match style.get("font-style") {
                    Some(value) => Some(!value.trim().eq_ignore_ascii_case("normal")),
                    None => (el.is("i") || el.is("em")).then_some(true),
                };
            }
            if underline.is_none() {
                let decoration = style
                    .get("text-decoration-line")
                    .or_else(|| style.get("text-decoration"));
                underline = match decoration {
                    Some(value) => Some(value.to_ascii_lowercase().contains("underline")),
                    None => el.is("u").then_some(true),
                };
            }
            if superscript.is_none() || subscript.is_none() {
                let vertical = style.get("vertical-align").map(str::to_ascii_lowercase);
                match vertical.as_deref() {
                    Some("super") => {
                        superscript.get_or_insert(true);
                        subscript.get_or_insert(false);
                    }
                    Some("sub") => {
                        subscript.get_or_insert(true);
                        superscript.get_or_insert(false);
                    }
                    Some(_) => {
                        superscript.get_or_insert(false);
                        subscript.get_or_insert(false);
                    }
                    None => {
                        if el.is("sup") {
                            superscript.get_or_insert(true);
                            subscript.get_or_insert(false);
                        } else if el.is("sub") {
                            subscript.get_or_insert(true);
                            superscript.get_or_insert(false);
                        }
                    }
                }
            }
        }

        FormattingState {
            bold: bold.unwrap_or(false),
            italic: italic.unwrap_or(false),
            underline: underline.unwrap_or(false),
            superscript: superscript.unwrap_or(false),
            subscript: subscript.unwrap_or(false),
        }
    }
}

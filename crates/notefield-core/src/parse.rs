//! Fragment tree builder on top of the html5ever tokenizer.
//!
//! This is deliberately not a full HTML tree builder. It handles what pasted
//! fragments and stored field values need: void elements, end tags closing the
//! nearest matching element, the common implied end tags, and raw-text
//! elements. Anything else falls through to "nest under the current element".

use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

use crate::dom::{Document, NodeId};
use crate::serialize::is_void_element;

/// Tag of the synthetic wrapper parsed fragments live under.
pub const FRAGMENT_ROOT: &str = "notefield-fragment";

/// Start tags that close an open `<p>`.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div",
    "dl", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hr", "li", "main", "menu", "nav", "ol", "p", "pre", "section", "table",
    "ul",
];

/// Open elements an implied end tag never looks past.
const SCOPE_BOUNDARIES: &[&str] = &[
    "table", "td", "th", "caption", "button", "object", "marquee", "template", "svg", "math",
];

fn is_one_of(tag: &str, set: &[&str]) -> bool {
    set.iter().any(|t| *t == tag)
}

fn raw_kind(tag: &str) -> Option<RawKind> {
    match tag {
        "style" | "xmp" | "iframe" | "noembed" | "noframes" => Some(RawKind::Rawtext),
        "script" => Some(RawKind::ScriptData),
        "title" | "textarea" => Some(RawKind::Rcdata),
        _ => None,
    }
}

struct Builder {
    doc: Document,
    open: Vec<NodeId>,
}

impl Builder {
    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(self.doc.root())
    }

    fn open_tag(&self, idx: usize) -> &str {
        self.doc.tag(self.open[idx]).unwrap_or_default()
    }

    /// Pop through the nearest open element named in `targets`, not looking
    /// past any of `boundaries`.
    fn close_implied(&mut self, targets: &[&str], boundaries: &[&str]) {
        for idx in (1..self.open.len()).rev() {
            let tag = self.open_tag(idx);
            if is_one_of(tag, targets) {
                self.open.truncate(idx);
                return;
            }
            if is_one_of(tag, boundaries) {
                return;
            }
        }
    }

    fn in_foreign_content(&self) -> bool {
        self.open
            .iter()
            .any(|&n| self.doc.has_tag(n, "svg") || self.doc.has_tag(n, "math"))
    }

    fn start_tag(
        &mut self,
        name: &str,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    ) -> Option<RawKind> {
        if is_one_of(name, CLOSES_P) {
            self.close_implied(&["p"], SCOPE_BOUNDARIES);
        }
        match name {
            "li" => self.close_implied(&["li"], &["ul", "ol", "menu", "table"]),
            "dt" | "dd" => self.close_implied(&["dt", "dd"], &["dl", "table"]),
            "tr" => self.close_implied(&["tr"], &["table", "tbody", "thead", "tfoot"]),
            "td" | "th" => self.close_implied(&["td", "th"], &["tr", "table"]),
            _ => {}
        }

        let node = self.doc.create_element(name);
        if let Some(el) = self.doc.element_mut(node) {
            for (attr_name, value) in attrs {
                if el.attr(&attr_name).is_none() {
                    el.set_attr(&attr_name, value);
                }
            }
        }
        let parent = self.current();
        self.doc.append_child(parent, node);

        let closes_itself = self_closing && self.in_foreign_content();
        if is_void_element(name) || closes_itself {
            return None;
        }
        self.open.push(node);
        raw_kind(name)
    }

    fn end_tag(&mut self, name: &str) {
        if let Some(idx) = (1..self.open.len())
            .rev()
            .find(|&idx| self.open_tag(idx) == name)
        {
            self.open.truncate(idx);
        }
    }
}

struct FragmentSink {
    builder: RefCell<Builder>,
}

impl TokenSink for FragmentSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        let mut builder = self.builder.borrow_mut();
        match token {
            Token::TagToken(tag) => {
                let name = tag.name.to_ascii_lowercase();
                match tag.kind {
                    TagKind::StartTag => {
                        let attrs = tag
                            .attrs
                            .iter()
                            .map(|a| (a.name.local.to_string(), a.value.to_string()))
                            .collect();
                        if let Some(kind) = builder.start_tag(&name, attrs, tag.self_closing) {
                            return TokenSinkResult::RawData(kind);
                        }
                    }
                    TagKind::EndTag => builder.end_tag(&name),
                }
            }
            Token::CharacterTokens(text) => {
                let parent = builder.current();
                builder.doc.append_text(parent, &text);
            }
            Token::CommentToken(text) => {
                let parent = builder.current();
                let comment = builder.doc.create_comment(text.to_string());
                builder.doc.append_child(parent, comment);
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

/// Parse a markup fragment into a fresh document rooted at [`FRAGMENT_ROOT`].
///
/// Never fails: malformed markup produces whatever tree the recovery rules
/// above yield.
pub fn parse_fragment(markup: &str) -> Document {
    let doc = Document::new(FRAGMENT_ROOT);
    let root = doc.root();
    let sink = FragmentSink {
        builder: RefCell::new(Builder {
            doc,
            open: vec![root],
        }),
    };

    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let mut queue = BufferQueue::default();
    queue.push_back(StrTendril::from(markup));
    let _ = tokenizer.feed(&mut queue);
    tokenizer.end();

    tokenizer.sink.builder.into_inner().doc
}

/// Parse `markup` and append the resulting nodes to `parent` in `doc`.
///
/// Returns the inserted top-level nodes in order.
pub fn append_fragment(doc: &mut Document, parent: NodeId, markup: &str) -> Vec<NodeId> {
    let fragment = parse_fragment(markup);
    let mut inserted = Vec::new();
    for &child in fragment.children(fragment.root()) {
        let node = doc.import(&fragment, child);
        doc.append_child(parent, node);
        inserted.push(node);
    }
    inserted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(markup: &str) -> String {
        let doc = parse_fragment(markup);
        doc.inner_html(doc.root())
    }

    #[test]
    fn test_simple_markup_round_trips() {
        assert_eq!(round_trip("a <b>bold</b> c"), "a <b>bold</b> c");
        assert_eq!(round_trip("<p>one</p><p>two</p>"), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_names_are_lowercased() {
        assert_eq!(
            round_trip("<SPAN STYLE=\"color:red\">x</SPAN>"),
            "<span style=\"color:red\">x</span>"
        );
    }

    #[test]
    fn test_void_elements_do_not_nest() {
        assert_eq!(round_trip("a<br>b<img src=\"x.png\">c"), "a<br>b<img src=\"x.png\">c");
    }

    #[test]
    fn test_unmatched_end_tag_is_ignored() {
        assert_eq!(round_trip("a</b>c"), "ac");
    }

    #[test]
    fn test_unclosed_elements_close_at_end() {
        assert_eq!(round_trip("<i>open"), "<i>open</i>");
    }

    #[test]
    fn test_end_tag_closes_intermediate_elements() {
        assert_eq!(round_trip("<div><b>x</div>y"), "<div><b>x</b></div>y");
    }

    #[test]
    fn test_implied_end_tags() {
        assert_eq!(
            round_trip("<ul><li>one<li>two</ul>"),
            "<ul><li>one</li><li>two</li></ul>"
        );
        assert_eq!(round_trip("<p>one<div>two</div>"), "<p>one</p><div>two</div>");
    }

    #[test]
    fn test_entities_are_decoded() {
        let doc = parse_fragment("a &amp; b&nbsp;c");
        assert_eq!(doc.text_content(doc.root()), "a & b\u{a0}c");
    }

    #[test]
    fn test_raw_text_elements_keep_markup_as_text() {
        let doc = parse_fragment("<style>p > b { x: y }</style>after");
        let style = doc.first_child(doc.root()).unwrap();
        assert_eq!(doc.text_content(style), "p > b { x: y }");
        assert_eq!(doc.children(doc.root()).len(), 2);
    }

    #[test]
    fn test_comments_survive() {
        assert_eq!(round_trip("a<!-- note -->b"), "a<!-- note -->b");
    }

    #[test]
    fn test_append_fragment_returns_top_level_nodes() {
        let mut doc = Document::new("root");
        let root = doc.root();
        let nodes = append_fragment(&mut doc, root, "x<b>y</b>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(doc.inner_html(root), "x<b>y</b>");
    }
}

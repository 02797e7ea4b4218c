//! Static tag tables consulted by the sanitizer and the field model.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::dom::{Document, NodeId};
use crate::style::InlineStyle;

/// Tags rendered inline. An element is inline iff its upper-cased tag is here.
pub const INLINE_TAGS: &[&str] = &[
    "A", "ABBR", "ACRONYM", "AUDIO", "B", "BDI", "BDO", "BIG", "BR", "BUTTON", "CANVAS", "CITE",
    "CODE", "DATA", "DATALIST", "DEL", "DFN", "EM", "EMBED", "I", "IFRAME", "IMG", "INPUT", "INS",
    "KBD", "LABEL", "MAP", "MARK", "METER", "NOSCRIPT", "OBJECT", "OUTPUT", "PICTURE", "PROGRESS",
    "Q", "RUBY", "S", "SAMP", "SCRIPT", "SELECT", "SLOT", "SMALL", "SPAN", "STRONG", "SUB", "SUP",
    "SVG", "TEMPLATE", "TEXTAREA", "TIME", "TT", "U", "VAR", "VIDEO", "WBR",
];

/// Inline style properties external content may keep.
pub const ALLOWED_STYLING: &[&str] = &[
    "color",
    "background-color",
    "font-weight",
    "font-style",
    "text-decoration-line",
];

/// Properties dropped in night mode, where they were chosen for a light
/// background.
const NIGHT_MODE_STRIPPED: &[&str] = &["color", "background-color"];

const BASIC_TAGS_WITHOUT_ATTRS: &[&str] = &["P", "DIV", "BR", "SUB", "SUP"];

const EXTENDED_TAGS_WITHOUT_ATTRS: &[&str] = &[
    "B",
    "BLOCKQUOTE",
    "CODE",
    "DD",
    "DL",
    "DT",
    "EM",
    "H1",
    "H2",
    "H3",
    "I",
    "LI",
    "OL",
    "PRE",
    "RP",
    "RT",
    "RUBY",
    "STRONG",
    "TABLE",
    "U",
    "UL",
];

/// Per-call knobs handed to custom tag filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterContext {
    pub night_mode: bool,
}

/// Signature of a tag-specific filter.
pub type TagFilter = fn(&mut Document, NodeId, FilterContext);

/// What the sanitizer does with a known tag.
#[derive(Clone, Copy)]
pub enum TagRule {
    /// Keep the tag and only the listed (upper-cased) attributes.
    Attributes(&'static [&'static str]),
    /// Hand the element to a dedicated filter.
    Custom(TagFilter),
}

impl std::fmt::Debug for TagRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attributes(attrs) => f.debug_tuple("Attributes").field(attrs).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Upper-cased tag name to rule.
#[derive(Debug)]
pub struct AllowList {
    rules: HashMap<&'static str, TagRule>,
}

impl AllowList {
    pub fn rule(&self, tag: &str) -> Option<TagRule> {
        self.rules.get(tag.to_ascii_uppercase().as_str()).copied()
    }
}

fn basic_rules() -> HashMap<&'static str, TagRule> {
    let mut rules: HashMap<_, _> = BASIC_TAGS_WITHOUT_ATTRS
        .iter()
        .map(|&tag| (tag, TagRule::Attributes(&[])))
        .collect();
    rules.insert("IMG", TagRule::Attributes(&["SRC"]));
    rules
}

fn extended_rules() -> HashMap<&'static str, TagRule> {
    let mut rules: HashMap<_, _> = EXTENDED_TAGS_WITHOUT_ATTRS
        .iter()
        .map(|&tag| (tag, TagRule::Attributes(&[])))
        .collect();
    rules.insert("A", TagRule::Attributes(&["HREF"]));
    rules.insert("TR", TagRule::Attributes(&["ROWSPAN"]));
    rules.insert("TD", TagRule::Attributes(&["COLSPAN", "ROWSPAN"]));
    rules.insert("TH", TagRule::Attributes(&["COLSPAN", "ROWSPAN"]));
    rules.insert("FONT", TagRule::Attributes(&["COLOR"]));
    rules.insert("SPAN", TagRule::Custom(filter_span));
    // Basic entries win where both define a tag.
    rules.extend(basic_rules());
    rules
}

static BASIC: LazyLock<AllowList> = LazyLock::new(|| AllowList {
    rules: basic_rules(),
});

static EXTENDED: LazyLock<AllowList> = LazyLock::new(|| AllowList {
    rules: extended_rules(),
});

/// Table used for plain external paste.
pub fn basic() -> &'static AllowList {
    &BASIC
}

/// Table used when the host asks for structure-preserving paste.
pub fn extended() -> &'static AllowList {
    &EXTENDED
}

pub fn is_inline_tag(tag: &str) -> bool {
    INLINE_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Text and comments are always inline.
pub fn is_inline_node(doc: &Document, id: NodeId) -> bool {
    doc.tag(id).is_none_or(is_inline_tag)
}

/// Keep only allowed styling on a span and drop every other attribute.
pub fn filter_span(doc: &mut Document, id: NodeId, ctx: FilterContext) {
    let Some(el) = doc.element_mut(id) else {
        return;
    };
    el.retain_attrs(|attr| attr.name.eq_ignore_ascii_case("style"));
    if el.attr("style").is_none() {
        return;
    }

    let mut style = InlineStyle::of(el);
    style.retain(|decl| {
        let property = decl.property.as_str();
        if !ALLOWED_STYLING.contains(&property) {
            return false;
        }
        if ctx.night_mode && NIGHT_MODE_STRIPPED.contains(&property) {
            return false;
        }
        !(property == "background-color" && decl.value.eq_ignore_ascii_case("transparent"))
    });
    style.apply_to(el);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_fragment;

    #[test]
    fn test_extended_is_superset_of_basic() {
        for tag in BASIC_TAGS_WITHOUT_ATTRS.iter().chain(&["IMG"]) {
            assert!(basic().rule(tag).is_some());
            assert!(extended().rule(tag).is_some(), "{tag} missing from extended");
        }
        assert!(basic().rule("SPAN").is_none());
        assert!(matches!(extended().rule("span"), Some(TagRule::Custom(_))));
    }

    #[test]
    fn test_inline_classification() {
        assert!(is_inline_tag("b"));
        assert!(is_inline_tag("IMG"));
        assert!(!is_inline_tag("div"));
        assert!(!is_inline_tag("p"));
    }

    #[test]
    fn test_span_filter_keeps_only_allowed_styles() {
        let mut doc = parse_fragment(
            "<span class=\"x\" style=\"color: red; position: absolute; background-color: transparent\">x</span>",
        );
        let span = doc.first_child(doc.root()).unwrap();
        filter_span(&mut doc, span, FilterContext::default());
        assert_eq!(
            doc.inner_html(doc.root()),
            "<span style=\"color:red\">x</span>"
        );
    }

    #[test]
    fn test_span_filter_night_mode_drops_colors() {
        let mut doc =
            parse_fragment("<span style=\"color:red;font-weight:bold;background-color:#fff\">x</span>");
        let span = doc.first_child(doc.root()).unwrap();
        filter_span(&mut doc, span, FilterContext { night_mode: true });
        assert_eq!(
            doc.inner_html(doc.root()),
            "<span style=\"font-weight:bold\">x</span>"
        );
    }
}

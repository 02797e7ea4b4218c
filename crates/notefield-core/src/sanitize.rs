//! Paste/drop sanitizer.
//!
//! Markup entering a field is rewritten according to where it came from.
//! Content copied between fields of the same note is trusted structurally and
//! only loses presentation that would leak across fields. Anything else is
//! rebuilt bottom-up against an allow-list: unknown elements are unwrapped (or
//! dropped when empty), known elements lose every attribute they are not
//! allowed to carry. Nothing in here fails; bad input degrades to less markup.

use serde::{Deserialize, Serialize};

use crate::allowlist::{self, AllowList, FilterContext, TagRule};
use crate::dom::{Document, NodeId};
use crate::parse::parse_fragment;
use crate::style::strip_properties;

/// Style properties removed from content copied between fields.
const INTERNAL_STRIPPED_STYLES: &[&str] = &["background-color", "font-size", "font-family"];

/// Where pasted or dropped markup came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteSource {
    /// Another field of the same editing session.
    Internal,
    /// Anything outside the session: other applications, web pages, files.
    External,
}

impl PasteSource {
    pub fn from_internal_flag(internal: bool) -> Self {
        if internal {
            Self::Internal
        } else {
            Self::External
        }
    }
}

/// Fidelity and display knobs for external filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Use the extended table (lists, tables, headings, links, spans).
    pub extended: bool,
    /// The destination renders on a dark background.
    pub night_mode: bool,
}

/// Filter a markup fragment.
///
/// Returns the empty string when nothing survives; callers treat that as
/// "insert nothing".
pub fn filter_html(markup: &str, source: PasteSource, options: FilterOptions) -> String {
    let mut doc = parse_fragment(markup);
    let root = doc.root();

    match source {
        PasteSource::Internal => filter_internal(&mut doc, root),
        PasteSource::External => {
            let table = if options.extended {
                allowlist::extended()
            } else {
                allowlist::basic()
            };
            let ctx = FilterContext {
                night_mode: options.night_mode,
            };
            filter_external(&mut doc, root, table, ctx);
        }
    }

    let mut out = doc.inner_html(root);
    if source == PasteSource::External && !options.extended {
        out = collapse_whitespace(&out);
    }
    let out = out.trim().to_string();

    tracing::trace!(
        ?source,
        extended = options.extended,
        in_len = markup.len(),
        out_len = out.len(),
        "filtered pasted markup"
    );
    out
}

/// Strip cross-field presentation from every element below `node`.
pub fn filter_internal(doc: &mut Document, node: NodeId) {
    if let Some(el) = doc.element_mut(node) {
        strip_properties(el, INTERNAL_STRIPPED_STYLES);
    }
    for child in doc.children(node).to_vec() {
        filter_internal(doc, child);
    }
}

/// Rewrite the subtree below `node` against `table`, children first.
///
/// `node` itself is only judged when it is not the document root; the root is
/// the synthetic wrapper and stays.
pub fn filter_external(doc: &mut Document, node: NodeId, table: &AllowList, ctx: FilterContext) {
    if !doc.is_element(node) {
        return;
    }

    // Children may be removed or unwrapped while we walk, so walk a snapshot.
    for child in doc.children(node).to_vec() {
        filter_external(doc, child, table, ctx);
    }

    if node == doc.root() {
        return;
    }

    let Some(tag) = doc.element(node).map(|el| el.tag_upper()) else {
        return;
    };

    match table.rule(&tag) {
        None => {
            if tag == "TITLE" || doc.children(node).is_empty() {
                tracing::trace!(%tag, "dropping element");
                doc.detach(node);
            } else {
                tracing::trace!(%tag, "unwrapping element");
                doc.unwrap(node);
            }
        }
        Some(TagRule::Custom(filter)) => filter(doc, node, ctx),
        Some(TagRule::Attributes(allowed)) => {
            if let Some(el) = doc.element_mut(node) {
                el.retain_attrs(|attr| {
                    let name = attr.name.to_ascii_uppercase();
                    allowed.contains(&name.as_str())
                });
            }
        }
    }
}

/// Collapse every run of spaces, tabs and newlines to one space.
fn collapse_whitespace(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_run = false;
    for c in markup.chars() {
        if matches!(c, ' ' | '\t' | '\n') {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

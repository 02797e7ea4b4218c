//! DOM synchronization for field content and selection.
//!
//! The model tree and the live DOM of a field have the same shape: the model
//! is written out node by node and read back node by node, so a path of child
//! indices names the same node on both sides. Only text offsets differ in
//! unit: the DOM counts UTF-16 code units, the model counts chars.

use notefield_core::{AREA_ROOT, Document, NodeData, NodeId, Position, Selection};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::error::{BrowserError, DomResultExt};

// === ShadowRoot.getSelection binding ===
//
// Chromium exposes the selection inside a shadow tree on the shadow root
// itself; web-sys has no binding for it. Other engines throw, which `catch`
// turns into an `Err`.

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(extends = web_sys::ShadowRoot)]
    type SelectableShadowRoot;

    #[wasm_bindgen(method, catch, js_name = getSelection)]
    fn shadow_selection(this: &SelectableShadowRoot)
    -> Result<Option<web_sys::Selection>, JsValue>;
}

/// The selection that covers nodes inside `shadow`.
pub fn selection_for(shadow: Option<&web_sys::ShadowRoot>) -> Option<web_sys::Selection> {
    if let Some(selection) = shadow.and_then(|s| s.unchecked_ref::<SelectableShadowRoot>().shadow_selection().ok().flatten()) {
        return Some(selection);
    }
    web_sys::window()?.get_selection().ok().flatten()
}

// === Offsets ===

/// Char offset of a UTF-16 offset into `s`. An offset inside a surrogate
/// pair rounds up to the end of that char.
pub fn utf16_to_char_offset(s: &str, utf16: u32) -> usize {
    let mut acc = 0u32;
    for (i, ch) in s.chars().enumerate() {
        if acc >= utf16 {
            return i;
        }
        acc += ch.len_utf16() as u32;
    }
    s.chars().count()
}

pub fn char_to_utf16_offset(s: &str, chars: usize) -> u32 {
    s.chars().take(chars).map(|c| c.len_utf16() as u32).sum()
}

/// Node types that have a counterpart in the model.
fn is_mirrored(node: &web_sys::Node) -> bool {
    matches!(
        node.node_type(),
        web_sys::Node::ELEMENT_NODE | web_sys::Node::TEXT_NODE | web_sys::Node::COMMENT_NODE
    )
}

fn mirrored_children(node: &web_sys::Node) -> Vec<web_sys::Node> {
    let list = node.child_nodes();
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter(is_mirrored)
        .collect()
}

/// Model child index for a raw DOM child offset.
fn mirrored_offset(node: &web_sys::Node, raw: u32) -> usize {
    let list = node.child_nodes();
    (0..raw.min(list.length()))
        .filter_map(|i| list.item(i))
        .filter(is_mirrored)
        .count()
}

/// Raw DOM child offset for a model child index.
fn raw_offset(node: &web_sys::Node, mirrored: usize) -> u32 {
    let list = node.child_nodes();
    let mut seen = 0;
    for i in 0..list.length() {
        let Some(child) = list.item(i) else {
            continue;
        };
        if !is_mirrored(&child) {
            continue;
        }
        if seen == mirrored {
            return i;
        }
        seen += 1;
    }
    list.length()
}

// === Reading ===

/// Read the children of `root` into a fresh model tree.
pub fn read_tree(root: &web_sys::Node) -> Document {
    let mut doc = Document::new(AREA_ROOT);
    let target = doc.root();
    read_children(&mut doc, target, root);
    doc
}

fn read_children(doc: &mut Document, parent: NodeId, node: &web_sys::Node) {
    for child in mirrored_children(node) {
        let id = match child.dyn_ref::<web_sys::Element>() {
            Some(el) => {
                let id = doc.create_element(&el.local_name());
                let attrs = el.attributes();
                if let Some(data) = doc.element_mut(id) {
                    for attr in (0..attrs.length()).filter_map(|j| attrs.item(j)) {
                        data.set_attr(&attr.name(), attr.value());
                    }
                }
                read_children(doc, id, &child);
                id
            }
            None if child.node_type() == web_sys::Node::TEXT_NODE => {
                doc.create_text(child.node_value().unwrap_or_default())
            }
            None => doc.create_comment(child.node_value().unwrap_or_default()),
        };
        doc.append_child(parent, id);
    }
}

/// Child index path from `root` down to `node`.
fn dom_path(root: &web_sys::Node, node: &web_sys::Node) -> Option<Vec<usize>> {
    let mut path = Vec::new();
    let mut current = node.clone();
    while !current.is_same_node(Some(root)) {
        let parent = current.parent_node()?;
        let index = mirrored_children(&parent)
            .iter()
            .position(|c| c.is_same_node(Some(&current)))?;
        path.push(index);
        current = parent;
    }
    path.reverse();
    Some(path)
}

fn dom_node_at_path(root: &web_sys::Node, path: &[usize]) -> Option<web_sys::Node> {
    path.iter().try_fold(root.clone(), |node, &index| {
        mirrored_children(&node).into_iter().nth(index)
    })
}

fn read_position(
    root: &web_sys::Node,
    doc: &Document,
    node: &web_sys::Node,
    offset: u32,
) -> Option<Position> {
    let id = doc.node_at_path(&dom_path(root, node)?)?;
    let offset = match node.node_type() {
        web_sys::Node::TEXT_NODE => {
            utf16_to_char_offset(&node.node_value().unwrap_or_default(), offset)
        }
        web_sys::Node::ELEMENT_NODE | web_sys::Node::DOCUMENT_FRAGMENT_NODE => {
            mirrored_offset(node, offset)
        }
        _ => 0,
    };
    Some(Position::new(id, offset))
}

/// The DOM selection mapped into `doc`, if both ends lie inside `root`.
pub fn read_selection(
    shadow: Option<&web_sys::ShadowRoot>,
    root: &web_sys::Node,
    doc: &Document,
) -> Option<Selection> {
    let selection = selection_for(shadow)?;
    let anchor = read_position(root, doc, &selection.anchor_node()?, selection.anchor_offset())?;
    let head = read_position(root, doc, &selection.focus_node()?, selection.focus_offset())?;
    Some(Selection::new(anchor, head))
}

// === Writing ===

/// Replace the children of `target` with the content of `doc`.
pub fn write_tree(doc: &Document, target: &web_sys::Element) -> Result<(), BrowserError> {
    let document = target.owner_document().ok_or(BrowserError::Cast {
        expected: "element owned by a document",
    })?;
    let fragment = document.create_document_fragment();
    for &child in doc.children(doc.root()) {
        fragment
            .append_child(&build_node(&document, doc, child)?)
            .dom_err("appendChild")?;
    }
    target.set_text_content(None);
    target.append_child(&fragment).dom_err("appendChild")?;
    Ok(())
}

fn build_node(
    document: &web_sys::Document,
    doc: &Document,
    id: NodeId,
) -> Result<web_sys::Node, BrowserError> {
    match doc.data(id) {
        NodeData::Element(data) => {
            let el = document
                .create_element(&data.tag)
                .dom_err("createElement")?;
            for attr in &data.attrs {
                if let Err(err) = el.set_attribute(&attr.name, &attr.value) {
                    tracing::warn!(name = %attr.name, error = ?err, "skipping attribute");
                }
            }
            for &child in doc.children(id) {
                el.append_child(&build_node(document, doc, child)?)
                    .dom_err("appendChild")?;
            }
            Ok(el.into())
        }
        NodeData::Text(text) => Ok(document.create_text_node(text).into()),
        NodeData::Comment(text) => Ok(document.create_comment(text).into()),
    }
}

fn dom_position(root: &web_sys::Node, doc: &Document, pos: Position) -> Option<(web_sys::Node, u32)> {
    let node = dom_node_at_path(root, &doc.path(pos.node)?)?;
    let offset = match doc.text(pos.node) {
        Some(text) => char_to_utf16_offset(text, pos.offset),
        None => raw_offset(&node, pos.offset),
    };
    Some((node, offset))
}

/// Put the DOM selection where the model says it is.
pub fn write_selection(
    shadow: Option<&web_sys::ShadowRoot>,
    root: &web_sys::Node,
    doc: &Document,
    selection: Selection,
) -> Result<(), BrowserError> {
    let Some(dom_selection) = selection_for(shadow) else {
        return Ok(());
    };
    let outside = BrowserError::Cast {
        expected: "selection inside the field",
    };
    let (anchor, anchor_offset) =
        dom_position(root, doc, selection.anchor).ok_or_else(|| outside.clone())?;
    let (head, head_offset) = dom_position(root, doc, selection.head).ok_or(outside)?;
    dom_selection
        .set_base_and_extent(&anchor, anchor_offset, &head, head_offset)
        .dom_err("setBaseAndExtent")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_offsets() {
        let s = "a😀b";
        assert_eq!(utf16_to_char_offset(s, 0), 0);
        assert_eq!(utf16_to_char_offset(s, 1), 1);
        assert_eq!(utf16_to_char_offset(s, 3), 2);
        assert_eq!(utf16_to_char_offset(s, 4), 3);
        assert_eq!(utf16_to_char_offset(s, 99), 3);

        assert_eq!(char_to_utf16_offset(s, 2), 3);
        assert_eq!(char_to_utf16_offset(s, 3), 4);
    }

    #[test]
    fn test_offset_inside_surrogate_pair_rounds_up() {
        assert_eq!(utf16_to_char_offset("😀x", 1), 1);
    }
}

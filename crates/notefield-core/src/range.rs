//! Range operations on a [`Document`]: cloning, deleting, inserting.
//!
//! These mirror the handful of DOM `Range` behaviors the editor relies on.
//! Ranges are given as ordered `(start, end)` positions.

use std::cmp::Ordering;

use crate::dom::{Document, NodeData, NodeId};
use crate::parse::FRAGMENT_ROOT;
use crate::selection::{Position, compare};

fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

fn char_slice(text: &str, from: usize, to: usize) -> &str {
    let start = char_to_byte(text, from);
    let end = char_to_byte(text, to.max(from));
    &text[start..end]
}

/// Boundary points just before and just after the child at `index`.
fn child_bounds(parent: NodeId, index: usize) -> (Position, Position) {
    (
        Position::new(parent, index),
        Position::new(parent, index + 1),
    )
}

/// Copy the contents of `start..end` into a new fragment document.
///
/// Partially selected elements are cloned shallowly with their selected
/// descendants; partially selected text is cut down to the selected chars.
pub fn clone_contents(doc: &Document, start: Position, end: Position) -> Document {
    let mut fragment = Document::new(FRAGMENT_ROOT);
    if compare(doc, &start, &end) != Ordering::Less {
        return fragment;
    }
    let dst = fragment.root();
    clone_children(doc, doc.root(), start, end, &mut fragment, dst);
    fragment
}

fn clone_children(
    doc: &Document,
    node: NodeId,
    start: Position,
    end: Position,
    out: &mut Document,
    out_parent: NodeId,
) {
    for (index, &child) in doc.children(node).iter().enumerate() {
        let (child_start, child_end) = child_bounds(node, index);
        if compare(doc, &child_end, &start) != Ordering::Greater
            || compare(doc, &child_start, &end) != Ordering::Less
        {
            continue;
        }

        let fully_contained = compare(doc, &child_start, &start) != Ordering::Less
            && compare(doc, &child_end, &end) != Ordering::Greater;

        match doc.data(child) {
            NodeData::Text(text) => {
                let from = if start.node == child { start.offset } else { 0 };
                let to = if end.node == child {
                    end.offset
                } else {
                    text.chars().count()
                };
                let piece = char_slice(text, from, to);
                if !piece.is_empty() {
                    out.append_text(out_parent, piece);
                }
            }
            NodeData::Comment(_) => {
                if fully_contained {
                    let copy = out.import(doc, child);
                    out.append_child(out_parent, copy);
                }
            }
            NodeData::Element(_) => {
                if fully_contained {
                    let copy = out.import(doc, child);
                    out.append_child(out_parent, copy);
                } else {
                    let data = doc.data(child).clone();
                    let copy = match data {
                        NodeData::Element(el) => {
                            let id = out.create_element(&el.tag);
                            if let Some(copy_el) = out.element_mut(id) {
                                copy_el.attrs = el.attrs;
                            }
                            id
                        }
                        _ => continue,
                    };
                    out.append_child(out_parent, copy);
                    clone_children(doc, child, start, end, out, copy);
                }
            }
        }
    }
}

/// Turn a position inside a text or comment node into an element boundary,
/// splitting text when the position falls strictly inside it.
///
/// Returns the boundary and whether a new node was inserted after the split
/// node's index in the parent.
fn split_at(doc: &mut Document, pos: Position) -> (Position, Option<(NodeId, usize)>) {
    if doc.is_element(pos.node) {
        return (pos.clamped(doc), None);
    }
    let (Some(parent), Some(index)) = (doc.parent(pos.node), doc.index_in_parent(pos.node)) else {
        return (pos, None);
    };
    let len = doc.node_len(pos.node);
    if pos.offset == 0 {
        return (Position::new(parent, index), None);
    }
    if pos.offset >= len || !doc.is_text(pos.node) {
        return (Position::new(parent, index + 1), None);
    }

    let tail = match doc.text_mut(pos.node) {
        Some(text) => {
            let byte = char_to_byte(text, pos.offset);
            text.split_off(byte)
        }
        None => return (Position::new(parent, index + 1), None),
    };
    let tail_node = doc.create_text(tail);
    doc.insert_child(parent, index + 1, tail_node);
    (Position::new(parent, index + 1), Some((parent, index)))
}

/// Split text at both ends so the range is expressed in element boundaries.
pub fn to_boundaries(doc: &mut Document, start: Position, end: Position) -> (Position, Position) {
    let (mut end, _) = split_at(doc, end);
    let (start, inserted) = split_at(doc, start);
    if let Some((parent, index)) = inserted {
        if end.node == parent && end.offset > index {
            end.offset += 1;
        }
    }
    (start, end)
}

/// Remove everything in `start..end` and return the collapsed position.
///
/// Elements only partially inside the range stay; their selected descendants
/// go. Text at the boundaries is split and the selected part removed.
pub fn delete_contents(doc: &mut Document, start: Position, end: Position) -> Position {
    if compare(doc, &start, &end) != Ordering::Less {
        return start;
    }
    let (start, end) = to_boundaries(doc, start, end);

    let mut doomed = Vec::new();
    collect_contained(doc, doc.root(), start, end, &mut doomed);
    for node in doomed {
        doc.detach(node);
    }
    merge_text_at(doc, start)
}

fn collect_contained(
    doc: &Document,
    node: NodeId,
    start: Position,
    end: Position,
    out: &mut Vec<NodeId>,
) {
    for (index, &child) in doc.children(node).iter().enumerate() {
        let (child_start, child_end) = child_bounds(node, index);
        if compare(doc, &child_end, &start) != Ordering::Greater
            || compare(doc, &child_start, &end) != Ordering::Less
        {
            continue;
        }
        let fully_contained = compare(doc, &child_start, &start) != Ordering::Less
            && compare(doc, &child_end, &end) != Ordering::Greater;
        if fully_contained {
            out.push(child);
        } else {
            collect_contained(doc, child, start, end, out);
        }
    }
}

/// Merge text on both sides of an element boundary and move the position
/// into the adjacent text, preferring the text before it.
fn merge_text_at(doc: &mut Document, pos: Position) -> Position {
    if !doc.is_element(pos.node) {
        return pos;
    }
    let children = doc.children(pos.node);
    let before = pos
        .offset
        .checked_sub(1)
        .and_then(|i| children.get(i).copied())
        .filter(|&n| doc.is_text(n));
    let after = children
        .get(pos.offset)
        .copied()
        .filter(|&n| doc.is_text(n));

    match (before, after) {
        (Some(before), Some(after)) => {
            let caret = doc.node_len(before);
            let tail = doc.text(after).unwrap_or_default().to_owned();
            doc.detach(after);
            if let Some(text) = doc.text_mut(before) {
                text.push_str(&tail);
            }
            Position::new(before, caret)
        }
        (Some(before), None) => Position::new(before, doc.node_len(before)),
        (None, Some(after)) => Position::new(after, 0),
        (None, None) => pos,
    }
}

/// Insert `nodes` at `pos`, returning the boundary right after the last one.
pub fn insert_nodes(doc: &mut Document, pos: Position, nodes: &[NodeId]) -> Position {
    let (at, _) = split_at(doc, pos);
    for (i, &node) in nodes.iter().enumerate() {
        doc.insert_child(at.node, at.offset + i, node);
    }
    Position::new(at.node, at.offset + nodes.len())
}

/// Insert plain text at `pos`, returning the position right after it.
pub fn insert_text(doc: &mut Document, pos: Position, text: &str) -> Position {
    let inserted = text.chars().count();
    if let Some(existing) = doc.text_mut(pos.node) {
        let byte = char_to_byte(existing, pos.offset);
        existing.insert_str(byte, text);
        return Position::new(pos.node, pos.offset + inserted);
    }
    if !doc.is_element(pos.node) {
        let (at, _) = split_at(doc, pos);
        return insert_text(doc, at, text);
    }

    let pos = pos.clamped(doc);
    if pos.offset > 0 {
        let before = doc.children(pos.node)[pos.offset - 1];
        if let Some(existing) = doc.text_mut(before) {
            existing.push_str(text);
            let len = existing.chars().count();
            return Position::new(before, len);
        }
    }
    if let Some(&after) = doc.children(pos.node).get(pos.offset) {
        if let Some(existing) = doc.text_mut(after) {
            existing.insert_str(0, text);
            return Position::new(after, inserted);
        }
    }
    let node = doc.create_text(text);
    doc.insert_child(pos.node, pos.offset, node);
    Position::new(node, inserted)
}

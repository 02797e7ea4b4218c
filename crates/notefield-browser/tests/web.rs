//! WASM browser tests for notefield-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use notefield_browser::dom_sync::{read_tree, write_selection, write_tree};
use notefield_browser::{
    BrowserPlatform, EditingArea, FieldChanges, FieldEntry, FieldSet, FieldView, FieldViews,
    FocusPlatform, FormattingState, HostBridge, HostCommand, Position, Selection, ThemePlatform,
    Toolbar, ViewportPlatform,
};

fn document() -> web_sys::Document {
    gloo_utils::document()
}

fn scratch() -> web_sys::Element {
    let el = document().create_element("div").unwrap();
    document().body().unwrap().append_child(&el).unwrap();
    el
}

fn area(markup: &str) -> EditingArea {
    let mut area = EditingArea::new();
    area.attach();
    area.set_content(markup);
    area
}

// === Tree sync ===

#[wasm_bindgen_test]
fn test_write_then_read_tree() {
    let target = scratch();
    let area = area("a<b class=\"x\">bold</b><!--c-->");
    write_tree(area.document(), &target).unwrap();
    assert_eq!(target.inner_html(), "a<b class=\"x\">bold</b><!--c--><br>");

    let doc = read_tree(&target);
    assert_eq!(doc.inner_html(doc.root()), "a<b class=\"x\">bold</b><!--c--><br>");
}

#[wasm_bindgen_test]
fn test_write_replaces_previous_children() {
    let target = scratch();
    target.set_inner_html("<i>old</i>");
    write_tree(area("new").document(), &target).unwrap();
    assert_eq!(target.inner_html(), "new<br>");
}

#[wasm_bindgen_test]
fn test_selection_maps_utf16_offsets() {
    let target = scratch();
    let area = area("😀ab");
    write_tree(area.document(), &target).unwrap();

    let text = area.document().node_at_path(&[0]).unwrap();
    let caret = Selection::collapsed(Position::new(text, 2));
    write_selection(None, &target, area.document(), caret).unwrap();

    let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
    assert_eq!(selection.anchor_offset(), 3);

    let doc = read_tree(&target);
    let read = notefield_browser::dom_sync::read_selection(None, &target, &doc).unwrap();
    assert_eq!(read.anchor.offset, 2);
    assert_eq!(doc.text(read.anchor.node), Some("😀ab"));
}

// === Field views ===

#[wasm_bindgen_test]
fn test_field_view_renders_label_style_and_content() {
    let mut fields = FieldSet::new();
    fields.set_fields(&[FieldEntry::new("Front", "<b>x</b>")], "red");
    fields.set_backgrounds(&["dupe"]);

    let view = FieldView::create(&document(), 0).unwrap();
    let field = fields.get(0).unwrap();
    let all = FieldChanges {
        label: true,
        content: true,
        selection: true,
        style: true,
        duplicate: true,
    };
    view.render(field, all).unwrap();

    assert_eq!(view.row().text_content().unwrap(), "Front");
    assert_eq!(view.editable().inner_html(), "<b>x</b><br>");
    assert!(view.host().class_list().contains("dupe"));
    let style = view.shadow().first_element_child().unwrap();
    assert!(style.text_content().unwrap().contains("color: red;"));
}

#[wasm_bindgen_test]
fn test_views_resize_and_find_ordinals() {
    let container = scratch();
    let mut views = FieldViews::new(container.clone());
    assert_eq!(views.resize(3).unwrap(), vec![0, 1, 2]);
    assert_eq!(container.child_element_count(), 3);

    assert!(views.resize(1).unwrap().is_empty());
    assert_eq!(views.len(), 1);
    assert_eq!(container.child_element_count(), 1);

    let host: &web_sys::Element = views.get(0).unwrap().host();
    assert_eq!(FieldViews::ordinal_of(host), Some(0));
}

// === Platform ===

#[wasm_bindgen_test]
fn test_bridge_receives_wire_strings() {
    let received = js_sys::Array::new();
    let push = js_sys::Function::new_with_args("msg", "this.push(msg)")
        .bind(&received);
    let platform = BrowserPlatform::new(scratch(), push).unwrap();

    platform.send(&HostCommand::Focus { ordinal: 2 });
    platform.send(&HostCommand::CutOrCopy);

    assert_eq!(received.length(), 2);
    assert_eq!(received.get(0).as_string().unwrap(), "focus:2");
    assert_eq!(received.get(1).as_string().unwrap(), "cutOrCopy");
}

#[wasm_bindgen_test]
fn test_focus_is_queued_until_applied() {
    let container = scratch();
    let platform = BrowserPlatform::new(container, js_sys::Function::new_no_args("")).unwrap();
    let mut fields = FieldSet::new();
    fields.set_fields(&[FieldEntry::new("Front", "")], "black");
    let changes = notefield_browser::EditorChanges {
        structure: true,
        fields: Vec::new(),
    };
    assert_eq!(platform.render(&fields, &changes).unwrap(), vec![0]);

    platform.focus_field(0);
    assert!(!platform.field_has_focus(0));
    for effect in platform.take_effects() {
        effect.apply();
    }
    assert!(platform.field_has_focus(0));
    assert!(platform.take_effects().is_empty());
}

#[wasm_bindgen_test]
fn test_theme_and_viewport_queries() {
    let platform = BrowserPlatform::new(scratch(), js_sys::Function::new_no_args("")).unwrap();
    assert!(!platform.text_color().is_empty());
    assert!(platform.viewport_height() > 0.0);
    assert_eq!(platform.field_rect(0), None);
}

#[wasm_bindgen_test]
fn test_highlight_toggles_button_class() {
    let bold = document().create_element("button").unwrap();
    bold.set_id("bold");
    let italic = document().create_element("button").unwrap();
    italic.set_id("italic");
    let toolbar = scratch();
    toolbar.append_child(&bold).unwrap();
    toolbar.append_child(&italic).unwrap();

    let platform = BrowserPlatform::new(scratch(), js_sys::Function::new_no_args("")).unwrap();
    platform.highlight(FormattingState {
        bold: true,
        ..FormattingState::default()
    });
    assert!(bold.class_list().contains("highlighted"));
    assert!(!italic.class_list().contains("highlighted"));

    platform.highlight(FormattingState::default());
    assert!(!bold.class_list().contains("highlighted"));
    toolbar.remove();
}

//! DOM construction for the fields of a note.
//!
//! Each field renders as
//!
//! ```text
//! <div class="field-row" data-ordinal="N">
//!   <div class="fname">Label</div>
//!   <div class="field" data-ordinal="N">          "dupe" class when duplicate
//!     #shadow-root
//!       <style>...</style>
//!       <notefield-editable contenteditable="true">...</notefield-editable>
//!   </div>
//! </div>
//! ```
//!
//! The shadow root keeps page styles out of the field; the `<style>` element
//! inside it carries the field's own font, size, direction and color.

use gloo_events::EventListener;
use notefield_core::{
    AREA_ROOT, Document, EditorChanges, EditorField, FieldChanges, FieldSet, Selection,
};
use wasm_bindgen::JsCast;

use crate::dom_sync::{read_selection, read_tree, write_selection, write_tree};
use crate::error::{BrowserError, DomResultExt};

/// Attribute carrying a field's ordinal on its row and host elements.
pub const ORDINAL_ATTR: &str = "data-ordinal";

/// Class marking a field whose content duplicates another note.
pub const DUPLICATE_CLASS: &str = "dupe";

const BASE_CSS: &str = "notefield-editable { display: block; min-height: 1.5em; \
     outline: none; overflow-wrap: anywhere; white-space: pre-wrap; }";

const ALL_CHANGES: FieldChanges = FieldChanges {
    label: true,
    content: true,
    selection: true,
    style: true,
    duplicate: true,
};

/// The live DOM of one field.
pub struct FieldView {
    ordinal: usize,
    row: web_sys::Element,
    label: web_sys::Element,
    host: web_sys::HtmlElement,
    shadow: web_sys::ShadowRoot,
    style: web_sys::Element,
    editable: web_sys::HtmlElement,
    listeners: Vec<EventListener>,
}

fn html_element(element: web_sys::Element) -> Result<web_sys::HtmlElement, BrowserError> {
    element.dyn_into().map_err(|_| BrowserError::Cast {
        expected: "HtmlElement",
    })
}

impl FieldView {
    pub fn create(document: &web_sys::Document, ordinal: usize) -> Result<Self, BrowserError> {
        let ordinal_value = ordinal.to_string();

        let row = document.create_element("div").dom_err("createElement")?;
        row.set_class_name("field-row");
        row.set_attribute(ORDINAL_ATTR, &ordinal_value)
            .dom_err("setAttribute")?;

        let label = document.create_element("div").dom_err("createElement")?;
        label.set_class_name("fname");

        let host = html_element(document.create_element("div").dom_err("createElement")?)?;
        host.set_class_name("field");
        host.set_attribute(ORDINAL_ATTR, &ordinal_value)
            .dom_err("setAttribute")?;

        let shadow = host
            .attach_shadow(&web_sys::ShadowRootInit::new(web_sys::ShadowRootMode::Open))
            .dom_err("attachShadow")?;
        let style = document.create_element("style").dom_err("createElement")?;
        let editable = html_element(document.create_element(AREA_ROOT).dom_err("createElement")?)?;
        editable
            .set_attribute("contenteditable", "true")
            .dom_err("setAttribute")?;

        shadow.append_child(&style).dom_err("appendChild")?;
        shadow.append_child(&editable).dom_err("appendChild")?;
        row.append_child(&label).dom_err("appendChild")?;
        row.append_child(&host).dom_err("appendChild")?;

        Ok(Self {
            ordinal,
            row,
            label,
            host,
            shadow,
            style,
            editable,
            listeners: Vec::new(),
        })
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn row(&self) -> &web_sys::Element {
        &self.row
    }

    pub fn host(&self) -> &web_sys::HtmlElement {
        &self.host
    }

    pub fn shadow(&self) -> &web_sys::ShadowRoot {
        &self.shadow
    }

    /// The content-editable element events are listened on.
    pub fn editable(&self) -> &web_sys::HtmlElement {
        &self.editable
    }

    /// Keep `listeners` alive for as long as this view exists.
    pub fn set_listeners(&mut self, listeners: Vec<EventListener>) {
        self.listeners = listeners;
    }

    /// Whether the editable element is the active element of its shadow tree.
    pub fn has_focus(&self) -> bool {
        self.shadow
            .active_element()
            .is_some_and(|el| el.is_same_node(Some(&self.editable)))
    }

    /// Read content and selection back from the DOM.
    pub fn read(&self) -> (Document, Option<Selection>) {
        let doc = read_tree(&self.editable);
        let selection = read_selection(Some(&self.shadow), &self.editable, &doc);
        (doc, selection)
    }

    /// Refresh the parts of the DOM named by `changes`.
    pub fn render(&self, field: &EditorField, changes: FieldChanges) -> Result<(), BrowserError> {
        let container = &field.container;
        if changes.label {
            self.label.set_text_content(Some(field.label()));
        }
        if changes.style {
            let css = format!("{BASE_CSS}\n{}", container.style().to_css(AREA_ROOT));
            self.style.set_text_content(Some(&css));
        }
        if changes.duplicate {
            self.host
                .class_list()
                .toggle_with_force(DUPLICATE_CLASS, container.is_duplicate())
                .dom_err("classList.toggle")?;
        }

        let area = container.area();
        if changes.content {
            write_tree(area.document(), &self.editable)?;
        }
        if (changes.content || changes.selection) && container.is_focused() {
            if let Some(selection) = area.selection() {
                write_selection(Some(&self.shadow), &self.editable, area.document(), selection)?;
            }
        }
        Ok(())
    }

    fn remove(&self) {
        self.row.remove();
    }
}

/// All field views, in ordinal order, inside one container element.
pub struct FieldViews {
    container: web_sys::Element,
    views: Vec<FieldView>,
}

impl FieldViews {
    pub fn new(container: web_sys::Element) -> Self {
        Self {
            container,
            views: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn get(&self, ordinal: usize) -> Option<&FieldView> {
        self.views.get(ordinal)
    }

    pub fn get_mut(&mut self, ordinal: usize) -> Option<&mut FieldView> {
        self.views.get_mut(ordinal)
    }

    /// Grow or shrink to `count` views. Returns the ordinals of new views.
    pub fn resize(&mut self, count: usize) -> Result<Vec<usize>, BrowserError> {
        for view in self.views.drain(count.min(self.views.len())..) {
            view.remove();
        }

        let document = self.container.owner_document().ok_or(BrowserError::Cast {
            expected: "container owned by a document",
        })?;
        let mut created = Vec::new();
        while self.views.len() < count {
            let view = FieldView::create(&document, self.views.len())?;
            self.container
                .append_child(view.row())
                .dom_err("appendChild")?;
            created.push(view.ordinal());
            self.views.push(view);
        }
        Ok(created)
    }

    /// Bring the DOM in line with the model. Returns the ordinals of views
    /// created on the way, which still need their event listeners.
    pub fn apply(
        &mut self,
        fields: &FieldSet,
        changes: &EditorChanges,
    ) -> Result<Vec<usize>, BrowserError> {
        if !changes.structure {
            for (ordinal, field_changes) in &changes.fields {
                let (Some(view), Some(field)) = (self.views.get(*ordinal), fields.get(*ordinal))
                else {
                    return Err(BrowserError::MissingField(*ordinal));
                };
                view.render(field, *field_changes)?;
            }
            return Ok(Vec::new());
        }

        let created = self.resize(fields.len())?;
        for (view, field) in self.views.iter().zip(fields.iter()) {
            view.render(field, ALL_CHANGES)?;
        }
        tracing::debug!(count = fields.len(), created = created.len(), "field views rebuilt");
        Ok(created)
    }

    /// Ordinal of the field `element` belongs to.
    pub fn ordinal_of(element: &web_sys::Element) -> Option<usize> {
        element
            .closest(&format!("[{ORDINAL_ATTR}]"))
            .ok()
            .flatten()?
            .get_attribute(ORDINAL_ATTR)?
            .parse()
            .ok()
    }
}

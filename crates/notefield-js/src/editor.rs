//! JsNoteEditor - the editor wrapper for JavaScript.

use std::cell::RefCell;
use std::rc::Rc;

use notefield_browser::BrowserPlatform;
use notefield_core::{EditorConfig, FieldEntry, FontSpec, NoteEditor, NoteId};
use wasm_bindgen::prelude::*;

use crate::events;

pub(crate) type InnerEditor = NoteEditor<BrowserPlatform>;
pub(crate) type EditorHandle = Rc<RefCell<InnerEditor>>;

/// The note editor exposed to JavaScript.
#[wasm_bindgen(js_name = NoteEditor)]
pub struct JsNoteEditor {
    handle: EditorHandle,
}

#[wasm_bindgen(js_class = NoteEditor)]
impl JsNoteEditor {
    /// Create an editor rendering into `container`.
    ///
    /// `bridge` is called with every host command string. `config` is an
    /// optional `{ saveDelayMs, nightMode, extendedPaste }` object.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: web_sys::Element,
        bridge: js_sys::Function,
        config: JsValue,
    ) -> Result<JsNoteEditor, JsError> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?
        };

        let platform = BrowserPlatform::new(container, bridge)?;
        let editor = NoteEditor::new(platform, config)?;
        let handle = Rc::new(RefCell::new(editor));

        let weak = Rc::downgrade(&handle);
        handle
            .borrow()
            .platform()
            .set_timer_callback(Rc::new(move |token| events::save_timer_fired(&weak, token)));

        Ok(Self { handle })
    }

    /// Load the note's fields as `[[name, content], ...]`.
    #[wasm_bindgen(js_name = setFields)]
    pub fn set_fields(&self, fields: JsValue) -> Result<(), JsError> {
        let entries: Vec<FieldEntry> = serde_wasm_bindgen::from_value(fields)
            .map_err(|e| JsError::new(&format!("Invalid fields: {}", e)))?;
        events::dispatch(&self.handle, |editor| editor.set_fields(&entries));
        Ok(())
    }

    /// Mark fields as duplicates: `"dupe"` per position, anything else clears.
    #[wasm_bindgen(js_name = setBackgrounds)]
    pub fn set_backgrounds(&self, flags: Vec<String>) {
        events::dispatch(&self.handle, |editor| editor.set_backgrounds(&flags));
    }

    /// Set fonts as `[[family, sizePx, rtl], ...]`.
    #[wasm_bindgen(js_name = setFonts)]
    pub fn set_fonts(&self, fonts: JsValue) -> Result<(), JsError> {
        let fonts: Vec<FontSpec> = serde_wasm_bindgen::from_value(fonts)
            .map_err(|e| JsError::new(&format!("Invalid fonts: {}", e)))?;
        events::dispatch(&self.handle, |editor| editor.set_fonts(&fonts));
        Ok(())
    }

    #[wasm_bindgen(js_name = setNoteId)]
    pub fn set_note_id(&self, id: f64) -> Result<(), JsError> {
        if !id.is_finite() || id.fract() != 0.0 {
            return Err(JsError::new(&format!("Invalid note id: {}", id)));
        }
        events::dispatch(&self.handle, |editor| editor.set_note_id(NoteId(id as i64)));
        Ok(())
    }

    #[wasm_bindgen(js_name = setNightMode)]
    pub fn set_night_mode(&self, night_mode: bool) {
        events::dispatch(&self.handle, |editor| editor.set_night_mode(night_mode));
    }

    /// Save the current field immediately.
    #[wasm_bindgen(js_name = saveNow)]
    pub fn save_now(&self, keep_focus: bool) {
        events::dispatch(&self.handle, |editor| editor.save_now(keep_focus));
    }

    #[wasm_bindgen(js_name = focusField)]
    pub fn focus_field(&self, ordinal: Option<usize>) {
        let Some(ordinal) = ordinal else {
            return;
        };
        events::dispatch(&self.handle, |editor| editor.focus_field(ordinal));
    }

    /// Focus the field at a viewport point. Returns whether there was one.
    #[wasm_bindgen(js_name = focusIfField)]
    pub fn focus_if_field(&self, x: f64, y: f64) -> bool {
        events::dispatch(&self.handle, |editor| editor.focus_if_field(x, y)).unwrap_or(false)
    }

    /// Insert `html` at the caret of the current field after filtering it.
    #[wasm_bindgen(js_name = pasteHtml)]
    pub fn paste_html(&self, html: &str, internal: bool, extended: Option<bool>) {
        events::dispatch(&self.handle, |editor| {
            editor.paste_html(html, internal, extended)
        });
    }

    /// Surround the selection of the current field with `before` and `after`.
    pub fn wrap(&self, before: &str, after: &str, plain_text: Option<bool>) {
        let plain_text = plain_text.unwrap_or(false);
        events::dispatch(&self.handle, |editor| {
            editor.wrap(before, after, plain_text)
        });
    }

    /// Ordinal of the focused field, if any.
    #[wasm_bindgen(getter, js_name = currentField)]
    pub fn current_field(&self) -> Option<usize> {
        self.handle
            .try_borrow()
            .ok()
            .and_then(|editor| editor.session().current())
    }

    /// Content of field `ordinal` as it would be saved.
    #[wasm_bindgen(js_name = fieldContent)]
    pub fn field_content(&self, ordinal: usize) -> Option<String> {
        events::dispatch(&self.handle, |editor| {
            editor.field(ordinal).map(|field| field.container.content())
        })
        .flatten()
    }
}

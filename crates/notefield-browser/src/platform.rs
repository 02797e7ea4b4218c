//! Browser implementation of the editor platform traits.
//!
//! Commands go to a JS callback, the debounce runs on `setTimeout`, and the
//! toolbar, geometry and focus calls act on the page DOM. Focus, blur and
//! selection changes make the browser fire events synchronously, so they are
//! queued as [`DomEffect`]s and applied by the caller once it no longer holds
//! the editor borrowed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use notefield_core::{
    Document, EditorChanges, FieldRect, FieldSet, FocusPlatform, FormattingState, HostBridge,
    HostCommand, SaveTimer, SaveToken, Selection, SelectionModify, ThemePlatform, Toolbar,
    ViewportPlatform,
};
use wasm_bindgen::{JsCast, JsValue};

use crate::error::BrowserError;
use crate::fields::FieldViews;

/// Id of the element holding the formatting buttons.
pub const TOOLBAR_ID: &str = "topbuts";

/// Id of the "show duplicates" indicator.
pub const DUPLICATES_ID: &str = "dupes";

/// Class set on toolbar buttons whose format is active at the caret.
pub const HIGHLIGHT_CLASS: &str = "highlighted";

/// A DOM side effect that may re-enter the editor's event handlers.
pub enum DomEffect {
    Focus(web_sys::HtmlElement),
    Blur(web_sys::HtmlElement),
    Modify {
        shadow: web_sys::ShadowRoot,
        modify: SelectionModify,
    },
}

impl DomEffect {
    pub fn apply(self) {
        let result = match self {
            Self::Focus(element) => element.focus(),
            Self::Blur(element) => element.blur(),
            Self::Modify { shadow, modify } => {
                match crate::dom_sync::selection_for(Some(&shadow)) {
                    Some(selection) => selection.modify(
                        modify.alter_str(),
                        modify.direction_str(),
                        modify.granularity_str(),
                    ),
                    None => Ok(()),
                }
            }
        };
        if let Err(err) = result {
            tracing::warn!(error = %BrowserError::dom("effect", err), "DOM effect failed");
        }
    }
}

pub struct BrowserPlatform {
    document: web_sys::Document,
    bridge: js_sys::Function,
    views: RefCell<FieldViews>,
    timers: RefCell<HashMap<SaveToken, Timeout>>,
    // The timer that last fired; dropped only when the next one fires.
    fired: RefCell<Option<Timeout>>,
    on_timer: RefCell<Option<Rc<dyn Fn(SaveToken)>>>,
    effects: RefCell<Vec<DomEffect>>,
}

impl BrowserPlatform {
    /// Render fields into `container` and send commands to `bridge`.
    pub fn new(container: web_sys::Element, bridge: js_sys::Function) -> Result<Self, BrowserError> {
        let document = container.owner_document().ok_or(BrowserError::Cast {
            expected: "container owned by a document",
        })?;
        Ok(Self {
            document,
            bridge,
            views: RefCell::new(FieldViews::new(container)),
            timers: RefCell::new(HashMap::new()),
            fired: RefCell::new(None),
            on_timer: RefCell::new(None),
            effects: RefCell::new(Vec::new()),
        })
    }

    /// Set what runs when a scheduled save timer elapses.
    pub fn set_timer_callback(&self, callback: Rc<dyn Fn(SaveToken)>) {
        *self.on_timer.borrow_mut() = Some(callback);
    }

    /// Forget a timer that has just fired.
    pub fn timer_fired(&self, token: SaveToken) {
        let timeout = self.timers.borrow_mut().remove(&token);
        if timeout.is_some() {
            self.fired.replace(timeout);
        }
    }

    pub fn take_effects(&self) -> Vec<DomEffect> {
        std::mem::take(&mut *self.effects.borrow_mut())
    }

    /// Apply model changes to the field DOM. Returns ordinals of new views.
    pub fn render(
        &self,
        fields: &FieldSet,
        changes: &EditorChanges,
    ) -> Result<Vec<usize>, BrowserError> {
        if changes.is_empty() {
            return Ok(Vec::new());
        }
        self.views.borrow_mut().apply(fields, changes)
    }

    /// Content and selection of field `ordinal` as the DOM has them.
    pub fn read_field(&self, ordinal: usize) -> Option<(Document, Option<Selection>)> {
        self.views.borrow().get(ordinal).map(|view| view.read())
    }

    pub fn set_listeners(&self, ordinal: usize, listeners: Vec<EventListener>) {
        if let Some(view) = self.views.borrow_mut().get_mut(ordinal) {
            view.set_listeners(listeners);
        }
    }

    pub fn field_has_focus(&self, ordinal: usize) -> bool {
        self.views
            .borrow()
            .get(ordinal)
            .is_some_and(|view| view.has_focus())
    }

    /// Run `f` with the view of field `ordinal`.
    pub fn with_view<R>(
        &self,
        ordinal: usize,
        f: impl FnOnce(&crate::fields::FieldView) -> R,
    ) -> Option<R> {
        self.views.borrow().get(ordinal).map(f)
    }

    fn queue(&self, effect: DomEffect) {
        self.effects.borrow_mut().push(effect);
    }

    fn element_by_id(&self, id: &str) -> Option<web_sys::Element> {
        self.document.get_element_by_id(id)
    }
}

impl HostBridge for BrowserPlatform {
    fn send(&self, command: &HostCommand) {
        let message = JsValue::from_str(&command.to_string());
        if let Err(err) = self.bridge.call1(&JsValue::NULL, &message) {
            tracing::warn!(error = %BrowserError::dom("bridge", err), "host bridge failed");
        }
    }
}

impl SaveTimer for BrowserPlatform {
    fn schedule(&self, token: SaveToken, delay: Duration) {
        let Some(callback) = self.on_timer.borrow().clone() else {
            tracing::warn!(?token, "no timer callback installed, save not scheduled");
            return;
        };
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let timeout = Timeout::new(millis, move || callback(token));
        self.timers.borrow_mut().insert(token, timeout);
    }

    fn cancel(&self, token: SaveToken) {
        // Dropping a gloo Timeout clears it.
        self.timers.borrow_mut().remove(&token);
    }
}

impl Toolbar for BrowserPlatform {
    fn set_formatting_enabled(&self, enabled: bool) {
        let Some(toolbar) = self.element_by_id(TOOLBAR_ID) else {
            return;
        };
        let Ok(buttons) = toolbar.query_selector_all("button") else {
            return;
        };
        for button in (0..buttons.length()).filter_map(|i| buttons.item(i)) {
            let Some(button) = button.dyn_ref::<web_sys::Element>() else {
                continue;
            };
            let result = if enabled {
                button.remove_attribute("disabled")
            } else {
                button.set_attribute("disabled", "")
            };
            if let Err(err) = result {
                tracing::warn!(error = %BrowserError::dom("disabled", err), "toolbar update failed");
            }
        }
    }

    fn highlight(&self, state: FormattingState) {
        let buttons = [
            ("bold", state.bold),
            ("italic", state.italic),
            ("underline", state.underline),
            ("superscript", state.superscript),
            ("subscript", state.subscript),
        ];
        for (id, active) in buttons {
            let Some(button) = self.element_by_id(id) else {
                continue;
            };
            if let Err(err) = button.class_list().toggle_with_force(HIGHLIGHT_CLASS, active) {
                tracing::warn!(error = %BrowserError::dom("classList", err), "toolbar highlight failed");
            }
        }
    }

    fn show_duplicates(&self, shown: bool) {
        let Some(indicator) = self
            .element_by_id(DUPLICATES_ID)
            .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
        else {
            return;
        };
        let display = if shown { "block" } else { "none" };
        if let Err(err) = indicator.style().set_property("display", display) {
            tracing::warn!(error = %BrowserError::dom("style", err), "duplicate indicator update failed");
        }
    }
}

impl ViewportPlatform for BrowserPlatform {
    fn field_rect(&self, ordinal: usize) -> Option<FieldRect> {
        self.with_view(ordinal, |view| {
            let rect = view.host().get_bounding_client_rect();
            FieldRect {
                top: rect.top(),
                bottom: rect.bottom(),
            }
        })
    }

    fn viewport_height(&self) -> f64 {
        self.document
            .default_view()
            .and_then(|window| window.inner_height().ok())
            .and_then(|height| height.as_f64())
            .unwrap_or(0.0)
    }

    fn scroll_into_view(&self, ordinal: usize) {
        self.with_view(ordinal, |view| view.host().scroll_into_view_with_bool(false));
    }

    fn field_at_point(&self, x: f64, y: f64) -> Option<usize> {
        let element = self.document.element_from_point(x as f32, y as f32)?;
        FieldViews::ordinal_of(&element)
    }
}

impl FocusPlatform for BrowserPlatform {
    fn focus_field(&self, ordinal: usize) {
        if let Some(editable) = self.with_view(ordinal, |view| view.editable().clone()) {
            self.queue(DomEffect::Focus(editable));
        }
    }

    fn blur_field(&self, ordinal: usize) {
        if let Some(editable) = self.with_view(ordinal, |view| view.editable().clone()) {
            self.queue(DomEffect::Blur(editable));
        }
    }

    fn modify_selection(&self, ordinal: usize, modify: SelectionModify) {
        if let Some(shadow) = self.with_view(ordinal, |view| view.shadow().clone()) {
            self.queue(DomEffect::Modify { shadow, modify });
        }
    }
}

impl ThemePlatform for BrowserPlatform {
    fn text_color(&self) -> String {
        self.document
            .body()
            .and_then(|body| {
                let window = self.document.default_view()?;
                let style = window.get_computed_style(&body).ok()??;
                style.get_property_value("color").ok()
            })
            .filter(|color| !color.is_empty())
            .unwrap_or_else(|| "black".to_string())
    }
}

//! A labeled field: the unit the host addresses by ordinal.

use crate::container::{Direction, EditingContainer};

/// What the rendering layer has to refresh for one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldChanges {
    pub label: bool,
    pub content: bool,
    pub selection: bool,
    pub style: bool,
    pub duplicate: bool,
}

impl FieldChanges {
    pub fn any(&self) -> bool {
        self.label || self.content || self.selection || self.style || self.duplicate
    }
}

#[derive(Debug, Clone)]
pub struct EditorField {
    ordinal: usize,
    label: String,
    label_changed: bool,
    pub container: EditingContainer,
}

impl EditorField {
    /// A blank field at position `ordinal`.
    pub fn new(ordinal: usize) -> Self {
        Self {
            ordinal,
            label: String::new(),
            label_changed: true,
            container: EditingContainer::new(),
        }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Set label, text color and content in one go.
    pub fn initialize(&mut self, label: &str, color: &str, content: &str) {
        if self.label != label {
            self.label = label.to_string();
            self.label_changed = true;
        }
        self.container.set_base_color(color);
        self.container.set_content(content);
    }

    pub fn set_base_styling(&mut self, font_family: &str, font_size: &str, direction: Direction) {
        self.container
            .set_base_styling(font_family, font_size, direction);
    }

    pub fn teardown(&mut self) {
        self.container.teardown();
    }

    pub fn take_changes(&mut self) -> FieldChanges {
        let mut changes = self.container.take_changes();
        changes.label = std::mem::take(&mut self.label_changed);
        changes
    }
}

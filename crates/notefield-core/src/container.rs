//! Style-isolated wrapper around a field's editing area.

use std::fmt;

use crate::area::EditingArea;
use crate::field::FieldChanges;
use crate::selection::Selection;

/// Writing direction of a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub fn from_rtl(rtl: bool) -> Self {
        if rtl { Self::Rtl } else { Self::Ltr }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field overrides of the inherited text styling.
///
/// Unset properties render as `initial` so nothing leaks in from the page
/// around the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleOverride {
    pub font_family: Option<String>,
    pub font_size: Option<String>,
    pub direction: Option<Direction>,
    pub color: Option<String>,
}

impl StyleOverride {
    /// Declarations for the editable element, one per property.
    pub fn declarations(&self) -> String {
        let direction = self.direction.map(Direction::as_str);
        format!(
            "font-family: {}; font-size: {}; direction: {}; color: {};",
            self.font_family.as_deref().unwrap_or("initial"),
            self.font_size.as_deref().unwrap_or("initial"),
            direction.unwrap_or("initial"),
            self.color.as_deref().unwrap_or("initial"),
        )
    }

    /// A complete rule for `selector`.
    pub fn to_css(&self, selector: &str) -> String {
        format!("{selector} {{ {} }}", self.declarations())
    }
}

/// Owns one [`EditingArea`] plus the presentation around it.
#[derive(Debug, Clone, Default)]
pub struct EditingContainer {
    area: EditingArea,
    style: StyleOverride,
    duplicate: bool,
    style_changed: bool,
    duplicate_changed: bool,
}

impl EditingContainer {
    pub fn new() -> Self {
        let mut container = Self::default();
        container.area.attach();
        container
    }

    pub fn teardown(&mut self) {
        self.area.teardown();
        self.duplicate = false;
        self.duplicate_changed = true;
    }

    pub fn area(&self) -> &EditingArea {
        &self.area
    }

    pub fn area_mut(&mut self) -> &mut EditingArea {
        &mut self.area
    }

    pub fn style(&self) -> &StyleOverride {
        &self.style
    }

    pub fn set_base_color(&mut self, color: &str) {
        self.style.color = Some(color.to_string());
        self.style_changed = true;
    }

    pub fn set_base_styling(&mut self, font_family: &str, font_size: &str, direction: Direction) {
        self.style.font_family = Some(font_family.to_string());
        self.style.font_size = Some(font_size.to_string());
        self.style.direction = Some(direction);
        self.style_changed = true;
    }

    pub fn is_right_to_left(&self) -> bool {
        self.style.direction == Some(Direction::Rtl)
    }

    /// The field's own selection.
    pub fn selection(&self) -> Option<Selection> {
        self.area.selection()
    }

    pub fn focus(&mut self) {
        self.area.focus();
    }

    pub fn blur(&mut self) {
        self.area.blur();
    }

    pub fn is_focused(&self) -> bool {
        self.area.is_focused()
    }

    pub fn content(&self) -> String {
        self.area.content()
    }

    pub fn set_content(&mut self, markup: &str) {
        self.area.set_content(markup);
    }

    pub fn is_duplicate(&self) -> bool {
        self.duplicate
    }

    pub fn set_duplicate(&mut self, duplicate: bool) {
        if self.duplicate != duplicate {
            self.duplicate = duplicate;
            self.duplicate_changed = true;
        }
    }

    /// Drain change flags; the label flag is left for the owning field.
    pub fn take_changes(&mut self) -> FieldChanges {
        let area = self.area.take_changes();
        let changes = FieldChanges {
            label: false,
            content: area.content,
            selection: area.selection,
            style: self.style_changed,
            duplicate: self.duplicate_changed,
        };
        self.style_changed = false;
        self.duplicate_changed = false;
        changes
    }
}

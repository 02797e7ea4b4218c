//! The ordered collection of fields of the note being edited.

use serde::Deserialize;

use crate::container::Direction;
use crate::field::EditorField;

/// Background flag marking a field as a duplicate.
pub const DUPLICATE_FLAG: &str = "dupe";

/// Font settings for one field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, u32, bool)")]
pub struct FontSpec {
    pub family: String,
    pub size_px: u32,
    pub rtl: bool,
}

impl From<(String, u32, bool)> for FontSpec {
    fn from((family, size_px, rtl): (String, u32, bool)) -> Self {
        Self {
            family,
            size_px,
            rtl,
        }
    }
}

/// Name and content of one field as the host sends them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, String)")]
pub struct FieldEntry {
    pub name: String,
    pub content: String,
}

impl From<(String, String)> for FieldEntry {
    fn from((name, content): (String, String)) -> Self {
        Self { name, content }
    }
}

impl FieldEntry {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: Vec<EditorField>,
    has_duplicates: bool,
    structure_changed: bool,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, ordinal: usize) -> Option<&EditorField> {
        self.fields.get(ordinal)
    }

    pub fn get_mut(&mut self, ordinal: usize) -> Option<&mut EditorField> {
        self.fields.get_mut(ordinal)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EditorField> {
        self.fields.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EditorField> {
        self.fields.iter_mut()
    }

    /// Resize to `entries.len()` and load every entry into its position.
    ///
    /// Fields past the new length are torn down and dropped; new ones are
    /// appended. Ordinals always equal positions.
    pub fn set_fields(&mut self, entries: &[FieldEntry], text_color: &str) {
        let target = entries.len();
        if self.fields.len() > target {
            for mut field in self.fields.drain(target..) {
                field.teardown();
            }
            self.structure_changed = true;
        }
        while self.fields.len() < target {
            let ordinal = self.fields.len();
            self.fields.push(EditorField::new(ordinal));
            self.structure_changed = true;
        }

        for (field, entry) in self.fields.iter_mut().zip(entries) {
            field.initialize(&entry.name, text_color, &entry.content);
        }
        tracing::debug!(count = target, "fields loaded");
    }

    /// Toggle duplicate markers by position. Returns whether any is set.
    pub fn set_backgrounds<S: AsRef<str>>(&mut self, flags: &[S]) -> bool {
        for (field, flag) in self.fields.iter_mut().zip(flags) {
            field
                .container
                .set_duplicate(flag.as_ref() == DUPLICATE_FLAG);
        }
        self.has_duplicates = self.fields.iter().any(|f| f.container.is_duplicate());
        self.has_duplicates
    }

    pub fn set_fonts(&mut self, fonts: &[FontSpec]) {
        for (field, font) in self.fields.iter_mut().zip(fonts) {
            let size = format!("{}px", font.size_px);
            field.set_base_styling(&font.family, &size, Direction::from_rtl(font.rtl));
        }
    }

    pub fn has_duplicates(&self) -> bool {
        self.has_duplicates
    }

    /// Whether fields were added or removed since the last call.
    pub fn take_structure_changed(&mut self) -> bool {
        std::mem::take(&mut self.structure_changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(names: &[&str]) -> Vec<FieldEntry> {
        names
            .iter()
            .map(|n| FieldEntry::new(*n, format!("{n} content")))
            .collect()
    }

    #[test]
    fn test_set_fields_grows() {
        let mut set = FieldSet::new();
        set.set_fields(&entries(&["Front", "Back"]), "black");
        assert_eq!(set.len(), 2);
        assert!(set.take_structure_changed());
        assert_eq!(set.get(1).unwrap().ordinal(), 1);
        assert_eq!(set.get(1).unwrap().container.content(), "Back content");
    }

    #[test]
    fn test_set_fields_shrinks_to_exact_count() {
        let mut set = FieldSet::new();
        set.set_fields(&entries(&["a", "b", "c", "d"]), "black");
        set.take_structure_changed();

        set.set_fields(&entries(&["x", "y"]), "white");
        assert_eq!(set.len(), 2);
        assert!(set.take_structure_changed());
        for (i, name) in ["x", "y"].iter().enumerate() {
            let field = set.get(i).unwrap();
            assert_eq!(field.label(), *name);
            assert_eq!(field.ordinal(), i);
            assert_eq!(field.container.content(), format!("{name} content"));
            assert_eq!(field.container.style().color.as_deref(), Some("white"));
        }
    }

    #[test]
    fn test_same_count_keeps_structure() {
        let mut set = FieldSet::new();
        set.set_fields(&entries(&["a"]), "black");
        set.take_structure_changed();
        set.set_fields(&entries(&["b"]), "black");
        assert!(!set.take_structure_changed());
    }

    #[test]
    fn test_backgrounds_and_fonts_never_resize() {
        let mut set = FieldSet::new();
        set.set_fields(&entries(&["a", "b"]), "black");

        assert!(set.set_backgrounds(&["", "dupe", "dupe"]));
        assert_eq!(set.len(), 2);
        assert!(!set.get(0).unwrap().container.is_duplicate());
        assert!(set.get(1).unwrap().container.is_duplicate());
        assert!(set.set_backgrounds(&[""]));
        assert!(set.get(1).unwrap().container.is_duplicate());
        assert!(set.has_duplicates());
        assert!(!set.set_backgrounds(&["", ""]));

        set.set_fonts(&[FontSpec::from(("Arial".to_string(), 20, true))]);
        assert_eq!(set.len(), 2);
        let first = &set.get(0).unwrap().container;
        assert!(first.is_right_to_left());
        assert_eq!(first.style().font_size.as_deref(), Some("20px"));
        assert_eq!(set.get(1).unwrap().container.style().font_family, None);
    }
}

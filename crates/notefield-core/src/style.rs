//! Inline `style` attribute handling.
//!
//! Only what the sanitizer and the rendering layer need: a declaration list
//! that can be parsed from an attribute, filtered, and written back.

use smol_str::SmolStr;

use crate::dom::ElementData;

/// One `property: value` declaration. Property names are lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: SmolStr,
    pub value: String,
}

/// Ordered list of inline style declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<Declaration>,
}

impl InlineStyle {
    /// Parse the body of a `style` attribute. Declarations without a colon or
    /// with an empty property are skipped; later duplicates win.
    pub fn parse(source: &str) -> Self {
        let mut style = Self::default();
        for chunk in source.split(';') {
            let Some((property, value)) = chunk.split_once(':') else {
                continue;
            };
            let property = property.trim();
            let value = value.trim();
            if property.is_empty() || value.is_empty() {
                continue;
            }
            style.set(property, value);
        }
        style
    }

    /// Style of an element, empty when it has no `style` attribute.
    pub fn of(element: &ElementData) -> Self {
        element.attr("style").map(Self::parse).unwrap_or_default()
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|d| d.property.eq_ignore_ascii_case(property))
            .map(|d| d.value.as_str())
    }

    pub fn set(&mut self, property: &str, value: &str) {
        let property = SmolStr::new(property.to_ascii_lowercase());
        match self.declarations.iter_mut().find(|d| d.property == property) {
            Some(existing) => existing.value = value.to_string(),
            None => self.declarations.push(Declaration {
                property,
                value: value.to_string(),
            }),
        }
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        let idx = self
            .declarations
            .iter()
            .position(|d| d.property.eq_ignore_ascii_case(property))?;
        Some(self.declarations.remove(idx).value)
    }

    pub fn retain(&mut self, keep: impl FnMut(&Declaration) -> bool) {
        self.declarations.retain(keep);
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    /// Write the declarations back onto `element`, dropping the attribute
    /// entirely when nothing is left.
    pub fn apply_to(&self, element: &mut ElementData) {
        if self.is_empty() {
            element.remove_attr("style");
        } else {
            element.set_attr("style", self.to_string());
        }
    }
}

impl std::fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, decl) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}:{}", decl.property, decl.value)?;
        }
        Ok(())
    }
}

/// Remove the named properties from an element's inline style.
///
/// Returns true when the element had a `style` attribute. Unparseable
/// declarations are dropped along the way.
pub fn strip_properties(element: &mut ElementData, properties: &[&str]) -> bool {
    if element.attr("style").is_none() {
        return false;
    }
    let mut style = InlineStyle::of(element);
    for property in properties {
        style.remove(property);
    }
    style.apply_to(element);
    true
}

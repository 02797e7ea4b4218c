//! notefield-core: Platform-agnostic logic of the note field editor.
//!
//! This crate provides:
//! - `Document` - an arena markup tree with html5ever parsing and serialization
//! - `filter_html` - the paste/drop sanitizer with basic and extended allow-lists
//! - `EditingArea`, `EditingContainer`, `EditorField` and `FieldSet` - the field model
//! - `NoteEditor<P>` - focus tracking and debounced saves, generic over `EditorPlatform`
//! - `HostCommand` - the string commands sent to the host application

pub mod allowlist;
pub mod area;
pub mod command;
pub mod config;
pub mod container;
pub mod dom;
pub mod editing;
pub mod editor;
pub mod field;
pub mod field_set;
pub mod keys;
pub mod parse;
pub mod platform;
pub mod range;
pub mod sanitize;
pub mod selection;
pub mod serialize;
pub mod style;

pub use area::{AREA_ROOT, AreaChanges, EditingArea};
pub use command::{CommandParseError, HostCommand, NoteId, SaveKind};
pub use config::{ConfigError, EditorConfig};
pub use container::{Direction, EditingContainer, StyleOverride};
pub use dom::{Document, NodeData, NodeId};
pub use editing::FormattingState;
pub use editor::{EditorChanges, FocusState, NoteEditor, Session};
pub use field::{EditorField, FieldChanges};
pub use field_set::{DUPLICATE_FLAG, FieldEntry, FieldSet, FontSpec};
pub use keys::{Key, KeyCombo, KeydownResult, Modifiers, SelectionModify};
pub use platform::{
    EditorPlatform, FieldRect, FocusPlatform, HostBridge, SaveTimer, SaveToken, ThemePlatform,
    Toolbar, ViewportPlatform,
};
pub use sanitize::{FilterOptions, PasteSource, filter_html};
pub use selection::{Position, Selection};
pub use smol_str::SmolStr;

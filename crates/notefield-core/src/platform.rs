//! Platform abstraction traits for editor side effects.
//!
//! The coordinator never touches a host, a timer or a UI directly. Every side
//! effect goes through these traits so the same logic runs in the browser and
//! in tests. Methods take `&self`; implementations that need to mutate use
//! interior mutability and must not call back into the editor synchronously.

use std::time::Duration;

use crate::command::HostCommand;
use crate::editing::FormattingState;
use crate::keys::SelectionModify;

/// Identifies one scheduled save. Tokens increase monotonically, so a timer
/// firing for an old token can be recognised and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SaveToken(pub u64);

/// Vertical extent of a field relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRect {
    pub top: f64,
    pub bottom: f64,
}

/// Fire-and-forget channel to the host application.
pub trait HostBridge {
    fn send(&self, command: &HostCommand);
}

/// Single-shot timer driving the save debounce.
///
/// When a scheduled timer elapses the platform calls
/// `NoteEditor::on_save_timer` with the same token.
pub trait SaveTimer {
    fn schedule(&self, token: SaveToken, delay: Duration);
    fn cancel(&self, token: SaveToken);
}

/// The minimal formatting toolbar contract.
pub trait Toolbar {
    /// Enable or disable formatting controls.
    fn set_formatting_enabled(&self, enabled: bool);

    /// Highlight the controls matching the formatting at the caret.
    fn highlight(&self, state: FormattingState);

    /// Show or hide the "duplicate note" indicator.
    fn show_duplicates(&self, shown: bool);
}

/// Geometry queries and scrolling.
pub trait ViewportPlatform {
    fn field_rect(&self, ordinal: usize) -> Option<FieldRect>;

    fn viewport_height(&self) -> f64;

    /// Scroll so that the bottom of the field is visible.
    fn scroll_into_view(&self, ordinal: usize);

    /// Ordinal of the field under a viewport point, if any.
    fn field_at_point(&self, x: f64, y: f64) -> Option<usize>;
}

/// Input focus and native selection control.
pub trait FocusPlatform {
    fn focus_field(&self, ordinal: usize);

    fn blur_field(&self, ordinal: usize);

    /// Apply a caret movement the platform knows how to do natively.
    fn modify_selection(&self, ordinal: usize, modify: SelectionModify);
}

/// Theme information the editor needs.
pub trait ThemePlatform {
    /// The current text color as a literal CSS color.
    fn text_color(&self) -> String;
}

/// Everything the coordinator needs from its environment.
pub trait EditorPlatform:
    HostBridge + SaveTimer + Toolbar + ViewportPlatform + FocusPlatform + ThemePlatform
{
}

impl<T> EditorPlatform for T where
    T: HostBridge + SaveTimer + Toolbar + ViewportPlatform + FocusPlatform + ThemePlatform
{
}

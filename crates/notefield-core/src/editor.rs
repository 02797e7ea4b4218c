//! Focus and save coordination for the fields of one note.
//!
//! [`NoteEditor`] is the single entry point for both the host (loading fields,
//! explicit saves, paste) and the view (focus, blur, key and input events).
//! It tracks which field is current and debounces saves while the user types:
//!
//! ```text
//! Idle --focus(f)--> Focused(f) --edit--> PendingSave(f) --timer--> Focused(f)
//!   ^                    |                     |
//!   +------blur----------+---------blur--------+
//! ```
//!
//! Every side effect goes through the [`EditorPlatform`] it owns.

use crate::command::{HostCommand, NoteId, SaveKind};
use crate::config::{ConfigError, EditorConfig};
use crate::dom::Document;
use crate::field::{EditorField, FieldChanges};
use crate::field_set::{FieldEntry, FieldSet, FontSpec};
use crate::keys::{Key, KeyCombo, KeydownResult, SelectionModify};
use crate::platform::{EditorPlatform, SaveToken};
use crate::sanitize::{FilterOptions, PasteSource, filter_html};
use crate::selection::Selection;

/// Where the coordinator's state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusState {
    Idle,
    Focused(usize),
    PendingSave(usize),
}

/// Mutable state of one editing session.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<usize>,
    pending_save: Option<SaveToken>,
    note_id: Option<NoteId>,
    next_token: u64,
}

impl Session {
    /// Ordinal of the field holding focus.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn pending_save(&self) -> Option<SaveToken> {
        self.pending_save
    }

    pub fn note_id(&self) -> Option<NoteId> {
        self.note_id
    }

    pub fn state(&self) -> FocusState {
        match (self.current, self.pending_save) {
            (None, _) => FocusState::Idle,
            (Some(ordinal), None) => FocusState::Focused(ordinal),
            (Some(ordinal), Some(_)) => FocusState::PendingSave(ordinal),
        }
    }

    fn next_token(&mut self) -> SaveToken {
        let token = SaveToken(self.next_token);
        self.next_token += 1;
        token
    }
}

/// Render work accumulated since the last [`NoteEditor::drain_changes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorChanges {
    /// Fields were added or removed; rebuild all of them.
    pub structure: bool,
    /// Per-field refreshes, by ordinal.
    pub fields: Vec<(usize, FieldChanges)>,
}

impl EditorChanges {
    pub fn is_empty(&self) -> bool {
        !self.structure && self.fields.is_empty()
    }
}

pub struct NoteEditor<P: EditorPlatform> {
    platform: P,
    config: EditorConfig,
    fields: FieldSet,
    session: Session,
}

impl<P: EditorPlatform> NoteEditor<P> {
    pub fn new(platform: P, config: EditorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            platform,
            config,
            fields: FieldSet::new(),
            session: Session::default(),
        })
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn field(&self, ordinal: usize) -> Option<&EditorField> {
        self.fields.get(ordinal)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> FocusState {
        self.session.state()
    }

    fn is_current(&self, ordinal: usize) -> bool {
        self.session.current == Some(ordinal)
    }

    // === Host entry points ===

    /// Load the note's fields, resizing the field set to match.
    ///
    /// Any pending save is dropped: the host just replaced the content it
    /// would have saved.
    pub fn set_fields(&mut self, entries: &[FieldEntry]) {
        self.cancel_debounce();
        if let Some(current) = self.session.current {
            if current >= entries.len() {
                tracing::debug!(current, "current field removed");
                self.session.current = None;
            }
        }

        let color = self.platform.text_color();
        self.fields.set_fields(entries, &color);
        self.platform
            .set_formatting_enabled(self.session.current.is_some());
    }

    pub fn set_backgrounds<S: AsRef<str>>(&mut self, flags: &[S]) {
        let any = self.fields.set_backgrounds(flags);
        self.platform.show_duplicates(any);
    }

    pub fn set_fonts(&mut self, fonts: &[FontSpec]) {
        self.fields.set_fonts(fonts);
    }

    pub fn set_note_id(&mut self, note_id: NoteId) {
        self.session.note_id = Some(note_id);
    }

    pub fn set_night_mode(&mut self, night_mode: bool) {
        self.config.night_mode = night_mode;
    }

    /// Flush the current field now.
    ///
    /// With `keep_focus` this is a `key:` save; otherwise the field is blurred
    /// and saved through the blur transition.
    pub fn save_now(&mut self, keep_focus: bool) {
        let Some(current) = self.session.current else {
            self.cancel_debounce();
            return;
        };
        if keep_focus {
            self.cancel_debounce();
            self.send_save(SaveKind::Key);
        } else {
            self.leave_current(false);
            self.platform.blur_field(current);
        }
    }

    /// Focus field `ordinal`; no-op when there is no such field.
    pub fn focus_field(&mut self, ordinal: usize) {
        if self.fields.get(ordinal).is_none() {
            tracing::debug!(ordinal, "no field to focus");
            return;
        }
        self.on_focus(ordinal);
    }

    /// Focus the field under a viewport point. Returns whether there was one.
    pub fn focus_if_field(&mut self, x: f64, y: f64) -> bool {
        match self.platform.field_at_point(x, y) {
            Some(ordinal) if self.fields.get(ordinal).is_some() => {
                self.focus_field(ordinal);
                true
            }
            _ => false,
        }
    }

    /// Filter `markup` and insert it at the current field's selection.
    ///
    /// `extended` falls back to the configured paste fidelity.
    pub fn paste_html(&mut self, markup: &str, internal: bool, extended: Option<bool>) {
        let Some(current) = self.session.current else {
            return;
        };
        let options = FilterOptions {
            extended: extended.unwrap_or(self.config.extended_paste),
            night_mode: self.config.night_mode,
        };
        let filtered = filter_html(markup, PasteSource::from_internal_flag(internal), options);
        if filtered.is_empty() {
            return;
        }
        if let Some(field) = self.fields.get_mut(current) {
            field
                .container
                .area_mut()
                .replace_selection_with_markup(&filtered);
        }
        self.start_debounce();
    }

    /// Wrap the current field's selection in `before` and `after`.
    pub fn wrap(&mut self, before: &str, after: &str, plain_text: bool) {
        let Some(current) = self.session.current else {
            return;
        };
        if let Some(field) = self.fields.get_mut(current) {
            field
                .container
                .area_mut()
                .wrap_selection(before, after, plain_text);
        }
        self.start_debounce();
    }

    // === View synchronization ===

    /// Adopt a field's tree and selection as read back from the view.
    pub fn sync_field(&mut self, ordinal: usize, doc: Document, selection: Option<Selection>) {
        if let Some(field) = self.fields.get_mut(ordinal) {
            field.container.area_mut().sync_from_view(doc, selection);
        }
    }

    pub fn drain_changes(&mut self) -> EditorChanges {
        let structure = self.fields.take_structure_changed();
        let fields = self
            .fields
            .iter_mut()
            .map(|field| (field.ordinal(), field.take_changes()))
            .filter(|(_, changes)| changes.any())
            .collect();
        EditorChanges { structure, fields }
    }

    // === View events ===

    pub fn on_focus(&mut self, ordinal: usize) {
        if self.is_current(ordinal) || self.fields.get(ordinal).is_none() {
            return;
        }
        if self.session.current.is_some() {
            self.leave_current(false);
        }
        self.enter(ordinal);
    }

    /// Focus left field `ordinal`.
    ///
    /// `focus_retained` is true when the field is still the active element,
    /// e.g. because the whole window lost focus; the field then stays current
    /// and only a `key:` save is sent.
    pub fn on_blur(&mut self, ordinal: usize, focus_retained: bool) {
        if !self.is_current(ordinal) {
            tracing::debug!(ordinal, "blur of a field that is not current");
            return;
        }
        self.leave_current(focus_retained);
    }

    pub fn on_keydown(&mut self, ordinal: usize, combo: &KeyCombo) -> KeydownResult {
        if !self.is_current(ordinal) {
            return KeydownResult::PassThrough;
        }

        let result = match combo.key {
            Key::Escape => {
                self.leave_current(false);
                self.platform.blur_field(ordinal);
                return KeydownResult::Handled;
            }
            Key::Enter if !combo.modifiers.is_shortcut() => self.on_enter(ordinal),
            Key::ArrowLeft | Key::ArrowRight => self.on_rtl_arrow(ordinal, combo),
            _ => KeydownResult::PassThrough,
        };

        if combo.triggers_save() {
            self.start_debounce();
        }
        result
    }

    fn on_enter(&mut self, ordinal: usize) -> KeydownResult {
        let Some(field) = self.fields.get_mut(ordinal) else {
            return KeydownResult::PassThrough;
        };
        let area = field.container.area_mut();
        if area.in_list_item() {
            KeydownResult::PassThrough
        } else if area.in_preformatted() {
            area.insert_newline();
            KeydownResult::Handled
        } else {
            area.insert_line_break();
            KeydownResult::Handled
        }
    }

    fn on_rtl_arrow(&mut self, ordinal: usize, combo: &KeyCombo) -> KeydownResult {
        let rtl = self
            .fields
            .get(ordinal)
            .is_some_and(|f| f.container.is_right_to_left());
        match SelectionModify::for_rtl_arrow(combo) {
            Some(modify) if rtl => {
                self.platform.modify_selection(ordinal, modify);
                KeydownResult::Handled
            }
            _ => KeydownResult::PassThrough,
        }
    }

    pub fn on_keyup(&mut self, ordinal: usize, combo: &KeyCombo) {
        if !self.is_current(ordinal) || !matches!(combo.key, Key::Enter | Key::Backspace) {
            return;
        }
        let changed = self
            .fields
            .get_mut(ordinal)
            .is_some_and(|f| f.container.area_mut().unwrap_lone_break_block());
        if changed {
            self.start_debounce();
        }
    }

    /// Content of field `ordinal` changed in the view.
    pub fn on_input(&mut self, ordinal: usize) {
        if self.is_current(ordinal) {
            self.start_debounce();
        }
    }

    /// Paste or drop into a field. The host answers with `paste_html`.
    pub fn on_paste(&self) {
        self.platform.send(&HostCommand::Paste);
    }

    pub fn on_cut_or_copy(&self) {
        self.platform.send(&HostCommand::CutOrCopy);
    }

    /// The debounce timer for `token` elapsed.
    pub fn on_save_timer(&mut self, token: SaveToken) {
        if self.session.pending_save != Some(token) {
            tracing::trace!(?token, "stale save timer");
            return;
        }
        self.session.pending_save = None;

        if let Some(field) = self.session.current.and_then(|c| self.fields.get(c)) {
            let state = field.container.area().formatting_state();
            self.platform.highlight(state);
        }
        self.send_save(SaveKind::Key);
    }

    // === Transitions ===

    fn enter(&mut self, ordinal: usize) {
        let Some(field) = self.fields.get_mut(ordinal) else {
            return;
        };
        field.container.focus();
        field.container.area_mut().caret_to_end();
        self.session.current = Some(ordinal);

        self.platform.focus_field(ordinal);
        self.platform.send(&HostCommand::Focus { ordinal });
        self.platform.set_formatting_enabled(true);

        if let Some(rect) = self.platform.field_rect(ordinal) {
            if rect.bottom > self.platform.viewport_height() || rect.top < 0.0 {
                self.platform.scroll_into_view(ordinal);
            }
        }
        tracing::debug!(ordinal, "field focused");
    }

    fn leave_current(&mut self, focus_retained: bool) {
        let Some(current) = self.session.current else {
            return;
        };
        self.cancel_debounce();

        if focus_retained {
            self.send_save(SaveKind::Key);
            return;
        }

        self.send_save(SaveKind::Blur);
        if let Some(field) = self.fields.get_mut(current) {
            field.container.blur();
        }
        self.session.current = None;
        self.platform.set_formatting_enabled(false);
        tracing::debug!(ordinal = current, "field blurred");
    }

    fn start_debounce(&mut self) {
        self.cancel_debounce();
        let token = self.session.next_token();
        self.session.pending_save = Some(token);
        self.platform.schedule(token, self.config.save_delay());
    }

    fn cancel_debounce(&mut self) {
        if let Some(token) = self.session.pending_save.take() {
            self.platform.cancel(token);
        }
    }

    fn send_save(&self, kind: SaveKind) {
        let Some(ordinal) = self.session.current else {
            return;
        };
        let Some(field) = self.fields.get(ordinal) else {
            return;
        };
        if self.session.note_id.is_none() {
            tracing::debug!(ordinal, kind = kind.as_str(), "saving before a note id was set");
        }
        self.platform.send(&HostCommand::Save {
            kind,
            ordinal,
            note_id: self.session.note_id,
            content: field.container.content(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;
    use crate::editing::FormattingState;
    use crate::keys::Modifiers;
    use crate::selection::Position;
    use crate::platform::{
        FieldRect, FocusPlatform, HostBridge, SaveTimer, ThemePlatform, Toolbar, ViewportPlatform,
    };

    #[derive(Debug, Clone, PartialEq)]
    enum Effect {
        Sent(String),
        Scheduled(SaveToken, Duration),
        Cancelled(SaveToken),
        Formatting(bool),
        Highlight(FormattingState),
        Duplicates(bool),
        Focus(usize),
        Blur(usize),
        Scroll(usize),
        Modify(usize, SelectionModify),
    }

    /// Records every side effect and runs timers on a manual clock.
    #[derive(Default)]
    struct MockPlatform {
        effects: RefCell<Vec<Effect>>,
        now_ms: Cell<u64>,
        timers: RefCell<Vec<(SaveToken, u64)>>,
        rects: RefCell<HashMap<usize, FieldRect>>,
        field_at_point: Cell<Option<usize>>,
    }

    impl MockPlatform {
        fn record(&self, effect: Effect) {
            self.effects.borrow_mut().push(effect);
        }

        fn take(&self) -> Vec<Effect> {
            std::mem::take(&mut *self.effects.borrow_mut())
        }

        fn sent(&self) -> Vec<String> {
            self.effects
                .borrow()
                .iter()
                .filter_map(|e| match e {
                    Effect::Sent(s) => Some(s.clone()),
                    _ => None,
                })
                .collect()
        }

        fn clear(&self) {
            self.effects.borrow_mut().clear();
        }
    }

    impl HostBridge for MockPlatform {
        fn send(&self, command: &HostCommand) {
            self.record(Effect::Sent(command.to_string()));
        }
    }

    impl SaveTimer for MockPlatform {
        fn schedule(&self, token: SaveToken, delay: Duration) {
            let due = self.now_ms.get() + delay.as_millis() as u64;
            self.timers.borrow_mut().push((token, due));
            self.record(Effect::Scheduled(token, delay));
        }

        fn cancel(&self, token: SaveToken) {
            self.timers.borrow_mut().retain(|(t, _)| *t != token);
            self.record(Effect::Cancelled(token));
        }
    }

    impl Toolbar for MockPlatform {
        fn set_formatting_enabled(&self, enabled: bool) {
            self.record(Effect::Formatting(enabled));
        }

        fn highlight(&self, state: FormattingState) {
            self.record(Effect::Highlight(state));
        }

        fn show_duplicates(&self, shown: bool) {
            self.record(Effect::Duplicates(shown));
        }
    }

    impl ViewportPlatform for MockPlatform {
        fn field_rect(&self, ordinal: usize) -> Option<FieldRect> {
            self.rects.borrow().get(&ordinal).copied()
        }

        fn viewport_height(&self) -> f64 {
            500.0
        }

        fn scroll_into_view(&self, ordinal: usize) {
            self.record(Effect::Scroll(ordinal));
        }

        fn field_at_point(&self, _x: f64, _y: f64) -> Option<usize> {
            self.field_at_point.get()
        }
    }

    impl FocusPlatform for MockPlatform {
        fn focus_field(&self, ordinal: usize) {
            self.record(Effect::Focus(ordinal));
        }

        fn blur_field(&self, ordinal: usize) {
            self.record(Effect::Blur(ordinal));
        }

        fn modify_selection(&self, ordinal: usize, modify: SelectionModify) {
            self.record(Effect::Modify(ordinal, modify));
        }
    }

    impl ThemePlatform for MockPlatform {
        fn text_color(&self) -> String {
            "rgb(0, 0, 0)".to_string()
        }
    }

    type TestEditor = NoteEditor<MockPlatform>;

    /// Move the manual clock forward, firing due timers in order.
    fn advance(editor: &mut TestEditor, ms: u64) {
        let target = editor.platform().now_ms.get() + ms;
        loop {
            let next = {
                let timers = editor.platform().timers.borrow();
                timers
                    .iter()
                    .filter(|(_, due)| *due <= target)
                    .min_by_key(|(_, due)| *due)
                    .copied()
            };
            let Some((token, due)) = next else {
                break;
            };
            editor.platform().now_ms.set(due);
            editor
                .platform()
                .timers
                .borrow_mut()
                .retain(|(t, _)| *t != token);
            editor.on_save_timer(token);
        }
        editor.platform().now_ms.set(target);
    }

    fn editor(fields: &[(&str, &str)]) -> TestEditor {
        let mut editor = NoteEditor::new(MockPlatform::default(), EditorConfig::default()).unwrap();
        let entries: Vec<FieldEntry> = fields.iter().map(|(n, c)| FieldEntry::new(*n, *c)).collect();
        editor.set_fields(&entries);
        editor.set_note_id(NoteId(7));
        editor.platform().clear();
        editor
    }

    fn key(c: &str) -> KeyCombo {
        KeyCombo::new(Key::character(c))
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EditorConfig {
            save_delay_ms: 0,
            ..Default::default()
        };
        assert!(NoteEditor::new(MockPlatform::default(), config).is_err());
    }

    #[test]
    fn test_focus_sends_one_command_and_puts_caret_at_end() {
        let mut editor = editor(&[("Front", "abc"), ("Back", "")]);
        editor.on_focus(0);

        assert_eq!(
            editor.platform().take(),
            vec![
                Effect::Focus(0),
                Effect::Sent("focus:0".into()),
                Effect::Formatting(true),
            ]
        );
        assert_eq!(editor.state(), FocusState::Focused(0));

        let area = editor.field(0).unwrap().container.area();
        let caret = area.selection().unwrap();
        assert!(caret.is_collapsed());
        assert_eq!(area.document().text(caret.head.node), Some("abc"));
        assert_eq!(caret.head.offset, 3);

        editor.on_focus(0);
        assert!(editor.platform().take().is_empty());
    }

    #[test]
    fn test_focus_scrolls_field_into_view() {
        let mut editor = editor(&[("Front", "")]);
        editor
            .platform()
            .rects
            .borrow_mut()
            .insert(0, FieldRect { top: 480.0, bottom: 540.0 });
        editor.on_focus(0);
        assert!(editor.platform().take().contains(&Effect::Scroll(0)));
    }

    #[test]
    fn test_visible_field_does_not_scroll() {
        let mut editor = editor(&[("Front", "")]);
        editor
            .platform()
            .rects
            .borrow_mut()
            .insert(0, FieldRect { top: 10.0, bottom: 60.0 });
        editor.on_focus(0);
        assert!(!editor.platform().take().contains(&Effect::Scroll(0)));
    }

    #[test]
    fn test_debounce_burst_saves_once_after_last_edit() {
        let mut editor = editor(&[("Front", "abc")]);
        editor.on_focus(0);
        editor.platform().clear();

        editor.on_keydown(0, &key("a"));
        advance(&mut editor, 300);
        editor.on_input(0);
        advance(&mut editor, 300);
        editor.on_keydown(0, &key("b"));
        assert_eq!(editor.state(), FocusState::PendingSave(0));

        advance(&mut editor, 599);
        assert!(editor.platform().sent().is_empty());

        advance(&mut editor, 1);
        assert_eq!(editor.platform().sent(), vec!["key:0:7:abc".to_string()]);
        assert_eq!(editor.state(), FocusState::Focused(0));

        advance(&mut editor, 5_000);
        assert_eq!(editor.platform().sent().len(), 1);
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let mut editor = editor(&[("Front", "abc")]);
        editor.on_focus(0);
        editor.on_input(0);
        let first = editor.session().pending_save().unwrap();
        editor.on_input(0);
        editor.platform().clear();

        editor.on_save_timer(first);
        assert!(editor.platform().take().is_empty());
        assert_eq!(editor.state(), FocusState::PendingSave(0));
    }

    #[test]
    fn test_flush_refreshes_toolbar_highlight() {
        let mut editor = editor(&[("Front", "<b>bold</b>")]);
        editor.on_focus(0);
        let text = editor
            .field(0)
            .unwrap()
            .container
            .area()
            .document()
            .node_at_path(&[0, 0])
            .unwrap();
        let doc = editor.field(0).unwrap().container.area().document().clone();
        editor.sync_field(
            0,
            doc,
            Some(Selection::collapsed(Position::new(text, 2))),
        );
        editor.on_input(0);
        editor.platform().clear();
        advance(&mut editor, 600);

        let effects = editor.platform().take();
        let highlight = effects.iter().find_map(|e| match e {
            Effect::Highlight(state) => Some(*state),
            _ => None,
        });
        assert!(highlight.is_some_and(|s| s.bold));
        assert!(effects.contains(&Effect::Sent("key:0:7:<b>bold</b>".into())));
    }

    #[test]
    fn test_navigation_and_shortcuts_do_not_schedule() {
        let mut editor = editor(&[("Front", "abc")]);
        editor.on_focus(0);
        editor.platform().clear();

        for combo in [
            KeyCombo::new(Key::ArrowLeft),
            KeyCombo::new(Key::Shift),
            KeyCombo::ctrl(Key::character("b")),
            KeyCombo::new(Key::Function(5)),
        ] {
            assert_eq!(editor.on_keydown(0, &combo), KeydownResult::PassThrough);
        }
        assert!(editor.platform().take().is_empty());
        assert_eq!(editor.state(), FocusState::Focused(0));
    }

    #[test]
    fn test_blur_leaving_field_sends_blur_save() {
        let mut editor = editor(&[("Front", "abc")]);
        editor.on_focus(0);
        editor.on_keydown(0, &key("x"));
        editor.platform().clear();

        editor.on_blur(0, false);
        let effects = editor.platform().take();
        assert!(matches!(effects[0], Effect::Cancelled(_)));
        assert_eq!(
            &effects[1..],
            &[
                Effect::Sent("blur:0:7:abc".into()),
                Effect::Formatting(false)
            ]
        );
        assert_eq!(editor.state(), FocusState::Idle);

        advance(&mut editor, 1_000);
        assert!(editor.platform().take().is_empty());
    }

    #[test]
    fn test_blur_with_focus_retained_keeps_field() {
        let mut editor = editor(&[("Front", "abc")]);
        editor.on_focus(0);
        editor.platform().clear();

        editor.on_blur(0, true);
        assert_eq!(editor.platform().sent(), vec!["key:0:7:abc".to_string()]);
        assert_eq!(editor.state(), FocusState::Focused(0));
    }

    #[test]
    fn test_blur_of_other_field_is_ignored() {
        let mut editor = editor(&[("Front", "a"), ("Back", "b")]);
        editor.on_focus(0);
        editor.platform().clear();
        editor.on_blur(1, false);
        assert!(editor.platform().take().is_empty());
        assert_eq!(editor.state(), FocusState::Focused(0));
    }

    #[test]
    fn test_switching_fields_saves_previous_first() {
        let mut editor = editor(&[("Front", "a"), ("Back", "b")]);
        editor.on_focus(0);
        editor.platform().clear();

        editor.on_focus(1);
        assert_eq!(
            editor.platform().sent(),
            vec!["blur:0:7:a".to_string(), "focus:1".to_string()]
        );
        assert_eq!(editor.state(), FocusState::Focused(1));
    }

    #[test]
    fn test_save_now_keeping_focus() {
        let mut editor = editor(&[("Front", "abc")]);
        editor.on_focus(0);
        editor.on_input(0);
        editor.platform().clear();

        editor.save_now(true);
        assert_eq!(editor.platform().sent(), vec!["key:0:7:abc".to_string()]);
        assert_eq!(editor.state(), FocusState::Focused(0));

        advance(&mut editor, 1_000);
        assert_eq!(editor.platform().sent().len(), 1);
    }

    #[test]
    fn test_save_now_without_focus_blurs() {
        let mut editor = editor(&[("Front", "abc")]);
        editor.on_focus(0);
        editor.platform().clear();

        editor.save_now(false);
        let effects = editor.platform().take();
        assert!(effects.contains(&Effect::Sent("blur:0:7:abc".into())));
        assert_eq!(effects.last(), Some(&Effect::Blur(0)));
        assert_eq!(editor.state(), FocusState::Idle);

        // The view's blur event arrives afterwards and changes nothing.
        editor.on_blur(0, false);
        assert!(editor.platform().take().is_empty());
    }

    #[test]
    fn test_saves_without_note_id_send_null() {
        let mut editor = NoteEditor::new(MockPlatform::default(), EditorConfig::default()).unwrap();
        editor.set_fields(&[FieldEntry::new("Front", "abc")]);
        editor.on_focus(0);
        editor.on_input(0);
        advance(&mut editor, 700);
        editor.on_blur(0, false);

        assert_eq!(
            editor.platform().sent(),
            vec!["focus:0", "key:0:null:abc", "blur:0:null:abc"]
        );
    }

    #[test]
    fn test_escape_blurs_and_saves() {
        let mut editor = editor(&[("Front", "abc")]);
        editor.on_focus(0);
        editor.platform().clear();

        let result = editor.on_keydown(0, &KeyCombo::new(Key::Escape));
        assert_eq!(result, KeydownResult::Handled);
        let effects = editor.platform().take();
        assert!(effects.contains(&Effect::Sent("blur:0:7:abc".into())));
        assert!(effects.contains(&Effect::Blur(0)));
        assert_eq!(editor.state(), FocusState::Idle);
    }

    #[test]
    fn test_enter_inserts_break() {
        let mut editor = editor(&[("Front", "abc")]);
        editor.on_focus(0);

        let result = editor.on_keydown(0, &KeyCombo::new(Key::Enter));
        assert_eq!(result, KeydownResult::Handled);
        assert_eq!(editor.field(0).unwrap().container.content(), "abc<br>");
        assert_eq!(editor.state(), FocusState::PendingSave(0));
    }

    #[test]
    fn test_enter_in_list_item_passes_through() {
        let mut editor = editor(&[("Front", "<ul><li>one</li></ul>")]);
        editor.on_focus(0);
        let li_text = {
            let doc = editor.field(0).unwrap().container.area().document();
            doc.node_at_path(&[0, 0, 0]).unwrap()
        };
        let doc = editor.field(0).unwrap().container.area().document().clone();
        let caret = Selection::collapsed(Position::new(li_text, 3));
        editor.sync_field(0, doc, Some(caret));

        let result = editor.on_keydown(0, &KeyCombo::new(Key::Enter));
        assert_eq!(result, KeydownResult::PassThrough);
        assert_eq!(editor.state(), FocusState::PendingSave(0));
    }

    #[test]
    fn test_enter_in_pre_inserts_newlines() {
        let mut editor = editor(&[("Front", "<pre>code</pre>")]);
        editor.on_focus(0);
        let text = editor
            .field(0)
            .unwrap()
            .container
            .area()
            .document()
            .node_at_path(&[0, 0])
            .unwrap();
        let doc = editor.field(0).unwrap().container.area().document().clone();
        let caret = Selection::collapsed(Position::new(text, 4));
        editor.sync_field(0, doc, Some(caret));

        editor.on_keydown(0, &KeyCombo::new(Key::Enter));
        assert_eq!(
            editor.field(0).unwrap().container.content(),
            "<pre>code\n\n</pre>"
        );
    }

    #[test]
    fn test_keyup_unwraps_lone_break_block() {
        let mut editor = editor(&[("Front", "<div>a</div><div><br></div>")]);
        editor.on_focus(0);
        let block = {
            let doc = editor.field(0).unwrap().container.area().document();
            doc.node_at_path(&[1]).unwrap()
        };
        let doc = editor.field(0).unwrap().container.area().document().clone();
        editor.sync_field(
            0,
            doc,
            Some(Selection::collapsed(Position::new(block, 0))),
        );

        editor.on_keyup(0, &KeyCombo::new(Key::Enter));
        assert_eq!(
            editor.field(0).unwrap().container.content(),
            "<div>a</div><br>"
        );
    }

    #[test]
    fn test_rtl_arrows_are_translated() {
        let mut editor = editor(&[("Front", "abc"), ("Back", "def")]);
        editor.set_fonts(&[
            FontSpec::from(("Arial".to_string(), 20, true)),
            FontSpec::from(("Arial".to_string(), 20, false)),
        ]);
        editor.on_focus(0);
        editor.platform().clear();

        let combo = KeyCombo::with_modifiers(Key::ArrowRight, Modifiers::SHIFT);
        assert_eq!(editor.on_keydown(0, &combo), KeydownResult::Handled);
        let expected = SelectionModify::for_rtl_arrow(&combo).unwrap();
        assert_eq!(editor.platform().take(), vec![Effect::Modify(0, expected)]);

        editor.on_focus(1);
        editor.platform().clear();
        assert_eq!(editor.on_keydown(1, &combo), KeydownResult::PassThrough);
        assert!(editor.platform().take().is_empty());
    }

    #[test]
    fn test_shrinking_fields_keeps_exact_count() {
        let mut editor = editor(&[("a", "1"), ("b", "2"), ("c", "3")]);
        editor.on_focus(2);
        editor.platform().clear();

        editor.set_fields(&[FieldEntry::new("x", "9"), FieldEntry::new("y", "8")]);
        assert_eq!(editor.fields().len(), 2);
        assert_eq!(editor.field(1).unwrap().container.content(), "8");
        assert_eq!(editor.state(), FocusState::Idle);
        assert_eq!(editor.platform().take(), vec![Effect::Formatting(false)]);
        assert!(editor.drain_changes().structure);
    }

    #[test]
    fn test_backgrounds_toggle_indicator() {
        let mut editor = editor(&[("a", ""), ("b", "")]);
        editor.set_backgrounds(&["", "dupe"]);
        assert_eq!(editor.platform().take(), vec![Effect::Duplicates(true)]);
        assert!(editor.field(1).unwrap().container.is_duplicate());
    }

    #[test]
    fn test_paste_html_filters_and_inserts() {
        let mut editor = editor(&[("Front", "ab")]);
        editor.paste_html("<b>x</b>", false, None);
        assert_eq!(editor.field(0).unwrap().container.content(), "ab");

        editor.on_focus(0);
        editor.platform().clear();
        editor.paste_html("<b onclick=\"x()\">x</b><random></random>", false, Some(true));
        assert_eq!(editor.field(0).unwrap().container.content(), "ab<b>x</b>");
        assert_eq!(editor.state(), FocusState::PendingSave(0));

        editor.save_now(true);
        editor.platform().clear();
        editor.paste_html("<random></random>", false, None);
        assert_eq!(editor.state(), FocusState::Focused(0));
        assert!(editor.platform().take().is_empty());
    }

    #[test]
    fn test_wrap_at_caret() {
        let mut editor = editor(&[("Front", "ab")]);
        editor.on_focus(0);
        editor.wrap("{{c1::", "}}", true);
        assert_eq!(
            editor.field(0).unwrap().container.content(),
            "ab{{c1::}}"
        );
        assert_eq!(editor.state(), FocusState::PendingSave(0));
    }

    #[test]
    fn test_focus_helpers_ignore_missing_fields() {
        let mut editor = editor(&[("Front", "")]);
        editor.focus_field(3);
        assert_eq!(editor.state(), FocusState::Idle);

        assert!(!editor.focus_if_field(1.0, 1.0));
        editor.platform().field_at_point.set(Some(0));
        assert!(editor.focus_if_field(1.0, 1.0));
        assert_eq!(editor.state(), FocusState::Focused(0));
    }

    #[test]
    fn test_clipboard_events_notify_host() {
        let editor = editor(&[("Front", "")]);
        editor.on_paste();
        editor.on_cut_or_copy();
        assert_eq!(
            editor.platform().sent(),
            vec!["paste".to_string(), "cutOrCopy".to_string()]
        );
    }

    #[test]
    fn test_drain_changes_reports_once() {
        let mut editor = editor(&[("Front", "a")]);
        let changes = editor.drain_changes();
        assert!(changes.structure);
        assert_eq!(changes.fields.len(), 1);
        assert!(editor.drain_changes().is_empty());

        editor.on_focus(0);
        let changes = editor.drain_changes();
        assert!(!changes.structure);
        assert_eq!(changes.fields[0].0, 0);
        assert!(changes.fields[0].1.selection);
    }
}

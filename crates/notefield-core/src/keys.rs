//! Keyboard input types.
//!
//! Platform-agnostic key representation. Platform code converts native key
//! events into a [`KeyCombo`] before handing them to the editor.

use smol_str::SmolStr;

/// Key values for keyboard input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(SmolStr),

    /// Unknown/unidentified key, e.g. during IME composition.
    Unidentified,

    // === Whitespace / editing ===
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Insert,

    // === Navigation ===
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,

    // === Modifiers ===
    Alt,
    AltGraph,
    CapsLock,
    Control,
    Fn,
    Meta,
    NumLock,
    ScrollLock,
    Shift,

    /// Function keys F1 to F24.
    Function(u8),

    /// Any other named key (media, UI, IME mode keys).
    Other(SmolStr),
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Check if this is a navigation key.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::ArrowLeft
                | Self::ArrowRight
                | Self::ArrowUp
                | Self::ArrowDown
                | Self::Home
                | Self::End
                | Self::PageUp
                | Self::PageDown
        )
    }

    /// Check if this is a modifier key.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Self::Alt
                | Self::AltGraph
                | Self::CapsLock
                | Self::Control
                | Self::Fn
                | Self::Meta
                | Self::NumLock
                | Self::ScrollLock
                | Self::Shift
        )
    }
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };

    pub const CTRL_SHIFT: Self = Self {
        ctrl: true,
        alt: false,
        shift: true,
        meta: false,
    };

    /// Ctrl or Cmd held, i.e. the key is an application shortcut.
    pub fn is_shortcut(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key plus the modifiers held with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::CTRL,
        }
    }

    pub fn shift(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::SHIFT,
        }
    }

    /// Whether the key may have changed the content, so a debounced save
    /// has to be (re)started.
    ///
    /// Navigation, bare modifiers, function keys, Tab, Escape and
    /// Ctrl/Cmd + character shortcuts do not count. Shortcuts that do edit
    /// (paste, cut) arrive as input events on their own.
    pub fn triggers_save(&self) -> bool {
        if self.key.is_navigation() || self.key.is_modifier() {
            return false;
        }
        match &self.key {
            Key::Character(_) => !self.modifiers.is_shortcut(),
            Key::Backspace | Key::Delete | Key::Enter | Key::Unidentified => true,
            _ => false,
        }
    }
}

/// Result of handling a keydown event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeydownResult {
    /// Event was handled, prevent default.
    Handled,
    /// Let the platform apply its default behavior.
    PassThrough,
}

/// Whether a selection modification moves the caret or extends the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAlter {
    Move,
    Extend,
}

/// Logical direction of a selection modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Character,
    Word,
}

/// A `Selection.modify()`-style request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionModify {
    pub alter: SelectionAlter,
    pub direction: LogicalDirection,
    pub granularity: Granularity,
}

impl SelectionModify {
    /// Arrow key handling for right-to-left fields.
    ///
    /// Visually right is logically backward there. Ctrl moves by word, Shift
    /// extends. `None` for anything but ArrowLeft/ArrowRight.
    pub fn for_rtl_arrow(combo: &KeyCombo) -> Option<Self> {
        let direction = match combo.key {
            Key::ArrowRight => LogicalDirection::Backward,
            Key::ArrowLeft => LogicalDirection::Forward,
            _ => return None,
        };
        Some(Self {
            alter: if combo.modifiers.shift {
                SelectionAlter::Extend
            } else {
                SelectionAlter::Move
            },
            direction,
            granularity: if combo.modifiers.ctrl {
                Granularity::Word
            } else {
                Granularity::Character
            },
        })
    }

    pub fn alter_str(&self) -> &'static str {
        match self.alter {
            SelectionAlter::Move => "move",
            SelectionAlter::Extend => "extend",
        }
    }

    pub fn direction_str(&self) -> &'static str {
        match self.direction {
            LogicalDirection::Forward => "forward",
            LogicalDirection::Backward => "backward",
        }
    }

    pub fn granularity_str(&self) -> &'static str {
        match self.granularity {
            Granularity::Character => "character",
            Granularity::Word => "word",
        }
    }
}

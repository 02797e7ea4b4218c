//! Browser key events to editor key combos.

use notefield_core::{Key, KeyCombo, Modifiers};

/// Parse a `KeyboardEvent.key` value.
pub fn parse_key(key: &str) -> Key {
    match key {
        "Enter" => Key::Enter,
        "Backspace" => Key::Backspace,
        "Delete" => Key::Delete,
        "Tab" => Key::Tab,
        "Escape" | "Esc" => Key::Escape,
        "Insert" => Key::Insert,
        "ArrowLeft" => Key::ArrowLeft,
        "ArrowRight" => Key::ArrowRight,
        "ArrowUp" => Key::ArrowUp,
        "ArrowDown" => Key::ArrowDown,
        "Home" => Key::Home,
        "End" => Key::End,
        "PageUp" => Key::PageUp,
        "PageDown" => Key::PageDown,
        "Alt" => Key::Alt,
        "AltGraph" => Key::AltGraph,
        "CapsLock" => Key::CapsLock,
        "Control" => Key::Control,
        "Fn" => Key::Fn,
        "Meta" | "OS" => Key::Meta,
        "NumLock" => Key::NumLock,
        "ScrollLock" => Key::ScrollLock,
        "Shift" => Key::Shift,
        "" | "Unidentified" | "Dead" | "Process" => Key::Unidentified,
        s if s.chars().count() == 1 => Key::character(s),
        s => match s.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
            Some(n @ 1..=24) => Key::Function(n),
            _ => Key::Other(s.into()),
        },
    }
}

pub fn key_combo(event: &web_sys::KeyboardEvent) -> KeyCombo {
    KeyCombo::with_modifiers(
        parse_key(&event.key()),
        Modifiers {
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            shift: event.shift_key(),
            meta: event.meta_key(),
        },
    )
}

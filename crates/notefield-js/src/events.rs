//! Event wiring between field elements and the editor.
//!
//! Every call into the editor goes through [`dispatch`]: the focused field's
//! DOM is read into the model first, model changes are rendered afterwards,
//! and queued focus/blur effects run only once the editor is released.
//! Handlers hold a `Weak` so the listeners stored inside the editor do not
//! keep it alive.

use std::rc::Weak;

use gloo_events::{EventListener, EventListenerOptions};
use notefield_browser::{KeydownResult, SaveToken, key_combo};
use wasm_bindgen::JsCast;

use crate::editor::{EditorHandle, InnerEditor};

type WeakHandle = Weak<std::cell::RefCell<InnerEditor>>;

/// Run `f` on the editor with DOM sync before and rendering after.
///
/// Returns `None` when the editor is already borrowed, which happens when
/// DOM work inside another call fires an event synchronously.
pub(crate) fn dispatch<R>(handle: &EditorHandle, f: impl FnOnce(&mut InnerEditor) -> R) -> Option<R> {
    let (result, effects) = {
        let Ok(mut editor) = handle.try_borrow_mut() else {
            tracing::trace!("editor busy, dropping re-entrant call");
            return None;
        };
        sync_current(&mut editor);
        let result = f(&mut editor);

        let changes = editor.drain_changes();
        match editor.platform().render(editor.fields(), &changes) {
            Ok(created) => {
                for ordinal in created {
                    attach_listeners(handle, &editor, ordinal);
                }
            }
            Err(err) => tracing::warn!(error = %err, "rendering fields failed"),
        }
        (result, editor.platform().take_effects())
    };

    for effect in effects {
        effect.apply();
    }
    Some(result)
}

fn sync_current(editor: &mut InnerEditor) {
    let Some(current) = editor.session().current() else {
        return;
    };
    if let Some((doc, selection)) = editor.platform().read_field(current) {
        editor.sync_field(current, doc, selection);
    }
}

fn with_editor<R>(weak: &WeakHandle, f: impl FnOnce(&mut InnerEditor) -> R) -> Option<R> {
    let handle = weak.upgrade()?;
    dispatch(&handle, f)
}

pub(crate) fn save_timer_fired(weak: &WeakHandle, token: SaveToken) {
    with_editor(weak, |editor| {
        editor.platform().timer_fired(token);
        editor.on_save_timer(token);
    });
}

fn attach_listeners(handle: &EditorHandle, editor: &InnerEditor, ordinal: usize) {
    let Some(editable) = editor
        .platform()
        .with_view(ordinal, |view| view.editable().clone())
    else {
        return;
    };
    let weak = std::rc::Rc::downgrade(handle);
    let prevent = EventListenerOptions::enable_prevent_default();

    let listeners = vec![
        {
            let weak = weak.clone();
            EventListener::new(&editable, "focus", move |_| {
                with_editor(&weak, |editor| editor.on_focus(ordinal));
            })
        },
        {
            let weak = weak.clone();
            EventListener::new(&editable, "blur", move |_| {
                with_editor(&weak, |editor| {
                    let retained = editor.platform().field_has_focus(ordinal);
                    editor.on_blur(ordinal, retained);
                });
            })
        },
        {
            let weak = weak.clone();
            EventListener::new_with_options(&editable, "keydown", prevent, move |event| {
                let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                    return;
                };
                let combo = key_combo(event);
                let result = with_editor(&weak, |editor| editor.on_keydown(ordinal, &combo));
                if result == Some(KeydownResult::Handled) {
                    event.prevent_default();
                }
            })
        },
        {
            let weak = weak.clone();
            EventListener::new(&editable, "keyup", move |event| {
                let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                    return;
                };
                let combo = key_combo(event);
                with_editor(&weak, |editor| editor.on_keyup(ordinal, &combo));
            })
        },
        {
            let weak = weak.clone();
            EventListener::new(&editable, "input", move |_| {
                with_editor(&weak, |editor| editor.on_input(ordinal));
            })
        },
        {
            let weak = weak.clone();
            EventListener::new_with_options(&editable, "paste", prevent, move |event| {
                event.prevent_default();
                with_editor(&weak, |editor| editor.on_paste());
            })
        },
        {
            let weak = weak.clone();
            EventListener::new_with_options(&editable, "drop", prevent, move |event| {
                event.prevent_default();
                with_editor(&weak, |editor| editor.on_paste());
            })
        },
        {
            let weak = weak.clone();
            EventListener::new(&editable, "cut", move |_| {
                with_editor(&weak, |editor| editor.on_cut_or_copy());
            })
        },
        EventListener::new(&editable, "copy", move |_| {
            with_editor(&weak, |editor| editor.on_cut_or_copy());
        }),
    ];

    editor.platform().set_listeners(ordinal, listeners);
}

//! Errors from the DOM layer.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BrowserError {
    /// A DOM call threw.
    #[error("DOM operation `{operation}` failed: {message}")]
    Dom {
        operation: &'static str,
        message: String,
    },

    /// A node had an unexpected type.
    #[error("expected {expected}")]
    Cast { expected: &'static str },

    #[error("no view for field {0}")]
    MissingField(usize),
}

impl BrowserError {
    /// Wrap a thrown JS value, keeping its message when it has one.
    pub fn dom(operation: &'static str, value: JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(&value, &JsValue::from_str("message"))
                    .ok()
                    .and_then(|m| m.as_string())
            })
            .unwrap_or_else(|| format!("{value:?}"));
        Self::Dom { operation, message }
    }
}

impl From<BrowserError> for JsValue {
    fn from(err: BrowserError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

/// Shorthand for mapping a `Result<_, JsValue>` into a [`BrowserError`].
pub(crate) trait DomResultExt<T> {
    fn dom_err(self, operation: &'static str) -> Result<T, BrowserError>;
}

impl<T> DomResultExt<T> for Result<T, JsValue> {
    fn dom_err(self, operation: &'static str) -> Result<T, BrowserError> {
        self.map_err(|e| BrowserError::dom(operation, e))
    }
}

//! Browser DOM layer for the note field editor.
//!
//! This crate implements the `notefield-core` platform traits on top of
//! web-sys. It assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `dom_sync`: DOM ↔ model tree and selection synchronization
//! - `fields`: field DOM construction inside style-isolating shadow roots
//! - `events`: keyboard event translation
//! - `platform`: `BrowserPlatform`, the `EditorPlatform` implementation
//!
//! # Re-exports
//!
//! This crate re-exports `notefield-core` for convenience, so consumers
//! only need to depend on `notefield-browser`.

// Re-export core crate
pub use notefield_core;
pub use notefield_core::*;

pub mod dom_sync;
pub mod error;
pub mod events;
pub mod fields;
pub mod platform;

pub use error::BrowserError;
pub use events::{key_combo, parse_key};
pub use fields::{FieldView, FieldViews};
pub use platform::{BrowserPlatform, DomEffect};

//! FX editor: keyboard shortcuts and clipboard transfer on top of an
//! [`fx_core::Canvas`].
//!
//! The host forwards key-down and copy/paste events to an [`Editor`]. Key
//! events are normalized to chords (`ctrl+shift+arrowup`) and dispatched
//! through a [`ShortcutRegistry`] while the canvas has focus.

pub mod clipboard;
pub mod commands;
pub mod config;
pub mod editor;
pub mod input;
pub mod shortcuts;

pub use clipboard::{ClipboardItem, FX_JSON, TransferConverter, TransferRegistry};
pub use commands::install_default_shortcuts;
pub use config::EditorConfig;
pub use editor::Editor;
pub use input::KeyEvent;
pub use shortcuts::{ShortcutHandler, ShortcutRegistry, normalize_chord, parse_chord};

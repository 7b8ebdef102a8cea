//! Shared fixtures for fx-editor integration tests.

#![allow(dead_code)]

use fx_core::{Canvas, CanvasOptions, Registry};
use fx_editor::{Editor, EditorConfig};
use std::rc::Rc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn editor_with(config: EditorConfig) -> Editor {
    init_logging();
    let canvas = Canvas::new(Rc::new(Registry::new()), CanvasOptions::default());
    let mut editor = Editor::with_default_shortcuts(canvas, config).unwrap();
    editor.canvas_mut().set_focused(true);
    editor
}

pub fn editor() -> Editor {
    editor_with(EditorConfig::default())
}

//! The editor: a canvas plus the shortcut and clipboard plumbing around it.

use crate::clipboard::{self, ClipboardItem, TransferRegistry};
use crate::commands::install_default_shortcuts;
use crate::config::EditorConfig;
use crate::input::KeyEvent;
use crate::shortcuts::ShortcutRegistry;
use fx_core::{Canvas, FxResult, ObjectId};

/// Owns the canvas and routes host keyboard and clipboard events to it.
///
/// Creating an editor installs its dispatcher; [`Editor::dispose`]
/// uninstalls it. Events only reach the canvas while it has focus.
#[derive(Debug)]
pub struct Editor {
    canvas: Canvas,
    shortcuts: ShortcutRegistry,
    transfers: TransferRegistry,
    config: EditorConfig,
    installed: bool,
}

impl Editor {
    pub fn new(canvas: Canvas, shortcuts: ShortcutRegistry, config: EditorConfig) -> Self {
        log::debug!("editor installed with {} shortcut(s)", shortcuts.len());
        Self {
            canvas,
            shortcuts,
            transfers: TransferRegistry::default(),
            config,
            installed: true,
        }
    }

    /// An editor with the built-in shortcuts installed.
    pub fn with_default_shortcuts(canvas: Canvas, config: EditorConfig) -> FxResult<Self> {
        let mut shortcuts = ShortcutRegistry::new();
        install_default_shortcuts(&mut shortcuts, &config)?;
        Ok(Self::new(canvas, shortcuts, config))
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn shortcuts_mut(&mut self) -> &mut ShortcutRegistry {
        &mut self.shortcuts
    }

    pub fn transfers_mut(&mut self) -> &mut TransferRegistry {
        &mut self.transfers
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Host key-down. Returns true if a shortcut handled the event.
    pub fn handle_key_down(&mut self, event: &mut KeyEvent) -> bool {
        if !self.installed {
            return false;
        }
        self.shortcuts.dispatch(&mut self.canvas, event)
    }

    /// Host copy event. `None` when unfocused, uninstalled or nothing is selected.
    pub fn copy(&self) -> FxResult<Option<ClipboardItem>> {
        if !self.installed || !self.canvas.has_focus() {
            return Ok(None);
        }
        clipboard::copy_selection(&self.canvas, &self.config)
    }

    /// Host paste (or drop) event. Returns the inserted objects, now selected.
    pub fn paste(&mut self, items: &[ClipboardItem]) -> FxResult<Vec<ObjectId>> {
        if !self.installed || !self.canvas.has_focus() {
            return Ok(Vec::new());
        }
        clipboard::paste(&mut self.canvas, &self.transfers, items)
    }

    /// Uninstall the dispatcher. Calling it again does nothing.
    pub fn dispose(&mut self) {
        if self.installed {
            log::debug!("editor disposed");
        }
        self.installed = false;
    }

    /// Give the canvas back, uninstalling the editor.
    pub fn into_canvas(mut self) -> Canvas {
        self.dispose();
        self.canvas
    }
}

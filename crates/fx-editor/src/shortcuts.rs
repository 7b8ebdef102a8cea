//! Chord normalization and the shortcut registry.
//!
//! A chord is the canonical string form of a key combination:
//! `ctrl?+shift?+alt?+key`, lower-cased, with `meta`/`cmd` folded into
//! `ctrl`. Registered shortcut strings and live key events normalize to the same
//! form, so `"shift+ctrl+A"` matches a Ctrl+Shift+a key press.

use crate::input::KeyEvent;
use fx_core::{Canvas, FxError, FxResult};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Runs when a registered chord is pressed: `(canvas, event)`.
pub type ShortcutHandler = Rc<dyn Fn(&mut Canvas, &KeyEvent)>;

/// Canonical chord for a modifier state and key.
pub fn normalize_chord(ctrl: bool, meta: bool, shift: bool, alt: bool, key: &str) -> String {
    let key = key.trim().to_lowercase();
    let mut parts: SmallVec<[&str; 4]> = SmallVec::new();
    if ctrl || meta {
        parts.push("ctrl");
    }
    if shift {
        parts.push("shift");
    }
    if alt {
        parts.push("alt");
    }
    if !key.is_empty() {
        parts.push(&key);
    }
    parts.join("+")
}

/// Parse a shortcut string such as `"shift + Ctrl+a"` into its canonical chord.
///
/// Parts may come in any order; empty parts are ignored. The first part
/// that is not a modifier is the key.
pub fn parse_chord(shortcut: &str) -> FxResult<String> {
    let (mut ctrl, mut shift, mut alt) = (false, false, false);
    let mut key: Option<String> = None;

    for part in shortcut.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        let part = part.to_lowercase();
        match part.as_str() {
            "ctrl" | "control" | "meta" | "cmd" | "command" => ctrl = true,
            "shift" => shift = true,
            "alt" | "option" => alt = true,
            _ => {
                if key.is_none() {
                    key = Some(part);
                }
            }
        }
    }

    let key = key.ok_or_else(|| FxError::InvalidChord(shortcut.to_string()))?;
    Ok(normalize_chord(ctrl, false, shift, alt, &key))
}

/// Chord → handler map. Registering a chord twice keeps the last handler.
#[derive(Clone, Default)]
pub struct ShortcutRegistry {
    handlers: HashMap<String, ShortcutHandler>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, shortcut: &str, handler: F) -> FxResult<&mut Self>
    where
        F: Fn(&mut Canvas, &KeyEvent) + 'static,
    {
        let chord = parse_chord(shortcut)?;
        self.handlers.insert(chord, Rc::new(handler));
        Ok(self)
    }

    pub fn unregister(&mut self, shortcut: &str) -> FxResult<bool> {
        Ok(self.handlers.remove(&parse_chord(shortcut)?).is_some())
    }

    pub fn lookup(&self, event: &KeyEvent) -> Option<ShortcutHandler> {
        self.handlers.get(&event.chord()).cloned()
    }

    pub fn contains(&self, shortcut: &str) -> bool {
        parse_chord(shortcut).is_ok_and(|chord| self.handlers.contains_key(&chord))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler for `event` if the canvas has focus. Marks the event
    /// default-prevented and returns true when a handler ran.
    pub fn dispatch(&self, canvas: &mut Canvas, event: &mut KeyEvent) -> bool {
        if !canvas.has_focus() {
            return false;
        }
        let Some(handler) = self.lookup(event) else {
            return false;
        };
        log::debug!("shortcut {}", event.chord());
        event.prevent_default();
        handler(canvas, event);
        true
    }
}

impl fmt::Debug for ShortcutRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chords: Vec<_> = self.handlers.keys().collect();
        chords.sort();
        f.debug_struct("ShortcutRegistry").field("chords", &chords).finish()
    }
}

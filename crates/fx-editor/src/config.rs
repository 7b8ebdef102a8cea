//! Editor configuration.

use serde::{Deserialize, Serialize};

/// Tunables for the built-in commands and clipboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Top-level JSON keys dropped from copied objects.
    pub exclude_from_copy: Vec<String>,
    /// Arrow-key nudge in canvas units. Default: **1**.
    pub move_step: f64,
    /// Shift+arrow nudge. Default: **10**.
    pub move_step_large: f64,
    /// Ctrl+Shift+arrow rotation in degrees. Default: **1**.
    pub rotate_step: f64,
    /// Ctrl+Shift+Alt+arrow rotation. Default: **10**.
    pub rotate_step_large: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            exclude_from_copy: Vec::new(),
            move_step: 1.0,
            move_step_large: 10.0,
            rotate_step: 1.0,
            rotate_step_large: 10.0,
        }
    }
}

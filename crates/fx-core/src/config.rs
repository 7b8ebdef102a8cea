//! Canvas configuration.

use serde::{Deserialize, Serialize};

// ─── Strategy ─────────────────────────────────────────────────────────────

/// How a declarative animation drives its object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationStrategy {
    /// Tween the object's own properties.
    #[default]
    InPlace,
    /// Tween a hidden-from-export clone while the original is hidden.
    /// The original reappears untouched when the run ends.
    ShadowClone,
}

// ─── Config ───────────────────────────────────────────────────────────────

/// Configuration for [`Canvas::new`](crate::Canvas::new).
///
/// Deserializable so hosts can keep it alongside their own settings;
/// missing fields fall back to `Default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasOptions {
    /// Initial value of the interactive-selection flag. While set, descriptor
    /// insertions stay unbound and running animations abort. Default: **false**.
    pub selection_in_progress: bool,

    /// Rendering strategy for declarative animations. Default: **in place**.
    pub strategy: AnimationStrategy,

    /// Duration applied when a descriptor omits `duration`. Default: **1000 ms**.
    pub default_duration_ms: f64,

    /// Hover cursor applied while an object has bound custom events.
    pub hover_cursor: String,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            selection_in_progress: false,
            strategy: AnimationStrategy::InPlace,
            default_duration_ms: 1000.0,
            hover_cursor: "pointer".to_string(),
        }
    }
}

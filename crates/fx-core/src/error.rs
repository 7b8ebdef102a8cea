//! Error types shared by the canvas, the observed lists and the editor.

use crate::id::ObjectId;
use thiserror::Error;

/// Everything that can go wrong while binding descriptors or mutating the canvas.
///
/// Binding errors are raised synchronously by the list mutation that caused
/// them; a running animation never produces one.
#[derive(Error, Debug)]
pub enum FxError {
    /// An event descriptor names a handler that was never registered.
    #[error("unknown event name: {0:?}")]
    UnknownEventName(String),

    /// Malformed timing or easing values on an animation descriptor.
    #[error("invalid animation descriptor: {0}")]
    InvalidAnimationDescriptor(String),

    /// A property key outside the animatable set.
    #[error("unknown property: {0:?}")]
    UnknownProperty(String),

    /// An easing key outside the known easing table.
    #[error("unknown easing: {0:?}")]
    UnknownEasing(String),

    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("an object with id {0} is already on the canvas")]
    DuplicateId(ObjectId),

    #[error("index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Lists of an object that lives on a canvas must be mutated through the canvas.
    #[error("object {0} is attached to a canvas")]
    ObjectAttached(ObjectId),

    /// The object kind does not support the requested operation.
    #[error("object {0} does not support {1}")]
    Unsupported(ObjectId, &'static str),

    #[error("cannot group an empty selection")]
    EmptyGroup,

    #[error("invalid shortcut chord: {0:?}")]
    InvalidChord(String),

    #[error("clipboard: {0}")]
    Clipboard(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the workspace.
pub type FxResult<T> = Result<T, FxError>;

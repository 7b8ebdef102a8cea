//! FX core: a retained-mode canvas object model extended with
//! declarative per-object animations, custom events, and the observed
//! descriptor lists that bind them.
//!
//! The canvas owns a scene graph of [`CanvasObject`]s. Each object carries
//! two [`ObservedList`]s (`animations` and `events`) whose insertions and
//! removals register and unregister runtime side effects while the object
//! lives on a canvas. Time only advances through [`Canvas::tick`], which the
//! host calls from its frame loop.

pub mod animation;
pub mod canvas;
pub mod config;
pub mod easing;
pub mod editing;
pub mod error;
pub mod events;
pub mod geometry;
pub mod group;
pub mod id;
pub mod listeners;
pub mod object;
pub mod observed;
pub mod property;
pub mod registry;
pub mod scene;
pub mod snapshot;
pub mod timer;

pub use animation::{AnimationBinding, AnimationDescriptor, RunId, RunPhase};
pub use canvas::{
    Canvas, CanvasEvent, CanvasHandler, ENTER_EDITING, EXIT_EDITING, OBJECT_ADDED,
    OBJECT_MODIFIED, OBJECT_REMOVED,
};
pub use config::{AnimationStrategy, CanvasOptions};
pub use easing::Easing;
pub use editing::CropHandle;
pub use error::{FxError, FxResult};
pub use events::{EventBinding, EventDescriptor};
pub use geometry::{Origin, OriginX, OriginY};
pub use id::ObjectId;
pub use listeners::{ListenerId, ObjectEvent, ObjectHandler};
pub use object::{CanvasObject, ObjectKind};
pub use observed::{ObservedList, Observer};
pub use property::{Property, PropertySet};
pub use registry::{AnimationFactory, EventHandler, Registry};
pub use snapshot::ObjectSnapshot;

// Re-export kurbo geometry so downstream crates don't need a direct dependency
pub use kurbo::{Point, Vec2};

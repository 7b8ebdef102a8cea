//! Origin anchors and the coordinate transforms that keep an object in
//! place when its anchor changes.
//!
//! An object's `left`/`top` is the canvas position of its origin point.
//! The object is rotated by `angle` around that point, so moving the
//! anchor means moving along the rotated bounding box.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Horizontal anchor of an object's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginX {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical anchor of an object's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginY {
    #[default]
    Top,
    Center,
    Bottom,
}

impl OriginX {
    /// Offset from the center as a fraction of the width.
    pub fn offset(self) -> f64 {
        match self {
            OriginX::Left => -0.5,
            OriginX::Center => 0.0,
            OriginX::Right => 0.5,
        }
    }
}

impl OriginY {
    /// Offset from the center as a fraction of the height.
    pub fn offset(self) -> f64 {
        match self {
            OriginY::Top => -0.5,
            OriginY::Center => 0.0,
            OriginY::Bottom => 0.5,
        }
    }
}

/// A pair of anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Origin {
    pub x: OriginX,
    pub y: OriginY,
}

impl Origin {
    pub const TOP_LEFT: Origin = Origin {
        x: OriginX::Left,
        y: OriginY::Top,
    };
    pub const CENTER: Origin = Origin {
        x: OriginX::Center,
        y: OriginY::Center,
    };

    pub const fn new(x: OriginX, y: OriginY) -> Self {
        Self { x, y }
    }
}

/// Rotate a vector by `angle_deg` degrees (clockwise in screen space).
pub fn rotate_vec(v: Vec2, angle_deg: f64) -> Vec2 {
    if angle_deg == 0.0 {
        return v;
    }
    (Affine::rotate(angle_deg.to_radians()) * v.to_point()).to_vec2()
}

/// Translate `point`, expressed under the `from` anchor, to the equivalent
/// point under the `to` anchor.
///
/// `dims` are the transformed (scaled) dimensions of the object and
/// `angle_deg` its rotation. The visual placement of the object is unchanged.
pub fn translate_to_origin(
    point: Point,
    from: Origin,
    to: Origin,
    dims: Vec2,
    angle_deg: f64,
) -> Point {
    let offset = Vec2::new(
        (to.x.offset() - from.x.offset()) * dims.x,
        (to.y.offset() - from.y.offset()) * dims.y,
    );
    if offset == Vec2::ZERO {
        return point;
    }
    point + rotate_vec(offset, angle_deg)
}

/// Axis-aligned bounds of a rotated box given its center.
pub fn rotated_bounds(center: Point, dims: Vec2, angle_deg: f64) -> Rect {
    let half = dims / 2.0;
    let corners = [
        Vec2::new(-half.x, -half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(-half.x, half.y),
    ];
    let first = center + rotate_vec(corners[0], angle_deg);
    corners[1..].iter().fold(Rect::from_points(first, first), |rect, corner| {
        rect.union_pt(center + rotate_vec(*corner, angle_deg))
    })
}

//! The closed set of animatable properties.
//!
//! Animation `from`/`to` maps are keyed by [`Property`], so a typo in a
//! descriptor is rejected when it is parsed instead of silently setting a
//! field nothing reads.

use crate::error::FxError;
use crate::object::CanvasObject;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A numeric object property an animation may drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Property {
    Left,
    Top,
    Width,
    Height,
    Angle,
    ScaleX,
    ScaleY,
    Opacity,
    StrokeWidth,
}

/// Property values keyed by property; ordered so export is stable.
pub type PropertySet = BTreeMap<Property, f64>;

impl Property {
    pub const ALL: [Property; 9] = [
        Property::Left,
        Property::Top,
        Property::Width,
        Property::Height,
        Property::Angle,
        Property::ScaleX,
        Property::ScaleY,
        Property::Opacity,
        Property::StrokeWidth,
    ];

    /// The wire name (`scaleX`, `strokeWidth`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Property::Left => "left",
            Property::Top => "top",
            Property::Width => "width",
            Property::Height => "height",
            Property::Angle => "angle",
            Property::ScaleX => "scaleX",
            Property::ScaleY => "scaleY",
            Property::Opacity => "opacity",
            Property::StrokeWidth => "strokeWidth",
        }
    }

    pub fn get(self, obj: &CanvasObject) -> f64 {
        match self {
            Property::Left => obj.left,
            Property::Top => obj.top,
            Property::Width => obj.width,
            Property::Height => obj.height,
            Property::Angle => obj.angle,
            Property::ScaleX => obj.scale_x,
            Property::ScaleY => obj.scale_y,
            Property::Opacity => obj.opacity,
            Property::StrokeWidth => obj.stroke_width,
        }
    }

    pub fn set(self, obj: &mut CanvasObject, value: f64) {
        match self {
            Property::Left => obj.left = value,
            Property::Top => obj.top = value,
            Property::Width => obj.width = value,
            Property::Height => obj.height = value,
            Property::Angle => obj.angle = value,
            Property::ScaleX => obj.scale_x = value,
            Property::ScaleY => obj.scale_y = value,
            Property::Opacity => obj.opacity = value,
            Property::StrokeWidth => obj.stroke_width = value,
        }
    }
}

/// Current values of `keys` on `obj`.
pub fn pick<'a>(obj: &CanvasObject, keys: impl IntoIterator<Item = &'a Property>) -> PropertySet {
    keys.into_iter().map(|p| (*p, p.get(obj))).collect()
}

/// Write every entry of `values` onto `obj`.
pub fn apply(obj: &mut CanvasObject, values: &PropertySet) {
    for (prop, value) in values {
        prop.set(obj, *value);
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Property {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Property::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| FxError::UnknownProperty(s.to_string()))
    }
}

impl Serialize for Property {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Property {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_parse_back() {
        for prop in Property::ALL {
            assert_eq!(prop.name().parse::<Property>().unwrap(), prop);
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = "lefft".parse::<Property>().unwrap_err();
        assert!(matches!(err, FxError::UnknownProperty(ref k) if k == "lefft"));

        let json = r#"{ "left": 1, "colour": 2 }"#;
        assert!(serde_json::from_str::<PropertySet>(json).is_err());
    }

    #[test]
    fn set_serializes_in_property_order() {
        let set: PropertySet = serde_json::from_str(r#"{ "top": 2, "left": 1 }"#).unwrap();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"{"left":1.0,"top":2.0}"#);
    }

    #[test]
    fn pick_and_apply() {
        let mut obj = CanvasObject::rect(10.0, 20.0).at(5.0, 6.0);
        let picked = pick(&obj, &[Property::Left, Property::Width]);
        assert_eq!(picked, PropertySet::from([(Property::Left, 5.0), (Property::Width, 10.0)]));

        apply(&mut obj, &PropertySet::from([(Property::Opacity, 0.5)]));
        assert_eq!(obj.opacity, 0.5);
    }
}

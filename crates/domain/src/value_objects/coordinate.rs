//! Coordinates for places of interest.
//!
//! A coordinate is exactly one of three reference frames. Each coordinate
//! also carries an identity so the path segmenter can tell "the same point,
//! moved" apart from "a different point at the same location".

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::CoordinateId;

/// The reference frame of a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoordinateType {
    /// Geocentric (earth-centered, earth-fixed) cartesian
    Gcc,
    /// Geodetic latitude/longitude
    Gdc,
    /// Above ground level, in training-application units
    Agl,
}

impl fmt::Display for CoordinateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gcc => write!(f, "GCC"),
            Self::Gdc => write!(f, "GDC"),
            Self::Agl => write!(f, "AGL"),
        }
    }
}

/// The location a coordinate describes, in one of the supported frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoordinateKind {
    Gcc { x: f64, y: f64, z: f64 },
    Gdc {
        latitude: f64,
        longitude: f64,
        elevation: f64,
    },
    Agl { x: f64, y: f64, elevation: f64 },
}

impl CoordinateKind {
    pub fn coordinate_type(&self) -> CoordinateType {
        match self {
            Self::Gcc { .. } => CoordinateType::Gcc,
            Self::Gdc { .. } => CoordinateType::Gdc,
            Self::Agl { .. } => CoordinateType::Agl,
        }
    }

    /// The origin of the given frame, used when an author switches coordinate type.
    pub fn origin(coordinate_type: CoordinateType) -> Self {
        match coordinate_type {
            CoordinateType::Gcc => Self::Gcc {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
            CoordinateType::Gdc => Self::Gdc {
                latitude: 0.0,
                longitude: 0.0,
                elevation: 0.0,
            },
            CoordinateType::Agl => Self::Agl {
                x: 0.0,
                y: 0.0,
                elevation: 0.0,
            },
        }
    }
}

impl fmt::Display for CoordinateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gcc { x, y, z } => write!(f, "GCC({}, {}, {})", x, y, z),
            Self::Gdc {
                latitude,
                longitude,
                elevation,
            } => write!(f, "GDC({}, {}, {})", latitude, longitude, elevation),
            Self::Agl { x, y, elevation } => write!(f, "AGL({}, {}, {})", x, y, elevation),
        }
    }
}

/// A coordinate with identity.
///
/// Equality compares both identity and location. Two coordinates at the same
/// location with different ids are different coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    id: CoordinateId,
    kind: CoordinateKind,
}

impl Coordinate {
    pub fn new(kind: CoordinateKind) -> Self {
        Self {
            id: CoordinateId::new(),
            kind,
        }
    }

    pub fn from_parts(id: CoordinateId, kind: CoordinateKind) -> Self {
        Self { id, kind }
    }

    pub fn gcc(x: f64, y: f64, z: f64) -> Self {
        Self::new(CoordinateKind::Gcc { x, y, z })
    }

    pub fn gdc(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self::new(CoordinateKind::Gdc {
            latitude,
            longitude,
            elevation,
        })
    }

    pub fn agl(x: f64, y: f64, elevation: f64) -> Self {
        Self::new(CoordinateKind::Agl { x, y, elevation })
    }

    #[inline]
    pub fn id(&self) -> CoordinateId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> &CoordinateKind {
        &self.kind
    }

    #[inline]
    pub fn coordinate_type(&self) -> CoordinateType {
        self.kind.coordinate_type()
    }

    pub fn set_kind(&mut self, kind: CoordinateKind) {
        self.kind = kind;
    }

    /// A copy at the same location with a fresh identity.
    pub fn deep_copy(&self) -> Self {
        Self::new(self.kind)
    }

    /// True if both coordinates are the same instance (same id).
    #[inline]
    pub fn is_same(&self, other: &Coordinate) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_type_matches_variant() {
        assert_eq!(Coordinate::gcc(1.0, 2.0, 3.0).coordinate_type(), CoordinateType::Gcc);
        assert_eq!(Coordinate::gdc(40.0, -70.0, 5.0).coordinate_type(), CoordinateType::Gdc);
        assert_eq!(Coordinate::agl(1.0, 2.0, 0.0).coordinate_type(), CoordinateType::Agl);
    }

    #[test]
    fn deep_copy_keeps_location_and_changes_identity() {
        let original = Coordinate::gcc(1.0, 2.0, 3.0);
        let copy = original.deep_copy();

        assert_eq!(copy.kind(), original.kind());
        assert!(!copy.is_same(&original));
        assert_ne!(copy, original);
    }

    #[test]
    fn same_location_different_identity_is_not_equal() {
        let a = Coordinate::gcc(0.0, 0.0, 0.0);
        let b = Coordinate::gcc(0.0, 0.0, 0.0);
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn origin_has_requested_type() {
        assert_eq!(
            CoordinateKind::origin(CoordinateType::Agl).coordinate_type(),
            CoordinateType::Agl
        );
    }

    #[test]
    fn serializes_with_type_tag() {
        let coordinate = Coordinate::gdc(40.5, -73.25, 12.0);
        let json = serde_json::to_value(&coordinate).expect("serialize");
        assert_eq!(json["kind"]["type"], "GDC");
        assert_eq!(json["kind"]["latitude"], 40.5);

        let back: Coordinate = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, coordinate);
    }
}

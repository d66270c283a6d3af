//! Places of interest - named spatial entities referenced from conditions and strategies
//!
//! A place is a [`Point`] (one coordinate), a [`Path`] (a chain of named
//! segments), or an [`Area`] (a closed polygon of coordinates).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::Coordinate;
use crate::PlaceId;

/// Width assigned to every segment the segmenter builds
pub const DEFAULT_SEGMENT_WIDTH: f64 = 1.0;

/// Prefix of generated segment names ("Segment 1", "Segment 2", ...)
pub const SEGMENT_NAME_PREFIX: &str = "Segment";

/// Fewest coordinates a path needs to form one segment
pub const MIN_PATH_COORDINATES: usize = 2;

/// Fewest coordinates an area needs to enclose a region
pub const MIN_AREA_COORDINATES: usize = 3;

/// The shape of a place of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
    Point,
    Path,
    Area,
}

impl fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point => write!(f, "Point"),
            Self::Path => write!(f, "Path"),
            Self::Area => write!(f, "Area"),
        }
    }
}

// ============================================================================
// Point
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub id: PlaceId,
    pub name: String,
    /// None until the author picks a coordinate type
    pub coordinate: Option<Coordinate>,
}

impl Point {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlaceId::new(),
            name: name.into(),
            coordinate: None,
        }
    }

    pub fn with_coordinate(mut self, coordinate: Coordinate) -> Self {
        self.coordinate = Some(coordinate);
        self
    }
}

// ============================================================================
// Segment
// ============================================================================

/// A named, directed edge of a [`Path`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub name: String,
    pub start: Coordinate,
    pub end: Coordinate,
    pub width: f64,
}

impl Segment {
    pub fn new(name: impl Into<String>, start: Coordinate, end: Coordinate) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            width: DEFAULT_SEGMENT_WIDTH,
        }
    }
}

// ============================================================================
// Path
// ============================================================================

/// An ordered chain of segments.
///
/// Segments are only rebuilt through the segmenter, which keeps the end of
/// segment *i* identical to the start of segment *i+1*.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    pub id: PlaceId,
    pub name: String,
    segments: Vec<Segment>,
}

impl Path {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlaceId::new(),
            name: name.into(),
            segments: Vec::new(),
        }
    }

    /// Reconstitute a path from stored segments without checking contiguity.
    pub fn from_segments(id: PlaceId, name: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            id,
            name: name.into(),
            segments,
        }
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn replace_segments(&mut self, segments: Vec<Segment>) {
        self.segments = segments;
    }
}

// ============================================================================
// Area
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: PlaceId,
    pub name: String,
    pub coordinates: Vec<Coordinate>,
}

impl Area {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlaceId::new(),
            name: name.into(),
            coordinates: Vec::new(),
        }
    }

    pub fn with_coordinates(mut self, coordinates: Vec<Coordinate>) -> Self {
        self.coordinates = coordinates;
        self
    }
}

// ============================================================================
// PlaceOfInterest
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlaceOfInterest {
    Point(Point),
    Path(Path),
    Area(Area),
}

impl PlaceOfInterest {
    pub fn id(&self) -> PlaceId {
        match self {
            Self::Point(p) => p.id,
            Self::Path(p) => p.id,
            Self::Area(a) => a.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Point(p) => &p.name,
            Self::Path(p) => &p.name,
            Self::Area(a) => &a.name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self {
            Self::Point(p) => p.name = name,
            Self::Path(p) => p.name = name,
            Self::Area(a) => a.name = name,
        }
    }

    pub fn kind(&self) -> PlaceKind {
        match self {
            Self::Point(_) => PlaceKind::Point,
            Self::Path(_) => PlaceKind::Path,
            Self::Area(_) => PlaceKind::Area,
        }
    }
}

impl From<Point> for PlaceOfInterest {
    fn from(value: Point) -> Self {
        Self::Point(value)
    }
}

impl From<Path> for PlaceOfInterest {
    fn from(value: Path) -> Self {
        Self::Path(value)
    }
}

impl From<Area> for PlaceOfInterest {
    fn from(value: Area) -> Self {
        Self::Area(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_uses_default_width() {
        let segment = Segment::new("Segment 1", Coordinate::gcc(0.0, 0.0, 0.0), Coordinate::gcc(1.0, 0.0, 0.0));
        assert_eq!(segment.width, DEFAULT_SEGMENT_WIDTH);
    }

    #[test]
    fn place_accessors_dispatch_by_kind() {
        let mut place: PlaceOfInterest = Area::new("Compound").into();
        assert_eq!(place.kind(), PlaceKind::Area);
        assert_eq!(place.name(), "Compound");

        place.set_name("Outer Compound");
        assert_eq!(place.name(), "Outer Compound");
    }

    #[test]
    fn place_serializes_with_kind_tag() {
        let place: PlaceOfInterest = Point::new("Rally Point")
            .with_coordinate(Coordinate::agl(1.0, 2.0, 0.0))
            .into();
        let json = serde_json::to_value(&place).expect("serialize");
        assert_eq!(json["kind"], "point");
        assert_eq!(json["name"], "Rally Point");
    }
}

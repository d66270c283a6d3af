//! Editable copies of places of interest.
//!
//! An editor works on a [`PlaceDraft`] so that cancelling leaves the document
//! untouched. Coordinates are deep-copied with fresh ids; the draft remembers
//! which original each copy replaces so path segment names survive the edit.

use std::collections::HashMap;

use crate::aggregates::ScenarioDocument;
use crate::entities::{Path, PlaceKind, PlaceOfInterest};
use crate::error::DomainError;
use crate::value_objects::Coordinate;
use crate::{CoordinateId, PlaceId};

use super::segmenter::{compute_coordinates, set_coordinates};
use super::validation::PlaceValidation;

/// Working coordinates of a draft, by place shape.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftShape {
    Point(Option<Coordinate>),
    Path(Vec<Coordinate>),
    Area(Vec<Coordinate>),
}

impl DraftShape {
    pub fn kind(&self) -> PlaceKind {
        match self {
            Self::Point(_) => PlaceKind::Point,
            Self::Path(_) => PlaceKind::Path,
            Self::Area(_) => PlaceKind::Area,
        }
    }
}

/// Name change produced by applying a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceEdit {
    pub place: PlaceId,
    pub old_name: String,
    pub new_name: String,
}

impl PlaceEdit {
    pub fn renamed(&self) -> bool {
        self.old_name != self.new_name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDraft {
    place: PlaceId,
    pub name: String,
    pub shape: DraftShape,
    replacement_to_original: HashMap<CoordinateId, CoordinateId>,
}

impl PlaceDraft {
    /// Start editing a copy of `place`.
    pub fn edit(place: &PlaceOfInterest) -> Self {
        let mut replacement_to_original = HashMap::new();
        let mut copy = |original: &Coordinate| {
            let replacement = original.deep_copy();
            replacement_to_original.insert(replacement.id(), original.id());
            replacement
        };

        let shape = match place {
            PlaceOfInterest::Point(point) => DraftShape::Point(point.coordinate.as_ref().map(&mut copy)),
            PlaceOfInterest::Path(path) => {
                DraftShape::Path(compute_coordinates(path).iter().map(&mut copy).collect())
            }
            PlaceOfInterest::Area(area) => {
                DraftShape::Area(area.coordinates.iter().map(&mut copy).collect())
            }
        };

        Self {
            place: place.id(),
            name: place.name().to_string(),
            shape,
            replacement_to_original,
        }
    }

    #[inline]
    pub fn place(&self) -> PlaceId {
        self.place
    }

    /// The original coordinate a draft coordinate replaces, if any.
    pub fn original_of(&self, replacement: CoordinateId) -> Option<CoordinateId> {
        self.replacement_to_original.get(&replacement).copied()
    }

    /// What the place would look like with the draft applied.
    pub fn preview(&self, current: &PlaceOfInterest) -> Result<PlaceOfInterest, DomainError> {
        let mut preview = current.clone();
        self.write_into(&mut preview)?;
        Ok(preview)
    }

    pub fn validate(&self, doc: &ScenarioDocument) -> Result<PlaceValidation, DomainError> {
        let current = doc
            .place(self.place)
            .ok_or_else(|| DomainError::not_found("PlaceOfInterest", self.place.to_string()))?;
        Ok(doc.validate_place(&self.preview(current)?))
    }

    /// Write the draft's name (trimmed) and coordinates into `target`.
    ///
    /// Paths are rebuilt through the segmenter with the replacement map, so
    /// unchanged points keep their segment names. The caller is responsible
    /// for propagating a rename.
    pub fn apply_edits(&self, target: &mut PlaceOfInterest) -> Result<PlaceEdit, DomainError> {
        let old_name = target.name().to_string();
        self.write_into(target)?;
        Ok(PlaceEdit {
            place: target.id(),
            old_name,
            new_name: target.name().to_string(),
        })
    }

    fn write_into(&self, target: &mut PlaceOfInterest) -> Result<(), DomainError> {
        let mismatch = DomainError::validation(format!(
            "Draft of {} {} cannot be applied to {} '{}'",
            self.shape.kind(),
            self.place,
            target.kind(),
            target.name()
        ));
        if target.id() != self.place {
            return Err(mismatch);
        }
        let name = self.name.trim();

        match (&self.shape, target) {
            (DraftShape::Point(coordinate), PlaceOfInterest::Point(point)) => {
                point.name = name.to_string();
                point.coordinate = *coordinate;
            }
            (DraftShape::Path(coordinates), PlaceOfInterest::Path(path)) => {
                write_path(path, name, coordinates, &self.replacement_to_original);
            }
            (DraftShape::Area(coordinates), PlaceOfInterest::Area(area)) => {
                area.name = name.to_string();
                area.coordinates = coordinates.clone();
            }
            _ => return Err(mismatch),
        }
        Ok(())
    }
}

fn write_path(
    path: &mut Path,
    name: &str,
    coordinates: &[Coordinate],
    replacement_to_original: &HashMap<CoordinateId, CoordinateId>,
) {
    path.name = name.to_string();
    set_coordinates(path, Some(coordinates), Some(replacement_to_original));
}

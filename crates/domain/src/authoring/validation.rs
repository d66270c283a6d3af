//! Boundary checks for places of interest.
//!
//! Each check reports per field instead of failing fast, so an editor can
//! flag every problem at once.

use crate::aggregates::ScenarioDocument;
use crate::entities::{PlaceKind, PlaceOfInterest, MIN_AREA_COORDINATES, MIN_PATH_COORDINATES};
use crate::error::DomainError;

use super::segmenter::compute_coordinates;
use super::{EntityRef, ReferenceKind};

/// Field-by-field validity of a place of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceValidation {
    pub name: Result<(), DomainError>,
    /// Points must have a coordinate type selected
    pub coordinate_type: Result<(), DomainError>,
    /// Paths need 2 coordinates, areas 3
    pub coordinates: Result<(), DomainError>,
}

impl PlaceValidation {
    pub fn is_valid(&self) -> bool {
        self.name.is_ok() && self.coordinate_type.is_ok() && self.coordinates.is_ok()
    }

    /// The first failing check, if any.
    pub fn into_result(self) -> Result<(), DomainError> {
        self.name?;
        self.coordinate_type?;
        self.coordinates
    }
}

/// Checks only the coordinate rules, for a place not yet in any document.
pub fn validate_coordinates(place: &PlaceOfInterest) -> (Result<(), DomainError>, Result<(), DomainError>) {
    match place {
        PlaceOfInterest::Point(point) => {
            let coordinate_type = match point.coordinate {
                Some(_) => Ok(()),
                None => Err(DomainError::validation(format!(
                    "Point '{}' needs a coordinate type",
                    point.name
                ))),
            };
            (coordinate_type, Ok(()))
        }
        PlaceOfInterest::Path(path) => {
            let count = compute_coordinates(path).len();
            (Ok(()), require(PlaceKind::Path, MIN_PATH_COORDINATES, count))
        }
        PlaceOfInterest::Area(area) => (
            Ok(()),
            require(PlaceKind::Area, MIN_AREA_COORDINATES, area.coordinates.len()),
        ),
    }
}

fn require(kind: PlaceKind, required: usize, actual: usize) -> Result<(), DomainError> {
    if actual < required {
        Err(DomainError::insufficient_points(kind, required, actual))
    } else {
        Ok(())
    }
}

impl ScenarioDocument {
    /// Validate a place against the document's other places.
    ///
    /// The place does not need to be in the document; when it is, its own
    /// name does not count as a duplicate.
    pub fn validate_place(&self, place: &PlaceOfInterest) -> PlaceValidation {
        let name = if self.is_name_unique(
            ReferenceKind::PlaceOfInterest,
            place.name(),
            Some(EntityRef::Place(place.id())),
        ) {
            Ok(())
        } else if place.name().trim().is_empty() {
            Err(DomainError::invalid_name(place.name(), "name cannot be blank"))
        } else {
            Err(DomainError::invalid_name(
                place.name(),
                "another place of interest already uses this name",
            ))
        };
        let (coordinate_type, coordinates) = validate_coordinates(place);

        PlaceValidation {
            name,
            coordinate_type,
            coordinates,
        }
    }
}

//! Value objects - immutable, validated building blocks of the scenario document.

mod coordinate;
mod names;

pub use coordinate::{Coordinate, CoordinateKind, CoordinateType};
pub use names::{is_blank, EntityName, NameMatching};

//! Path segmentation: converting between a path's segments and a flat coordinate list.
//!
//! Segments are a derived representation of an ordered point list, but their
//! names are persisted and referenced elsewhere, so names follow coordinate
//! identity across edits.

use std::collections::{HashMap, HashSet};

use crate::entities::{Path, Segment, SEGMENT_NAME_PREFIX};
use crate::value_objects::Coordinate;
use crate::CoordinateId;

/// Flatten a path into its ordered coordinates: every segment start, then the last segment's end.
///
/// Segments are assumed contiguous. Disjoint segments are not repaired; the
/// result simply lists whatever coordinates are present.
pub fn compute_coordinates(path: &Path) -> Vec<Coordinate> {
    let mut coordinates: Vec<Coordinate> = path.segments().iter().map(|s| s.start).collect();
    if let Some(last) = path.segments().last() {
        coordinates.push(last.end);
    }
    coordinates
}

/// Rebuild a path's segments from an ordered coordinate list.
///
/// `None` or an empty list leaves the path unchanged. Otherwise one segment is
/// built per consecutive pair. A segment keeps the old name of the segment
/// whose start was the original of its start coordinate (looked up through
/// `replacement_to_original`), unless an earlier segment already took that
/// name; everything else gets the next free `"Segment N"`.
pub fn set_coordinates(
    path: &mut Path,
    coordinates: Option<&[Coordinate]>,
    replacement_to_original: Option<&HashMap<CoordinateId, CoordinateId>>,
) {
    let Some(coordinates) = coordinates.filter(|c| !c.is_empty()) else {
        return;
    };

    // Later segments win when two share a start, matching a plain map insert
    let old_names: HashMap<CoordinateId, String> = path
        .segments()
        .iter()
        .map(|s| (s.start.id(), s.name.clone()))
        .collect();

    let mut assigned: HashSet<String> = HashSet::new();
    let mut counter = 0usize;
    let mut segments = Vec::with_capacity(coordinates.len().saturating_sub(1));

    for pair in coordinates.windows(2) {
        let (start, end) = (pair[0], pair[1]);

        let preserved = replacement_to_original
            .and_then(|map| map.get(&start.id()))
            .and_then(|original| old_names.get(original))
            .filter(|name| !assigned.contains(name.as_str()))
            .cloned();

        let name = match preserved {
            Some(name) => name,
            None => loop {
                counter += 1;
                let candidate = format!("{} {}", SEGMENT_NAME_PREFIX, counter);
                if !assigned.contains(&candidate) {
                    break candidate;
                }
            },
        };

        assigned.insert(name.clone());
        segments.push(Segment::new(name, start, end));
    }

    path.replace_segments(segments);
}

/// Map each coordinate to itself, for edits that keep coordinate identity.
pub fn identity_map(coordinates: &[Coordinate]) -> HashMap<CoordinateId, CoordinateId> {
    coordinates.iter().map(|c| (c.id(), c.id())).collect()
}

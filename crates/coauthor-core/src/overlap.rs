//! Overlap Detector.
//!
//! Two patches overlap when they target the same section and their ranges
//! strictly intersect. Ranges that only touch (`a.end == b.start`) do not
//! overlap, so two inserts at one boundary can coexist.

use crate::patch::Patch;

/// Whether `a` and `b` touch the same characters of the same section.
pub fn overlaps(a: &Patch, b: &Patch) -> bool {
    a.section_id == b.section_id && a.position.intersects(&b.position)
}
